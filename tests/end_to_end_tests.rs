mod support;

use ddlscope::audit::{schema_warnings, Severity, WarningKind};
use ddlscope::output::context::schema_context;
use support::parse_fixture;

/// Full pipeline for the blog schema: parse, annotate, linearize.
/// This is the primary acceptance test.
#[test]
fn end_to_end_supabase_blog_context() {
    let schema = parse_fixture("supabase_blog");

    insta::assert_snapshot!(schema_context(&schema), @r###"
DATABASE SUMMARY:
- Total Tables: 4
- Total Columns: 15
- Total Foreign Keys: 4
- Tables with RLS: 3

TABLE profiles (schema: public):
  id uuid PRIMARY KEY NOT NULL
  username text UNIQUE
  role text DEFAULT 'user'::text
  created_at timestamp with time zone DEFAULT now()
  FOREIGN KEY (id) REFERENCES users(id)
  -- RLS ENABLED
  -- Policies:
  --   Profiles are viewable by everyone (SELECT): Anyone can view rows — unrestricted
  --   Users can update own profile (UPDATE): Logged-in users can modify rows — only their own record. Can only modify own record

TABLE posts (schema: public):
  id bigint PRIMARY KEY NOT NULL
  author_id uuid NOT NULL
  title character varying(200) NOT NULL
  body text
  is_published boolean NOT NULL DEFAULT false
  FOREIGN KEY (author_id) REFERENCES profiles(id)
  -- RLS ENABLED
  -- Policies:
  --   Published posts are visible (SELECT): Anyone can view rows — only published content
  --   Authors manage own posts (ALL): Logged-in users can access rows — condition: auth.uid() = author_id. Validation required
  --   Admins can delete posts (DELETE): Restricts who can remove rows — only users with admin role

TABLE comments (schema: public):
  id bigint PRIMARY KEY NOT NULL
  post_id bigint NOT NULL
  user_id uuid NOT NULL
  content text NOT NULL
  FOREIGN KEY (post_id) REFERENCES posts(id)
  FOREIGN KEY (user_id) REFERENCES profiles(id)
  -- RLS ENABLED
  -- Policies:
  --   Comments on published posts (SELECT): Anyone can view rows — only published content
  --   Users insert own comments (INSERT): Logged-in users can create rows. Must set user_id to own ID

TABLE audit_log (schema: public):
  id bigserial
  action text NOT NULL
"###);
}

/// The serialized model keeps the field names downstream consumers read.
#[test]
fn end_to_end_json_contract() {
    let schema = parse_fixture("messaging");
    let json = serde_json::to_value(&schema).expect("schema should serialize");

    assert_eq!(json["stats"]["totalTables"], 2);
    assert_eq!(json["stats"]["totalRLSPolicies"], 4);
    assert_eq!(json["stats"]["tablesWithRLS"], 2);

    let messages = &json["tables"][0];
    assert_eq!(messages["name"], "messages");
    assert_eq!(messages["columns"][0]["defaultValue"], "gen_random_uuid()");
    assert_eq!(messages["columns"][4]["type"], "timestamptz");
    assert_eq!(messages["rlsPolicies"][1]["command"], "INSERT");
    assert_eq!(messages["rlsPolicies"][1]["withCheck"], "auth.uid() = sender_id");
    assert!(messages["rlsPolicies"][1]["using"].is_null());

    let blocked = &json["tables"][1];
    assert_eq!(blocked["rlsEnabled"], true);
    assert_eq!(blocked["rlsPolicies"], serde_json::json!([]));
}

#[test]
fn end_to_end_warnings() {
    let schema = parse_fixture("messaging");
    let warnings = schema_warnings(&schema);

    let critical = warnings
        .iter()
        .find(|w| w.kind == WarningKind::RlsWithoutPolicies)
        .expect("blocked_senders should be flagged");
    assert_eq!(critical.severity, Severity::Error);
    assert_eq!(critical.tables, vec!["blocked_senders".to_string()]);
    assert!(!warnings
        .iter()
        .any(|w| w.kind == WarningKind::MissingPrimaryKey));

    let blog_warnings = schema_warnings(&parse_fixture("supabase_blog"));
    let kinds: Vec<WarningKind> = blog_warnings.iter().map(|w| w.kind).collect();
    assert_eq!(
        kinds,
        vec![
            WarningKind::MissingPrimaryKey,
            WarningKind::NoRowLevelSecurity,
            WarningKind::IsolatedTable,
        ]
    );
    assert!(blog_warnings.iter().all(|w| w.tables == vec!["audit_log".to_string()]));
}
