mod support;

use ddlscope::model::PolicyCommand;
use ddlscope::parser::locator::StatementLocator;
use ddlscope::parser::policy_body::PolicyBodyParser;
use support::{parse_fixture, policy, read_fixture_sql, table};

#[test]
fn locator_finds_policies_in_source_order() {
    let located = StatementLocator::new().locate(&read_fixture_sql("supabase_blog"));

    let found: Vec<(&str, &str)> = located
        .policies
        .iter()
        .map(|p| (p.table.as_str(), p.name.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("profiles", "Profiles are viewable by everyone"),
            ("profiles", "Users can update own profile"),
            ("posts", "Published posts are visible"),
            ("posts", "Authors manage own posts"),
            ("posts", "Admins can delete posts"),
            ("comments", "Comments on published posts"),
            ("comments", "Users insert own comments"),
        ]
    );
    assert_eq!(
        located.rls_enabled.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["comments", "posts", "profiles"]
    );
}

#[test]
fn own_rows_scenario() {
    let schema = ddlscope::parse_schema(
        "CREATE TABLE posts (id uuid PRIMARY KEY, user_id uuid);\n\
         CREATE POLICY \"own_rows\" ON posts FOR SELECT USING (auth.uid() = user_id);",
    );
    let own_rows = policy(table(&schema, "posts"), "own_rows");
    assert_eq!(own_rows.command, PolicyCommand::Select);
    assert_eq!(own_rows.roles, vec!["public".to_string()]);
    assert_eq!(own_rows.using.as_deref(), Some("auth.uid() = user_id"));
    assert!(own_rows.plain_english.contains("only their own data"));
}

#[test]
fn nested_exists_predicate_is_extracted_whole() {
    let schema = parse_fixture("supabase_blog");

    let admins = policy(table(&schema, "posts"), "Admins can delete posts");
    assert_eq!(admins.command, PolicyCommand::Delete);
    assert!(!admins.permissive);
    assert_eq!(
        admins.using.as_deref(),
        Some(
            "EXISTS (SELECT 1 FROM public.profiles WHERE profiles.id = auth.uid() AND profiles.role = 'admin')"
        )
    );
    assert_eq!(admins.with_check, None);
}

#[test]
fn using_and_with_check_are_both_captured() {
    let schema = parse_fixture("supabase_blog");

    let update = policy(table(&schema, "profiles"), "Users can update own profile");
    assert_eq!(update.command, PolicyCommand::Update);
    assert_eq!(update.roles, vec!["authenticated".to_string()]);
    assert_eq!(update.using.as_deref(), Some("auth.uid() = id"));
    assert_eq!(update.with_check.as_deref(), Some("auth.uid() = id"));

    let insert = policy(table(&schema, "comments"), "Users insert own comments");
    assert_eq!(insert.using, None);
    assert_eq!(insert.with_check.as_deref(), Some("auth.uid() = user_id"));
}

#[test]
fn parenthesized_predicate_keeps_inner_parens() {
    let draft = PolicyBodyParser::new().parse(
        "p",
        "t",
        "FOR SELECT USING ((EXISTS (SELECT 1 FROM roles WHERE role = 'admin')))",
    );
    assert_eq!(
        draft.using.as_deref(),
        Some("(EXISTS (SELECT 1 FROM roles WHERE role = 'admin'))")
    );
}

#[test]
fn only_the_first_listed_role_is_kept() {
    let schema = ddlscope::parse_schema(
        "CREATE TABLE docs (id int PRIMARY KEY);\n\
         CREATE POLICY shared ON docs FOR SELECT TO authenticated, anon USING (true);",
    );
    let shared = policy(table(&schema, "docs"), "shared");
    assert_eq!(shared.roles, vec!["authenticated".to_string()]);
    assert_eq!(shared.plain_english, "Logged-in users can view rows — unrestricted");
}

#[test]
fn only_keyword_and_quoted_table_names_are_accepted() {
    let located = StatementLocator::new().locate(
        "CREATE POLICY \"p1\" ON ONLY \"app\".\"Docs\" USING (true);\n\
         CREATE POLICY p2 ON app.docs FOR DELETE USING (false);",
    );
    assert_eq!(located.policies[0].table, "Docs");
    assert_eq!(located.policies[1].name, "p2");
    assert_eq!(located.policies[1].body, "FOR DELETE USING (false)");
}

#[test]
fn quoted_create_inside_a_predicate_does_not_end_the_policy() {
    let schema = ddlscope::parse_schema(
        "CREATE TABLE audit (id int PRIMARY KEY, action text, \"create\" boolean);\n\
         CREATE POLICY \"writes\" ON audit FOR INSERT WITH CHECK (action IN ('create', 'update'));\n\
         CREATE POLICY flagged ON audit FOR SELECT USING (\"create\" = true);\n\
         CREATE TABLE after_audit (id int PRIMARY KEY);",
    );
    let audit = table(&schema, "audit");

    let writes = policy(audit, "writes");
    assert_eq!(writes.command, PolicyCommand::Insert);
    assert_eq!(
        writes.with_check.as_deref(),
        Some("action IN ('create', 'update')")
    );

    let flagged = policy(audit, "flagged");
    assert_eq!(flagged.using.as_deref(), Some("\"create\" = true"));
    assert_eq!(schema.stats.total_tables, 2);
}
