use std::collections::BTreeSet;

use regex::Regex;
use tracing::{debug, trace};

use crate::parser::names::{qualified_name, relation_name, unquote_identifier};
use crate::parser::scan::{blank_comments, is_unquoted, matching_paren, statement_end};

/// A bare or quoted identifier.
const IDENT: &str = r#"(?:"[^"]+"|`[^`]+`|[A-Za-z_][\w$]*)"#;

fn qualified_ident() -> String {
    format!(r"{IDENT}(?:\s*\.\s*{IDENT})?")
}

/// Raw span of one `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStatement {
    /// Schema qualifier, `public` when absent.
    pub schema: String,
    /// Relation name with quoting stripped.
    pub name: String,
    /// Text strictly inside the statement's outer parentheses.
    pub body: String,
}

/// Raw span of one `CREATE POLICY` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyStatement {
    /// Policy name with quoting stripped.
    pub name: String,
    /// Bare name of the table the policy is declared on.
    pub table: String,
    /// Everything after the table identifier up to the end of the statement.
    pub body: String,
}

/// Everything the locator found in one source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatedStatements {
    /// Tables named in `ALTER TABLE ... ENABLE ROW LEVEL SECURITY`.
    pub rls_enabled: BTreeSet<String>,
    /// `CREATE POLICY` statements in source order.
    pub policies: Vec<PolicyStatement>,
    /// `CREATE TABLE` statements in source order.
    pub tables: Vec<TableStatement>,
}

/// Finds table, policy and RLS-enable statements by structural matching.
///
/// Comments are blanked before scanning, so commented-out statements are
/// never reported. Nothing here fails: text that does not look like one of
/// the three statement families is ignored.
#[derive(Debug, Clone)]
pub struct StatementLocator {
    enable_rls: Regex,
    create_policy: Regex,
    create_table: Regex,
    create_keyword: Regex,
}

impl StatementLocator {
    /// Compile the statement patterns.
    pub fn new() -> Self {
        let qualified = qualified_ident();
        Self {
            enable_rls: Regex::new(&format!(
                r"(?i)\bALTER\s+TABLE\s+(?:IF\s+EXISTS\s+)?(?:ONLY\s+)?({qualified})\s+ENABLE\s+ROW\s+LEVEL\s+SECURITY\b"
            ))
            .expect("valid regex"),
            create_policy: Regex::new(&format!(
                r"(?i)\bCREATE\s+POLICY\s+({IDENT})\s+ON\s+(?:ONLY\s+)?({qualified})"
            ))
            .expect("valid regex"),
            create_table: Regex::new(&format!(
                r"(?i)\bCREATE\s+(?:(?:GLOBAL|LOCAL)\s+)?(?:(?:TEMP|TEMPORARY|UNLOGGED)\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?({qualified})\s*\("
            ))
            .expect("valid regex"),
            create_keyword: Regex::new(r"(?i)\bCREATE\b").expect("valid regex"),
        }
    }

    /// Scan `sql` for all three statement families.
    pub fn locate(&self, sql: &str) -> LocatedStatements {
        let text = blank_comments(sql);
        let located = LocatedStatements {
            rls_enabled: self.rls_enabled_tables(&text),
            policies: self.policies(&text),
            tables: self.tables(&text),
        };
        debug!(
            tables = located.tables.len(),
            policies = located.policies.len(),
            rls_enabled = located.rls_enabled.len(),
            "located DDL statements"
        );
        located
    }

    fn rls_enabled_tables(&self, text: &str) -> BTreeSet<String> {
        self.enable_rls
            .captures_iter(text)
            .map(|cap| relation_name(&cap[1]))
            .collect()
    }

    fn policies(&self, text: &str) -> Vec<PolicyStatement> {
        self.create_policy
            .captures_iter(text)
            .filter_map(|cap| {
                let whole = cap.get(0)?;
                let rest = &text[whole.end()..];
                // The body never runs into the next statement: it stops at the next
                // unquoted CREATE or at the first top-level semicolon, whichever comes first.
                let next_create = self
                    .create_keyword
                    .find_iter(rest)
                    .find(|m| is_unquoted(rest, m.start()))
                    .map_or(rest.len(), |m| m.start());
                let scoped = &rest[..next_create];
                let body = scoped[..statement_end(scoped)].trim();

                Some(PolicyStatement {
                    name: unquote_identifier(&cap[1]).to_string(),
                    table: relation_name(&cap[2]),
                    body: body.to_string(),
                })
            })
            .collect()
    }

    fn tables(&self, text: &str) -> Vec<TableStatement> {
        self.create_table
            .captures_iter(text)
            .filter_map(|cap| {
                let whole = cap.get(0)?;
                let open = whole.end() - 1;
                let (schema, name) = qualified_name(&cap[1]);
                let Some(close) = table_body_end(text, open) else {
                    trace!(table = %name, "skipping CREATE TABLE without a closing parenthesis");
                    return None;
                };

                Some(TableStatement {
                    schema: schema.unwrap_or_else(|| "public".to_string()),
                    name,
                    body: text[open + 1..close].to_string(),
                })
            })
            .collect()
    }
}

impl Default for StatementLocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Offset of the `)` closing a table body opened at `open`.
///
/// Prefers the balancing parenthesis; unbalanced hand-edited bodies fall back
/// to the first literal `);` after the opening parenthesis.
fn table_body_end(text: &str, open: usize) -> Option<usize> {
    matching_paren(text, open).or_else(|| text[open..].find(");").map(|idx| open + idx))
}
