use regex::Regex;
use tracing::trace;

use crate::model::{PolicyCommand, PolicyDraft};
use crate::parser::names::unquote_identifier;
use crate::parser::scan::{balanced_prefix, blank_comments};

/// Extracts command, role, predicates and permissiveness from a policy body.
///
/// The body is whatever followed `ON <table>` in the statement, e.g.
/// `AS RESTRICTIVE FOR UPDATE TO authenticated USING (...) WITH CHECK (...)`.
#[derive(Debug, Clone)]
pub struct PolicyBodyParser {
    restrictive: Regex,
    command: Regex,
    role: Regex,
    using: Regex,
    with_check: Regex,
}

impl PolicyBodyParser {
    /// Compile the clause patterns.
    pub fn new() -> Self {
        Self {
            restrictive: Regex::new(r"(?i)\bAS\s+RESTRICTIVE\b").expect("valid regex"),
            command: Regex::new(r"(?i)\bFOR\s+(ALL|SELECT|INSERT|UPDATE|DELETE)\b")
                .expect("valid regex"),
            role: Regex::new(r#"(?i)\bTO\s+("[^"]+"|[A-Za-z_][\w$]*)"#).expect("valid regex"),
            using: Regex::new(r"(?i)\bUSING\s*\(").expect("valid regex"),
            with_check: Regex::new(r"(?i)\bWITH\s+CHECK\s*\(").expect("valid regex"),
        }
    }

    /// Parse one policy body into a draft awaiting its prose summary.
    pub fn parse(&self, name: &str, table: &str, body: &str) -> PolicyDraft {
        let body = blank_comments(body);
        let using = self.using.find(&body);
        let with_check = self.with_check.find(&body);

        // Command and role keywords only count before the first predicate.
        let header_end = [using, with_check]
            .into_iter()
            .flatten()
            .map(|m| m.start())
            .min()
            .unwrap_or(body.len());
        let header = &body[..header_end];

        let command = self
            .command
            .captures(header)
            .and_then(|cap| cap[1].parse().ok())
            .unwrap_or(PolicyCommand::All);
        // Only the first role of a `TO a, b` list is kept.
        let roles = match self.role.captures(header) {
            Some(cap) => vec![unquote_identifier(&cap[1]).to_string()],
            None => vec!["public".to_string()],
        };

        let draft = PolicyDraft {
            name: name.to_string(),
            command,
            roles,
            using: using.and_then(|m| predicate(&body[m.end()..])),
            with_check: with_check.and_then(|m| predicate(&body[m.end()..])),
            permissive: !self.restrictive.is_match(header),
        };
        trace!(table, policy = name, command = %draft.command, "parsed policy body");
        draft
    }
}

impl Default for PolicyBodyParser {
    fn default() -> Self {
        Self::new()
    }
}

fn predicate(inner: &str) -> Option<String> {
    let text = balanced_prefix(inner).trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> PolicyDraft {
        PolicyBodyParser::new().parse("p", "t", body)
    }

    #[test]
    fn defaults_apply_when_clauses_are_missing() {
        let draft = parse("USING (true)");
        assert_eq!(draft.command, PolicyCommand::All);
        assert_eq!(draft.roles, vec!["public".to_string()]);
        assert_eq!(draft.using.as_deref(), Some("true"));
        assert_eq!(draft.with_check, None);
        assert!(draft.permissive);
    }

    #[test]
    fn nested_predicates_are_kept_whole() {
        let draft = parse(
            "FOR UPDATE TO authenticated \
             USING (EXISTS (SELECT 1 FROM roles WHERE role = 'admin')) \
             WITH CHECK ((auth.uid() = user_id))",
        );
        assert_eq!(draft.command, PolicyCommand::Update);
        assert_eq!(
            draft.using.as_deref(),
            Some("EXISTS (SELECT 1 FROM roles WHERE role = 'admin')")
        );
        assert_eq!(draft.with_check.as_deref(), Some("(auth.uid() = user_id)"));
    }

    #[test]
    fn only_first_role_of_a_list_is_captured() {
        let draft = parse("FOR SELECT TO authenticated, anon USING (true)");
        assert_eq!(draft.roles, vec!["authenticated".to_string()]);
    }

    #[test]
    fn restrictive_and_quoted_role_are_recognized() {
        let draft = parse(r#"AS RESTRICTIVE FOR DELETE TO "service_role" USING (false)"#);
        assert!(!draft.permissive);
        assert_eq!(draft.command, PolicyCommand::Delete);
        assert_eq!(draft.roles, vec!["service_role".to_string()]);
    }

    #[test]
    fn predicate_text_never_supplies_command_or_role() {
        let draft = parse("USING (note = 'for select to admins')");
        assert_eq!(draft.command, PolicyCommand::All);
        assert_eq!(draft.roles, vec!["public".to_string()]);
    }
}
