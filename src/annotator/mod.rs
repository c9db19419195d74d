//! Plain-English summaries of RLS policies.
//!
//! The summary is a pure function of the policy draft and the idiom
//! catalogues, so the same draft always produces the same sentence.

/// Ranked predicate idioms and their prose fragments.
pub mod idioms;

use tracing::trace;

use crate::annotator::idioms::IdiomCatalogue;
use crate::model::{PolicyCommand, PolicyDraft};

/// Longest predicate rendered verbatim before truncation.
const MAX_CONDITION_CHARS: usize = 60;

/// Turns policy drafts into one-sentence descriptions for non-technical readers.
#[derive(Debug, Clone)]
pub struct Annotator {
    using: IdiomCatalogue,
    with_check: IdiomCatalogue,
}

impl Annotator {
    /// Build an annotator with the standard idiom catalogues.
    pub fn new() -> Self {
        Self {
            using: IdiomCatalogue::using(),
            with_check: IdiomCatalogue::with_check(),
        }
    }

    /// Describe `draft`, a policy declared on `table`.
    pub fn annotate(&self, table: &str, draft: &PolicyDraft) -> String {
        let action = draft.command.action_verb();
        let mut sentence = if draft.permissive {
            format!("{} can {action} rows", role_phrase(&draft.roles))
        } else {
            format!("Restricts who can {action} rows")
        };

        if let Some(using) = &draft.using {
            let using = using.trim();
            match self.using.first_match(using) {
                Some(idiom) => {
                    trace!(table, policy = %draft.name, idiom = idiom.name(), "USING idiom");
                    sentence.push_str(" — ");
                    sentence.push_str(idiom.fragment());
                }
                None => {
                    sentence.push_str(" — condition: ");
                    sentence.push_str(&truncate_condition(using));
                }
            }
        }

        if let Some(check) = &draft.with_check {
            if draft.command != PolicyCommand::Select {
                let fragment = self
                    .with_check
                    .first_match(check)
                    .map_or("Validation required", |idiom| idiom.fragment());
                if !fragment.is_empty() {
                    sentence.push_str(". ");
                    sentence.push_str(fragment);
                }
            }
        }

        sentence
    }

    /// Catalogue used for `USING` predicates.
    pub fn using_idioms(&self) -> &IdiomCatalogue {
        &self.using
    }

    /// Catalogue used for `WITH CHECK` predicates.
    pub fn with_check_idioms(&self) -> &IdiomCatalogue {
        &self.with_check
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new()
    }
}

/// Friendly label for a single role; unknown roles pass through.
pub fn role_label(role: &str) -> &str {
    match role.to_ascii_lowercase().as_str() {
        "public" => "Anyone (including anonymous)",
        "authenticated" => "Logged-in users",
        "anon" => "Anonymous users",
        "service_role" => "Service/backend only",
        _ => role,
    }
}

/// Subject of the sentence: `Anyone` whenever `public` is in scope.
fn role_phrase(roles: &[String]) -> String {
    if roles.is_empty() || roles.iter().any(|r| r.eq_ignore_ascii_case("public")) {
        return "Anyone".to_string();
    }
    roles
        .iter()
        .map(|r| role_label(r))
        .collect::<Vec<_>>()
        .join(", ")
}

fn truncate_condition(predicate: &str) -> String {
    if predicate.chars().count() > MAX_CONDITION_CHARS {
        let head: String = predicate.chars().take(MAX_CONDITION_CHARS).collect();
        format!("{head}...")
    } else {
        predicate.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(command: PolicyCommand, roles: &[&str], using: Option<&str>) -> PolicyDraft {
        PolicyDraft {
            name: "p".to_string(),
            command,
            roles: roles.iter().map(|r| (*r).to_string()).collect(),
            using: using.map(str::to_string),
            with_check: None,
            permissive: true,
        }
    }

    #[test]
    fn owner_read_policy() {
        let annotator = Annotator::new();
        let text = annotator.annotate(
            "posts",
            &draft(PolicyCommand::Select, &["public"], Some("auth.uid() = user_id")),
        );
        assert_eq!(
            text,
            "Anyone can view rows — only their own data (where user_id matches their login)"
        );
    }

    #[test]
    fn role_labels_are_joined() {
        let annotator = Annotator::new();
        let text = annotator.annotate(
            "posts",
            &draft(PolicyCommand::Delete, &["service_role", "Auditor"], None),
        );
        assert_eq!(text, "Service/backend only, Auditor can remove rows");

        let text = annotator.annotate("posts", &draft(PolicyCommand::All, &[], None));
        assert_eq!(text, "Anyone can access rows");
    }

    #[test]
    fn restrictive_policy_with_write_checks() {
        let annotator = Annotator::new();
        let mut policy = draft(PolicyCommand::Insert, &["authenticated"], None);
        policy.permissive = false;
        policy.with_check = Some("auth.uid() = user_id".to_string());
        assert_eq!(
            annotator.annotate("posts", &policy),
            "Restricts who can create rows. Must set user_id to own ID"
        );

        policy.with_check = Some("char_length(title) > 3".to_string());
        assert_eq!(
            annotator.annotate("posts", &policy),
            "Restricts who can create rows. Validation required"
        );

        policy.with_check = Some("(true)".to_string());
        assert_eq!(annotator.annotate("posts", &policy), "Restricts who can create rows");
    }

    #[test]
    fn select_ignores_with_check() {
        let annotator = Annotator::new();
        let mut policy = draft(PolicyCommand::Select, &["authenticated"], Some("true"));
        policy.with_check = Some("auth.uid() = id".to_string());
        assert_eq!(
            annotator.annotate("posts", &policy),
            "Logged-in users can view rows — unrestricted"
        );
    }

    #[test]
    fn unknown_conditions_are_truncated() {
        let annotator = Annotator::new();
        let long = "tenant_id = (SELECT tenant_id FROM memberships WHERE member = current_user)";
        let text = annotator.annotate("docs", &draft(PolicyCommand::Update, &["anon"], Some(long)));
        assert_eq!(
            text,
            format!("Anonymous users can modify rows — condition: {}...", &long[..60])
        );

        let text = annotator.annotate(
            "docs",
            &draft(PolicyCommand::Update, &["anon"], Some("owner = current_user")),
        );
        assert!(text.ends_with("— condition: owner = current_user"));
    }
}
