use regex::{Regex, RegexBuilder};

/// How an idiom recognizes a predicate.
#[derive(Debug, Clone)]
enum Matcher {
    /// Unanchored regex search over the trimmed predicate.
    Pattern(Regex),
    /// Case-sensitive equality with one of the listed literals.
    Exact(&'static [&'static str]),
}

/// One recognized predicate shape and the prose it contributes.
#[derive(Debug, Clone)]
pub struct Idiom {
    name: &'static str,
    matcher: Matcher,
    fragment: &'static str,
}

impl Idiom {
    fn pattern(name: &'static str, pattern: &str, fragment: &'static str) -> Self {
        Self {
            name,
            // CRLF mode keeps `.` from matching `\r` as well as `\n`.
            matcher: Matcher::Pattern(
                RegexBuilder::new(pattern)
                    .crlf(true)
                    .build()
                    .expect("valid regex"),
            ),
            fragment,
        }
    }

    fn exact(name: &'static str, literals: &'static [&'static str], fragment: &'static str) -> Self {
        Self {
            name,
            matcher: Matcher::Exact(literals),
            fragment,
        }
    }

    /// Stable identifier, e.g. `own_user_id`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Prose appended when this idiom wins. Empty means "add nothing".
    pub fn fragment(&self) -> &'static str {
        self.fragment
    }

    /// Test this idiom alone, ignoring catalogue order.
    pub fn matches(&self, predicate: &str) -> bool {
        let predicate = predicate.trim();
        match &self.matcher {
            Matcher::Pattern(regex) => regex.is_match(predicate),
            Matcher::Exact(literals) => literals.contains(&predicate),
        }
    }
}

/// Ranked list of idioms; the first one that matches a predicate wins.
#[derive(Debug, Clone)]
pub struct IdiomCatalogue {
    idioms: Vec<Idiom>,
}

impl IdiomCatalogue {
    /// Idioms for read-visibility (`USING`) predicates.
    ///
    /// Order matters. Broad shapes like `role = 'admin'` sit above their
    /// `EXISTS`-wrapped variants, so the latter only fire when the earlier
    /// entries are removed.
    pub fn using() -> Self {
        Self {
            idioms: vec![
                Idiom::pattern(
                    "own_user_id",
                    r"(?i)auth\.uid\(\)\s*=\s*user_id",
                    "only their own data (where user_id matches their login)",
                ),
                Idiom::pattern("own_id", r"(?i)auth\.uid\(\)\s*=\s*id", "only their own record"),
                Idiom::pattern(
                    "sender_or_recipient",
                    r"(?i)auth\.uid\(\)\s*=\s*sender_id\s+OR\s+auth\.uid\(\)\s*=\s*recipient_id",
                    "only messages they sent or received",
                ),
                Idiom::pattern(
                    "sender",
                    r"(?i)auth\.uid\(\)\s*=\s*sender_id",
                    "only messages they sent",
                ),
                Idiom::pattern(
                    "recipient",
                    r"(?i)auth\.uid\(\)\s*=\s*recipient_id",
                    "only messages they received",
                ),
                Idiom::pattern(
                    "published",
                    r"(?i)is_published\s*=\s*true",
                    "only published content",
                ),
                Idiom::pattern(
                    "authenticated_role",
                    r"(?i)auth\.role\(\)\s*=\s*'authenticated'",
                    "only if logged in",
                ),
                Idiom::pattern(
                    "anon_role",
                    r"(?i)auth\.role\(\)\s*=\s*'anon'",
                    "even without logging in",
                ),
                Idiom::pattern("admin_role", r"(?i)auth\.role\(\)\s*=\s*'admin'", "only admins"),
                Idiom::pattern(
                    "admin_column",
                    r"(?i)role\s*=\s*'admin'",
                    "only users with admin role",
                ),
                Idiom::pattern(
                    "moderator_column",
                    r"(?i)role\s*=\s*'moderator'",
                    "only moderators",
                ),
                Idiom::pattern(
                    "exists_admin",
                    r"(?i)EXISTS.*role\s*=\s*'admin'",
                    "only if user is an admin",
                ),
                Idiom::pattern(
                    "exists_moderator",
                    r"(?i)EXISTS.*role\s*=\s*'moderator'",
                    "only if user is a moderator",
                ),
                Idiom::pattern(
                    "exists_published",
                    r"(?i)EXISTS.*is_published\s*=\s*true",
                    "only on published posts",
                ),
                Idiom::pattern("admin_flag", r"(?i)is_admin", "only if they are an admin"),
                Idiom::exact("unrestricted", &["true", "(true)"], "unrestricted"),
                Idiom::exact("blocked", &["false", "(false)"], "access blocked"),
            ],
        }
    }

    /// Idioms for write-validation (`WITH CHECK`) predicates.
    pub fn with_check() -> Self {
        Self {
            idioms: vec![
                Idiom::pattern(
                    "sets_own_user_id",
                    r"(?i)auth\.uid\(\)\s*=\s*user_id",
                    "Must set user_id to own ID",
                ),
                Idiom::pattern("is_sender", r"(?i)auth\.uid\(\)\s*=\s*sender_id", "Must be the sender"),
                Idiom::pattern(
                    "modifies_own_record",
                    r"(?i)auth\.uid\(\)\s*=\s*id",
                    "Can only modify own record",
                ),
                Idiom::exact("unrestricted", &["true", "(true)"], ""),
            ],
        }
    }

    /// First idiom in rank order that matches `predicate`.
    pub fn first_match(&self, predicate: &str) -> Option<&Idiom> {
        self.idioms.iter().find(|idiom| idiom.matches(predicate))
    }

    /// All idioms in rank order.
    pub fn idioms(&self) -> &[Idiom] {
        &self.idioms
    }

    /// Look up an idiom by name.
    pub fn get(&self, name: &str) -> Option<&Idiom> {
        self.idioms.iter().find(|idiom| idiom.name == name)
    }
}
