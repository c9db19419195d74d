/// Return the identifier without surrounding double quotes or backticks.
pub fn unquote_identifier(ident: &str) -> &str {
    ident
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| ident.strip_prefix('`').and_then(|s| s.strip_suffix('`')))
        .unwrap_or(ident)
}

/// Split a potentially schema-qualified name into `(schema, relation)`.
///
/// Handles dots inside quoted identifiers, e.g. `"my.schema"."table.name"`.
/// Returns `None` for unqualified names.
pub fn split_schema_and_relation(name: &str) -> Option<(String, String)> {
    let parts = split_name_parts(name);
    if parts.len() < 2 {
        return None;
    }

    let schema = unquote_identifier(parts[parts.len() - 2]).to_string();
    let relation = unquote_identifier(parts[parts.len() - 1]).to_string();
    Some((schema, relation))
}

/// Split a table reference into an optional schema and the bare relation name,
/// stripping quote characters from both.
pub fn qualified_name(name: &str) -> (Option<String>, String) {
    match split_schema_and_relation(name.trim()) {
        Some((schema, relation)) => (Some(schema), relation),
        None => (None, strip_quote_chars(name.trim())),
    }
}

/// Terminal relation name of a possibly qualified, possibly quoted reference.
///
/// Examples:
/// - `public.posts` -> `posts`
/// - `"auth"."users"` -> `users`
pub fn relation_name(name: &str) -> String {
    qualified_name(name).1
}

/// Remove every double-quote and backtick character.
pub fn strip_quote_chars(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '"' | '`')).collect()
}

/// Split a comma-separated identifier list such as `a, "B", c`.
pub fn identifier_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|part| unquote_identifier(part.trim()).to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

fn split_name_parts(name: &str) -> Vec<&str> {
    let mut in_quotes = false;
    let mut start = 0usize;
    let mut parts: Vec<&str> = Vec::new();

    for (idx, ch) in name.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '.' if !in_quotes => {
                parts.push(name[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(name[start..].trim());
    parts
}
