//! Quote-aware character scanning shared by the statement, table-body and
//! policy-body parsers.
//!
//! None of these helpers understand SQL grammar. They only know enough to
//! skip over string literals, quoted identifiers and comments so that
//! parentheses, commas and semicolons inside them are not mistaken for
//! structure.

/// Tracks whether the scanner is inside a single-quoted literal or a
/// double-quoted identifier. Doubled quotes (`''`) toggle twice and so
/// behave as escapes without special handling.
#[derive(Debug, Default, Clone, Copy)]
struct QuoteState {
    single: bool,
    double: bool,
}

impl QuoteState {
    /// Feed one character; returns `true` when it is structural (outside quotes).
    fn step(&mut self, ch: char) -> bool {
        match ch {
            '\'' if !self.double => {
                self.single = !self.single;
                false
            }
            '"' if !self.single => {
                self.double = !self.double;
                false
            }
            _ => !self.single && !self.double,
        }
    }
}

/// Replace `-- line` and `/* block */` comments with spaces.
///
/// Byte offsets and line breaks are preserved so spans found in the result
/// can be used to slice the original text. Comment markers inside string
/// literals, quoted identifiers and dollar-quoted bodies are left alone.
pub fn blank_comments(sql: &str) -> String {
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len());
    let mut quotes = QuoteState::default();
    let mut i = 0usize;

    while i < bytes.len() {
        let rest = &sql[i..];
        if !quotes.single && !quotes.double {
            if rest.starts_with("--") {
                let end = rest.find('\n').map_or(sql.len(), |n| i + n);
                out.extend(std::iter::repeat(' ').take(end - i));
                i = end;
                continue;
            }
            if rest.starts_with("/*") {
                let end = rest[2..].find("*/").map_or(sql.len(), |n| i + 2 + n + 2);
                for ch in sql[i..end].chars() {
                    if ch == '\n' {
                        out.push('\n');
                    } else {
                        out.extend(std::iter::repeat(' ').take(ch.len_utf8()));
                    }
                }
                i = end;
                continue;
            }
            if let Some(tag_len) = dollar_quote_tag_len(rest) {
                let tag = &rest[..tag_len];
                let end = rest[tag_len..]
                    .find(tag)
                    .map_or(sql.len(), |n| i + tag_len + n + tag_len);
                out.push_str(&sql[i..end]);
                i = end;
                continue;
            }
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        quotes.step(ch);
        out.push(ch);
        i += ch.len_utf8();
    }

    out
}

/// Length of a `$tag$` opener at the start of `text`, if there is one.
fn dollar_quote_tag_len(text: &str) -> Option<usize> {
    let body = text.strip_prefix('$')?;
    let close = body.find('$')?;
    let tag = &body[..close];
    let valid = tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !tag.chars().next().is_some_and(|c| c.is_ascii_digit());
    valid.then_some(close + 2)
}

/// Index of the `)` matching the `(` at `open`, skipping quoted text.
pub fn matching_paren(text: &str, open: usize) -> Option<usize> {
    if text.as_bytes().get(open) != Some(&b'(') {
        return None;
    }
    let mut quotes = QuoteState::default();
    let mut depth = 0usize;
    for (idx, ch) in text[open..].char_indices() {
        if !quotes.step(ch) {
            continue;
        }
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Text from the start of `inner` up to the point where parenthesis depth
/// would drop below zero, i.e. the contents of an already-opened group.
///
/// When the group never closes the whole input is returned.
pub fn balanced_prefix(inner: &str) -> &str {
    let mut quotes = QuoteState::default();
    let mut depth = 0i32;
    for (idx, ch) in inner.char_indices() {
        if !quotes.step(ch) {
            continue;
        }
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return &inner[..idx];
                }
            }
            _ => {}
        }
    }
    inner
}

/// Split on `sep` where it appears outside quotes and at parenthesis depth 0.
pub fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut quotes = QuoteState::default();
    let mut depth = 0i32;
    let mut start = 0usize;
    let mut parts = Vec::new();

    for (idx, ch) in text.char_indices() {
        if !quotes.step(ch) {
            continue;
        }
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if c == sep && depth <= 0 => {
                parts.push(&text[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Offset of the first `;` outside quotes and parentheses, or `text.len()`.
pub fn statement_end(text: &str) -> usize {
    let mut quotes = QuoteState::default();
    let mut depth = 0i32;
    for (idx, ch) in text.char_indices() {
        if !quotes.step(ch) {
            continue;
        }
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ';' if depth <= 0 => return idx,
            _ => {}
        }
    }
    text.len()
}

/// Whether `offset` falls outside every string literal and quoted identifier.
pub fn is_unquoted(text: &str, offset: usize) -> bool {
    let mut quotes = QuoteState::default();
    for ch in text[..offset].chars() {
        quotes.step(ch);
    }
    !quotes.single && !quotes.double
}

/// Read one expression token: stops at whitespace or a comma at depth 0,
/// keeping quoted literals and parenthesized call arguments whole.
pub fn leading_expression(text: &str) -> &str {
    let mut quotes = QuoteState::default();
    let mut depth = 0i32;
    for (idx, ch) in text.char_indices() {
        if !quotes.step(ch) {
            continue;
        }
        match ch {
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return &text[..idx];
                }
                depth -= 1;
            }
            c if depth == 0 && (c == ',' || c.is_whitespace()) => return &text[..idx],
            _ => {}
        }
    }
    text
}
