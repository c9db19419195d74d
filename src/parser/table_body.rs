use regex::Regex;
use tracing::trace;

use crate::model::{Column, ForeignKey};
use crate::parser::names::{identifier_list, relation_name, unquote_identifier};
use crate::parser::scan::{balanced_prefix, blank_comments, leading_expression, split_top_level};

const IDENT: &str = r#"(?:"[^"]+"|`[^`]+`|[A-Za-z_][\w$]*)"#;

/// Words that start a table constraint and therefore never name a column.
const RESERVED_LEADING_WORDS: &[&str] = &[
    "CONSTRAINT",
    "PRIMARY",
    "FOREIGN",
    "UNIQUE",
    "CHECK",
    "INDEX",
    "EXCLUDE",
    "LIKE",
];

/// Columns and key constraints recovered from one table body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTableBody {
    /// Columns in declaration order.
    pub columns: Vec<Column>,
    /// Primary-key column names, first-seen order, no duplicates.
    pub primary_keys: Vec<String>,
    /// Foreign-key constraints in declaration order.
    pub foreign_keys: Vec<ForeignKey>,
}

impl ParsedTableBody {
    fn add_primary_key(&mut self, column: String) {
        if !self.primary_keys.contains(&column) {
            self.primary_keys.push(column);
        }
    }
}

/// One entry of the per-line rule table: returns `true` when it consumed the line.
type LineRule = fn(&TableBodyParser, &str, &str, &mut ParsedTableBody) -> bool;

/// Rules tried in order for every logical line; the first that claims a line wins.
const LINE_RULES: &[(&str, LineRule)] = &[
    ("primary key constraint", TableBodyParser::primary_key_constraint),
    ("foreign key constraint", TableBodyParser::foreign_key_constraint),
    ("other constraint", TableBodyParser::other_constraint),
    ("column", TableBodyParser::column_declaration),
];

/// Decomposes a `CREATE TABLE` body into columns and key constraints.
///
/// Each comma-separated entry at parenthesis depth 0 is one logical line.
/// Lines that no rule understands are skipped, never reported as errors.
#[derive(Debug, Clone)]
pub struct TableBodyParser {
    primary_key: Regex,
    foreign_key: Regex,
    constraint: Regex,
    column: Regex,
    type_end: Regex,
    not_null: Regex,
    inline_primary_key: Regex,
    unique: Regex,
    not_unique: Regex,
    default: Regex,
    check: Regex,
}

impl TableBodyParser {
    /// Compile the line patterns.
    pub fn new() -> Self {
        let qualified = format!(r"{IDENT}(?:\s*\.\s*{IDENT})?");
        Self {
            primary_key: Regex::new(&format!(
                r"(?i)^(?:CONSTRAINT\s+{IDENT}\s+)?PRIMARY\s+KEY\s*\(([^)]+)\)"
            ))
            .expect("valid regex"),
            foreign_key: Regex::new(&format!(
                r"(?i)^(?:CONSTRAINT\s+({IDENT})\s+)?FOREIGN\s+KEY\s*\(([^)]+)\)\s*REFERENCES\s+({qualified})\s*\(([^)]+)\)"
            ))
            .expect("valid regex"),
            constraint: Regex::new(r"(?i)^CONSTRAINT\s+").expect("valid regex"),
            column: Regex::new(&format!(r"(?is)^({IDENT})\s+(.+)$")).expect("valid regex"),
            type_end: Regex::new(
                r"(?i)(?:^|\s)(?:NOT\s+NULL|NULL|DEFAULT|CHECK|UNIQUE|PRIMARY\s+KEY|REFERENCES|GENERATED|CONSTRAINT|COLLATE)\b",
            )
            .expect("valid regex"),
            not_null: Regex::new(r"(?i)\bNOT\s+NULL\b").expect("valid regex"),
            inline_primary_key: Regex::new(r"(?i)\bPRIMARY\s+KEY\b").expect("valid regex"),
            unique: Regex::new(r"(?i)\bUNIQUE\b").expect("valid regex"),
            not_unique: Regex::new(r"(?i)\bNOT\s+UNIQUE\b").expect("valid regex"),
            default: Regex::new(r"(?i)(\bBY\s+)?\bDEFAULT\s+").expect("valid regex"),
            check: Regex::new(r"(?i)\bCHECK\s*\(").expect("valid regex"),
        }
    }

    /// Parse the text between a table's outer parentheses.
    ///
    /// `table` is only used to name unnamed foreign keys the way Postgres does
    /// (`<table>_<column>_fkey`).
    pub fn parse(&self, table: &str, body: &str) -> ParsedTableBody {
        let body = blank_comments(body);
        let mut parsed = ParsedTableBody::default();

        for line in split_top_level(&body, ',') {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let claimed = LINE_RULES
                .iter()
                .find(|(_, rule)| rule(self, table, line, &mut parsed))
                .map(|(name, _)| *name);
            match claimed {
                Some(rule) => trace!(table, rule, line, "table body line"),
                None => trace!(table, line, "skipping unrecognized table body line"),
            }
        }

        // Inline and table-level primary keys are unioned in both directions.
        let inline: Vec<String> = parsed
            .columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.clone())
            .collect();
        for name in inline {
            parsed.add_primary_key(name);
        }
        for column in &mut parsed.columns {
            if parsed.primary_keys.contains(&column.name) {
                column.is_primary_key = true;
            }
        }

        parsed
    }

    fn primary_key_constraint(&self, _table: &str, line: &str, out: &mut ParsedTableBody) -> bool {
        let Some(cap) = self.primary_key.captures(line) else {
            return false;
        };
        for column in identifier_list(&cap[1]) {
            out.add_primary_key(column);
        }
        true
    }

    fn foreign_key_constraint(&self, table: &str, line: &str, out: &mut ParsedTableBody) -> bool {
        let Some(cap) = self.foreign_key.captures(line) else {
            return false;
        };
        let column = identifier_list(&cap[2]).join(", ");
        let constraint_name = match cap.get(1) {
            Some(name) => unquote_identifier(name.as_str()).to_string(),
            None => format!("{table}_{}_fkey", identifier_list(&cap[2]).join("_")),
        };
        out.foreign_keys.push(ForeignKey {
            column,
            referenced_table: relation_name(&cap[3]),
            referenced_column: identifier_list(&cap[4]).join(", "),
            constraint_name,
        });
        true
    }

    /// Table-level CHECK/UNIQUE/EXCLUDE constraints are not modeled.
    fn other_constraint(&self, _table: &str, line: &str, _out: &mut ParsedTableBody) -> bool {
        self.constraint.is_match(line)
    }

    fn column_declaration(&self, _table: &str, line: &str, out: &mut ParsedTableBody) -> bool {
        let Some(cap) = self.column.captures(line) else {
            return false;
        };
        let raw_name = &cap[1];
        let is_quoted = raw_name.starts_with('"') || raw_name.starts_with('`');
        if !is_quoted
            && RESERVED_LEADING_WORDS
                .iter()
                .any(|kw| raw_name.eq_ignore_ascii_case(kw))
        {
            // Usually an unnamed table constraint whose shape no other rule knows.
            return true;
        }

        let definition = cap[2].trim();
        out.columns.push(Column {
            name: unquote_identifier(raw_name).to_string(),
            data_type: self.column_type(definition),
            nullable: !self.not_null.is_match(definition),
            default_value: self.default_value(definition),
            is_primary_key: self.inline_primary_key.is_match(definition),
            is_unique: self.unique.is_match(definition) && !self.not_unique.is_match(definition),
            check_constraint: self.check_constraint(definition),
        });
        true
    }

    /// Leading type expression, cut before the first column constraint keyword.
    fn column_type(&self, definition: &str) -> String {
        let end = self
            .type_end
            .find(definition)
            .map_or(definition.len(), |m| m.start());
        definition[..end].split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// `GENERATED BY DEFAULT AS IDENTITY` is an identity clause, not a default.
    fn default_value(&self, definition: &str) -> Option<String> {
        let m = self
            .default
            .captures_iter(definition)
            .find(|cap| cap.get(1).is_none())?
            .get(0)?;
        let expr = leading_expression(&definition[m.end()..]);
        (!expr.is_empty()).then(|| expr.to_string())
    }

    fn check_constraint(&self, definition: &str) -> Option<String> {
        let m = self.check.find(definition)?;
        let expr = balanced_prefix(&definition[m.end()..]).trim();
        (!expr.is_empty()).then(|| expr.to_string())
    }
}

impl Default for TableBodyParser {
    fn default() -> Self {
        Self::new()
    }
}
