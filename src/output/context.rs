use std::fmt::Write;

use crate::model::{Column, Table};
use crate::schema::ParsedSchema;

/// Linearize a schema into the plain-text block handed to a chat model.
///
/// The layout is consumed verbatim downstream, so it stays fixed: a summary
/// block, then one block per table separated by a blank line. An empty schema
/// renders as the empty string.
pub fn schema_context(schema: &ParsedSchema) -> String {
    if schema.tables.is_empty() {
        return String::new();
    }

    let stats = &schema.stats;
    let mut out = String::new();
    let _ = writeln!(out, "DATABASE SUMMARY:");
    let _ = writeln!(out, "- Total Tables: {}", stats.total_tables);
    let _ = writeln!(out, "- Total Columns: {}", stats.total_columns);
    let _ = writeln!(out, "- Total Foreign Keys: {}", stats.total_relationships);
    let _ = writeln!(out, "- Tables with RLS: {}", stats.tables_with_rls);
    out.push('\n');

    let blocks: Vec<String> = schema.tables.iter().map(table_block).collect();
    out.push_str(&blocks.join("\n\n"));
    out
}

fn table_block(table: &Table) -> String {
    let mut lines = vec![table.columns.iter().map(column_line).collect::<Vec<_>>().join("\n")];
    lines.extend(table.foreign_keys.iter().map(|fk| {
        format!(
            "  FOREIGN KEY ({}) REFERENCES {}({})",
            fk.column, fk.referenced_table, fk.referenced_column
        )
    }));

    if table.rls_enabled || !table.rls_policies.is_empty() {
        lines.push("  -- RLS ENABLED".to_string());
        if !table.rls_policies.is_empty() {
            lines.push("  -- Policies:".to_string());
            lines.extend(table.rls_policies.iter().map(|p| {
                format!("  --   {} ({}): {}", p.name, p.command, p.plain_english)
            }));
        }
    }

    format!(
        "TABLE {} (schema: {}):\n{}",
        table.name,
        table.schema,
        lines.join("\n")
    )
}

fn column_line(column: &Column) -> String {
    let mut line = format!("  {} {}", column.name, column.data_type);
    if column.is_primary_key {
        line.push_str(" PRIMARY KEY");
    }
    if !column.nullable {
        line.push_str(" NOT NULL");
    }
    if column.is_unique {
        line.push_str(" UNIQUE");
    }
    if let Some(default) = &column.default_value {
        let _ = write!(line, " DEFAULT {default}");
    }
    line
}
