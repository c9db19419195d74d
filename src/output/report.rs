use std::fmt::Write;

use crate::audit::{PolicyCoverage, SchemaWarning, Severity};
use crate::model::Table;
use crate::schema::ParsedSchema;

/// Build a markdown report with summary counts, warnings and per-table details.
pub fn build_report(schema: &ParsedSchema, warnings: &[SchemaWarning]) -> String {
    let mut report = String::new();
    let stats = &schema.stats;

    let _ = writeln!(report, "# ddlscope Schema Report");
    let _ = writeln!(report);
    let _ = writeln!(report, "## Summary");
    let _ = writeln!(report);
    let _ = writeln!(report, "| Metric | Count |");
    let _ = writeln!(report, "|--------|-------|");
    let _ = writeln!(report, "| Tables | {} |", stats.total_tables);
    let _ = writeln!(report, "| Columns | {} |", stats.total_columns);
    let _ = writeln!(report, "| Foreign keys | {} |", stats.total_relationships);
    let _ = writeln!(report, "| RLS policies | {} |", stats.total_rls_policies);
    let _ = writeln!(report, "| Tables with RLS | {} |", stats.tables_with_rls);

    if !warnings.is_empty() {
        let _ = writeln!(report);
        let _ = writeln!(report, "## Warnings");
        let _ = writeln!(report);
        for warning in warnings {
            let label = match warning.severity {
                Severity::Error if warning.is_critical() => "CRITICAL".to_string(),
                severity => severity.to_string().to_uppercase(),
            };
            let _ = writeln!(report, "- **[{label}]** {}", warning.message);
        }
    }

    for table in &schema.tables {
        let _ = writeln!(report);
        write_table(&mut report, schema, table);
    }

    report
}

fn write_table(report: &mut String, schema: &ParsedSchema, table: &Table) {
    let _ = writeln!(report, "## {}.{}", table.schema, table.name);
    let _ = writeln!(report);

    if table.columns.is_empty() {
        let _ = writeln!(report, "_No columns recognized._");
    } else {
        let _ = writeln!(report, "| Column | Type | Nullable | Default | Notes |");
        let _ = writeln!(report, "|--------|------|----------|---------|-------|");
        for column in &table.columns {
            let mut notes = Vec::new();
            if column.is_primary_key {
                notes.push("PK".to_string());
            }
            if column.is_unique {
                notes.push("UNIQUE".to_string());
            }
            if let Some(check) = &column.check_constraint {
                notes.push(format!("CHECK ({check})"));
            }
            let _ = writeln!(
                report,
                "| {} | `{}` | {} | {} | {} |",
                column.name,
                column.data_type,
                if column.nullable { "yes" } else { "no" },
                column
                    .default_value
                    .as_deref()
                    .map_or(String::new(), |d| format!("`{d}`")),
                notes.join(", ")
            );
        }
    }

    if !table.foreign_keys.is_empty() {
        let _ = writeln!(report);
        let _ = writeln!(report, "Foreign keys:");
        for fk in &table.foreign_keys {
            let unresolved = if schema.table(&fk.referenced_table).is_none() {
                " (table not in schema)"
            } else {
                ""
            };
            let _ = writeln!(
                report,
                "- `{}`: {} -> {}.{}{unresolved}",
                fk.constraint_name, fk.column, fk.referenced_table, fk.referenced_column
            );
        }
    }

    let referenced_by: Vec<&str> = schema
        .referencing_tables(&table.name)
        .into_iter()
        .map(|t| t.name.as_str())
        .collect();
    if !referenced_by.is_empty() {
        let _ = writeln!(report);
        let _ = writeln!(report, "Referenced by: {}", referenced_by.join(", "));
    }

    let _ = writeln!(report);
    if table.denies_all_access() {
        let _ = writeln!(
            report,
            "> **CRITICAL:** RLS is enabled but no policies exist, so all access is blocked."
        );
        return;
    }
    if !table.rls_enabled {
        let _ = writeln!(report, "RLS: disabled");
        return;
    }

    let _ = writeln!(report, "RLS policies:");
    let _ = writeln!(report);
    for policy in &table.rls_policies {
        let mode = if policy.permissive { "permissive" } else { "restrictive" };
        let _ = writeln!(
            report,
            "- **{}** ({}, {mode}, to {}): {}",
            policy.name,
            policy.command,
            policy.roles.join(", "),
            policy.plain_english
        );
    }

    let coverage = PolicyCoverage::of(table).describe();
    if !coverage.is_empty() {
        let _ = writeln!(report);
        let _ = writeln!(report, "Coverage: {}", coverage.join("; "));
    }
}
