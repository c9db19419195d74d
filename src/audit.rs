use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{PolicyCommand, Table};
use crate::schema::ParsedSchema;

/// Table name that is expected to stand alone and is never reported as isolated.
const IDENTITY_TABLE: &str = "users";

/// How serious a schema warning is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Worth a look, not necessarily wrong.
    Info,
    /// Likely a security gap.
    Warning,
    /// Structurally broken or blocking all access.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// What a schema warning is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WarningKind {
    /// No column is part of a primary key.
    MissingPrimaryKey,
    /// Row-level security is not enabled and no policy exists.
    NoRowLevelSecurity,
    /// RLS is enabled but there are no policies, so every row is hidden.
    RlsWithoutPolicies,
    /// No foreign key leaves or enters the table.
    IsolatedTable,
}

/// One finding over a group of tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaWarning {
    /// Severity used for ordering and `--strict` exit codes.
    pub severity: Severity,
    /// Category of the finding.
    pub kind: WarningKind,
    /// Affected tables in schema order.
    pub tables: Vec<String>,
    /// One-line description.
    pub message: String,
}

impl SchemaWarning {
    /// True for findings that mean access is blocked outright.
    pub fn is_critical(&self) -> bool {
        self.kind == WarningKind::RlsWithoutPolicies
    }
}

/// Check a parsed schema for common design and security gaps.
///
/// Returns warnings in a fixed order: missing primary keys, tables without
/// RLS, RLS without policies, isolated tables. Empty schemas have no warnings.
pub fn schema_warnings(schema: &ParsedSchema) -> Vec<SchemaWarning> {
    let mut warnings = Vec::new();
    if schema.tables.is_empty() {
        return warnings;
    }

    let mut push = |severity, kind, tables: Vec<&Table>, describe: fn(usize) -> String| {
        if tables.is_empty() {
            return;
        }
        let names: Vec<String> = tables.iter().map(|t| t.name.clone()).collect();
        warnings.push(SchemaWarning {
            severity,
            kind,
            message: format!("{}: {}", describe(names.len()), names.join(", ")),
            tables: names,
        });
    };

    push(
        Severity::Error,
        WarningKind::MissingPrimaryKey,
        schema.tables.iter().filter(|t| !t.has_primary_key()).collect(),
        |n| format!("{n} table(s) missing primary key"),
    );
    push(
        Severity::Warning,
        WarningKind::NoRowLevelSecurity,
        schema
            .tables
            .iter()
            .filter(|t| !t.rls_enabled && t.rls_policies.is_empty())
            .collect(),
        |n| format!("{n} table(s) without RLS policies"),
    );
    push(
        Severity::Error,
        WarningKind::RlsWithoutPolicies,
        schema.tables_denying_all_access().collect(),
        |n| format!("{n} table(s) have RLS enabled but no policies (blocks all access)"),
    );
    push(
        Severity::Info,
        WarningKind::IsolatedTable,
        schema
            .tables
            .iter()
            .filter(|t| {
                t.foreign_keys.is_empty()
                    && schema.referencing_tables(&t.name).is_empty()
                    && t.name != IDENTITY_TABLE
            })
            .collect(),
        |n| format!("{n} isolated table(s) with no relationships"),
    );

    warnings
}

/// Which operations on a table at least one policy governs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyCoverage {
    /// A `SELECT` or `ALL` policy exists.
    pub read: bool,
    /// An `INSERT` or `ALL` policy exists.
    pub create: bool,
    /// An `UPDATE` or `ALL` policy exists.
    pub update: bool,
    /// A `DELETE` or `ALL` policy exists.
    pub delete: bool,
    /// At least one policy is `AS RESTRICTIVE`.
    pub restrictive: bool,
}

impl PolicyCoverage {
    /// Summarize the policies attached to `table`.
    pub fn of(table: &Table) -> Self {
        let governs = |cmd| table.rls_policies.iter().any(|p| p.command.covers(cmd));
        Self {
            read: governs(PolicyCommand::Select),
            create: governs(PolicyCommand::Insert),
            update: governs(PolicyCommand::Update),
            delete: governs(PolicyCommand::Delete),
            restrictive: table.rls_policies.iter().any(|p| !p.permissive),
        }
    }

    /// Human-readable lines, one per governed operation.
    pub fn describe(&self) -> Vec<&'static str> {
        [
            (self.read, "Read access controlled"),
            (self.create, "Create access controlled"),
            (self.update, "Update access controlled"),
            (self.delete, "Delete access controlled"),
            (self.restrictive, "Restrictive policies present"),
        ]
        .into_iter()
        .filter_map(|(on, line)| on.then_some(line))
        .collect()
    }
}
