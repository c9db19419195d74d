use serde::{Deserialize, Serialize};
use std::fmt;

/// The command a policy applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyCommand {
    /// Policy applies to SELECT queries only.
    Select,
    /// Policy applies to INSERT queries only.
    Insert,
    /// Policy applies to UPDATE queries only.
    Update,
    /// Policy applies to DELETE queries only.
    Delete,
    /// Policy applies to all DML commands.
    All,
}

impl PolicyCommand {
    /// Verb used when describing the command to a non-technical reader.
    pub fn action_verb(self) -> &'static str {
        match self {
            PolicyCommand::Select => "view",
            PolicyCommand::Insert => "create",
            PolicyCommand::Update => "modify",
            PolicyCommand::Delete => "remove",
            PolicyCommand::All => "access",
        }
    }

    /// True when a policy for this command governs `other` (`ALL` governs everything).
    pub fn covers(self, other: PolicyCommand) -> bool {
        self == PolicyCommand::All || self == other
    }
}

impl fmt::Display for PolicyCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyCommand::Select => write!(f, "SELECT"),
            PolicyCommand::Insert => write!(f, "INSERT"),
            PolicyCommand::Update => write!(f, "UPDATE"),
            PolicyCommand::Delete => write!(f, "DELETE"),
            PolicyCommand::All => write!(f, "ALL"),
        }
    }
}

impl std::str::FromStr for PolicyCommand {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SELECT" => Ok(PolicyCommand::Select),
            "INSERT" => Ok(PolicyCommand::Insert),
            "UPDATE" => Ok(PolicyCommand::Update),
            "DELETE" => Ok(PolicyCommand::Delete),
            "ALL" => Ok(PolicyCommand::All),
            _ => Err(format!("Invalid policy command: {s}")),
        }
    }
}

/// A column declaration recovered from a `CREATE TABLE` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Column name with quoting stripped.
    pub name: String,
    /// Type expression as written, e.g. `varchar(255)` or `timestamp with time zone`.
    #[serde(rename = "type")]
    pub data_type: String,
    /// False only when the declaration says `NOT NULL`.
    pub nullable: bool,
    /// Raw `DEFAULT` expression.
    pub default_value: Option<String>,
    /// Set inline (`PRIMARY KEY`) or by a table-level primary-key constraint.
    pub is_primary_key: bool,
    /// Inline `UNIQUE` marker.
    pub is_unique: bool,
    /// Raw expression inside an inline `CHECK (...)`.
    pub check_constraint: Option<String>,
}

/// A single-column `FOREIGN KEY ... REFERENCES` table constraint.
///
/// The referenced table and column are kept verbatim; whether they resolve
/// against the parsed tables is answered by
/// [`ParsedSchema::unresolved_foreign_keys`](crate::schema::ParsedSchema::unresolved_foreign_keys).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    /// Referencing column in the owning table.
    pub column: String,
    /// Referenced table (schema qualifier and quotes stripped).
    pub referenced_table: String,
    /// Referenced column.
    pub referenced_column: String,
    /// Declared constraint name, or the Postgres default for unnamed constraints.
    pub constraint_name: String,
}

/// A `CREATE POLICY` statement before its plain-English summary is derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDraft {
    /// Policy name as declared.
    pub name: String,
    /// DML command this policy restricts (`ALL` if unspecified).
    pub command: PolicyCommand,
    /// Role scope; `["public"]` when no `TO` clause is present.
    pub roles: Vec<String>,
    /// Predicate inside `USING (...)`.
    pub using: Option<String>,
    /// Predicate inside `WITH CHECK (...)`.
    pub with_check: Option<String>,
    /// False only for `AS RESTRICTIVE` policies.
    pub permissive: bool,
}

/// A row-level-security policy attached to a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RlsPolicy {
    /// Policy name as declared.
    pub name: String,
    /// DML command this policy restricts.
    pub command: PolicyCommand,
    /// Role scope, never empty.
    pub roles: Vec<String>,
    /// Predicate inside `USING (...)`.
    pub using: Option<String>,
    /// Predicate inside `WITH CHECK (...)`.
    pub with_check: Option<String>,
    /// False only for `AS RESTRICTIVE` policies.
    pub permissive: bool,
    /// Human-readable summary produced by the annotator.
    pub plain_english: String,
}

impl RlsPolicy {
    /// Attach a derived summary to a parsed draft.
    pub(crate) fn from_draft(draft: PolicyDraft, plain_english: String) -> Self {
        Self {
            name: draft.name,
            command: draft.command,
            roles: draft.roles,
            using: draft.using,
            with_check: draft.with_check,
            permissive: draft.permissive,
            plain_english,
        }
    }
}

/// A table recovered from a `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Relation name with quoting stripped.
    pub name: String,
    /// Schema qualifier, `public` when absent.
    pub schema: String,
    /// Columns in declaration order.
    pub columns: Vec<Column>,
    /// Primary-key column names, de-duplicated, in first-seen order.
    pub primary_keys: Vec<String>,
    /// Foreign-key constraints in declaration order.
    pub foreign_keys: Vec<ForeignKey>,
    /// True when RLS was enabled explicitly or any policy targets this table.
    pub rls_enabled: bool,
    /// Policies targeting this table, in source order.
    pub rls_policies: Vec<RlsPolicy>,
}

impl Table {
    /// Column lookup by exact name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// RLS is on but no policy grants anything, so every row is hidden.
    pub fn denies_all_access(&self) -> bool {
        self.rls_enabled && self.rls_policies.is_empty()
    }

    /// True when at least one column is part of the primary key.
    pub fn has_primary_key(&self) -> bool {
        self.columns.iter().any(|c| c.is_primary_key)
    }
}

/// Aggregate counts over a parsed schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaStats {
    /// Number of tables.
    #[serde(rename = "totalTables")]
    pub total_tables: usize,
    /// Number of columns across all tables.
    #[serde(rename = "totalColumns")]
    pub total_columns: usize,
    /// Number of foreign keys across all tables.
    #[serde(rename = "totalRelationships")]
    pub total_relationships: usize,
    /// Number of policies attached to parsed tables.
    #[serde(rename = "totalRLSPolicies")]
    pub total_rls_policies: usize,
    /// Number of tables with RLS enabled.
    #[serde(rename = "tablesWithRLS")]
    pub tables_with_rls: usize,
}

impl SchemaStats {
    /// Compute counts for a table list.
    pub fn from_tables(tables: &[Table]) -> Self {
        Self {
            total_tables: tables.len(),
            total_columns: tables.iter().map(|t| t.columns.len()).sum(),
            total_relationships: tables.iter().map(|t| t.foreign_keys.len()).sum(),
            total_rls_policies: tables.iter().map(|t| t.rls_policies.len()).sum(),
            tables_with_rls: tables.iter().filter(|t| t.rls_enabled).count(),
        }
    }
}
