use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::annotator::Annotator;
use crate::model::{ForeignKey, RlsPolicy, SchemaStats, Table};
use crate::parser::locator::StatementLocator;
use crate::parser::policy_body::PolicyBodyParser;
use crate::parser::table_body::TableBodyParser;

/// The structured model recovered from one DDL source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSchema {
    /// Tables in source order.
    pub tables: Vec<Table>,
    /// Aggregate counts over `tables`.
    pub stats: SchemaStats,
}

impl ParsedSchema {
    /// Table lookup by bare name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Tables with at least one foreign key pointing at `name`.
    pub fn referencing_tables(&self, name: &str) -> Vec<&Table> {
        self.tables
            .iter()
            .filter(|t| t.foreign_keys.iter().any(|fk| fk.referenced_table == name))
            .collect()
    }

    /// Foreign keys whose referenced table was not parsed, with their owning table.
    pub fn unresolved_foreign_keys(&self) -> Vec<(&Table, &ForeignKey)> {
        self.tables
            .iter()
            .flat_map(|t| t.foreign_keys.iter().map(move |fk| (t, fk)))
            .filter(|(_, fk)| self.table(&fk.referenced_table).is_none())
            .collect()
    }

    /// Tables where RLS is on but no policy exists.
    pub fn tables_denying_all_access(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter().filter(|t| t.denies_all_access())
    }
}

/// Runs the full extraction pipeline: locate, parse bodies, annotate, assemble.
///
/// Each call to [`SchemaParser::parse`] is independent; the parser holds only
/// compiled patterns.
#[derive(Debug, Clone, Default)]
pub struct SchemaParser {
    locator: StatementLocator,
    tables: TableBodyParser,
    policies: PolicyBodyParser,
    annotator: Annotator,
}

impl SchemaParser {
    /// Build a parser with all patterns compiled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse DDL text into tables, policies and statistics.
    ///
    /// Never fails: statements and lines that cannot be understood are
    /// skipped, and an input without tables yields an empty schema.
    pub fn parse(&self, sql: &str) -> ParsedSchema {
        let located = self.locator.locate(sql);

        let mut policies_by_table: BTreeMap<&str, Vec<RlsPolicy>> = BTreeMap::new();
        for statement in &located.policies {
            let draft = self
                .policies
                .parse(&statement.name, &statement.table, &statement.body);
            let prose = self.annotator.annotate(&statement.table, &draft);
            policies_by_table
                .entry(statement.table.as_str())
                .or_default()
                .push(RlsPolicy::from_draft(draft, prose));
        }

        let tables: Vec<Table> = located
            .tables
            .into_iter()
            .map(|statement| {
                let body = self.tables.parse(&statement.name, &statement.body);
                let rls_policies = policies_by_table
                    .get(statement.name.as_str())
                    .cloned()
                    .unwrap_or_default();
                let rls_enabled =
                    located.rls_enabled.contains(&statement.name) || !rls_policies.is_empty();
                Table {
                    name: statement.name,
                    schema: statement.schema,
                    columns: body.columns,
                    primary_keys: body.primary_keys,
                    foreign_keys: body.foreign_keys,
                    rls_enabled,
                    rls_policies,
                }
            })
            .collect();

        let stats = SchemaStats::from_tables(&tables);
        debug!(
            tables = stats.total_tables,
            columns = stats.total_columns,
            relationships = stats.total_relationships,
            policies = stats.total_rls_policies,
            rls_tables = stats.tables_with_rls,
            "assembled schema"
        );
        ParsedSchema { tables, stats }
    }
}

/// Parse `sql` with a freshly built [`SchemaParser`].
pub fn parse_schema(sql: &str) -> ParsedSchema {
    SchemaParser::new().parse(sql)
}
