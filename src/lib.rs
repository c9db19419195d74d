//! Recover tables, keys and row-level-security policies from raw Postgres-style DDL,
//! with a plain-English summary of every policy.
#![warn(missing_docs)]

/// Plain-English policy summaries driven by a ranked idiom catalogue.
pub mod annotator;
/// Schema warnings and per-table policy coverage.
pub mod audit;
/// Tables, columns, foreign keys, policies and aggregate statistics.
pub mod model;
/// File output, chat-context linearization and markdown reports.
pub mod output;
/// Structural DDL scanning: statement location and body parsing.
pub mod parser;
/// Assembles located statements into the final schema model.
pub mod schema;
/// Listing and loading `.sql` schema files.
pub mod source;

pub use model::{Column, ForeignKey, PolicyCommand, RlsPolicy, SchemaStats, Table};
pub use schema::{parse_schema, ParsedSchema, SchemaParser};
