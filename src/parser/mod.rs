/// Finds `CREATE TABLE`, `CREATE POLICY` and RLS-enable statements in raw DDL.
pub mod locator;
/// Identifier and table-name normalization helpers (schema-qualified names, quoted identifiers).
pub mod names;
/// Command, role and predicate extraction from a policy body.
pub mod policy_body;
/// Quote-aware scanning primitives: comment blanking, paren matching, top-level splits.
pub mod scan;
/// Column and key-constraint extraction from a table body.
pub mod table_body;
