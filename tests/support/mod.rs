#![allow(dead_code)]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use ddlscope::model::{RlsPolicy, Table};
use ddlscope::schema::{parse_schema, ParsedSchema};

pub(crate) fn fixture_dir(fixture: &str) -> PathBuf {
    PathBuf::from("tests/fixtures").join(fixture)
}

pub(crate) fn read_fixture_sql(fixture: &str) -> String {
    let path = fixture_dir(fixture).join("input.sql");
    std::fs::read_to_string(path).expect("fixture SQL should be readable")
}

pub(crate) fn parse_fixture(fixture: &str) -> ParsedSchema {
    parse_schema(&read_fixture_sql(fixture))
}

pub(crate) fn table<'a>(schema: &'a ParsedSchema, name: &str) -> &'a Table {
    schema
        .table(name)
        .unwrap_or_else(|| panic!("table '{name}' should be parsed"))
}

pub(crate) fn policy<'a>(table: &'a Table, name: &str) -> &'a RlsPolicy {
    table
        .rls_policies
        .iter()
        .find(|p| p.name == name)
        .unwrap_or_else(|| panic!("policy '{name}' should be attached to '{}'", table.name))
}

pub(crate) fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{prefix}_{nanos}"));
    std::fs::create_dir_all(&dir).expect("should create temp dir");
    dir
}
