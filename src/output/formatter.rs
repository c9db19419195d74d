use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::audit::SchemaWarning;
use crate::output::{context, report};
use crate::schema::ParsedSchema;

/// Failure while writing output artifacts.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The artifact base name is empty or would escape the output directory.
    #[error("Invalid output name '{name}': {reason}")]
    InvalidName {
        /// Rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// The output directory could not be created.
    #[error("Failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// An artifact could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The schema could not be serialized.
    #[error("Failed to serialize schema: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write `<name>.json`, `<name>_context.txt` and `<name>_report.md` into `output_dir`.
pub fn write_output(
    output_dir: &Path,
    name: &str,
    schema: &ParsedSchema,
    warnings: &[SchemaWarning],
) -> Result<(), OutputError> {
    validate_output_name(name)?;

    std::fs::create_dir_all(output_dir).map_err(|source| OutputError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let json = serde_json::to_string_pretty(schema)?;
    write_file(&output_dir.join(format!("{name}.json")), &json)?;
    write_file(
        &output_dir.join(format!("{name}_context.txt")),
        &context::schema_context(schema),
    )?;
    write_file(
        &output_dir.join(format!("{name}_report.md")),
        &report::build_report(schema, warnings),
    )?;

    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), OutputError> {
    std::fs::write(path, contents).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn validate_output_name(name: &str) -> Result<(), OutputError> {
    let invalid = |reason| {
        Err(OutputError::InvalidName {
            name: name.to_string(),
            reason,
        })
    };
    if name.trim().is_empty() {
        return invalid("name must not be empty");
    }
    let candidate = Path::new(name);
    if candidate.is_absolute() {
        return invalid("absolute paths are not allowed");
    }
    if candidate.components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    }) {
        return invalid("traversal segments are not allowed");
    }
    if name.contains('/') || name.contains('\\') {
        return invalid("path separators are not allowed");
    }
    Ok(())
}
