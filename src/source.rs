use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Failure while reading schema source files.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The requested file does not exist.
    #[error("schema source not found: {}", .path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },
    /// The file or directory exists but could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Unreadable {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The source name would resolve outside the schema directory.
    #[error("invalid schema source name '{name}'")]
    InvalidName {
        /// Rejected name.
        name: String,
    },
}

/// One `.sql` file in a schema directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaSource {
    /// File stem, used to load the source by name.
    pub name: String,
    /// File name including the `.sql` extension.
    pub filename: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time, when the platform reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<SystemTime>,
}

/// List every `.sql` file in `dir`, sorted by file name.
///
/// A missing directory is an empty catalog rather than an error.
pub fn list_schema_sources(dir: &Path) -> Result<Vec<SchemaSource>, SourceError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "schema directory does not exist");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(SourceError::Unreadable {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let mut sources = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SourceError::Unreadable {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.extension().is_some_and(|e| e == "sql") {
            continue;
        }
        let metadata = entry.metadata().map_err(|source| SourceError::Unreadable {
            path: path.clone(),
            source,
        })?;
        if !metadata.is_file() {
            continue;
        }
        let (Some(filename), Some(name)) = (
            path.file_name().and_then(|n| n.to_str()),
            path.file_stem().and_then(|n| n.to_str()),
        ) else {
            continue;
        };
        sources.push(SchemaSource {
            name: name.to_string(),
            filename: filename.to_string(),
            size: metadata.len(),
            modified: metadata.modified().ok(),
            path,
        });
    }

    sources.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(sources)
}

/// Read `<dir>/<name>.sql`.
pub fn load_schema_source(dir: &Path, name: &str) -> Result<String, SourceError> {
    if name.is_empty() || name.contains(['/', '\\']) || name == ".." || name == "." {
        return Err(SourceError::InvalidName {
            name: name.to_string(),
        });
    }
    read_source(&dir.join(format!("{name}.sql")))
}

/// Read a schema file, distinguishing a missing file from an unreadable one.
pub fn read_source(path: &Path) -> Result<String, SourceError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            SourceError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            SourceError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    fn unique_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be monotonic")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("{prefix}_{nanos}"));
        std::fs::create_dir_all(&dir).expect("should create temp directory");
        dir
    }

    #[test]
    fn missing_directory_is_an_empty_catalog() {
        let dir = std::env::temp_dir().join("ddlscope_definitely_missing_dir");
        assert_eq!(list_schema_sources(&dir).expect("missing dir is ok"), Vec::new());
    }

    #[test]
    fn catalog_lists_only_sql_files_sorted() {
        let dir = unique_dir("ddlscope_sources");
        std::fs::write(dir.join("b.sql"), "CREATE TABLE b (id int);").expect("write b");
        std::fs::write(dir.join("a.sql"), "").expect("write a");
        std::fs::write(dir.join("notes.txt"), "ignored").expect("write notes");

        let sources = list_schema_sources(&dir).expect("catalog should list");
        let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(sources[1].filename, "b.sql");
        assert_eq!(sources[1].size, 24);

        let sql = load_schema_source(&dir, "b").expect("b should load");
        assert!(sql.starts_with("CREATE TABLE b"));
    }

    #[test]
    fn load_distinguishes_missing_and_invalid_names() {
        let dir = unique_dir("ddlscope_sources_missing");
        assert!(matches!(
            load_schema_source(&dir, "nope"),
            Err(SourceError::NotFound { .. })
        ));
        assert!(matches!(
            load_schema_source(&dir, "../etc/passwd"),
            Err(SourceError::InvalidName { .. })
        ));
    }
}
