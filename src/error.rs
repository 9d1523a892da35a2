use std::path::PathBuf;

use thiserror::Error;

/// ETL pipeline errors with contextual information.
///
/// Every variant aborts processing of the current file; the only sanctioned
/// silent cases (unresolvable type tags, recode misses) never reach this type.
#[derive(Debug, Error)]
pub enum EtlError {
    /// A column specification document is malformed
    #[error("Malformed specification document {path:?}: {reason}")]
    SchemaFormat { path: PathBuf, reason: String },

    /// Two retained specification entries share a column name
    #[error("Duplicate column '{column}' while deriving the schema for table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// Table provisioning collided with an existing table
    #[error("Table '{0}' already exists")]
    TableExists(String),

    /// A source line does not split into the expected field count
    #[error("{path:?} line {line}: expected {expected} pipe-delimited field(s), found {found}")]
    RecordFormat {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A value cannot be cast to its declared logical type
    #[error("{path:?} row {row} column '{column}': {reason}")]
    TypeCoercion {
        path: PathBuf,
        row: usize,
        column: String,
        reason: String,
    },

    /// Reading a source file failed
    #[error("Reading {path:?} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Decoding a source file with its declared encoding failed
    #[error("Decoding {path:?} as {encoding} failed")]
    Decode { path: PathBuf, encoding: &'static str },

    /// SQL query or connection error
    #[error("Database query failed: {0}")]
    Db(#[from] sqlx::Error),
}

impl EtlError {
    pub fn schema_format(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::SchemaFormat {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type EtlResult<T> = Result<T, EtlError>;
