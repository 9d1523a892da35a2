//! Logical column types and specification-driven schema derivation.
//!
//! The specification documents tag each column with a free-form type string.
//! [`LogicalType`] resolves those tags into a closed enumeration: exact
//! matches first, then the parameterized `char`/`varchar` patterns, and
//! anything else becomes the explicit [`LogicalType::Remove`] marker that
//! excludes the column from every derived schema.

use std::{collections::HashSet, fmt, sync::OnceLock};

use regex::Regex;

use crate::{
    error::{EtlError, EtlResult},
    spec::ColumnSpec,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalType {
    Boolean,
    Integer,
    BigInt,
    Float,
    Text,
    Date,
    /// Fixed-length string of the given length
    Char(u32),
    /// Variable-length string, optionally bounded
    VarChar(Option<u32>),
    /// Removal marker: the tag did not resolve and the column is dropped
    Remove,
}

fn first_digit_sequence(tag: &str) -> Option<u32> {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let digits = DIGITS.get_or_init(|| Regex::new("[0-9]+").expect("valid digit pattern"));
    digits.find(tag).and_then(|m| m.as_str().parse().ok())
}

impl LogicalType {
    /// Resolve a specification type tag. Unrecognized tags are not an error;
    /// they resolve to [`LogicalType::Remove`].
    pub fn resolve(tag: &str) -> LogicalType {
        let normalized = tag.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "boolean" => LogicalType::Boolean,
            "integer" => LogicalType::Integer,
            "bigint" => LogicalType::BigInt,
            "float" => LogicalType::Float,
            "text" => LogicalType::Text,
            "date" => LogicalType::Date,
            "varchar" => LogicalType::VarChar(None),
            other if other.contains("char") => match first_digit_sequence(other) {
                Some(length) if length > 0 => {
                    if other.starts_with("varchar") {
                        LogicalType::VarChar(Some(length))
                    } else {
                        LogicalType::Char(length)
                    }
                }
                _ => LogicalType::Remove,
            },
            _ => LogicalType::Remove,
        }
    }

    pub fn is_removed(&self) -> bool {
        matches!(self, LogicalType::Remove)
    }

    /// The SQL column type used when materializing a table.
    pub fn storage_type(&self) -> String {
        match self {
            LogicalType::Boolean => "BOOLEAN".to_string(),
            LogicalType::Integer => "INTEGER".to_string(),
            LogicalType::BigInt => "BIGINT".to_string(),
            LogicalType::Float => "DOUBLE PRECISION".to_string(),
            LogicalType::Text => "TEXT".to_string(),
            LogicalType::Date => "DATE".to_string(),
            LogicalType::Char(length) => format!("CHAR({length})"),
            LogicalType::VarChar(Some(length)) => format!("VARCHAR({length})"),
            LogicalType::VarChar(None) => "VARCHAR".to_string(),
            LogicalType::Remove => unreachable!("removal markers never reach storage"),
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalType::Remove => write!(f, "removed"),
            other => write!(f, "{}", other.storage_type().to_ascii_lowercase()),
        }
    }
}

/// A retained column with its position in the raw source record.
#[derive(Debug, Clone)]
pub struct ResolvedColumn {
    pub name: String,
    pub logical_type: LogicalType,
    /// Index of the column in the raw pipe-delimited record, before removal
    /// markers are dropped
    pub raw_index: usize,
}

/// Ordered physical schema for one table, derived from a specification.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub columns: Vec<ResolvedColumn>,
    raw_width: usize,
}

impl TableSchema {
    pub fn from_columns(columns: Vec<ResolvedColumn>) -> Self {
        let raw_width = columns.len();
        Self { columns, raw_width }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Field count of the raw source record, removal markers included.
    pub fn raw_width(&self) -> usize {
        self.raw_width
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Derive the physical schema for `table` from an ordered specification.
///
/// Order-preserving; removal markers are excluded; duplicate retained names
/// fail with [`EtlError::DuplicateColumn`].
pub fn derive_schema(table: &str, specs: &[ColumnSpec]) -> EtlResult<TableSchema> {
    let mut columns = Vec::with_capacity(specs.len());
    let mut seen = HashSet::new();
    for (raw_index, spec) in specs.iter().enumerate() {
        let logical_type = LogicalType::resolve(&spec.type_tag);
        if logical_type.is_removed() {
            continue;
        }
        if !seen.insert(spec.name.clone()) {
            return Err(EtlError::DuplicateColumn {
                table: table.to_string(),
                column: spec.name.clone(),
            });
        }
        columns.push(ResolvedColumn {
            name: spec.name.clone(),
            logical_type,
            raw_index,
        });
    }
    Ok(TableSchema {
        columns,
        raw_width: specs.len(),
    })
}
