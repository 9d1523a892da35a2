//! Column specification documents.
//!
//! Each file layout has a JSON document with a `columns` array of
//! `{name, type}` objects, in source-column order. Loading validates shape
//! only; type-tag resolution happens in [`crate::types`].

use std::{fs::File, io::BufReader, path::Path};

use serde::Deserialize;

use crate::error::{EtlError, EtlResult};

/// One ordered column entry from a specification document.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnSpec {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_tag: String,
}

#[derive(Debug, Deserialize)]
struct SpecDocumentBody {
    #[serde(default)]
    columns: Vec<ColumnSpec>,
}

pub struct SpecDocument;

impl SpecDocument {
    /// Load the ordered column specs from a JSON document.
    pub fn load(path: &Path) -> EtlResult<Vec<ColumnSpec>> {
        let file = File::open(path).map_err(|err| EtlError::io(path, err))?;
        let body: SpecDocumentBody = serde_json::from_reader(BufReader::new(file))
            .map_err(|err| EtlError::schema_format(path, err.to_string()))?;
        if body.columns.is_empty() {
            return Err(EtlError::schema_format(path, "no columns declared"));
        }
        for (idx, column) in body.columns.iter().enumerate() {
            if column.name.trim().is_empty() {
                return Err(EtlError::schema_format(
                    path,
                    format!("column entry {idx} is missing a name"),
                ));
            }
            if column.type_tag.trim().is_empty() {
                return Err(EtlError::schema_format(
                    path,
                    format!("column entry {idx} ('{}') is missing a type", column.name),
                ));
            }
        }
        Ok(body.columns)
    }
}
