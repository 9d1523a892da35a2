//! Vocabulary lookup tables, bulk-replaced from CSV sources.

use std::path::Path;

use anyhow::{Context, Result, ensure};
use log::info;
use sqlx::PgPool;

use crate::{
    data::Value,
    db,
    facts::FactRecord,
    types::{LogicalType, ResolvedColumn, TableSchema},
};

/// One vocabulary table and the CSV file that feeds it.
#[derive(Debug, Clone, Copy)]
pub struct LookupTable {
    pub table: &'static str,
    pub file: &'static str,
    pub key: &'static str,
    pub columns: &'static [(&'static str, LogicalType)],
}

pub const LOOKUP_TABLES: [LookupTable; 4] = [
    LookupTable {
        table: "clearance",
        file: "clearance_lookup.csv",
        key: "seq",
        columns: &[
            ("name", LogicalType::Text),
            ("seq", LogicalType::Char(3)),
            ("code", LogicalType::Char(3)),
        ],
    },
    LookupTable {
        table: "country",
        file: "country_lookup.csv",
        key: "code",
        columns: &[
            ("name", LogicalType::Text),
            ("code", LogicalType::Char(2)),
            ("seq", LogicalType::Char(3)),
        ],
    },
    LookupTable {
        table: "port",
        file: "port_lookup.csv",
        key: "code",
        columns: &[
            ("name", LogicalType::Text),
            ("code", LogicalType::Char(3)),
            ("seq", LogicalType::Char(3)),
            ("type", LogicalType::Text),
        ],
    },
    LookupTable {
        table: "quantity",
        file: "quantity_lookup.csv",
        key: "code",
        columns: &[("code", LogicalType::Text), ("name", LogicalType::Text)],
    },
];

impl LookupTable {
    pub fn schema(&self) -> TableSchema {
        TableSchema::from_columns(
            self.columns
                .iter()
                .enumerate()
                .map(|(raw_index, (name, logical_type))| ResolvedColumn {
                    name: (*name).to_string(),
                    logical_type: logical_type.clone(),
                    raw_index,
                })
                .collect(),
        )
    }
}

/// Drop, recreate, and refill one vocabulary table, then key it.
pub async fn replace_lookup_table(
    pool: &PgPool,
    dir: &Path,
    lookup: &LookupTable,
) -> Result<()> {
    let path = dir.join(lookup.file);
    let rows = read_lookup_rows(&path, lookup.columns.len())
        .with_context(|| format!("Reading lookup rows from {path:?}"))?;
    let schema = lookup.schema();
    db::drop_table_if_exists(pool, lookup.table).await?;
    db::create_table(pool, lookup.table, &schema).await?;
    db::append_rows(pool, lookup.table, &schema, &rows).await?;
    db::add_primary_key(pool, lookup.table, lookup.key).await?;
    info!(
        "✓ Replaced lookup table '{}' with {} row(s)",
        lookup.table,
        rows.len()
    );
    Ok(())
}

fn read_lookup_rows(path: &Path, width: usize) -> Result<Vec<FactRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Opening lookup file {path:?}"))?;
    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", idx + 2))?;
        ensure!(
            record.len() == width,
            "Row {} has {} field(s), expected {}",
            idx + 2,
            record.len(),
            width
        );
        let row: FactRecord = record
            .iter()
            .map(|field| {
                let trimmed = field.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Value::String(trimmed.to_string()))
                }
            })
            .collect();
        rows.push(row);
    }
    Ok(rows)
}
