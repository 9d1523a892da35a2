//! The monthly load cycle: incremental gate, file routing, and the two load
//! paths (control upsert, fact append).

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use itertools::Itertools;
use log::{debug, info};
use sqlx::PgPool;

use crate::{
    cli::LoadArgs,
    control,
    data::Value,
    db::{self, DbConfig},
    error::EtlResult,
    facts::{self, FactRecord},
    layout::{self, FileLayout, ParserKind, TableName},
    period::Period,
    recode::{RecodeMap, RecodeSet},
    spec::SpecDocument,
    types::derive_schema,
};

pub async fn execute(args: &LoadArgs) -> Result<()> {
    let period = Period::new(args.year, args.month)?;
    let pool = db::connect(&DbConfig::new(&args.database_url))
        .await
        .context("Connecting to the database")?;
    run_load_cycle(&pool, args, period).await
}

async fn run_load_cycle(pool: &PgPool, args: &LoadArgs, period: Period) -> Result<()> {
    let needed = tables_needing_load(pool, period.first_day(), args.threshold).await?;
    info!(
        "Tables needing load for {}-{:02}: {}",
        period.year,
        period.month,
        needed.iter().join(", ")
    );

    let files = scan_source_files(&args.input)?;
    if files.is_empty() {
        bail!("No recognizable extract files under {:?}", args.input);
    }

    let inland = RecodeMap::load(&args.recode)?;

    for (path, layout) in &files {
        if !needed.contains(&layout.table) {
            info!(
                "Skipping {:?}: '{}' already holds this period",
                path.file_name().unwrap_or_default(),
                layout.table
            );
            continue;
        }
        match layout.parser {
            ParserKind::Control => load_control_file(pool, path, layout, &args.specs_dir)
                .await
                .with_context(|| format!("Loading control file {path:?}"))?,
            ParserKind::Fact => load_fact_file(pool, path, layout, &args.specs_dir, &inland)
                .await
                .with_context(|| format!("Loading trade file {path:?}"))?,
        }
    }
    Ok(())
}

/// The incremental gate: fact tables whose row count for `period_date` sits
/// below `threshold`, plus `control`, which is always refreshed.
pub async fn tables_needing_load(
    pool: &PgPool,
    period_date: NaiveDate,
    threshold: u64,
) -> EtlResult<BTreeSet<TableName>> {
    let mut needed = BTreeSet::from([TableName::Control]);
    for table in TableName::fact_tables() {
        let count = db::count_rows_for_date(pool, table.as_str(), period_date).await?;
        if (count as u64) < threshold {
            needed.insert(table);
        } else {
            debug!("'{table}' holds {count} row(s) for {period_date}, at or above threshold");
        }
    }
    Ok(needed)
}

/// Extract files under `dir` with a recognized type prefix, sorted by name.
pub fn scan_source_files(dir: &Path) -> Result<Vec<(PathBuf, &'static FileLayout)>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Reading source directory {dir:?}"))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Reading source directory {dir:?}"))?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        match layout::layout_for_file(name) {
            Some(layout) => files.push((entry.path(), layout)),
            None => debug!("Ignoring '{name}': no known type prefix"),
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

async fn load_control_file(
    pool: &PgPool,
    path: &Path,
    layout: &FileLayout,
    specs_dir: &Path,
) -> Result<()> {
    let specs = SpecDocument::load(&specs_dir.join(layout.spec_file))?;
    let schema = derive_schema(layout.table.as_str(), &specs)?;
    if schema.len() != control::SELECTED_FIELDS.len() {
        bail!(
            "The control specification must retain exactly {} column(s), found {}",
            control::SELECTED_FIELDS.len(),
            schema.len()
        );
    }

    let records = control::parse_control_file(path)?;
    let rows: Vec<FactRecord> = records
        .iter()
        .map(|record| {
            record
                .values()
                .iter()
                .map(|value| {
                    if value.is_empty() {
                        None
                    } else {
                        Some(Value::String((*value).to_string()))
                    }
                })
                .collect()
        })
        .collect();

    let key = layout.primary_key.expect("the control layout carries a key");
    let affected = db::upsert_rows(pool, layout.table.as_str(), &schema, key, &rows).await?;
    info!(
        "✓ Upserted {} commodity code(s) from {:?}",
        affected,
        path.file_name().unwrap_or_default()
    );
    Ok(())
}

async fn load_fact_file(
    pool: &PgPool,
    path: &Path,
    layout: &FileLayout,
    specs_dir: &Path,
    inland: &RecodeMap,
) -> Result<()> {
    let specs = SpecDocument::load(&specs_dir.join(layout.spec_file))?;
    let schema = derive_schema(layout.table.as_str(), &specs)?;

    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let file_period = Period::from_file_name(file_name)
        .with_context(|| format!("Reading the period from '{file_name}'"))?;
    let recodes = RecodeSet::for_selection(layout.recodes, inland);

    let records = facts::parse_trade_file(path, layout, &schema, &recodes, file_period)?;
    let inserted = db::append_rows(pool, layout.table.as_str(), &schema, &records).await?;
    info!("✓ Appended {inserted} row(s) into '{}' from '{file_name}'", layout.table);
    Ok(())
}
