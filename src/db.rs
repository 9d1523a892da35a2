//! PostgreSQL storage layer: provisioning, appends, upserts, and the
//! row-count query behind the incremental gate.

use std::time::Duration;

use chrono::NaiveDate;
use itertools::Itertools;
use log::debug;
use sqlx::{
    PgPool, Postgres, QueryBuilder,
    postgres::{PgArguments, PgPoolOptions},
    query::Query,
};

use crate::{
    data::Value,
    error::{EtlError, EtlResult},
    facts::FactRecord,
    types::{LogicalType, TableSchema},
};

const INSERT_CHUNK_ROWS: usize = 500;

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
            connect_timeout_secs: 30,
        }
    }
}

pub async fn connect(config: &DbConfig) -> EtlResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.url)
        .await?;
    Ok(pool)
}

pub(crate) fn create_table_statement(table: &str, schema: &TableSchema) -> String {
    let columns = schema
        .columns
        .iter()
        .map(|column| format!("{} {}", column.name, column.logical_type.storage_type()))
        .join(", ");
    format!("CREATE TABLE {table} ({columns})")
}

pub(crate) fn upsert_statement(table: &str, schema: &TableSchema, key_column: &str) -> String {
    let columns = schema.column_names().join(", ");
    let placeholders = (1..=schema.len()).map(|i| format!("${i}")).join(", ");
    let updates = schema
        .column_names()
        .filter(|name| *name != key_column)
        .map(|name| format!("{name} = EXCLUDED.{name}"))
        .join(", ");
    format!(
        "INSERT INTO {table} ({columns}) VALUES ({placeholders}) \
         ON CONFLICT ({key_column}) DO UPDATE SET {updates}"
    )
}

/// Create `table` with one column per schema entry, in schema order.
///
/// An existing table is an [`EtlError::TableExists`] failure, never an
/// implicit replace.
pub async fn create_table(pool: &PgPool, table: &str, schema: &TableSchema) -> EtlResult<()> {
    let statement = create_table_statement(table, schema);
    debug!("{statement}");
    sqlx::query(&statement)
        .execute(pool)
        .await
        .map_err(|err| map_create_error(table, err))?;
    Ok(())
}

fn map_create_error(table: &str, err: sqlx::Error) -> EtlError {
    if let sqlx::Error::Database(db) = &err
        && db.code().as_deref() == Some("42P07")
    {
        return EtlError::TableExists(table.to_string());
    }
    EtlError::Db(err)
}

pub async fn add_primary_key(pool: &PgPool, table: &str, column: &str) -> EtlResult<()> {
    let statement = format!("ALTER TABLE {table} ADD PRIMARY KEY ({column})");
    debug!("{statement}");
    sqlx::query(&statement).execute(pool).await?;
    Ok(())
}

pub async fn drop_table_if_exists(pool: &PgPool, table: &str) -> EtlResult<()> {
    let statement = format!("DROP TABLE IF EXISTS {table}");
    debug!("{statement}");
    sqlx::query(&statement).execute(pool).await?;
    Ok(())
}

/// Bulk-append fact rows; existing content is never inspected.
pub async fn append_rows(
    pool: &PgPool,
    table: &str,
    schema: &TableSchema,
    rows: &[FactRecord],
) -> EtlResult<u64> {
    let column_list = schema.column_names().join(", ");
    let mut inserted = 0;
    for chunk in rows.chunks(INSERT_CHUNK_ROWS) {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO {table} ({column_list}) "));
        builder.push_values(chunk, |mut b, row| {
            for (cell, column) in row.iter().zip(&schema.columns) {
                push_cell(&mut b, cell, &column.logical_type);
            }
        });
        let result = builder.build().execute(pool).await?;
        inserted += result.rows_affected();
    }
    Ok(inserted)
}

/// Insert-or-update by `key_column`, one statement per record.
pub async fn upsert_rows(
    pool: &PgPool,
    table: &str,
    schema: &TableSchema,
    key_column: &str,
    rows: &[FactRecord],
) -> EtlResult<u64> {
    let statement = upsert_statement(table, schema, key_column);
    let mut affected = 0;
    for row in rows {
        let mut query = sqlx::query(&statement);
        for (cell, column) in row.iter().zip(&schema.columns) {
            query = bind_cell(query, cell, &column.logical_type);
        }
        affected += query.execute(pool).await?.rows_affected();
    }
    Ok(affected)
}

/// Rows in `table` whose `date` column equals `date`.
pub async fn count_rows_for_date(pool: &PgPool, table: &str, date: NaiveDate) -> EtlResult<i64> {
    let statement = format!("SELECT COUNT(*) FROM {table} WHERE date = $1");
    let count: i64 = sqlx::query_scalar(&statement)
        .bind(date)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

fn push_cell(
    b: &mut sqlx::query_builder::Separated<'_, '_, Postgres, &'static str>,
    cell: &Option<Value>,
    ty: &LogicalType,
) {
    match cell {
        Some(Value::String(v)) => b.push_bind(v.clone()),
        Some(Value::Integer(v)) => b.push_bind(*v),
        Some(Value::BigInt(v)) => b.push_bind(*v),
        Some(Value::Float(v)) => b.push_bind(*v),
        Some(Value::Boolean(v)) => b.push_bind(*v),
        Some(Value::Date(v)) => b.push_bind(*v),
        None => match ty {
            LogicalType::Integer => b.push_bind(Option::<i32>::None),
            LogicalType::BigInt => b.push_bind(Option::<i64>::None),
            LogicalType::Float => b.push_bind(Option::<f64>::None),
            LogicalType::Boolean => b.push_bind(Option::<bool>::None),
            LogicalType::Date => b.push_bind(Option::<NaiveDate>::None),
            _ => b.push_bind(Option::<String>::None),
        },
    };
}

fn bind_cell<'q>(
    query: Query<'q, Postgres, PgArguments>,
    cell: &Option<Value>,
    ty: &LogicalType,
) -> Query<'q, Postgres, PgArguments> {
    match cell {
        Some(Value::String(v)) => query.bind(v.clone()),
        Some(Value::Integer(v)) => query.bind(*v),
        Some(Value::BigInt(v)) => query.bind(*v),
        Some(Value::Float(v)) => query.bind(*v),
        Some(Value::Boolean(v)) => query.bind(*v),
        Some(Value::Date(v)) => query.bind(*v),
        None => match ty {
            LogicalType::Integer => query.bind(Option::<i32>::None),
            LogicalType::BigInt => query.bind(Option::<i64>::None),
            LogicalType::Float => query.bind(Option::<f64>::None),
            LogicalType::Boolean => query.bind(Option::<bool>::None),
            LogicalType::Date => query.bind(Option::<NaiveDate>::None),
            _ => query.bind(Option::<String>::None),
        },
    }
}
