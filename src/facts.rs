//! Trade fact file parsing: typed rows for the four append-only tables.

use std::{fs::File, io::BufReader, path::Path};

use encoding_rs::UTF_8;
use log::debug;

use crate::{
    data::{Value, coerce_value},
    error::{EtlError, EtlResult},
    layout::FileLayout,
    period::Period,
    recode::RecodeSet,
    types::{LogicalType, TableSchema},
};

pub const COMCODE_COLUMN: &str = "comcode";

const HEADER_ROWS: usize = 1;

/// One fact row in schema column order; `None` cells store NULL.
pub type FactRecord = Vec<Option<Value>>;

/// Parse a trade extract into typed fact records.
///
/// The single header row and the layout's trailer rows are dropped, each
/// retained column is coerced to its logical type (period columns follow the
/// layout's period format), mode-of-transport columns are recoded, and the
/// comcode check digit is stripped. A value that cannot be coerced aborts the
/// whole file with [`EtlError::TypeCoercion`].
pub fn parse_trade_file(
    path: &Path,
    layout: &FileLayout,
    schema: &TableSchema,
    recodes: &RecodeSet,
    period: Period,
) -> EtlResult<Vec<FactRecord>> {
    let file = File::open(path).map_err(|err| EtlError::io(path, err))?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.byte_records() {
        let record =
            record.map_err(|err| EtlError::io(path, std::io::Error::other(err)))?;
        let mut fields = Vec::with_capacity(record.len());
        for field in record.iter() {
            let (text, _, had_errors) = UTF_8.decode(field);
            if had_errors {
                return Err(EtlError::Decode {
                    path: path.to_path_buf(),
                    encoding: UTF_8.name(),
                });
            }
            fields.push(text.into_owned());
        }
        rows.push(fields);
    }

    if rows.len() <= HEADER_ROWS + layout.trailer_rows {
        debug!("{path:?} holds no data rows");
        return Ok(Vec::new());
    }
    let data_rows = &rows[HEADER_ROWS..rows.len() - layout.trailer_rows];

    let recode_columns: Vec<(usize, &crate::recode::RecodeMap)> = schema
        .columns
        .iter()
        .enumerate()
        .filter_map(|(idx, column)| recodes.map_for(&column.name).map(|map| (idx, map)))
        .collect();
    let comcode_index = schema.column_index(COMCODE_COLUMN);

    let mut records = Vec::with_capacity(data_rows.len());
    for (offset, row) in data_rows.iter().enumerate() {
        let file_row = HEADER_ROWS + offset + 1;
        if row.len() != schema.raw_width() {
            return Err(EtlError::RecordFormat {
                path: path.to_path_buf(),
                line: file_row,
                expected: schema.raw_width(),
                found: row.len(),
            });
        }

        let mut record: FactRecord = Vec::with_capacity(schema.len());
        for column in &schema.columns {
            let raw = row[column.raw_index].trim();
            let cell = coerce_column(raw, &column.logical_type, layout, period).map_err(
                |err| EtlError::TypeCoercion {
                    path: path.to_path_buf(),
                    row: file_row,
                    column: column.name.clone(),
                    reason: format!("{err:#}"),
                },
            )?;
            record.push(cell);
        }

        for (idx, map) in &recode_columns {
            if let Some(Value::String(code)) = &record[*idx]
                && let Some(mapped) = map.lookup(code)
            {
                record[*idx] = Some(Value::String(mapped.to_string()));
            }
        }

        if let Some(idx) = comcode_index
            && let Some(Value::String(comcode)) = &mut record[idx]
        {
            comcode.pop();
        }

        records.push(record);
    }
    Ok(records)
}

fn coerce_column(
    raw: &str,
    ty: &LogicalType,
    layout: &FileLayout,
    period: Period,
) -> anyhow::Result<Option<Value>> {
    match (ty, layout.period_format) {
        (LogicalType::Date, Some(format)) => {
            if raw.is_empty() {
                Ok(None)
            } else {
                Ok(Some(Value::Date(format.parse_date(raw, period)?)))
            }
        }
        _ => coerce_value(raw, ty),
    }
}
