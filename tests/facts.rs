mod common;

use chrono::NaiveDate;
use common::TestWorkspace;
use trade_loader::data::Value;
use trade_loader::error::EtlError;
use trade_loader::facts::parse_trade_file;
use trade_loader::layout::layout_for_file;
use trade_loader::period::Period;
use trade_loader::recode::{RecodeMap, RecodeSet};
use trade_loader::spec::ColumnSpec;
use trade_loader::types::{TableSchema, derive_schema};

fn spec(name: &str, tag: &str) -> ColumnSpec {
    ColumnSpec {
        name: name.to_string(),
        type_tag: tag.to_string(),
    }
}

fn eu_schema() -> TableSchema {
    derive_schema(
        "dispatches",
        &[
            spec("comcode", "char(9)"),
            spec("record_type", "REMOVE"),
            spec("date", "date"),
            spec("value", "bigint"),
            spec("quantity", "integer"),
            spec("description", "text"),
        ],
    )
    .unwrap()
}

fn noneu_schema() -> TableSchema {
    derive_schema(
        "exports",
        &[
            spec("comcode", "char(9)"),
            spec("date", "date"),
            spec("border_mot", "char(3)"),
            spec("inland_mot", "char(2)"),
            spec("value", "bigint"),
        ],
    )
    .unwrap()
}

fn cell_str(record: &[Option<Value>], idx: usize) -> &str {
    record[idx].as_ref().and_then(Value::as_str).expect("string cell")
}

#[test]
fn eu_files_have_a_header_but_no_trailer() {
    let workspace = TestWorkspace::new();
    let body = "\
COMCODE|RECTYPE|PERIOD|VALUE|QTY|DESC
010121000|0|0201912|15000|25|LIVE HORSES
010129000|0|0201912|7300|4|OTHER HORSES
010130000|0|0201912|120|1|ASSES";
    let path = workspace.write("SMKX461912.txt", body);
    let layout = layout_for_file("SMKX461912.txt").unwrap();
    let period = Period::from_file_name("SMKX461912.txt").unwrap();

    let records =
        parse_trade_file(&path, layout, &eu_schema(), &RecodeSet::none(), period).unwrap();
    assert_eq!(records.len(), 3);

    let first = &records[0];
    assert_eq!(cell_str(first, 0), "01012100");
    assert_eq!(
        first[1],
        Some(Value::Date(NaiveDate::from_ymd_opt(2019, 12, 1).unwrap()))
    );
    assert_eq!(first[2], Some(Value::BigInt(15_000)));
    assert_eq!(first[3], Some(Value::Integer(25)));
    assert_eq!(cell_str(first, 4), "LIVE HORSES");
}

#[test]
fn noneu_files_drop_the_trailing_totals_row() {
    let workspace = TestWorkspace::new();
    let body = "\
COMCODE|PERIOD|BMOT|IMOT|VALUE
010121000|12/2019|010|10|5000
010129000|12/2019|099|40|250
010130000|12/2019|040|99|90
TRAILER|0|0|0|0";
    let path = workspace.write("SMKE191912.txt", body);
    let layout = layout_for_file("SMKE191912.txt").unwrap();
    let period = Period::from_file_name("SMKE191912.txt").unwrap();
    let inland = RecodeMap::from_entries([("10", "1"), ("40", "4")]);
    let recodes = RecodeSet::for_selection(layout.recodes, &inland);

    let records = parse_trade_file(&path, layout, &noneu_schema(), &recodes, period).unwrap();
    assert_eq!(records.len(), 3);

    // border hit, inland hit
    assert_eq!(cell_str(&records[0], 2), "1");
    assert_eq!(cell_str(&records[0], 3), "1");
    // border miss passes through, inland hit
    assert_eq!(cell_str(&records[1], 2), "099");
    assert_eq!(cell_str(&records[1], 3), "4");
    // border hit, inland miss passes through
    assert_eq!(cell_str(&records[2], 2), "4");
    assert_eq!(cell_str(&records[2], 3), "99");
    assert_eq!(
        records[0][1],
        Some(Value::Date(NaiveDate::from_ymd_opt(2019, 12, 1).unwrap()))
    );
}

#[test]
fn thirteenth_period_and_zero_dates_follow_the_correction_rules() {
    let workspace = TestWorkspace::new();
    let body = "\
COMCODE|RECTYPE|PERIOD|VALUE|QTY|DESC
010121000|0|0201213|100|1|ADJUSTMENT
010129000|0|0000000|200|2|UNKNOWN PERIOD";
    let path = workspace.write("SMKX461912.txt", body);
    let layout = layout_for_file("SMKX461912.txt").unwrap();
    let period = Period::from_file_name("SMKX461912.txt").unwrap();

    let records =
        parse_trade_file(&path, layout, &eu_schema(), &RecodeSet::none(), period).unwrap();
    assert_eq!(
        records[0][1],
        Some(Value::Date(NaiveDate::from_ymd_opt(2012, 12, 31).unwrap()))
    );
    assert_eq!(
        records[1][1],
        Some(Value::Date(NaiveDate::from_ymd_opt(2019, 12, 1).unwrap()))
    );
}

#[test]
fn uncoercible_values_name_the_column_and_row() {
    let workspace = TestWorkspace::new();
    let body = "\
COMCODE|RECTYPE|PERIOD|VALUE|QTY|DESC
010121000|0|0201912|15000|25|LIVE HORSES
010129000|0|0201912|7B00|4|OTHER HORSES";
    let path = workspace.write("SMKX461912.txt", body);
    let layout = layout_for_file("SMKX461912.txt").unwrap();
    let period = Period::from_file_name("SMKX461912.txt").unwrap();

    let err = parse_trade_file(&path, layout, &eu_schema(), &RecodeSet::none(), period)
        .unwrap_err();
    match err {
        EtlError::TypeCoercion {
            row, column, reason, ..
        } => {
            assert_eq!(row, 3);
            assert_eq!(column, "value");
            assert!(reason.contains("7B00"));
        }
        other => panic!("expected TypeCoercion, got {other:?}"),
    }
}

#[test]
fn rows_with_the_wrong_field_count_are_rejected() {
    let workspace = TestWorkspace::new();
    let body = "\
COMCODE|RECTYPE|PERIOD|VALUE|QTY|DESC
010121000|0|0201912|15000|25";
    let path = workspace.write("SMKX461912.txt", body);
    let layout = layout_for_file("SMKX461912.txt").unwrap();
    let period = Period::from_file_name("SMKX461912.txt").unwrap();

    let err = parse_trade_file(&path, layout, &eu_schema(), &RecodeSet::none(), period)
        .unwrap_err();
    match err {
        EtlError::RecordFormat {
            line,
            expected,
            found,
            ..
        } => {
            assert_eq!(line, 2);
            assert_eq!(expected, 6);
            assert_eq!(found, 5);
        }
        other => panic!("expected RecordFormat, got {other:?}"),
    }
}

#[test]
fn empty_cells_become_nulls() {
    let workspace = TestWorkspace::new();
    let body = "\
COMCODE|RECTYPE|PERIOD|VALUE|QTY|DESC
010121000|0|0201912||25|";
    let path = workspace.write("SMKX461912.txt", body);
    let layout = layout_for_file("SMKX461912.txt").unwrap();
    let period = Period::from_file_name("SMKX461912.txt").unwrap();

    let records =
        parse_trade_file(&path, layout, &eu_schema(), &RecodeSet::none(), period).unwrap();
    assert_eq!(records[0][2], None);
    assert_eq!(records[0][4], None);
}
