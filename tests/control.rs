mod common;

use common::TestWorkspace;
use trade_loader::control::parse_control_file;
use trade_loader::error::EtlError;

const FIELD_COUNT: usize = 27;

/// Windows-1252 encoder for the handful of accented characters the fixtures
/// use; everything else is ASCII.
fn encode_w1252(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            'é' => 0xE9,
            'ü' => 0xFC,
            c if c.is_ascii() => c as u8,
            other => panic!("fixture character {other:?} is not mapped"),
        })
        .collect()
}

fn control_line(comcode: &str, quantity: &str, descriptions: [&str; 3]) -> String {
    let mut fields = vec![String::new(); FIELD_COUNT];
    fields[0] = comcode.to_string();
    fields[7] = quantity.to_string();
    fields[24] = descriptions[0].to_string();
    fields[25] = descriptions[1].to_string();
    fields[26] = descriptions[2].to_string();
    fields.join("|")
}

fn control_file(data_lines: &[String]) -> String {
    let mut lines = vec!["HEADER".to_string()];
    lines.extend(data_lines.iter().cloned());
    lines.push("SUMMARY".to_string());
    lines.push("TRAILER".to_string());
    lines.join("\n")
}

#[test]
fn each_data_line_becomes_one_trimmed_record() {
    let workspace = TestWorkspace::new();
    let data = [
        control_line("010121000", " 023", ["SUB A ", " SUB B", " LIVE HORSES "]),
        control_line("010129000", "023", ["", "", "OTHER HORSES"]),
        control_line("010130000", "023", ["", "", "ASSES"]),
    ];
    let path = workspace.write("SMKA121912.txt", &control_file(&data));

    let records = parse_control_file(&path).expect("well-formed file");
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].comcode, "01012100");
    assert_eq!(records[0].quantity_code, "023");
    assert_eq!(records[0].sub_description_1, "SUB A");
    assert_eq!(records[0].sub_description_2, "SUB B");
    assert_eq!(records[0].description, "LIVE HORSES");
    assert_eq!(records[2].comcode, "01013000");
}

#[test]
fn legacy_extracts_merge_the_split_description() {
    let workspace = TestWorkspace::new();
    let data = [
        control_line("010121000", "023", ["", "", "LIVE "]) + "| PURE-BRED",
        control_line("010129000", "023", ["", "", "OTHER"]) + "|HORSES",
    ];
    let path = workspace.write("SMKA120801.txt", &control_file(&data));

    let records = parse_control_file(&path).expect("legacy file");
    assert_eq!(records[0].description, "LIVE PURE-BRED");
    assert_eq!(records[1].description, "OTHER HORSES");
}

#[test]
fn windows_1252_text_and_nul_bytes_are_handled() {
    let workspace = TestWorkspace::new();
    let data = [control_line(
        "010121000",
        "023",
        ["", "", "PONIES \u{0}(CAMARGUé)"],
    )];
    let bytes = encode_w1252(&control_file(&data));
    let path = workspace.write_bytes("SMKA121912.txt", &bytes);

    let records = parse_control_file(&path).expect("decodable file");
    assert_eq!(records[0].description, "PONIES (CAMARGUé)");
}

#[test]
fn a_trailing_newline_does_not_eat_a_summary_line() {
    let workspace = TestWorkspace::new();
    let data = [control_line("010121000", "023", ["", "", "LIVE HORSES"])];
    let mut body = control_file(&data);
    body.push('\n');
    let path = workspace.write("SMKA121912.txt", &body);

    let records = parse_control_file(&path).expect("well-formed file");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].description, "LIVE HORSES");
}

#[test]
fn short_lines_abort_the_file_with_a_record_format_error() {
    let workspace = TestWorkspace::new();
    let data = [
        control_line("010121000", "023", ["", "", "LIVE HORSES"]),
        "too|few|fields".to_string(),
    ];
    let path = workspace.write("SMKA121912.txt", &control_file(&data));

    let err = parse_control_file(&path).unwrap_err();
    match err {
        EtlError::RecordFormat {
            line,
            expected,
            found,
            ..
        } => {
            assert_eq!(line, 3);
            assert_eq!(expected, FIELD_COUNT);
            assert_eq!(found, 3);
        }
        other => panic!("expected RecordFormat, got {other:?}"),
    }
}

#[test]
fn files_with_only_header_and_summary_lines_are_empty() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("SMKA121912.txt", "HEADER\nSUMMARY\nTRAILER");
    let records = parse_control_file(&path).expect("empty file");
    assert!(records.is_empty());
}
