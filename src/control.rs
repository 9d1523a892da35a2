//! Commodity code ("control") file parsing.
//!
//! Control files are pipe-delimited text in the legacy Windows-1252 encoding,
//! with one header line, two trailing summary lines, and occasional embedded
//! NUL bytes. Older extracts in the series carry 28 fields per line with the
//! final description split across the last two; newer extracts carry 27. The
//! tokenizer models that split explicitly and the merge happens when the line
//! is turned into a record.

use std::{fs, path::Path};

use encoding_rs::WINDOWS_1252;
use log::debug;

use crate::error::{EtlError, EtlResult};

/// Raw positions of the retained fields: comcode, quantity code, and the
/// three description fields.
pub const SELECTED_FIELDS: [usize; 5] = [0, 7, 24, 25, 26];

const HEADER_LINES: usize = 1;
const FOOTER_LINES: usize = 2;
const STANDARD_FIELD_COUNT: usize = 27;
const LEGACY_FIELD_COUNT: usize = 28;

/// One commodity reference row, check digit already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRecord {
    pub comcode: String,
    pub quantity_code: String,
    pub sub_description_1: String,
    pub sub_description_2: String,
    pub description: String,
}

impl ControlRecord {
    pub fn values(&self) -> [&str; 5] {
        [
            &self.comcode,
            &self.quantity_code,
            &self.sub_description_1,
            &self.sub_description_2,
            &self.description,
        ]
    }
}

#[derive(Debug)]
enum ControlLine {
    /// 27 fields, single trailing description
    Standard(Vec<String>),
    /// 28 fields, description split across the last two
    Legacy(Vec<String>),
}

impl ControlLine {
    fn tokenize(line: &str, path: &Path, line_no: usize, legacy: bool) -> EtlResult<ControlLine> {
        let fields: Vec<String> = line.split('|').map(str::to_string).collect();
        let expected = if legacy {
            LEGACY_FIELD_COUNT
        } else {
            STANDARD_FIELD_COUNT
        };
        if fields.len() != expected {
            return Err(EtlError::RecordFormat {
                path: path.to_path_buf(),
                line: line_no,
                expected,
                found: fields.len(),
            });
        }
        Ok(if legacy {
            ControlLine::Legacy(fields)
        } else {
            ControlLine::Standard(fields)
        })
    }

    fn into_record(self) -> ControlRecord {
        let fields = match self {
            ControlLine::Standard(fields) => fields,
            ControlLine::Legacy(mut fields) => {
                let tail = fields.pop().expect("legacy lines have 28 fields");
                let merged = format!("{} {}", fields[26].trim(), tail.trim());
                fields[26] = merged;
                fields
            }
        };
        let mut comcode = fields[SELECTED_FIELDS[0]].trim().to_string();
        // the final character is a check digit not used downstream
        comcode.pop();
        ControlRecord {
            comcode,
            quantity_code: fields[SELECTED_FIELDS[1]].trim().to_string(),
            sub_description_1: fields[SELECTED_FIELDS[2]].trim().to_string(),
            sub_description_2: fields[SELECTED_FIELDS[3]].trim().to_string(),
            description: fields[SELECTED_FIELDS[4]].trim().to_string(),
        }
    }
}

/// Parse a control file into reference records.
///
/// Malformed lines abort the whole file with [`EtlError::RecordFormat`].
pub fn parse_control_file(path: &Path) -> EtlResult<Vec<ControlRecord>> {
    let bytes = fs::read(path).map_err(|err| EtlError::io(path, err))?;
    let (text, _, had_errors) = WINDOWS_1252.decode(&bytes);
    if had_errors {
        return Err(EtlError::Decode {
            path: path.to_path_buf(),
            encoding: WINDOWS_1252.name(),
        });
    }
    let text = text.replace('\0', "");

    let mut lines: Vec<&str> = text.split('\n').collect();
    // a trailing newline yields an empty final line; drop it before the
    // positional trim so the two summary lines are the ones removed
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    if lines.len() <= HEADER_LINES + FOOTER_LINES {
        debug!("{path:?} holds no data lines");
        return Ok(Vec::new());
    }
    let data_lines = &lines[HEADER_LINES..lines.len() - FOOTER_LINES];

    // the 28-field variant is detected once, from the first data line
    let legacy = data_lines[0].split('|').count() == LEGACY_FIELD_COUNT;
    if legacy {
        debug!("{path:?} uses the legacy split-description layout");
    }

    let mut records = Vec::with_capacity(data_lines.len());
    for (offset, line) in data_lines.iter().enumerate() {
        let line_no = HEADER_LINES + offset + 1;
        let tokenized = ControlLine::tokenize(line, path, line_no, legacy)?;
        records.push(tokenized.into_record());
    }
    Ok(records)
}
