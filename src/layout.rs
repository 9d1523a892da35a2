//! The fixed registry of source file layouts.
//!
//! Every extract file name starts with a 6-character type prefix that selects
//! everything else about the file: which specification document describes its
//! columns, which table it lands in, how its period field is written, which
//! mode-of-transport columns get recoded, and how many trailer rows to drop.

use std::fmt;

use crate::period::PeriodFormat;

pub const PREFIX_LEN: usize = 6;

/// Column recoded with the zero-prefixed border variant of the transport map.
pub const BORDER_MOT_COLUMN: &str = "border_mot";
/// Column recoded with the plain transport map.
pub const INLAND_MOT_COLUMN: &str = "inland_mot";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableName {
    Control,
    Exports,
    Imports,
    Dispatches,
    Arrivals,
}

impl TableName {
    pub fn as_str(self) -> &'static str {
        match self {
            TableName::Control => "control",
            TableName::Exports => "exports",
            TableName::Imports => "imports",
            TableName::Dispatches => "dispatches",
            TableName::Arrivals => "arrivals",
        }
    }

    pub fn fact_tables() -> [TableName; 4] {
        [
            TableName::Exports,
            TableName::Imports,
            TableName::Dispatches,
            TableName::Arrivals,
        ]
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserKind {
    /// Commodity reference file: Windows-1252, positional trimming, upsert
    Control,
    /// Trade fact file: typed append
    Fact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecodeSelection {
    None,
    BorderAndInland,
}

/// Everything the loader needs to know about one file type.
#[derive(Debug, Clone, Copy)]
pub struct FileLayout {
    pub prefix: &'static str,
    pub table: TableName,
    pub spec_file: &'static str,
    pub parser: ParserKind,
    pub period_format: Option<PeriodFormat>,
    pub recodes: RecodeSelection,
    /// Trailing summary rows to drop after the single header row
    pub trailer_rows: usize,
    pub primary_key: Option<&'static str>,
}

pub const LAYOUTS: [FileLayout; 5] = [
    FileLayout {
        prefix: "SMKA12",
        table: TableName::Control,
        spec_file: "controlfilecols.json",
        parser: ParserKind::Control,
        period_format: None,
        recodes: RecodeSelection::None,
        trailer_rows: 2,
        primary_key: Some("comcode"),
    },
    FileLayout {
        prefix: "SMKE19",
        table: TableName::Exports,
        spec_file: "noneuexportcols.json",
        parser: ParserKind::Fact,
        period_format: Some(PeriodFormat::MonthSlashYear),
        recodes: RecodeSelection::BorderAndInland,
        trailer_rows: 1,
        primary_key: None,
    },
    FileLayout {
        prefix: "SMKI19",
        table: TableName::Imports,
        spec_file: "noneuimportcols.json",
        parser: ParserKind::Fact,
        period_format: Some(PeriodFormat::MonthSlashYear),
        recodes: RecodeSelection::BorderAndInland,
        trailer_rows: 1,
        primary_key: None,
    },
    FileLayout {
        prefix: "SMKX46",
        table: TableName::Dispatches,
        spec_file: "eutradecols.json",
        parser: ParserKind::Fact,
        period_format: Some(PeriodFormat::ZeroPaddedYearMonth),
        recodes: RecodeSelection::None,
        trailer_rows: 0,
        primary_key: None,
    },
    FileLayout {
        prefix: "SMKM46",
        table: TableName::Arrivals,
        spec_file: "eutradecols.json",
        parser: ParserKind::Fact,
        period_format: Some(PeriodFormat::ZeroPaddedYearMonth),
        recodes: RecodeSelection::None,
        trailer_rows: 0,
        primary_key: None,
    },
];

/// Select the layout for a source file by its uppercase-normalized prefix.
pub fn layout_for_file(name: &str) -> Option<&'static FileLayout> {
    let prefix = name.get(..PREFIX_LEN)?.to_ascii_uppercase();
    LAYOUTS.iter().find(|layout| layout.prefix == prefix)
}

pub fn layout_for_table(table: TableName) -> &'static FileLayout {
    LAYOUTS
        .iter()
        .find(|layout| layout.table == table)
        .expect("every table has a layout")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_selection_normalizes_case() {
        let layout = layout_for_file("smkx461912.txt").unwrap();
        assert_eq!(layout.table, TableName::Dispatches);
        assert_eq!(layout.period_format, Some(PeriodFormat::ZeroPaddedYearMonth));
    }

    #[test]
    fn unknown_or_short_names_have_no_layout() {
        assert!(layout_for_file("SMKZ991912.txt").is_none());
        assert!(layout_for_file("SMK").is_none());
    }

    #[test]
    fn only_the_control_layout_upserts() {
        for layout in &LAYOUTS {
            match layout.parser {
                ParserKind::Control => {
                    assert_eq!(layout.primary_key, Some("comcode"));
                    assert_eq!(layout.trailer_rows, 2);
                }
                ParserKind::Fact => {
                    assert!(layout.primary_key.is_none());
                    assert!(layout.period_format.is_some());
                }
            }
        }
    }
}
