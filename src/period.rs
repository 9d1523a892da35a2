//! Reporting periods and the date layouts embedded in the trade extracts.
//!
//! The extracts carry the reporting period as a text field: `0YYYYMM` in the
//! EU trade files and `MM/YYYY` in the non-EU files. Two values need special
//! treatment: month `13` is the source system's December adjustment period
//! and folds into period 12 advanced by 30 days, and the literal `0000000`
//! means "unknown" and is substituted with the first day of the period named
//! by the source file's name suffix.

use anyhow::{Result, anyhow, bail};
use chrono::{Duration, NaiveDate};

use crate::layout::PREFIX_LEN;

pub const ZERO_DATE_SENTINEL: &str = "0000000";
const ADJUSTMENT_PERIOD: u32 = 13;

/// A calendar reporting period (one month).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            bail!("Month {month} is out of range (1-12)");
        }
        if !(2000..2100).contains(&year) {
            bail!("Year {year} is out of range");
        }
        Ok(Self { year, month })
    }

    /// Extract the period from a source file name's `YYMM` suffix, e.g.
    /// `SMKX461912.txt` is December 2019.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let suffix = name
            .get(PREFIX_LEN..PREFIX_LEN + 4)
            .filter(|s| s.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| {
                anyhow!("File name '{name}' does not carry a YYMM period suffix")
            })?;
        let year: i32 = suffix[..2].parse()?;
        let month: u32 = suffix[2..].parse()?;
        Period::new(2000 + year, month)
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("validated on construction")
    }
}

/// Text layout of the period field in a trade extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodFormat {
    /// `0YYYYMM`, used by the EU trade extracts
    ZeroPaddedYearMonth,
    /// `MM/YYYY`, used by the non-EU trade extracts
    MonthSlashYear,
}

impl PeriodFormat {
    pub fn describe(self) -> &'static str {
        match self {
            PeriodFormat::ZeroPaddedYearMonth => "0YYYYMM",
            PeriodFormat::MonthSlashYear => "MM/YYYY",
        }
    }

    fn split_fields(self, raw: &str) -> Result<(i32, u32)> {
        match self {
            PeriodFormat::ZeroPaddedYearMonth => {
                if raw.len() != 7
                    || !raw.starts_with('0')
                    || !raw.bytes().all(|b| b.is_ascii_digit())
                {
                    bail!("'{raw}' does not match the {} period layout", self.describe());
                }
                Ok((raw[1..5].parse()?, raw[5..7].parse()?))
            }
            PeriodFormat::MonthSlashYear => {
                let (month, year) = raw.split_once('/').ok_or_else(|| {
                    anyhow!("'{raw}' does not match the {} period layout", self.describe())
                })?;
                if month.len() != 2
                    || year.len() != 4
                    || !month.bytes().all(|b| b.is_ascii_digit())
                    || !year.bytes().all(|b| b.is_ascii_digit())
                {
                    bail!("'{raw}' does not match the {} period layout", self.describe());
                }
                Ok((year.parse()?, month.parse()?))
            }
        }
    }

    /// Parse a period field into the date stored on the fact row.
    ///
    /// `file_period` is the period named by the source file's name suffix; it
    /// only backs the `0000000` sentinel.
    pub fn parse_date(self, raw: &str, file_period: Period) -> Result<NaiveDate> {
        if raw == ZERO_DATE_SENTINEL {
            return Ok(file_period.first_day());
        }
        let (year, month) = self.split_fields(raw)?;
        if month == ADJUSTMENT_PERIOD {
            let base = NaiveDate::from_ymd_opt(year, 12, 1)
                .ok_or_else(|| anyhow!("Year {year} is out of range"))?;
            return Ok(base + Duration::days(30));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| anyhow!("'{raw}' is not a valid {} period", self.describe()))
    }
}
