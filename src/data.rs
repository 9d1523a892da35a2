use std::fmt;

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;

use crate::types::LogicalType;

/// A single typed cell value after coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i32),
    BigInt(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::BigInt(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%Y%m%d"];
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

/// Coerce a raw field to its declared logical type. Empty input is NULL.
///
/// Period-formatted date columns in the trade extracts do not come through
/// here; they follow the layout-specific rules in [`crate::period`].
pub fn coerce_value(raw: &str, ty: &LogicalType) -> Result<Option<Value>> {
    if raw.is_empty() {
        return Ok(None);
    }
    let parsed = match ty {
        LogicalType::Text | LogicalType::Char(_) | LogicalType::VarChar(_) => {
            Value::String(raw.to_string())
        }
        LogicalType::Integer => {
            let parsed: i32 = raw
                .parse()
                .with_context(|| format!("Failed to parse '{raw}' as integer"))?;
            Value::Integer(parsed)
        }
        LogicalType::BigInt => {
            let parsed: i64 = raw
                .parse()
                .with_context(|| format!("Failed to parse '{raw}' as bigint"))?;
            Value::BigInt(parsed)
        }
        LogicalType::Float => {
            let parsed: f64 = raw
                .parse()
                .with_context(|| format!("Failed to parse '{raw}' as float"))?;
            Value::Float(parsed)
        }
        LogicalType::Boolean => {
            let lowered = raw.to_ascii_lowercase();
            let parsed = match lowered.as_str() {
                "true" | "t" | "yes" | "y" | "1" => true,
                "false" | "f" | "no" | "n" | "0" => false,
                _ => bail!("Failed to parse '{raw}' as boolean"),
            };
            Value::Boolean(parsed)
        }
        LogicalType::Date => Value::Date(parse_naive_date(raw)?),
        LogicalType::Remove => bail!("Removed columns carry no values"),
    };
    Ok(Some(parsed))
}
