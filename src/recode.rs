//! Categorical recode tables for the mode-of-transport columns.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};

use crate::layout::{BORDER_MOT_COLUMN, INLAND_MOT_COLUMN, RecodeSelection};

/// Raw code to canonical code mapping for one column.
#[derive(Debug, Clone, Default)]
pub struct RecodeMap {
    entries: BTreeMap<String, String>,
}

impl RecodeMap {
    /// Load a flat JSON object of raw-to-canonical codes.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Reading recode document {path:?}"))?;
        let entries: BTreeMap<String, String> = serde_json::from_str(&text)
            .with_context(|| format!("Parsing recode document {path:?}"))?;
        Ok(Self { entries })
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// The border crossing variant: every raw key gains a leading zero.
    pub fn border_variant(&self) -> RecodeMap {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(raw, canonical)| (format!("0{raw}"), canonical.clone()))
                .collect(),
        }
    }

    /// Best-effort substitution: values absent from the map pass through.
    pub fn lookup(&self, raw: &str) -> Option<&str> {
        self.entries.get(raw).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The per-column recode maps for one file layout.
#[derive(Debug, Clone, Default)]
pub struct RecodeSet {
    per_column: BTreeMap<String, RecodeMap>,
}

impl RecodeSet {
    pub fn none() -> Self {
        Self::default()
    }

    /// Build the recode set a layout asks for from the inland transport map.
    pub fn for_selection(selection: RecodeSelection, inland: &RecodeMap) -> Self {
        match selection {
            RecodeSelection::None => Self::none(),
            RecodeSelection::BorderAndInland => {
                let mut per_column = BTreeMap::new();
                per_column.insert(BORDER_MOT_COLUMN.to_string(), inland.border_variant());
                per_column.insert(INLAND_MOT_COLUMN.to_string(), inland.clone());
                Self { per_column }
            }
        }
    }

    pub fn map_for(&self, column: &str) -> Option<&RecodeMap> {
        self.per_column.get(column)
    }

    pub fn is_empty(&self) -> bool {
        self.per_column.is_empty()
    }
}
