use std::collections::BTreeSet;
use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use super::domain::{HazardEntry, RiskLevel};

/// Dataset compiled into the crate, used when no external table is configured.
pub(crate) const BUILTIN_DATASET: &str = include_str!("../../data/harmful_chemicals.json");

/// Fatal error raised while loading the hazard reference table.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("failed to read hazard dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hazard dataset JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid hazard dataset CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("hazard entry '{entry}' is missing required field '{field}'")]
    MissingField { entry: String, field: &'static str },
    #[error("hazard '{0}' is defined more than once")]
    DuplicateName(String),
    #[error("hazard '{name}' has invalid risk level '{value}'")]
    InvalidRiskLevel { name: String, value: String },
    #[error("unsupported hazard dataset format '{0}' (expected .json or .csv)")]
    UnsupportedFormat(String),
}

/// Encodings accepted for the hazard table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Json,
    Csv,
}

impl DatasetFormat {
    pub fn from_path(path: &Path) -> Result<Self, DataLoadError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(DataLoadError::UnsupportedFormat(
                path.display().to_string(),
            )),
        }
    }
}

// Field names cover both the canonical layout and the legacy keyed layout
// (`avoid`, `diseases_to_avoid`).
#[derive(Debug, Default, Deserialize)]
struct RawHazard {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    risk_level: Option<String>,
    #[serde(default)]
    cause: Option<String>,
    #[serde(default, alias = "avoid")]
    avoid_if: Option<String>,
    #[serde(default, alias = "diseases_to_avoid")]
    associated_diseases: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDataset {
    List(Vec<RawHazard>),
    Keyed(KeyedHazards),
}

/// Keyed layout in document order; repeated keys are kept so they can be
/// reported instead of silently overwriting each other.
#[derive(Debug)]
struct KeyedHazards(Vec<(String, RawHazard)>);

impl<'de> Deserialize<'de> for KeyedHazards {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KeyedVisitor;

        impl<'de> Visitor<'de> for KeyedVisitor {
            type Value = KeyedHazards;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of hazard entries keyed by name")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, RawHazard>()? {
                    entries.push(entry);
                }
                Ok(KeyedHazards(entries))
            }
        }

        deserializer.deserialize_map(KeyedVisitor)
    }
}

#[derive(Debug, Deserialize)]
struct CsvHazard {
    name: Option<String>,
    risk_level: Option<String>,
    cause: Option<String>,
    avoid_if: Option<String>,
    #[serde(default)]
    associated_diseases: Option<String>,
}

pub(crate) fn parse_json(raw: &str) -> Result<Vec<HazardEntry>, DataLoadError> {
    match serde_json::from_str::<RawDataset>(raw)? {
        RawDataset::List(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| into_entry(item, None, index))
            .collect(),
        RawDataset::Keyed(KeyedHazards(items)) => {
            let mut seen = BTreeSet::new();
            items
                .into_iter()
                .enumerate()
                .map(|(index, (key, item))| {
                    let canonical = canonical_name(&key);
                    if !seen.insert(canonical.clone()) {
                        return Err(DataLoadError::DuplicateName(canonical));
                    }
                    into_entry(item, Some(key), index)
                })
                .collect()
        }
    }
}

pub(crate) fn parse_csv<R: Read>(reader: R) -> Result<Vec<HazardEntry>, DataLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut entries = Vec::new();
    for (index, row) in csv_reader.deserialize::<CsvHazard>().enumerate() {
        let row = row?;
        let associated_diseases = row
            .associated_diseases
            .map(|value| value.split(';').map(str::to_string).collect())
            .unwrap_or_default();
        let raw = RawHazard {
            name: row.name,
            risk_level: row.risk_level,
            cause: row.cause,
            avoid_if: row.avoid_if,
            associated_diseases,
        };
        entries.push(into_entry(raw, None, index)?);
    }
    Ok(entries)
}

fn into_entry(
    raw: RawHazard,
    key: Option<String>,
    index: usize,
) -> Result<HazardEntry, DataLoadError> {
    let name = raw
        .name
        .or(key)
        .map(|value| canonical_name(&value))
        .filter(|value| !value.is_empty())
        .ok_or_else(|| DataLoadError::MissingField {
            entry: format!("#{index}"),
            field: "name",
        })?;

    let risk_value = required(raw.risk_level, &name, "risk_level")?;
    let risk_level =
        risk_value
            .parse::<RiskLevel>()
            .map_err(|value| DataLoadError::InvalidRiskLevel {
                name: name.clone(),
                value,
            })?;

    let cause = required(raw.cause, &name, "cause")?;
    let avoid_if = required(raw.avoid_if, &name, "avoid_if")?;

    let associated_diseases: BTreeSet<String> = raw
        .associated_diseases
        .into_iter()
        .map(|disease| disease.trim().to_string())
        .filter(|disease| !disease.is_empty())
        .collect();

    Ok(HazardEntry {
        name,
        risk_level,
        cause,
        avoid_if,
        associated_diseases,
    })
}

fn required(
    value: Option<String>,
    entry: &str,
    field: &'static str,
) -> Result<String, DataLoadError> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| DataLoadError::MissingField {
            entry: entry.to_string(),
            field,
        })
}

/// Lowercased, whitespace-collapsed form used as the hazard identity.
pub(crate) fn canonical_name(value: &str) -> String {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}
