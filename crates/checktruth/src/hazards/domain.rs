use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Severity attached to a hazard entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "moderate" => Ok(Self::Medium),
            "high" | "severe" => Ok(Self::High),
            other => Err(other.to_string()),
        }
    }
}

/// Reference record describing one ingredient of health concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardEntry {
    pub name: String,
    pub risk_level: RiskLevel,
    pub cause: String,
    pub avoid_if: String,
    pub associated_diseases: BTreeSet<String>,
}

impl HazardEntry {
    /// True when the entry is severe enough to force an auto-fail.
    pub fn is_critical(&self) -> bool {
        self.risk_level == RiskLevel::High && !self.associated_diseases.is_empty()
    }
}
