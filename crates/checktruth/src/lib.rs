//! Health assessment engine for packaged-food products.
//!
//! [`matcher::match_hazards`] finds reference hazards in an ingredients list,
//! [`assessment::AssessmentEngine`] scores nutrient facts plus those hazards,
//! and [`product::ProductAnalyzer`] ties both to a shared
//! [`hazards::HazardRegistry`] for callers that assemble full reports.

pub mod assessment;
pub mod config;
pub mod error;
pub mod hazards;
pub mod matcher;
pub mod product;
pub mod telemetry;

pub use assessment::{AssessmentEngine, AssessmentResult, InvalidInputError, NutrientFacts};
pub use hazards::{DataLoadError, HazardEntry, HazardRegistry, HazardStore, RiskLevel};
pub use matcher::{match_hazards, FlaggedChemical};
