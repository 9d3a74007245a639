//! Health assessment engine: turns nutrient facts and flagged chemicals into
//! a score, a status label and disease warnings.
//!
//! Stages run in a fixed order over a single accumulator: base score,
//! penalties, bonuses (skipped when an auto-fail condition holds), the
//! auto-fail ceiling, then the clamp. The ceiling always runs after the
//! additive stages.

mod config;
mod nutrients;
mod rules;
mod status;
mod warnings;

pub use config::{
    AutoFailConfig, ChemicalPenalty, DiseaseRule, NutrientBonus, NutrientPenalty, ScoringConfig,
    MAX_AUTO_FAIL_CEILING,
};
pub use nutrients::{Nutrient, NutrientFacts};
pub use rules::{AutoFailReason, RuleKind};
pub use status::StatusLabel;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matcher::FlaggedChemical;
use rules::{auto_fail_reasons, RuleInput, BONUS_RULES, PENALTY_RULES};
use warnings::derive_disease_warnings;

/// Per-request input that cannot be scored.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidInputError {
    #[error("{nutrient} must not be negative (got {value})")]
    NegativeNutrient { nutrient: Nutrient, value: f64 },
    #[error("{nutrient} must be a finite number")]
    NonFiniteNutrient { nutrient: Nutrient },
    #[error("malformed hazard entry: {reason}")]
    MalformedHazard { reason: String },
}

/// Discrete contribution to a score, kept for transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub rule: RuleKind,
    pub delta: f64,
    pub notes: String,
}

/// Engine output for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub score: u8,
    pub status: StatusLabel,
    pub flagged_chemicals: Vec<FlaggedChemical>,
    pub disease_warnings: BTreeSet<String>,
    pub components: Vec<ScoreComponent>,
    pub auto_fail: Vec<AutoFailReason>,
}

impl AssessmentResult {
    pub fn is_auto_failed(&self) -> bool {
        !self.auto_fail.is_empty()
    }
}

/// Stateless evaluator applying a scoring configuration.
#[derive(Debug, Clone, Default)]
pub struct AssessmentEngine {
    config: ScoringConfig,
}

impl AssessmentEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn assess(
        &self,
        facts: &NutrientFacts,
        flagged: &[FlaggedChemical],
    ) -> Result<AssessmentResult, InvalidInputError> {
        facts.validate()?;
        validate_flagged(flagged)?;

        let input = RuleInput {
            facts,
            flagged,
            config: &self.config,
        };

        let auto_fail = auto_fail_reasons(&input);
        let mut components = Vec::new();
        let mut total = self.config.base_score;

        for rule in &PENALTY_RULES {
            if let Some(component) = (rule.evaluate)(rule.kind, &input) {
                total += component.delta;
                components.push(component);
            }
        }

        if auto_fail.is_empty() {
            for rule in &BONUS_RULES {
                if let Some(component) = (rule.evaluate)(rule.kind, &input) {
                    total += component.delta;
                    components.push(component);
                }
            }
        } else {
            let ceiling = self.config.auto_fail.ceiling.min(MAX_AUTO_FAIL_CEILING);
            if total > ceiling {
                components.push(ScoreComponent {
                    rule: RuleKind::AutoFailCeiling,
                    delta: ceiling - total,
                    notes: auto_fail
                        .iter()
                        .map(AutoFailReason::summary)
                        .collect::<Vec<_>>()
                        .join("; "),
                });
                total = ceiling;
            }
        }

        let score = clamp_score(total);
        let status = StatusLabel::from_score(score);
        let disease_warnings =
            derive_disease_warnings(facts, flagged, &self.config.disease_rules);

        debug!(
            score,
            status = status.label(),
            flagged = flagged.len(),
            auto_fail = auto_fail.len(),
            "assessment complete"
        );

        Ok(AssessmentResult {
            score,
            status,
            flagged_chemicals: flagged.to_vec(),
            disease_warnings,
            components,
            auto_fail,
        })
    }
}

fn validate_flagged(flagged: &[FlaggedChemical]) -> Result<(), InvalidInputError> {
    for chemical in flagged {
        if chemical.hazard.name.trim().is_empty() {
            return Err(InvalidInputError::MalformedHazard {
                reason: "hazard name is empty".to_string(),
            });
        }
        if chemical.hazard.cause.trim().is_empty() {
            return Err(InvalidInputError::MalformedHazard {
                reason: format!("hazard '{}' has no cause", chemical.hazard.name),
            });
        }
    }
    Ok(())
}

fn clamp_score(total: f64) -> u8 {
    if total.is_nan() {
        return 0;
    }
    total.clamp(0.0, 100.0).round() as u8
}
