use serde::{Deserialize, Serialize};

use super::nutrients::Nutrient;
use crate::config::ConfigError;

/// Highest score an auto-failed product may keep.
pub const MAX_AUTO_FAIL_CEILING: f64 = 20.0;

/// Scoring weights and thresholds for the assessment pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub base_score: f64,
    pub sugars: NutrientPenalty,
    pub saturated_fat: NutrientPenalty,
    pub trans_fat: NutrientPenalty,
    pub sodium: NutrientPenalty,
    pub calories: NutrientPenalty,
    pub chemicals: ChemicalPenalty,
    pub protein: NutrientBonus,
    pub fiber: NutrientBonus,
    pub auto_fail: AutoFailConfig,
    pub disease_rules: Vec<DiseaseRule>,
}

/// Penalty applied once a nutrient exceeds `threshold`:
/// `min(cap, base + per_unit * excess)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientPenalty {
    pub threshold: f64,
    pub base: f64,
    pub per_unit: f64,
    pub cap: f64,
}

impl NutrientPenalty {
    pub fn amount(&self, value: f64) -> f64 {
        let excess = (value - self.threshold).max(0.0);
        (self.base + self.per_unit * excess).min(self.cap)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientBonus {
    pub threshold: f64,
    pub points: f64,
}

/// Per-hazard weights by risk level plus the ceiling on their sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChemicalPenalty {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub cap: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoFailConfig {
    pub trans_fat_limit: f64,
    pub ceiling: f64,
}

/// Disease warning raised when a nutrient is strictly above `threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseRule {
    pub nutrient: Nutrient,
    pub threshold: f64,
    pub disease: String,
}

impl DiseaseRule {
    fn new(nutrient: Nutrient, threshold: f64, disease: &str) -> Self {
        Self {
            nutrient,
            threshold,
            disease: disease.to_string(),
        }
    }
}

impl ScoringConfig {
    /// Rejects weights that would let overrides break the score bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in self.numeric_fields() {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!(
                    "{field} must be a finite, non-negative number (got {value})"
                )));
            }
        }

        if self.base_score > 100.0 {
            return Err(invalid(format!(
                "base_score {} exceeds 100",
                self.base_score
            )));
        }

        let ceiling = self.auto_fail.ceiling;
        if ceiling > MAX_AUTO_FAIL_CEILING {
            return Err(invalid(format!(
                "auto_fail.ceiling {ceiling} exceeds {MAX_AUTO_FAIL_CEILING}"
            )));
        }

        for (name, penalty) in self.nutrient_penalties() {
            if penalty.cap >= self.base_score {
                return Err(invalid(format!(
                    "{name}.cap {} must stay below base_score {}",
                    penalty.cap, self.base_score
                )));
            }
        }

        if self.chemicals.cap >= self.base_score - ceiling {
            return Err(invalid(format!(
                "chemicals.cap {} must stay below base_score - auto_fail.ceiling ({})",
                self.chemicals.cap,
                self.base_score - ceiling
            )));
        }

        Ok(())
    }

    fn nutrient_penalties(&self) -> [(&'static str, &NutrientPenalty); 5] {
        [
            ("sugars", &self.sugars),
            ("saturated_fat", &self.saturated_fat),
            ("trans_fat", &self.trans_fat),
            ("sodium", &self.sodium),
            ("calories", &self.calories),
        ]
    }

    fn numeric_fields(&self) -> Vec<(String, f64)> {
        let mut fields = vec![
            ("base_score".to_string(), self.base_score),
            ("chemicals.low".to_string(), self.chemicals.low),
            ("chemicals.medium".to_string(), self.chemicals.medium),
            ("chemicals.high".to_string(), self.chemicals.high),
            ("chemicals.cap".to_string(), self.chemicals.cap),
            ("protein.threshold".to_string(), self.protein.threshold),
            ("protein.points".to_string(), self.protein.points),
            ("fiber.threshold".to_string(), self.fiber.threshold),
            ("fiber.points".to_string(), self.fiber.points),
            (
                "auto_fail.trans_fat_limit".to_string(),
                self.auto_fail.trans_fat_limit,
            ),
            ("auto_fail.ceiling".to_string(), self.auto_fail.ceiling),
        ];
        for (name, penalty) in self.nutrient_penalties() {
            fields.push((format!("{name}.threshold"), penalty.threshold));
            fields.push((format!("{name}.base"), penalty.base));
            fields.push((format!("{name}.per_unit"), penalty.per_unit));
            fields.push((format!("{name}.cap"), penalty.cap));
        }
        for rule in &self.disease_rules {
            fields.push((format!("disease_rules.{}", rule.nutrient), rule.threshold));
        }
        fields
    }
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::InvalidScoringRules { reason }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_score: 50.0,
            sugars: NutrientPenalty {
                threshold: 30.0,
                base: 5.0,
                per_unit: 0.5,
                cap: 20.0,
            },
            saturated_fat: NutrientPenalty {
                threshold: 10.0,
                base: 5.0,
                per_unit: 1.0,
                cap: 15.0,
            },
            trans_fat: NutrientPenalty {
                threshold: 0.1,
                base: 5.0,
                per_unit: 20.0,
                cap: 15.0,
            },
            sodium: NutrientPenalty {
                threshold: 1.5,
                base: 5.0,
                per_unit: 5.0,
                cap: 15.0,
            },
            calories: NutrientPenalty {
                threshold: 400.0,
                base: 3.0,
                per_unit: 0.05,
                cap: 10.0,
            },
            chemicals: ChemicalPenalty {
                low: 3.0,
                medium: 8.0,
                high: 15.0,
                cap: 25.0,
            },
            protein: NutrientBonus {
                threshold: 10.0,
                points: 15.0,
            },
            fiber: NutrientBonus {
                threshold: 8.0,
                points: 15.0,
            },
            auto_fail: AutoFailConfig {
                trans_fat_limit: 0.3,
                ceiling: 20.0,
            },
            disease_rules: vec![
                DiseaseRule::new(Nutrient::Sodium, 1.5, "Heart Disease Risk"),
                DiseaseRule::new(Nutrient::TransFat, 0.1, "Heart Disease Risk"),
                DiseaseRule::new(Nutrient::Sugars, 30.0, "Diabetes Risk"),
                DiseaseRule::new(Nutrient::AddedSugars, 25.0, "Diabetes Risk"),
                DiseaseRule::new(Nutrient::SaturatedFat, 10.0, "High Cholesterol Risk"),
                DiseaseRule::new(Nutrient::Calories, 400.0, "Obesity Risk"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn penalty_grows_with_excess_and_stops_at_cap() {
        let sugars = ScoringConfig::default().sugars;

        let mild = sugars.amount(32.0);
        let severe = sugars.amount(60.0);

        assert!(mild < severe);
        assert_eq!(sugars.amount(500.0), sugars.cap);
    }

    #[test]
    fn no_single_nutrient_can_zero_the_score() {
        let config = ScoringConfig::default();
        for penalty in [
            config.sugars,
            config.saturated_fat,
            config.trans_fat,
            config.sodium,
            config.calories,
        ] {
            assert!(penalty.cap < config.base_score);
        }
    }

    #[test]
    fn defaults_pass_validation() {
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn ceiling_above_twenty_is_rejected() {
        let mut config = ScoringConfig::default();
        config.auto_fail.ceiling = 90.0;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidScoringRules { reason }) if reason.contains("ceiling")
        ));
    }

    #[test]
    fn nutrient_cap_reaching_base_score_is_rejected() {
        let mut config = ScoringConfig::default();
        config.sodium.cap = config.base_score;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidScoringRules { reason }) if reason.starts_with("sodium.cap")
        ));
    }

    #[test]
    fn chemical_cap_reaching_the_ceiling_is_rejected() {
        let mut config = ScoringConfig::default();
        config.chemicals.cap = config.base_score - config.auto_fail.ceiling;

        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_or_non_finite_weights_are_rejected() {
        let mut config = ScoringConfig::default();
        config.protein.points = -5.0;
        assert!(config.validate().is_err());

        let mut config = ScoringConfig::default();
        config.sugars.per_unit = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_overrides_keep_defaults() {
        let config: ScoringConfig =
            serde_json::from_str(r#"{ "base_score": 60.0 }"#).expect("config parses");

        assert_eq!(config.base_score, 60.0);
        assert_eq!(config.auto_fail, ScoringConfig::default().auto_fail);
    }
}
