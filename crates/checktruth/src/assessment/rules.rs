use serde::{Deserialize, Serialize};

use super::config::{NutrientBonus, NutrientPenalty, ScoringConfig};
use super::nutrients::{Nutrient, NutrientFacts};
use super::ScoreComponent;
use crate::hazards::RiskLevel;
use crate::matcher::FlaggedChemical;

/// Identifies the rule that produced a score component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    SugarPenalty,
    SaturatedFatPenalty,
    TransFatPenalty,
    SodiumPenalty,
    CaloriePenalty,
    ChemicalPenalty,
    ProteinBonus,
    FiberBonus,
    AutoFailCeiling,
}

/// Critical condition that caps the score regardless of other rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AutoFailReason {
    TransFat { grams: f64, limit: f64 },
    CriticalHazard { name: String },
}

impl AutoFailReason {
    pub fn summary(&self) -> String {
        match self {
            AutoFailReason::TransFat { grams, limit } => {
                format!("trans fat {grams:.2}g exceeds critical limit {limit:.2}g")
            }
            AutoFailReason::CriticalHazard { name } => {
                format!("high-risk ingredient '{name}' with known disease links")
            }
        }
    }
}

pub(crate) struct RuleInput<'a> {
    pub facts: &'a NutrientFacts,
    pub flagged: &'a [FlaggedChemical],
    pub config: &'a ScoringConfig,
}

/// A single (predicate, effect) pair: returns the component when the rule fires.
pub(crate) struct Rule {
    pub kind: RuleKind,
    pub evaluate: fn(RuleKind, &RuleInput<'_>) -> Option<ScoreComponent>,
}

/// Penalties, applied in this order, each independently.
pub(crate) const PENALTY_RULES: [Rule; 6] = [
    Rule {
        kind: RuleKind::SugarPenalty,
        evaluate: sugar_penalty,
    },
    Rule {
        kind: RuleKind::SaturatedFatPenalty,
        evaluate: saturated_fat_penalty,
    },
    Rule {
        kind: RuleKind::TransFatPenalty,
        evaluate: trans_fat_penalty,
    },
    Rule {
        kind: RuleKind::SodiumPenalty,
        evaluate: sodium_penalty,
    },
    Rule {
        kind: RuleKind::CaloriePenalty,
        evaluate: calorie_penalty,
    },
    Rule {
        kind: RuleKind::ChemicalPenalty,
        evaluate: chemical_penalty,
    },
];

/// Bonuses; skipped entirely when an auto-fail condition holds.
pub(crate) const BONUS_RULES: [Rule; 2] = [
    Rule {
        kind: RuleKind::ProteinBonus,
        evaluate: protein_bonus,
    },
    Rule {
        kind: RuleKind::FiberBonus,
        evaluate: fiber_bonus,
    },
];

fn nutrient_penalty(
    kind: RuleKind,
    facts: &NutrientFacts,
    nutrient: Nutrient,
    penalty: &NutrientPenalty,
) -> Option<ScoreComponent> {
    let value = facts.above(nutrient, penalty.threshold)?;
    let amount = penalty.amount(value);
    Some(ScoreComponent {
        rule: kind,
        delta: -amount,
        notes: format!(
            "{nutrient} {value:.2}{unit} above {threshold:.2}{unit}",
            unit = nutrient.unit(),
            threshold = penalty.threshold
        ),
    })
}

fn nutrient_bonus(
    kind: RuleKind,
    facts: &NutrientFacts,
    nutrient: Nutrient,
    bonus: &NutrientBonus,
) -> Option<ScoreComponent> {
    let value = facts.above(nutrient, bonus.threshold)?;
    Some(ScoreComponent {
        rule: kind,
        delta: bonus.points,
        notes: format!(
            "{nutrient} {value:.2}{unit} above {threshold:.2}{unit}",
            unit = nutrient.unit(),
            threshold = bonus.threshold
        ),
    })
}

fn sugar_penalty(kind: RuleKind, input: &RuleInput<'_>) -> Option<ScoreComponent> {
    nutrient_penalty(kind, input.facts, Nutrient::Sugars, &input.config.sugars)
}

fn saturated_fat_penalty(kind: RuleKind, input: &RuleInput<'_>) -> Option<ScoreComponent> {
    nutrient_penalty(
        kind,
        input.facts,
        Nutrient::SaturatedFat,
        &input.config.saturated_fat,
    )
}

fn trans_fat_penalty(kind: RuleKind, input: &RuleInput<'_>) -> Option<ScoreComponent> {
    nutrient_penalty(kind, input.facts, Nutrient::TransFat, &input.config.trans_fat)
}

fn sodium_penalty(kind: RuleKind, input: &RuleInput<'_>) -> Option<ScoreComponent> {
    nutrient_penalty(kind, input.facts, Nutrient::Sodium, &input.config.sodium)
}

fn calorie_penalty(kind: RuleKind, input: &RuleInput<'_>) -> Option<ScoreComponent> {
    nutrient_penalty(kind, input.facts, Nutrient::Calories, &input.config.calories)
}

fn chemical_penalty(kind: RuleKind, input: &RuleInput<'_>) -> Option<ScoreComponent> {
    if input.flagged.is_empty() {
        return None;
    }

    let weights = &input.config.chemicals;
    let raw: f64 = input
        .flagged
        .iter()
        .map(|chemical| match chemical.hazard.risk_level {
            RiskLevel::High => weights.high,
            RiskLevel::Medium => weights.medium,
            RiskLevel::Low => weights.low,
        })
        .sum();
    let amount = raw.min(weights.cap);

    let notes = if raw > weights.cap {
        format!(
            "{} flagged ingredient(s), penalty {raw:.0} capped at {:.0}",
            input.flagged.len(),
            weights.cap
        )
    } else {
        format!("{} flagged ingredient(s)", input.flagged.len())
    };

    Some(ScoreComponent {
        rule: kind,
        delta: -amount,
        notes,
    })
}

fn protein_bonus(kind: RuleKind, input: &RuleInput<'_>) -> Option<ScoreComponent> {
    nutrient_bonus(kind, input.facts, Nutrient::Protein, &input.config.protein)
}

fn fiber_bonus(kind: RuleKind, input: &RuleInput<'_>) -> Option<ScoreComponent> {
    nutrient_bonus(kind, input.facts, Nutrient::Fiber, &input.config.fiber)
}

/// Critical conditions, evaluated before bonuses so they can be skipped.
pub(crate) fn auto_fail_reasons(input: &RuleInput<'_>) -> Vec<AutoFailReason> {
    let settings = &input.config.auto_fail;
    let mut reasons = Vec::new();

    if let Some(grams) = input
        .facts
        .above(Nutrient::TransFat, settings.trans_fat_limit)
    {
        reasons.push(AutoFailReason::TransFat {
            grams,
            limit: settings.trans_fat_limit,
        });
    }

    reasons.extend(
        input
            .flagged
            .iter()
            .filter(|chemical| chemical.hazard.is_critical())
            .map(|chemical| AutoFailReason::CriticalHazard {
                name: chemical.hazard.name.clone(),
            }),
    );

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(facts: &'a NutrientFacts, config: &'a ScoringConfig) -> RuleInput<'a> {
        RuleInput {
            facts,
            flagged: &[],
            config,
        }
    }

    #[test]
    fn penalty_rules_run_in_declared_order() {
        let kinds: Vec<_> = PENALTY_RULES.iter().map(|rule| rule.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RuleKind::SugarPenalty,
                RuleKind::SaturatedFatPenalty,
                RuleKind::TransFatPenalty,
                RuleKind::SodiumPenalty,
                RuleKind::CaloriePenalty,
                RuleKind::ChemicalPenalty,
            ]
        );
    }

    #[test]
    fn threshold_values_do_not_fire() {
        let config = ScoringConfig::default();
        let facts = NutrientFacts {
            sugars: Some(30.0),
            sodium: Some(1.5),
            protein: Some(10.0),
            ..NutrientFacts::default()
        };
        let input = input(&facts, &config);

        assert!(sugar_penalty(RuleKind::SugarPenalty, &input).is_none());
        assert!(sodium_penalty(RuleKind::SodiumPenalty, &input).is_none());
        assert!(protein_bonus(RuleKind::ProteinBonus, &input).is_none());
    }

    #[test]
    fn trans_fat_auto_fail_only_above_limit() {
        let config = ScoringConfig::default();
        let mild = NutrientFacts {
            trans_fat: Some(0.2),
            ..NutrientFacts::default()
        };
        let severe = NutrientFacts {
            trans_fat: Some(0.5),
            ..NutrientFacts::default()
        };

        assert!(auto_fail_reasons(&input(&mild, &config)).is_empty());
        assert_eq!(
            auto_fail_reasons(&input(&severe, &config)),
            vec![AutoFailReason::TransFat {
                grams: 0.5,
                limit: 0.3
            }]
        );
    }
}
