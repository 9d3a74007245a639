use std::collections::BTreeSet;

use super::config::DiseaseRule;
use super::nutrients::NutrientFacts;
use crate::matcher::FlaggedChemical;

/// Union of nutrient-implied diseases and every flagged hazard's diseases.
pub(crate) fn derive_disease_warnings(
    facts: &NutrientFacts,
    flagged: &[FlaggedChemical],
    rules: &[DiseaseRule],
) -> BTreeSet<String> {
    let from_nutrients = rules
        .iter()
        .filter(|rule| facts.above(rule.nutrient, rule.threshold).is_some())
        .map(|rule| rule.disease.clone());

    let from_hazards = flagged
        .iter()
        .flat_map(|chemical| chemical.hazard.associated_diseases.iter().cloned());

    from_nutrients.chain(from_hazards).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::ScoringConfig;

    #[test]
    fn unknown_nutrients_raise_nothing() {
        let rules = ScoringConfig::default().disease_rules;
        assert!(derive_disease_warnings(&NutrientFacts::default(), &[], &rules).is_empty());
    }

    #[test]
    fn sodium_and_trans_fat_share_one_heart_warning() {
        let rules = ScoringConfig::default().disease_rules;
        let facts = NutrientFacts {
            sodium: Some(2.0),
            trans_fat: Some(0.2),
            ..NutrientFacts::default()
        };

        let warnings = derive_disease_warnings(&facts, &[], &rules);

        assert_eq!(
            warnings.into_iter().collect::<Vec<_>>(),
            vec!["Heart Disease Risk".to_string()]
        );
    }
}
