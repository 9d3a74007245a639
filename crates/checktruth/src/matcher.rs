//! Chemical matcher: finds hazard entries mentioned in a free-text
//! ingredients list.
//!
//! Matching is a case-insensitive substring search, not a whole-word one, so
//! compound or branded ingredient names still match ("red 40 lake" flags
//! "red 40").

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::hazards::{HazardEntry, HazardStore};

/// A hazard entry found in a specific product's ingredient text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedChemical {
    pub hazard: Arc<HazardEntry>,
    pub matched_substring: String,
    /// Byte offset of the first match within the lowercased ingredients text.
    pub position: usize,
}

impl FlaggedChemical {
    pub fn name(&self) -> &str {
        &self.hazard.name
    }
}

/// Split ingredients text on commas, trimming and dropping empty segments.
pub fn ingredient_list(ingredients_text: &str) -> Vec<String> {
    ingredients_text
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Report every hazard named in `ingredients_text` once, in order of first
/// appearance.
pub fn match_hazards(ingredients_text: Option<&str>, store: &HazardStore) -> Vec<FlaggedChemical> {
    let Some(text) = ingredients_text.filter(|text| !text.trim().is_empty()) else {
        return Vec::new();
    };

    let lowered = text.to_lowercase();
    // Offsets into `lowered` only map back onto `text` when lowercasing kept
    // every byte in place.
    let aligned = lowered.len() == text.len();

    let mut flagged: Vec<FlaggedChemical> = store
        .all()
        .filter(|hazard| !hazard.name.is_empty())
        .filter_map(|hazard| {
            let position = lowered.find(hazard.name.as_str())?;
            let end = position + hazard.name.len();
            let matched_substring = if aligned
                && text.is_char_boundary(position)
                && text.is_char_boundary(end)
            {
                text[position..end].to_string()
            } else {
                lowered[position..end].to_string()
            };

            Some(FlaggedChemical {
                hazard: Arc::clone(hazard),
                matched_substring,
                position,
            })
        })
        .collect();

    flagged.sort_by(|left, right| {
        left.position
            .cmp(&right.position)
            .then_with(|| right.hazard.name.len().cmp(&left.hazard.name.len()))
            .then_with(|| left.hazard.name.cmp(&right.hazard.name))
    });

    flagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hazards::RiskLevel;
    use std::collections::BTreeSet;

    fn hazard(name: &str) -> HazardEntry {
        HazardEntry {
            name: name.to_string(),
            risk_level: RiskLevel::Medium,
            cause: "cause".to_string(),
            avoid_if: "avoid".to_string(),
            associated_diseases: BTreeSet::new(),
        }
    }

    fn store(names: &[&str]) -> HazardStore {
        HazardStore::from_entries(names.iter().map(|name| hazard(name))).expect("store builds")
    }

    #[test]
    fn ingredient_list_trims_and_drops_empty_segments() {
        assert_eq!(
            ingredient_list(" Sugar ,, Red 40 ,Salt, "),
            vec!["Sugar", "Red 40", "Salt"]
        );
        assert!(ingredient_list("").is_empty());
    }

    #[test]
    fn missing_or_blank_text_yields_nothing() {
        let store = store(&["red 40"]);
        assert!(match_hazards(None, &store).is_empty());
        assert!(match_hazards(Some("   "), &store).is_empty());
    }

    #[test]
    fn matches_case_insensitively_and_keeps_original_spelling() {
        let store = store(&["red 40"]);

        let flagged = match_hazards(Some("Sugar, RED 40, Salt"), &store);

        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].name(), "red 40");
        assert_eq!(flagged[0].matched_substring, "RED 40");
        assert_eq!(flagged[0].position, 7);
    }

    #[test]
    fn substring_matches_inside_compound_names() {
        let store = store(&["red 40"]);
        let flagged = match_hazards(Some("colour (red 40 lake)"), &store);
        assert_eq!(flagged.len(), 1);
    }

    #[test]
    fn each_hazard_reported_once_in_order_of_appearance() {
        let store = store(&["aspartame", "yellow 5", "bht"]);

        let flagged = match_hazards(
            Some("water, yellow 5, bht, aspartame, yellow 5, bht"),
            &store,
        );

        let names: Vec<_> = flagged.iter().map(FlaggedChemical::name).collect();
        assert_eq!(names, vec!["yellow 5", "bht", "aspartame"]);
    }

    #[test]
    fn longer_name_wins_a_shared_start() {
        let store = store(&["sodium", "sodium benzoate"]);

        let flagged = match_hazards(Some("sodium benzoate"), &store);

        let names: Vec<_> = flagged.iter().map(FlaggedChemical::name).collect();
        assert_eq!(names, vec!["sodium benzoate", "sodium"]);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let store = store(&["bha", "bht"]);
        let text = Some("bht, flour, bha");
        assert_eq!(match_hazards(text, &store), match_hazards(text, &store));
    }
}
