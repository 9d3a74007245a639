use serde_json::{Map, Value};

use crate::assessment::{Nutrient, NutrientFacts};

const SALT_TO_SODIUM: f64 = 0.4;
const KJ_PER_KCAL: f64 = 4.184;

fn provider_key(nutrient: Nutrient) -> &'static str {
    match nutrient {
        Nutrient::Calories => "energy-kcal_100g",
        Nutrient::Protein => "proteins_100g",
        Nutrient::Carbohydrates => "carbohydrates_100g",
        Nutrient::Sugars => "sugars_100g",
        Nutrient::AddedSugars => "added-sugars_100g",
        Nutrient::Fiber => "fiber_100g",
        Nutrient::Fat => "fat_100g",
        Nutrient::SaturatedFat => "saturated-fat_100g",
        Nutrient::TransFat => "trans-fat_100g",
        Nutrient::Sodium => "sodium_100g",
    }
}

fn numeric(map: &Map<String, Value>, key: &str) -> Option<f64> {
    match map.get(key)? {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }
}

impl NutrientFacts {
    /// Map an Open Food Facts style `nutriments` object onto per-100g facts.
    ///
    /// Sodium falls back to `salt_100g * 0.4` and calories to `energy_100g`
    /// (kJ) when the direct keys are absent. Values that are neither numbers
    /// nor numeric strings are treated as unknown.
    pub fn from_nutriments(map: &Map<String, Value>) -> Self {
        let mut facts = NutrientFacts::default();
        for nutrient in Nutrient::ALL {
            facts.set(nutrient, numeric(map, provider_key(nutrient)));
        }

        if facts.sodium.is_none() {
            facts.sodium = numeric(map, "salt_100g").map(|salt| salt * SALT_TO_SODIUM);
        }
        if facts.calories.is_none() {
            facts.calories = numeric(map, "energy_100g").map(|kj| kj / KJ_PER_KCAL);
        }

        facts
    }

    /// Fill fields that are unknown here with the values known in `other`.
    pub fn or(self, other: &NutrientFacts) -> Self {
        let mut merged = self;
        for nutrient in Nutrient::ALL {
            if merged.get(nutrient).is_none() {
                merged.set(nutrient, other.get(nutrient));
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn maps_provider_keys() {
        let facts = NutrientFacts::from_nutriments(&map(json!({
            "sugars_100g": 41.2,
            "saturated-fat_100g": "3.5",
            "proteins_100g": 7,
            "energy-kcal_100g": 512,
        })));

        assert_eq!(facts.sugars, Some(41.2));
        assert_eq!(facts.saturated_fat, Some(3.5));
        assert_eq!(facts.protein, Some(7.0));
        assert_eq!(facts.calories, Some(512.0));
        assert_eq!(facts.fiber, None);
    }

    #[test]
    fn sodium_falls_back_to_salt() {
        let facts = NutrientFacts::from_nutriments(&map(json!({ "salt_100g": 5.0 })));
        assert_eq!(facts.sodium, Some(2.0));
    }

    #[test]
    fn direct_sodium_wins_over_salt() {
        let facts = NutrientFacts::from_nutriments(&map(json!({
            "salt_100g": 5.0,
            "sodium_100g": 1.1,
        })));
        assert_eq!(facts.sodium, Some(1.1));
    }

    #[test]
    fn non_numeric_values_are_unknown() {
        let facts = NutrientFacts::from_nutriments(&map(json!({
            "sugars_100g": "traces",
            "fiber_100g": null,
        })));
        assert_eq!(facts.sugars, None);
        assert_eq!(facts.fiber, None);
    }

    #[test]
    fn merge_keeps_explicit_values() {
        let explicit = NutrientFacts {
            sugars: Some(10.0),
            ..NutrientFacts::default()
        };
        let provider = NutrientFacts {
            sugars: Some(50.0),
            sodium: Some(0.3),
            ..NutrientFacts::default()
        };

        let merged = explicit.or(&provider);

        assert_eq!(merged.sugars, Some(10.0));
        assert_eq!(merged.sodium, Some(0.3));
    }
}
