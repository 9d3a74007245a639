use std::fmt;

use serde::{Deserialize, Serialize};

use super::InvalidInputError;

/// Nutrient keys understood by the scoring rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Calories,
    Protein,
    Carbohydrates,
    Sugars,
    AddedSugars,
    Fiber,
    Fat,
    SaturatedFat,
    TransFat,
    Sodium,
}

impl Nutrient {
    pub const ALL: [Nutrient; 10] = [
        Nutrient::Calories,
        Nutrient::Protein,
        Nutrient::Carbohydrates,
        Nutrient::Sugars,
        Nutrient::AddedSugars,
        Nutrient::Fiber,
        Nutrient::Fat,
        Nutrient::SaturatedFat,
        Nutrient::TransFat,
        Nutrient::Sodium,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Protein => "protein",
            Nutrient::Carbohydrates => "carbohydrates",
            Nutrient::Sugars => "sugars",
            Nutrient::AddedSugars => "added sugars",
            Nutrient::Fiber => "fiber",
            Nutrient::Fat => "fat",
            Nutrient::SaturatedFat => "saturated fat",
            Nutrient::TransFat => "trans fat",
            Nutrient::Sodium => "sodium",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Nutrient::Calories => "kcal",
            _ => "g",
        }
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Nutrient values per 100 g/ml. `None` means the provider did not report the
/// value; such fields never trigger a rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutrientFacts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbohydrates: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugars: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_sugars: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturated_fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trans_fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
}

impl NutrientFacts {
    pub fn get(&self, nutrient: Nutrient) -> Option<f64> {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein,
            Nutrient::Carbohydrates => self.carbohydrates,
            Nutrient::Sugars => self.sugars,
            Nutrient::AddedSugars => self.added_sugars,
            Nutrient::Fiber => self.fiber,
            Nutrient::Fat => self.fat,
            Nutrient::SaturatedFat => self.saturated_fat,
            Nutrient::TransFat => self.trans_fat,
            Nutrient::Sodium => self.sodium,
        }
    }

    pub fn set(&mut self, nutrient: Nutrient, value: Option<f64>) {
        let slot = match nutrient {
            Nutrient::Calories => &mut self.calories,
            Nutrient::Protein => &mut self.protein,
            Nutrient::Carbohydrates => &mut self.carbohydrates,
            Nutrient::Sugars => &mut self.sugars,
            Nutrient::AddedSugars => &mut self.added_sugars,
            Nutrient::Fiber => &mut self.fiber,
            Nutrient::Fat => &mut self.fat,
            Nutrient::SaturatedFat => &mut self.saturated_fat,
            Nutrient::TransFat => &mut self.trans_fat,
            Nutrient::Sodium => &mut self.sodium,
        };
        *slot = value;
    }

    /// Value of `nutrient` when it is known and strictly above `threshold`.
    pub(crate) fn above(&self, nutrient: Nutrient, threshold: f64) -> Option<f64> {
        self.get(nutrient).filter(|value| *value > threshold)
    }

    pub fn validate(&self) -> Result<(), InvalidInputError> {
        for nutrient in Nutrient::ALL {
            let Some(value) = self.get(nutrient) else {
                continue;
            };
            if !value.is_finite() {
                return Err(InvalidInputError::NonFiniteNutrient { nutrient });
            }
            if value < 0.0 {
                return Err(InvalidInputError::NegativeNutrient { nutrient, value });
            }
        }
        Ok(())
    }
}
