//! Caller-side composition: normalizes provider payloads, runs the matcher
//! and the engine, and assembles the final [`ProductReport`].

mod nutriments;
mod report;

pub use report::{FlaggedChemicalView, ProductReport};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::assessment::{AssessmentEngine, AssessmentResult, InvalidInputError, NutrientFacts};
use crate::hazards::HazardRegistry;
use crate::matcher::{ingredient_list, match_hazards};

const UNKNOWN_PRODUCT: &str = "N/A";
const NO_INGREDIENTS: &str = "No ingredients listed.";

/// Product data already fetched by the caller from a product-data provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductSubmission {
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub ingredients_text: Option<String>,
    /// Normalized facts; take precedence over `nutriments` field by field.
    #[serde(default)]
    pub nutrients: Option<NutrientFacts>,
    /// Raw Open Food Facts style `nutriments` object.
    #[serde(default)]
    pub nutriments: Option<Map<String, Value>>,
}

impl ProductSubmission {
    pub fn nutrient_facts(&self) -> NutrientFacts {
        let provider = self
            .nutriments
            .as_ref()
            .map(NutrientFacts::from_nutriments)
            .unwrap_or_default();
        self.nutrients.unwrap_or_default().or(&provider)
    }
}

/// Matcher and engine bound to the process-wide hazard registry.
pub struct ProductAnalyzer {
    registry: Arc<HazardRegistry>,
    engine: AssessmentEngine,
}

impl ProductAnalyzer {
    pub fn new(registry: Arc<HazardRegistry>, engine: AssessmentEngine) -> Self {
        Self { registry, engine }
    }

    pub fn registry(&self) -> &Arc<HazardRegistry> {
        &self.registry
    }

    pub fn assess(
        &self,
        ingredients_text: Option<&str>,
        facts: &NutrientFacts,
    ) -> Result<AssessmentResult, InvalidInputError> {
        let store = self.registry.current();
        let flagged = match_hazards(ingredients_text, &store);
        self.engine.assess(facts, &flagged)
    }

    pub fn analyze(&self, submission: ProductSubmission) -> Result<ProductReport, InvalidInputError> {
        let facts = submission.nutrient_facts();
        let result = self.assess(submission.ingredients_text.as_deref(), &facts)?;

        let ingredients = submission
            .ingredients_text
            .as_deref()
            .map(ingredient_list)
            .unwrap_or_default();

        info!(
            barcode = submission.barcode.as_deref().unwrap_or("-"),
            score = result.score,
            status = result.status.label(),
            flagged = result.flagged_chemicals.len(),
            "product analyzed"
        );

        Ok(ProductReport::assemble(
            submission.barcode,
            submission
                .product_name
                .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string()),
            submission
                .ingredients_text
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| NO_INGREDIENTS.to_string()),
            ingredients,
            result,
        ))
    }
}
