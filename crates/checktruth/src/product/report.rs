use serde::{Deserialize, Serialize};

use crate::assessment::{AssessmentResult, ScoreComponent, StatusLabel};
use crate::hazards::RiskLevel;
use crate::matcher::FlaggedChemical;

/// Flattened flagged-ingredient row for API and CLI output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedChemicalView {
    pub name: String,
    pub matched: String,
    pub risk_level: RiskLevel,
    pub cause: String,
    pub avoid_if: String,
    pub associated_diseases: Vec<String>,
}

impl From<&FlaggedChemical> for FlaggedChemicalView {
    fn from(chemical: &FlaggedChemical) -> Self {
        Self {
            name: chemical.hazard.name.clone(),
            matched: chemical.matched_substring.clone(),
            risk_level: chemical.hazard.risk_level,
            cause: chemical.hazard.cause.clone(),
            avoid_if: chemical.hazard.avoid_if.clone(),
            associated_diseases: chemical.hazard.associated_diseases.iter().cloned().collect(),
        }
    }
}

/// Final response assembled for a single product.
///
/// `flagged_chemicals` is ordered by first appearance in the ingredients
/// text; the byte offsets themselves are not exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    pub product_name: String,
    pub ingredients_text: String,
    pub ingredients: Vec<String>,
    pub flagged_chemicals: Vec<FlaggedChemicalView>,
    pub health_score: u8,
    pub status_label: StatusLabel,
    pub status_emoji: String,
    pub status_color: String,
    pub disease_warnings: Vec<String>,
    pub auto_fail: Vec<String>,
    pub components: Vec<ScoreComponent>,
}

impl ProductReport {
    pub(crate) fn assemble(
        barcode: Option<String>,
        product_name: String,
        ingredients_text: String,
        ingredients: Vec<String>,
        result: AssessmentResult,
    ) -> Self {
        Self {
            barcode,
            product_name,
            ingredients_text,
            ingredients,
            flagged_chemicals: result
                .flagged_chemicals
                .iter()
                .map(FlaggedChemicalView::from)
                .collect(),
            health_score: result.score,
            status_label: result.status,
            status_emoji: result.status.emoji().to_string(),
            status_color: result.status.color().to_string(),
            disease_warnings: result.disease_warnings.into_iter().collect(),
            auto_fail: result.auto_fail.iter().map(|reason| reason.summary()).collect(),
            components: result.components,
        }
    }
}
