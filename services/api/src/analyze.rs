use crate::infra::build_analyzer;
use checktruth::config::AppConfig;
use checktruth::error::AppError;
use checktruth::hazards::RiskLevel;
use checktruth::product::{ProductReport, ProductSubmission};
use clap::Args;
use std::io::Read;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Product JSON file (barcode, product_name, ingredients_text, nutrients or nutriments). Use `-` for stdin.
    #[arg(long)]
    pub(crate) file: PathBuf,
    /// Print the report as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct HazardsArgs {
    /// Only list hazards at this risk level (low, medium, high)
    #[arg(long, value_parser = parse_risk_level)]
    pub(crate) risk: Option<RiskLevel>,
}

fn parse_risk_level(raw: &str) -> Result<RiskLevel, String> {
    raw.parse::<RiskLevel>()
        .map_err(|value| format!("unknown risk level '{value}' (expected low, medium or high)"))
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let AnalyzeArgs { file, json } = args;

    let config = AppConfig::load()?;
    let analyzer = build_analyzer(&config.data)?;

    let raw = if file.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(&file)?
    };
    let submission: ProductSubmission = serde_json::from_str(&raw)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;

    let report = analyzer.analyze(submission)?;

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Report payload unavailable: {err}"),
        }
    } else {
        render_report(&report);
    }

    Ok(())
}

pub(crate) fn run_hazards(args: HazardsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = config.data.hazard_store()?;

    let mut listed = 0;
    for entry in store
        .all()
        .filter(|entry| args.risk.map_or(true, |risk| entry.risk_level == risk))
    {
        listed += 1;
        let diseases = if entry.associated_diseases.is_empty() {
            "none".to_string()
        } else {
            entry
                .associated_diseases
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!("- {} [{}]", entry.name, entry.risk_level);
        println!("    cause: {}", entry.cause);
        println!("    avoid if: {}", entry.avoid_if);
        println!("    diseases: {}", diseases);
    }

    println!("\n{listed} of {} hazards listed", store.len());
    Ok(())
}

pub(crate) fn render_report(report: &ProductReport) {
    println!("Product: {}", report.product_name);
    if let Some(barcode) = &report.barcode {
        println!("Barcode: {barcode}");
    }

    println!(
        "\nHealth score: {}/100 {} {}",
        report.health_score, report.status_emoji, report.status_label
    );

    if report.ingredients.is_empty() {
        println!("\nIngredients: {}", report.ingredients_text);
    } else {
        println!("\nIngredients ({})", report.ingredients.len());
        for ingredient in &report.ingredients {
            println!("- {ingredient}");
        }
    }

    if report.flagged_chemicals.is_empty() {
        println!("\nFlagged ingredients: none");
    } else {
        println!("\nFlagged ingredients");
        for chemical in &report.flagged_chemicals {
            println!(
                "- {} [{}]: {} (avoid if: {})",
                chemical.matched, chemical.risk_level, chemical.cause, chemical.avoid_if
            );
        }
    }

    if report.disease_warnings.is_empty() {
        println!("\nDisease warnings: none");
    } else {
        println!("\nDisease warnings");
        for warning in &report.disease_warnings {
            println!("- {warning}");
        }
    }

    if !report.auto_fail.is_empty() {
        println!("\nAuto-fail");
        for reason in &report.auto_fail {
            println!("- {reason}");
        }
    }

    println!("\nScore components");
    if report.components.is_empty() {
        println!("- none (base score)");
    }
    for component in &report.components {
        println!(
            "- {:?}: {:+.1} ({})",
            component.rule, component.delta, component.notes
        );
    }
}
