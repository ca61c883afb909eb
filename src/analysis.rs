use crate::catalog::Catalog;
use crate::error::Result;
use crate::scoring::{
    build_breakdown, find_placements, generate_narrative, score_product,
    FormulaBreakdown, ParsedProduct, RoutinePlacement, ScoreResult,
};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct AnalysisRequest<'a> {
    pub product_name: &'a str,
    pub ingredients: &'a str,
    pub skin_type: &'a str,
    pub template_set: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub product_name: String,
    pub skin_type: String,
    pub skin_type_name: String,
    pub parsed: ParsedProduct,
    pub score: ScoreResult,
    pub breakdown: FormulaBreakdown,
    pub placements: Vec<RoutinePlacement>,
    pub narrative: String,
}

pub fn run_full_analysis(request: &AnalysisRequest<'_>, catalog: &Catalog) -> Result<Analysis> {
    let skin = catalog.skin_type(request.skin_type)?;
    let parsed = catalog.parse(request.ingredients)?;
    let score = score_product(&parsed, &skin.id, catalog)?;
    let breakdown = build_breakdown(&parsed, &score, catalog.scoring());
    let placements = find_placements(&score, skin, catalog);
    let narrative = generate_narrative(
        &score,
        skin,
        request.product_name,
        request.template_set,
        catalog,
    )?;

    tracing::debug!(
        "{} scored {:.2} for {} ({} matched, {} unmatched)",
        request.product_name,
        score.score,
        skin.id,
        score.matched.len(),
        score.unmatched.len()
    );

    Ok(Analysis {
        product_name: request.product_name.to_string(),
        skin_type: skin.id.clone(),
        skin_type_name: skin.name.clone(),
        parsed,
        score,
        breakdown,
        placements,
        narrative,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixture;
    use crate::error::AnalysisError;

    fn request<'a>(ingredients: &'a str, skin_type: &'a str) -> AnalysisRequest<'a> {
        AnalysisRequest {
            product_name: "Test Serum",
            ingredients,
            skin_type,
            template_set: "default",
        }
    }

    #[test]
    fn test_full_analysis() {
        let catalog = fixture();
        let analysis = run_full_analysis(
            &request("Water, Glycerin, Panthenol, Phenoxyethanol, Fragrance", "1"),
            &catalog,
        )
        .unwrap();

        assert_eq!(analysis.skin_type, "dry-sensitive");
        assert_eq!(analysis.skin_type_name, "Dry & Sensitive");
        assert_eq!(analysis.parsed.len(), 5);
        assert!(analysis.narrative.starts_with("Test Serum is a"));
        assert!(!analysis.placements.is_empty());
        assert!(analysis.breakdown.positive_impact.contains(&"Glycerin".to_string()));
    }

    #[test]
    fn test_misspelled_marker_keeps_reference_score() {
        let catalog = fixture();
        for text in [
            "Water, Glycerin, Phenoxyethenol, Fragrance",
            "Water, Glycerin, Phenoxyethanol (Preservative), Fragrance",
        ] {
            let analysis = run_full_analysis(&request(text, "dry-sensitive"), &catalog).unwrap();
            assert!((analysis.score.score - 100.0 / 3.0).abs() < 1e-9, "{text}");
            assert_eq!(analysis.score.above_line_count, 2);
        }
    }

    #[test]
    fn test_invalid_skin_type_checked_first() {
        let catalog = fixture();
        assert!(matches!(
            run_full_analysis(&request("", "37"), &catalog),
            Err(AnalysisError::InvalidSkinType(_))
        ));
    }

    #[test]
    fn test_empty_input() {
        let catalog = fixture();
        let err = run_full_analysis(&request("  ,  ", "dry-sensitive"), &catalog).unwrap_err();
        assert_eq!(err.to_string(), "cannot score empty list");
    }

    #[test]
    fn test_analysis_serializes() {
        let catalog = fixture();
        let analysis =
            run_full_analysis(&request("Glycerin, Moon Dust", "oily-acne"), &catalog).unwrap();
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["score"]["unmatched"][0], "Moon Dust");
        assert_eq!(json["score"]["matched"][0]["tier"], "above_line");
        assert_eq!(json["score"]["normalization"], "weighted_sum");
    }
}
