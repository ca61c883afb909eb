use super::score::ScoreResult;
use crate::catalog::{Catalog, SkinType};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutinePlacement {
    pub routine_id: String,
    pub routine: String,
    pub step: String,
    pub profile_id: String,
    pub profile: String,
}

impl fmt::Display for RoutinePlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} ({})", self.routine, self.step, self.profile)
    }
}

/// Every function contributed by a matched ingredient.
pub fn product_functions(result: &ScoreResult) -> BTreeSet<String> {
    result
        .matched
        .iter()
        .flat_map(|m| m.functions.iter().cloned())
        .collect()
}

pub fn find_placements(
    result: &ScoreResult,
    skin: &SkinType,
    catalog: &Catalog,
) -> Vec<RoutinePlacement> {
    let functions = product_functions(result);
    if functions.is_empty() {
        return Vec::new();
    }
    let functions = &functions;

    catalog
        .routines()
        .iter()
        .filter(|routine| routine.applies_to(&skin.id))
        .flat_map(|routine| {
            routine.steps.iter().filter_map(move |step| {
                let profile = catalog.profile(&step.profile)?;
                profile.matches(functions).then(|| RoutinePlacement {
                    routine_id: routine.id.clone(),
                    routine: routine.name.clone(),
                    step: step.step.clone(),
                    profile_id: profile.id.clone(),
                    profile: profile.name.clone(),
                })
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixture;
    use crate::scoring::parser::parse_ingredients;
    use crate::scoring::score::score_product;

    fn placements(text: &str, skin: &str) -> Vec<String> {
        let catalog = fixture();
        let parsed = parse_ingredients(text, catalog.markers()).unwrap();
        let result = score_product(&parsed, skin, &catalog).unwrap();
        let skin = catalog.skin_type(skin).unwrap();
        find_placements(&result, skin, &catalog)
            .iter()
            .map(|p| p.to_string())
            .collect()
    }

    #[test]
    fn test_hydrating_serum_placements() {
        let found = placements(
            "Water, Glycerin, Sodium Hyaluronate, Panthenol, Phenoxyethanol",
            "dry-sensitive",
        );
        assert_eq!(
            found,
            vec![
                "Comfort Routine / Treat (Soothing Treatment)",
                "Comfort Routine / Hydrate (Hydrating Serum)",
                "Glow Routine / Hydrate (Hydrating Serum)",
            ]
        );
    }

    #[test]
    fn test_routines_filtered_by_skin_type() {
        let found = placements("Water, Salicylic Acid, Glycerin", "oily-acne");
        assert!(found.contains(&"Clear Skin Routine / Tone (Exfoliating Toner)".to_string()));
        assert!(!found.iter().any(|p| p.starts_with("Comfort Routine")));
    }

    #[test]
    fn test_excluded_functions_block_placement() {
        let found = placements("Water, Panthenol, Fragrance", "dry-sensitive");
        assert!(!found.iter().any(|p| p.contains("Soothing Treatment")));
        assert!(found.iter().any(|p| p.contains("Hydrating Serum")));
    }

    #[test]
    fn test_no_matches_for_unknowns() {
        assert!(placements("Moon Dust", "dry-sensitive").is_empty());
    }
}
