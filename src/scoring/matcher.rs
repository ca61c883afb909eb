use super::parser::name_variants;
use crate::catalog::{Catalog, Ingredient};
use serde::Serialize;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    #[strum(serialize = "exact")]
    Exact,
    #[strum(serialize = "alias")]
    Alias,
    #[strum(serialize = "fuzzy")]
    Fuzzy,
}

#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    pub ingredient: &'a Ingredient,
    pub kind: MatchKind,
    pub similarity: f64,
}

/// Resolves a normalized token against the catalog.
///
/// Exact INCI name first, then aliases, then the pieces of a parenthetical
/// spelling (`water (aqua)`), and finally a fuzzy fallback when the scoring
/// config enables one.
pub fn resolve<'a>(name: &str, catalog: &'a Catalog) -> Option<Resolution<'a>> {
    if let Some(ingredient) = catalog.ingredient(name) {
        return Some(Resolution {
            ingredient,
            kind: MatchKind::Exact,
            similarity: 1.0,
        });
    }

    let alias = std::iter::once(name.to_string())
        .chain(name_variants(name))
        .find_map(|candidate| {
            catalog
                .ingredient(&candidate)
                .or_else(|| catalog.ingredient_by_alias(&candidate))
        });
    if let Some(ingredient) = alias {
        return Some(Resolution {
            ingredient,
            kind: MatchKind::Alias,
            similarity: 1.0,
        });
    }

    let threshold = catalog.scoring().fuzzy_threshold?;
    let best = fuzzy_best(name, catalog)?;
    if best.similarity >= threshold {
        tracing::debug!(
            "fuzzy matched '{}' to {} ({:.2})",
            name,
            best.ingredient.name,
            best.similarity
        );
        Some(best)
    } else {
        None
    }
}

fn fuzzy_best<'a>(name: &str, catalog: &'a Catalog) -> Option<Resolution<'a>> {
    let mut best: Option<Resolution<'a>> = None;

    for ingredient in catalog.ingredients() {
        let score = std::iter::once(&ingredient.key)
            .chain(ingredient.aliases.iter())
            .map(|candidate| similarity(name, candidate))
            .fold(0.0, f64::max);

        // Ties go to the alphabetically first name.
        let better = best.as_ref().map_or(true, |b| {
            score > b.similarity || (score == b.similarity && ingredient.name < b.ingredient.name)
        });
        if better {
            best = Some(Resolution {
                ingredient,
                kind: MatchKind::Fuzzy,
                similarity: score,
            });
        }
    }

    best
}

/// Normalized edit-distance similarity in [0, 1].
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let distance = levenshtein_distance(a, b);
    let max_len = a.chars().count().max(b.chars().count());

    1.0 - (distance as f64 / max_len as f64)
}

fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{fixture, TableSources};
    use std::path::Path;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
        assert_eq!(levenshtein_distance("abc", "abd"), 1);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_similarity() {
        assert_eq!(similarity("glycerin", "glycerin"), 1.0);
        assert_eq!(similarity("", "glycerin"), 0.0);
        assert!(similarity("glycerine", "glycerin") > 0.85);
        assert!(similarity("water", "glycerin") < 0.5);
    }

    #[test]
    fn test_resolve_exact_and_alias() {
        let catalog = fixture();

        let exact = resolve("glycerin", &catalog).unwrap();
        assert_eq!(exact.kind, MatchKind::Exact);

        let alias = resolve("aqua", &catalog).unwrap();
        assert_eq!(alias.kind, MatchKind::Alias);
        assert_eq!(alias.ingredient.name, "Water");

        let variant = resolve("water (aqua)", &catalog).unwrap();
        assert_eq!(variant.kind, MatchKind::Alias);
        assert_eq!(variant.ingredient.name, "Water");
    }

    #[test]
    fn test_resolve_fuzzy() {
        let catalog = fixture();
        let fuzzy = resolve("niacinamid", &catalog).unwrap();
        assert_eq!(fuzzy.kind, MatchKind::Fuzzy);
        assert_eq!(fuzzy.ingredient.name, "Niacinamide");
        assert!(fuzzy.similarity >= 0.85);
    }

    #[test]
    fn test_null_threshold_disables_fuzzy() {
        let mut src =
            TableSources::read_dir(&Path::new(env!("CARGO_MANIFEST_DIR")).join("data")).unwrap();
        src.scoring = src
            .scoring
            .replace("\"fuzzy_threshold\": 0.85", "\"fuzzy_threshold\": null");
        let catalog = Catalog::from_sources(&src).unwrap();

        assert_eq!(catalog.scoring().fuzzy_threshold, None);
        assert!(resolve("niacinamid", &catalog).is_none());
        assert_eq!(resolve("niacinamide", &catalog).unwrap().kind, MatchKind::Exact);
    }

    #[test]
    fn test_resolve_unknown() {
        let catalog = fixture();
        assert!(resolve("unobtainium", &catalog).is_none());
        assert!(resolve("rosa damascena flower water", &catalog).is_none());
    }
}
