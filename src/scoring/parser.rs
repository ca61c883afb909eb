use crate::error::{AnalysisError, Result};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;
use strum::Display;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([^()]*)\)").unwrap());

const DECORATION: &[char] = &['*', '.', ';', '\u{2020}', '\u{00B9}'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcentrationTier {
    #[strum(serialize = "above 1% line")]
    AboveLine,
    #[strum(serialize = "below 1% line")]
    BelowLine,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientToken {
    /// Cleaned original spelling, for display.
    pub display: String,
    /// Case-folded lookup key.
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedProduct {
    tokens: Vec<IngredientToken>,
    one_percent_index: Option<usize>,
}

impl ParsedProduct {
    pub fn tokens(&self) -> &[IngredientToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn one_percent_index(&self) -> Option<usize> {
        self.one_percent_index
    }

    pub fn marker(&self) -> Option<&IngredientToken> {
        self.one_percent_index.and_then(|i| self.tokens.get(i))
    }

    /// Without a marker every ingredient counts as above the line.
    pub fn tier(&self, index: usize) -> ConcentrationTier {
        match self.one_percent_index {
            Some(boundary) if index >= boundary => ConcentrationTier::BelowLine,
            _ => ConcentrationTier::AboveLine,
        }
    }

    pub fn above_line(&self) -> &[IngredientToken] {
        let end = self.one_percent_index.unwrap_or(self.tokens.len());
        &self.tokens[..end]
    }

    pub fn below_line(&self) -> &[IngredientToken] {
        let start = self.one_percent_index.unwrap_or(self.tokens.len());
        &self.tokens[start..]
    }

    pub fn names(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.name.as_str()).collect()
    }
}

/// Ingredient names that conventionally sit at or just below 1%.
#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    names: BTreeSet<String>,
}

impl MarkerSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| normalize_name(n.as_ref()))
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let names: Vec<String> =
            serde_json::from_str(json).map_err(|source| AnalysisError::Json {
                table: "markers.json".into(),
                source,
            })?;
        Ok(Self::new(names))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Like `contains`, but also tries the pieces of a parenthetical
    /// spelling such as `phenoxyethanol (preservative)`.
    pub fn matches(&self, name: &str) -> bool {
        self.contains(name) || name_variants(name).iter().any(|v| self.contains(v))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

pub fn clean_name(raw: &str) -> String {
    let collapsed = WHITESPACE.replace_all(raw, " ");
    collapsed
        .trim()
        .trim_matches(DECORATION)
        .trim()
        .to_string()
}

pub fn normalize_name(raw: &str) -> String {
    clean_name(raw).to_lowercase()
}

/// `water (aqua)` yields `water` and `aqua`.
pub fn name_variants(name: &str) -> Vec<String> {
    let mut variants = Vec::new();
    let stripped = normalize_name(&PARENTHETICAL.replace_all(name, " "));
    if !stripped.is_empty() && stripped != name {
        variants.push(stripped);
    }
    for cap in PARENTHETICAL.captures_iter(name) {
        let inner = normalize_name(&cap[1]);
        if !inner.is_empty() && !variants.contains(&inner) {
            variants.push(inner);
        }
    }
    variants
}

fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

pub fn parse_ingredients(text: &str, markers: &MarkerSet) -> Result<ParsedProduct> {
    parse_ingredients_with(text, |name| markers.matches(name))
}

/// Parses with a caller-supplied test for the 1% line marker, which receives
/// the normalized token name.
pub fn parse_ingredients_with<F>(text: &str, is_marker: F) -> Result<ParsedProduct>
where
    F: Fn(&str) -> bool,
{
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();

    for part in split_top_level(text) {
        let display = clean_name(part);
        if display.is_empty() {
            continue;
        }
        let name = display.to_lowercase();
        if seen.insert(name.clone()) {
            tokens.push(IngredientToken { display, name });
        }
    }

    if tokens.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let one_percent_index = tokens.iter().position(|t| is_marker(&t.name));
    if let Some(i) = one_percent_index {
        tracing::debug!("1% line at position {} ({})", i, tokens[i].display);
    }

    Ok(ParsedProduct {
        tokens,
        one_percent_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> MarkerSet {
        MarkerSet::new(["Phenoxyethanol", "Xanthan Gum"])
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Sodium   Hyaluronate "), "sodium hyaluronate");
        assert_eq!(normalize_name("Rosa Damascena Flower Oil*"), "rosa damascena flower oil");
        assert_eq!(normalize_name("Tocopherol."), "tocopherol");
        assert_eq!(normalize_name("Glycerin\n"), "glycerin");
    }

    #[test]
    fn test_parse_preserves_order_and_dedups() {
        let parsed =
            parse_ingredients("Water, Glycerin, water, Niacinamide, GLYCERIN", &markers()).unwrap();
        assert_eq!(parsed.names(), vec!["water", "glycerin", "niacinamide"]);
        assert_eq!(parsed.tokens()[0].display, "Water");
    }

    #[test]
    fn test_parse_ignores_commas_in_parentheses() {
        let parsed = parse_ingredients(
            "Water, Parfum (Fragrance, Limonene), Glycerin",
            &markers(),
        )
        .unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed.names()[1], "parfum (fragrance, limonene)");
    }

    #[test]
    fn test_parse_skips_empty_tokens() {
        let parsed = parse_ingredients("Water,, Glycerin, ,", &markers()).unwrap();
        assert_eq!(parsed.names(), vec!["water", "glycerin"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            parse_ingredients("", &markers()),
            Err(AnalysisError::EmptyInput)
        ));
        assert!(matches!(
            parse_ingredients(" , ,\n", &markers()),
            Err(AnalysisError::EmptyInput)
        ));
    }

    #[test]
    fn test_one_percent_line() {
        let parsed =
            parse_ingredients("Water, Glycerin, Phenoxyethanol, Fragrance", &markers()).unwrap();
        assert_eq!(parsed.one_percent_index(), Some(2));
        assert_eq!(parsed.marker().unwrap().name, "phenoxyethanol");
        assert_eq!(parsed.tier(0), ConcentrationTier::AboveLine);
        assert_eq!(parsed.tier(1), ConcentrationTier::AboveLine);
        assert_eq!(parsed.tier(2), ConcentrationTier::BelowLine);
        assert_eq!(parsed.tier(3), ConcentrationTier::BelowLine);
        assert_eq!(parsed.above_line().len(), 2);
        assert_eq!(parsed.below_line().len(), 2);
    }

    #[test]
    fn test_parenthetical_marker_sets_line() {
        let parsed = parse_ingredients(
            "Water, Glycerin, Phenoxyethanol (Preservative), Fragrance",
            &markers(),
        )
        .unwrap();
        assert_eq!(parsed.one_percent_index(), Some(2));
        assert_eq!(parsed.tier(3), ConcentrationTier::BelowLine);
    }

    #[test]
    fn test_first_marker_wins() {
        let parsed =
            parse_ingredients("Water, Xanthan Gum, Glycerin, Phenoxyethanol", &markers()).unwrap();
        assert_eq!(parsed.one_percent_index(), Some(1));
    }

    #[test]
    fn test_no_marker_means_equal_weight() {
        let parsed = parse_ingredients("Water, Glycerin, Fragrance", &markers()).unwrap();
        assert_eq!(parsed.one_percent_index(), None);
        assert!((0..parsed.len()).all(|i| parsed.tier(i) == ConcentrationTier::AboveLine));
        assert!(parsed.below_line().is_empty());
    }

    #[test]
    fn test_reordering_above_marker_keeps_partition() {
        let a = parse_ingredients("Water, Glycerin, Phenoxyethanol, Fragrance, Linalool", &markers())
            .unwrap();
        let b = parse_ingredients("Glycerin, Water, Phenoxyethanol, Linalool, Fragrance", &markers())
            .unwrap();

        let above = |p: &ParsedProduct| -> BTreeSet<String> {
            p.above_line().iter().map(|t| t.name.clone()).collect()
        };
        let below = |p: &ParsedProduct| -> BTreeSet<String> {
            p.below_line().iter().map(|t| t.name.clone()).collect()
        };
        assert_eq!(above(&a), above(&b));
        assert_eq!(below(&a), below(&b));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = "Aqua, Glycerin, Niacinamide, Phenoxyethanol, Parfum";
        assert_eq!(
            parse_ingredients(text, &markers()).unwrap(),
            parse_ingredients(text, &markers()).unwrap()
        );
    }

    #[test]
    fn test_name_variants() {
        assert_eq!(name_variants("water (aqua)"), vec!["water", "aqua"]);
        assert!(name_variants("glycerin").is_empty());
    }

    #[test]
    fn test_marker_set_from_json() {
        let set = MarkerSet::from_json(r#"["Phenoxyethanol", " Carbomer "]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("carbomer"));
        assert!(MarkerSet::from_json("{").is_err());
    }
}
