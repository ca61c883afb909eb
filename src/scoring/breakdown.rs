use super::parser::ParsedProduct;
use super::score::ScoreResult;
use crate::catalog::ScoringConfig;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use strum::Display;

/// Name fragments that hint at a function when an ingredient is not in the
/// database. Hints only classify; they never feed the score.
pub struct HeuristicHint {
    pub fragments: &'static [&'static str],
    /// The hint is skipped when any of these also appears in the name.
    pub unless: &'static [&'static str],
    pub functions: &'static [&'static str],
}

pub const HEURISTIC_HINTS: &[HeuristicHint] = &[
    HeuristicHint {
        fragments: &["extract"],
        unless: &[],
        functions: &["Antioxidant", "Soothing"],
    },
    HeuristicHint {
        fragments: &["ferment", "lactobacillus"],
        unless: &[],
        functions: &["Soothing", "Hydration"],
    },
    HeuristicHint {
        fragments: &["water"],
        unless: &["aqua"],
        functions: &["Soothing", "Hydration"],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactClass {
    #[strum(serialize = "Positive Impact")]
    PositiveImpact,
    #[strum(serialize = "Neutral/Functional")]
    NeutralFunctional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionSource {
    #[strum(serialize = "database")]
    Database,
    #[strum(serialize = "heuristic")]
    Heuristic,
    #[strum(serialize = "none")]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedIngredient {
    pub name: String,
    pub functions: Vec<String>,
    pub class: ImpactClass,
    pub source: FunctionSource,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormulaBreakdown {
    pub positive_impact: Vec<String>,
    pub neutral_functional: Vec<String>,
    pub ingredients: Vec<ClassifiedIngredient>,
}

pub fn heuristic_functions(name: &str) -> BTreeSet<String> {
    let name = name.to_lowercase();
    HEURISTIC_HINTS
        .iter()
        .filter(|hint| {
            hint.fragments.iter().any(|f| name.contains(f))
                && !hint.unless.iter().any(|f| name.contains(f))
        })
        .flat_map(|hint| hint.functions.iter().map(|f| f.to_string()))
        .collect()
}

fn classify(functions: &[String], config: &ScoringConfig) -> ImpactClass {
    if functions.iter().any(|f| config.is_positive(f)) {
        ImpactClass::PositiveImpact
    } else {
        ImpactClass::NeutralFunctional
    }
}

/// Splits the formula into positive-impact and neutral/functional ingredients,
/// in INCI order.
pub fn build_breakdown(
    parsed: &ParsedProduct,
    result: &ScoreResult,
    config: &ScoringConfig,
) -> FormulaBreakdown {
    let by_token: HashMap<&str, &[String]> = result
        .matched
        .iter()
        .map(|m| (m.name.as_str(), m.functions.as_slice()))
        .collect();
    let by_ingredient: HashMap<&str, &[String]> = result
        .matched
        .iter()
        .map(|m| (m.matched.as_str(), m.functions.as_slice()))
        .collect();
    let duplicates: HashMap<&str, &str> = result
        .duplicates
        .iter()
        .map(|d| (d.name.as_str(), d.matched.as_str()))
        .collect();

    let mut breakdown = FormulaBreakdown::default();

    for token in parsed.tokens() {
        let known = by_token.get(token.display.as_str()).or_else(|| {
            duplicates
                .get(token.display.as_str())
                .and_then(|matched| by_ingredient.get(matched))
        });
        let (functions, source) = match known {
            Some(functions) => (functions.to_vec(), FunctionSource::Database),
            None => {
                let hints: Vec<String> = heuristic_functions(&token.name).into_iter().collect();
                if hints.is_empty() {
                    (hints, FunctionSource::Unknown)
                } else {
                    (hints, FunctionSource::Heuristic)
                }
            }
        };

        let class = classify(&functions, config);
        match class {
            ImpactClass::PositiveImpact => breakdown.positive_impact.push(token.display.clone()),
            ImpactClass::NeutralFunctional => {
                breakdown.neutral_functional.push(token.display.clone())
            }
        }
        breakdown.ingredients.push(ClassifiedIngredient {
            name: token.display.clone(),
            functions,
            class,
            source,
        });
    }

    breakdown
}
