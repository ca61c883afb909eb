use super::matcher::{resolve, MatchKind};
use super::parser::{ConcentrationTier, ParsedProduct};
use crate::catalog::{Catalog, Normalization, Preference, ScoringConfig};
use crate::error::{AnalysisError, Result};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedIngredient {
    pub name: String,
    pub matched: String,
    pub kind: MatchKind,
    pub similarity: f64,
    pub tier: ConcentrationTier,
    pub functions: Vec<String>,
    pub contribution: f64,
}

/// A token that resolved to an ingredient already scored earlier in the list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateIngredient {
    pub name: String,
    pub matched: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub skin_type: String,
    /// Percentage in [0, 100].
    pub score: f64,
    pub normalization: Normalization,
    pub contributions: BTreeMap<String, f64>,
    pub matched: Vec<MatchedIngredient>,
    pub unmatched: Vec<String>,
    pub duplicates: Vec<DuplicateIngredient>,
    pub no_matched_data: bool,
    pub line_marker: Option<String>,
    pub above_line_count: usize,
}

impl ScoreResult {
    pub fn matched_names(&self) -> Vec<&str> {
        self.matched.iter().map(|m| m.matched.as_str()).collect()
    }

    /// Positive contributors, strongest first, ties by name.
    pub fn top_functions(&self, limit: usize) -> Vec<(&str, f64)> {
        let mut top: Vec<(&str, f64)> = self
            .contributions
            .iter()
            .filter(|(_, v)| **v > 0.0)
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        top.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then(a.0.cmp(b.0)));
        top.truncate(limit);
        top
    }

    pub fn detracting_functions(&self) -> Vec<(&str, f64)> {
        let mut worst: Vec<(&str, f64)> = self
            .contributions
            .iter()
            .filter(|(_, v)| **v < 0.0)
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        worst.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal).then(a.0.cmp(b.0)));
        worst
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    weight: f64,
    raw: f64,
    max: f64,
    min: f64,
}

impl Tally {
    fn span(&self) -> f64 {
        self.max - self.min
    }
}

pub fn score_product(
    parsed: &ParsedProduct,
    skin_type_id: &str,
    catalog: &Catalog,
) -> Result<ScoreResult> {
    if parsed.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }
    let skin = catalog.skin_type(skin_type_id)?;
    let config = catalog.scoring();

    let mut tallies = Vec::new();
    let mut contributions = BTreeMap::new();
    let mut matched = Vec::new();
    let mut unmatched = Vec::new();
    let mut duplicates = Vec::new();
    let mut scored = HashSet::new();

    for (i, token) in parsed.tokens().iter().enumerate() {
        let Some(resolution) = resolve(&token.name, catalog) else {
            tracing::debug!("unknown ingredient '{}'", token.display);
            unmatched.push(token.display.clone());
            continue;
        };
        let ingredient = resolution.ingredient;
        if !scored.insert(ingredient.key.as_str()) {
            duplicates.push(DuplicateIngredient {
                name: token.display.clone(),
                matched: ingredient.name.clone(),
            });
            continue;
        }

        let tier = parsed.tier(i);
        let weight = config.tier_weight(tier);
        let affinity = ingredient.affinity(&skin.id);
        let mut tally = Tally {
            weight,
            ..Default::default()
        };

        for function in &ingredient.functions {
            let role = config.role_weight(function);
            let preference = affinity
                .unwrap_or_else(|| config.preference_weight(skin.preference(function)));
            let contribution = weight * role * preference;

            tally.raw += contribution;
            tally.max += weight * role * config.preference_weight(Preference::Preferred);
            tally.min += weight * role * config.preference_weight(Preference::Avoided);
            *contributions.entry(function.clone()).or_insert(0.0) += contribution;
        }

        matched.push(MatchedIngredient {
            name: token.display.clone(),
            matched: ingredient.name.clone(),
            kind: resolution.kind,
            similarity: resolution.similarity,
            tier,
            functions: ingredient.functions.iter().cloned().collect(),
            contribution: tally.raw,
        });
        tallies.push(tally);
    }

    let no_matched_data = matched.is_empty();
    let score = if no_matched_data {
        0.0
    } else {
        normalize(config, &tallies)
    };

    Ok(ScoreResult {
        skin_type: skin.id.clone(),
        score,
        normalization: config.normalization,
        contributions,
        matched,
        unmatched,
        duplicates,
        no_matched_data,
        line_marker: parsed.marker().map(|t| t.display.clone()),
        above_line_count: parsed.above_line().len(),
    })
}

fn normalize(config: &ScoringConfig, tallies: &[Tally]) -> f64 {
    let raw: f64 = tallies.iter().map(|t| t.raw).sum();
    let max: f64 = tallies.iter().map(|t| t.max).sum();
    let min: f64 = tallies.iter().map(|t| t.min).sum();

    let ratio = match config.normalization {
        Normalization::WeightedSum => {
            if max <= 0.0 {
                0.0
            } else {
                raw / max
            }
        }
        Normalization::Balanced => {
            if max - min <= 0.0 {
                0.0
            } else {
                (raw - min) / (max - min)
            }
        }
        Normalization::Multiplicative => weighted_geometric_mean(tallies),
    };

    (ratio.clamp(0.0, 1.0) * 100.0).clamp(0.0, 100.0)
}

fn weighted_geometric_mean(tallies: &[Tally]) -> f64 {
    let scoreable: Vec<&Tally> = tallies
        .iter()
        .filter(|t| t.weight > 0.0 && t.span() > 0.0)
        .collect();
    let total_weight: f64 = scoreable.iter().map(|t| t.weight).sum();
    if scoreable.is_empty() || total_weight <= 0.0 {
        return 0.0;
    }

    let mut log_sum = 0.0;
    for tally in scoreable {
        let ratio = ((tally.raw - tally.min) / tally.span()).clamp(0.0, 1.0);
        if ratio == 0.0 {
            return 0.0;
        }
        log_sum += (tally.weight / total_weight) * ratio.ln();
    }
    log_sum.exp()
}
