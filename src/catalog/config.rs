use super::records::Preference;
use crate::error::{AnalysisError, Result};
use crate::scoring::parser::ConcentrationTier;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strum::Display;

const TABLE: &str = "scoring.json";

/// How the weighted contributions collapse into a 0-100 percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Normalization {
    /// raw / max, floored at zero.
    WeightedSum,
    /// raw mapped linearly from [min, max] onto [0, 100].
    Balanced,
    /// Tier-weighted geometric mean of per-ingredient balanced ratios.
    Multiplicative,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceWeights {
    pub preferred: f64,
    pub neutral: f64,
    pub avoided: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierWeights {
    pub above_line: f64,
    pub below_line: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    pub high: f64,
    pub medium: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub normalization: Normalization,
    pub preference_weights: PreferenceWeights,
    pub tier_weights: TierWeights,
    #[serde(default = "default_role_weight")]
    pub default_role_weight: f64,
    #[serde(default)]
    pub role_weights: BTreeMap<String, f64>,
    pub thresholds: Thresholds,
    #[serde(default)]
    pub positive_functions: BTreeSet<String>,
    #[serde(default = "default_top_functions")]
    pub top_functions: usize,
    #[serde(default)]
    pub fuzzy_threshold: Option<f64>,
}

fn default_role_weight() -> f64 {
    1.0
}

fn default_top_functions() -> usize {
    3
}

impl ScoringConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|source| AnalysisError::Json {
            table: TABLE.into(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let p = &self.preference_weights;
        if !(p.preferred > 0.0 && p.avoided <= p.neutral && p.neutral <= p.preferred) {
            return Err(AnalysisError::invalid_table(
                TABLE,
                "preference weights must satisfy avoided <= neutral <= preferred and preferred > 0",
            ));
        }

        let t = &self.tier_weights;
        if t.above_line < 0.0 || t.below_line < 0.0 {
            return Err(AnalysisError::invalid_table(TABLE, "tier weights must be >= 0"));
        }

        if self.default_role_weight < 0.0 {
            return Err(AnalysisError::invalid_table(TABLE, "default_role_weight must be >= 0"));
        }
        if let Some((role, _)) = self.role_weights.iter().find(|(_, w)| **w < 0.0) {
            return Err(AnalysisError::invalid_table(
                TABLE,
                format!("role weight for {role} must be >= 0"),
            ));
        }

        let th = &self.thresholds;
        if !(0.0 <= th.medium && th.medium <= th.high && th.high <= 100.0) {
            return Err(AnalysisError::invalid_table(
                TABLE,
                "thresholds must satisfy 0 <= medium <= high <= 100",
            ));
        }

        if let Some(fuzzy) = self.fuzzy_threshold {
            if !(fuzzy > 0.0 && fuzzy <= 1.0) {
                return Err(AnalysisError::invalid_table(
                    TABLE,
                    "fuzzy_threshold must be in (0, 1]",
                ));
            }
        }

        Ok(())
    }

    pub fn role_weight(&self, function: &str) -> f64 {
        self.role_weights
            .get(function)
            .copied()
            .unwrap_or(self.default_role_weight)
    }

    pub fn tier_weight(&self, tier: ConcentrationTier) -> f64 {
        match tier {
            ConcentrationTier::AboveLine => self.tier_weights.above_line,
            ConcentrationTier::BelowLine => self.tier_weights.below_line,
        }
    }

    pub fn preference_weight(&self, preference: Preference) -> f64 {
        match preference {
            Preference::Preferred => self.preference_weights.preferred,
            Preference::Neutral => self.preference_weights.neutral,
            Preference::Avoided => self.preference_weights.avoided,
        }
    }

    /// Affinities override preference weights, so they share the same range.
    pub fn accepts_affinity(&self, weight: f64) -> bool {
        weight >= self.preference_weights.avoided && weight <= self.preference_weights.preferred
    }

    pub fn is_positive(&self, function: &str) -> bool {
        self.positive_functions.contains(function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"{
        "normalization": "balanced",
        "preference_weights": {"preferred": 1.0, "neutral": 0.0, "avoided": -1.0},
        "tier_weights": {"above_line": 1.0, "below_line": 0.5},
        "role_weights": {"Solvent": 0.0},
        "thresholds": {"high": 70.0, "medium": 40.0}
    }"#;

    #[test]
    fn test_defaults_and_lookups() {
        let config = ScoringConfig::from_json(BASE).unwrap();
        assert_eq!(config.normalization, Normalization::Balanced);
        assert_eq!(config.top_functions, 3);
        assert_eq!(config.fuzzy_threshold, None);
        assert_eq!(config.role_weight("Solvent"), 0.0);
        assert_eq!(config.role_weight("Humectant"), 1.0);
        assert_eq!(config.tier_weight(ConcentrationTier::BelowLine), 0.5);
        assert_eq!(config.preference_weight(Preference::Avoided), -1.0);
        assert!(config.accepts_affinity(-0.5));
        assert!(!config.accepts_affinity(1.5));
    }

    #[test]
    fn test_normalization_names() {
        assert_eq!(Normalization::WeightedSum.to_string(), "weighted_sum");
        let parsed: Normalization = serde_json::from_str(r#""multiplicative""#).unwrap();
        assert_eq!(parsed, Normalization::Multiplicative);
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let json = BASE.replace(r#""high": 70.0, "medium": 40.0"#, r#""high": 30.0, "medium": 40.0"#);
        assert!(matches!(
            ScoringConfig::from_json(&json),
            Err(AnalysisError::InvalidTable { .. })
        ));
    }

    #[test]
    fn test_rejects_negative_role_weight() {
        let json = BASE.replace(r#""Solvent": 0.0"#, r#""Solvent": -2.0"#);
        assert!(ScoringConfig::from_json(&json).is_err());
    }

    #[test]
    fn test_rejects_unknown_normalization() {
        let json = BASE.replace("balanced", "exponential");
        assert!(matches!(
            ScoringConfig::from_json(&json),
            Err(AnalysisError::Json { .. })
        ));
    }
}
