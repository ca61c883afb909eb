use crate::error::{AnalysisError, Result};
use crate::scoring::parser::{clean_name, normalize_name};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strum::Display;

#[derive(Debug, Clone, Deserialize)]
pub struct IngredientRecord {
    pub inci_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub functions: Vec<String>,
    #[serde(default)]
    pub behaviors: Vec<BehaviorRecord>,
    #[serde(default)]
    pub affinities: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BehaviorRecord {
    #[serde(default)]
    pub functions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkinTypeRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub problems: Vec<String>,
    #[serde(default)]
    pub preferred_functions: Vec<String>,
    #[serde(default)]
    pub avoided_functions: Vec<String>,
}

/// Maps raw function tags ("moisturising") onto canonical roles ("Humectant").
#[derive(Debug, Clone, Default)]
pub struct FunctionRoles {
    roles: BTreeMap<String, String>,
}

impl FunctionRoles {
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, String> =
            serde_json::from_str(json).map_err(|source| AnalysisError::Json {
                table: "function_roles.json".into(),
                source,
            })?;
        let roles = raw
            .into_iter()
            .map(|(tag, role)| (normalize_name(&tag), clean_name(&role)))
            .collect();
        Ok(Self { roles })
    }

    pub fn canonical(&self, tag: &str) -> String {
        let key = normalize_name(tag);
        match self.roles.get(&key) {
            Some(role) => role.clone(),
            None => {
                let role = self
                    .roles
                    .values()
                    .find(|r| r.eq_ignore_ascii_case(&key))
                    .cloned();
                role.unwrap_or_else(|| {
                    tracing::warn!("function tag '{}' has no role mapping", tag);
                    clean_name(tag)
                })
            }
        }
    }

    pub fn is_role(&self, role: &str) -> bool {
        self.roles.values().any(|r| r == role)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Ingredient {
    pub name: String,
    pub key: String,
    pub aliases: Vec<String>,
    pub functions: BTreeSet<String>,
    pub affinities: BTreeMap<String, f64>,
}

impl Ingredient {
    pub fn from_record(record: IngredientRecord, roles: &FunctionRoles) -> Result<Self> {
        let name = clean_name(&record.inci_name);
        if name.is_empty() {
            return Err(AnalysisError::invalid_table(
                "ingredients.json",
                "ingredient with empty inci_name",
            ));
        }

        let functions = record
            .functions
            .iter()
            .chain(record.behaviors.iter().flat_map(|b| b.functions.iter()))
            .filter(|tag| !tag.trim().is_empty())
            .map(|tag| roles.canonical(tag))
            .collect();

        let aliases = record
            .aliases
            .iter()
            .map(|a| normalize_name(a))
            .filter(|a| !a.is_empty())
            .collect();

        let mut affinities = BTreeMap::new();
        for (skin_type, weight) in record.affinities {
            if !weight.is_finite() {
                return Err(AnalysisError::invalid_table(
                    "ingredients.json",
                    format!("{name}: affinity for {skin_type} is not a number"),
                ));
            }
            affinities.insert(normalize_name(&skin_type), weight);
        }

        Ok(Self {
            key: normalize_name(&name),
            name,
            aliases,
            functions,
            affinities,
        })
    }

    pub fn affinity(&self, skin_type_id: &str) -> Option<f64> {
        self.affinities.get(skin_type_id).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    #[strum(serialize = "preferred")]
    Preferred,
    #[strum(serialize = "neutral")]
    Neutral,
    #[strum(serialize = "avoided")]
    Avoided,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkinType {
    pub id: String,
    pub name: String,
    /// 1-based position in the skin type table.
    pub position: usize,
    pub problems: Vec<String>,
    pub preferred: BTreeSet<String>,
    pub avoided: BTreeSet<String>,
}

impl SkinType {
    pub fn from_record(record: SkinTypeRecord, position: usize, roles: &FunctionRoles) -> Result<Self> {
        let id = normalize_name(&record.id);
        if id.is_empty() {
            return Err(AnalysisError::invalid_table(
                "skin_types.json",
                format!("skin type #{position} has an empty id"),
            ));
        }

        let preferred: BTreeSet<String> = record
            .preferred_functions
            .iter()
            .map(|f| roles.canonical(f))
            .collect();
        let avoided: BTreeSet<String> = record
            .avoided_functions
            .iter()
            .map(|f| roles.canonical(f))
            .collect();

        if let Some(conflict) = preferred.intersection(&avoided).next() {
            return Err(AnalysisError::invalid_table(
                "skin_types.json",
                format!("{id}: '{conflict}' is both preferred and avoided"),
            ));
        }

        let mut problems: Vec<String> = Vec::new();
        for problem in record.problems.iter().map(|p| clean_name(p)) {
            if !problem.is_empty() && !problems.contains(&problem) {
                problems.push(problem);
            }
        }

        Ok(Self {
            id,
            name: clean_name(&record.name),
            position,
            problems,
            preferred,
            avoided,
        })
    }

    pub fn preference(&self, function: &str) -> Preference {
        if self.preferred.contains(function) {
            Preference::Preferred
        } else if self.avoided.contains(function) {
            Preference::Avoided
        } else {
            Preference::Neutral
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub required_functions: BTreeSet<String>,
    #[serde(default)]
    pub excluded_functions: BTreeSet<String>,
}

impl ProductProfile {
    pub fn matches(&self, functions: &BTreeSet<String>) -> bool {
        !self.required_functions.is_empty()
            && self.required_functions.is_subset(functions)
            && self.excluded_functions.is_disjoint(functions)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineStep {
    pub step: String,
    pub profile: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Routine {
    pub id: String,
    pub name: String,
    /// Empty means the routine suits every skin type.
    #[serde(default)]
    pub skin_types: BTreeSet<String>,
    pub steps: Vec<RoutineStep>,
}

impl Routine {
    pub fn applies_to(&self, skin_type_id: &str) -> bool {
        self.skin_types.is_empty() || self.skin_types.contains(skin_type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles() -> FunctionRoles {
        FunctionRoles::from_json(
            r#"{"humectant": "Humectant", "moisturising": "Humectant", "perfuming": "Fragrance"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_canonical_roles() {
        let roles = roles();
        assert_eq!(roles.canonical("Moisturising"), "Humectant");
        assert_eq!(roles.canonical("fragrance"), "Fragrance");
        assert_eq!(roles.canonical("Film Forming"), "Film Forming");
        assert!(roles.is_role("Humectant"));
    }

    #[test]
    fn test_ingredient_from_record_merges_behaviors() {
        let record: IngredientRecord = serde_json::from_str(
            r#"{
                "inci_name": " Glycerin ",
                "aliases": ["Glycerol"],
                "functions": ["humectant"],
                "behaviors": [{"functions": ["moisturising", "perfuming"]}]
            }"#,
        )
        .unwrap();
        let ingredient = Ingredient::from_record(record, &roles()).unwrap();
        assert_eq!(ingredient.name, "Glycerin");
        assert_eq!(ingredient.key, "glycerin");
        assert_eq!(ingredient.aliases, vec!["glycerol"]);
        assert_eq!(ingredient.functions.len(), 2);
        assert!(ingredient.functions.contains("Humectant"));
        assert!(ingredient.functions.contains("Fragrance"));
    }

    #[test]
    fn test_ingredient_requires_name() {
        let record: IngredientRecord = serde_json::from_str(r#"{"inci_name": "  "}"#).unwrap();
        assert!(Ingredient::from_record(record, &roles()).is_err());
    }

    #[test]
    fn test_skin_type_rejects_conflicting_preferences() {
        let record: SkinTypeRecord = serde_json::from_str(
            r#"{"id": "x", "name": "X", "preferred_functions": ["humectant"], "avoided_functions": ["moisturising"]}"#,
        )
        .unwrap();
        assert!(SkinType::from_record(record, 1, &roles()).is_err());
    }

    #[test]
    fn test_skin_type_preference() {
        let record: SkinTypeRecord = serde_json::from_str(
            r#"{"id": "Dry-Sensitive", "name": "Dry & Sensitive", "problems": ["redness", "redness"],
                "preferred_functions": ["humectant"], "avoided_functions": ["perfuming"]}"#,
        )
        .unwrap();
        let skin = SkinType::from_record(record, 1, &roles()).unwrap();
        assert_eq!(skin.id, "dry-sensitive");
        assert_eq!(skin.problems, vec!["redness"]);
        assert_eq!(skin.preference("Humectant"), Preference::Preferred);
        assert_eq!(skin.preference("Fragrance"), Preference::Avoided);
        assert_eq!(skin.preference("Solvent"), Preference::Neutral);
    }

    #[test]
    fn test_profile_matching() {
        let profile = ProductProfile {
            id: "hydrating-serum".into(),
            name: "Hydrating Serum".into(),
            required_functions: ["Humectant".to_string()].into(),
            excluded_functions: ["Surfactant".to_string()].into(),
        };
        let hydrating: BTreeSet<String> = ["Humectant".to_string(), "Solvent".to_string()].into();
        let cleanser: BTreeSet<String> = ["Humectant".to_string(), "Surfactant".to_string()].into();
        assert!(profile.matches(&hydrating));
        assert!(!profile.matches(&cleanser));
        assert!(!profile.matches(&BTreeSet::new()));
    }
}
