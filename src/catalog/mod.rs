//! Read-only reference tables, loaded once and passed to every scoring call.

mod config;
mod records;
mod templates;

pub use config::{Normalization, PreferenceWeights, ScoringConfig, Thresholds, TierWeights};
pub use records::{
    FunctionRoles, Ingredient, IngredientRecord, Preference, ProductProfile, Routine, RoutineStep,
    SkinType, SkinTypeRecord,
};
pub use templates::NarrativeTemplates;

use crate::error::{AnalysisError, Result};
use crate::scoring::matcher;
use crate::scoring::parser::{normalize_name, parse_ingredients_with, MarkerSet, ParsedProduct};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

pub const SKIN_TYPE_COUNT: usize = 36;

pub const INGREDIENTS_FILE: &str = "ingredients.json";
pub const SKIN_TYPES_FILE: &str = "skin_types.json";
pub const ROUTINES_FILE: &str = "routines.json";
pub const PRODUCT_PROFILES_FILE: &str = "product_profiles.json";
pub const FUNCTION_ROLES_FILE: &str = "function_roles.json";
pub const MARKERS_FILE: &str = "markers.json";
pub const TEMPLATES_FILE: &str = "templates.json";
pub const SCORING_FILE: &str = "scoring.json";

/// Raw JSON text of every table, before validation.
#[derive(Debug, Clone, Default)]
pub struct TableSources {
    pub ingredients: String,
    pub skin_types: String,
    pub routines: String,
    pub product_profiles: String,
    pub function_roles: String,
    pub markers: String,
    pub templates: String,
    pub scoring: String,
}

impl TableSources {
    pub fn read_dir(dir: &Path) -> Result<Self> {
        let read = |file: &str| -> Result<String> {
            let path = dir.join(file);
            if !path.is_file() {
                return Err(AnalysisError::MissingConfig(path.display().to_string()));
            }
            Ok(fs::read_to_string(path)?)
        };

        Ok(Self {
            ingredients: read(INGREDIENTS_FILE)?,
            skin_types: read(SKIN_TYPES_FILE)?,
            routines: read(ROUTINES_FILE)?,
            product_profiles: read(PRODUCT_PROFILES_FILE)?,
            function_roles: read(FUNCTION_ROLES_FILE)?,
            markers: read(MARKERS_FILE)?,
            templates: read(TEMPLATES_FILE)?,
            scoring: read(SCORING_FILE)?,
        })
    }
}

fn parse_table<T: DeserializeOwned>(table: &str, json: &str) -> Result<T> {
    serde_json::from_str(json).map_err(|source| AnalysisError::Json {
        table: table.to_string(),
        source,
    })
}

#[derive(Debug)]
pub struct Catalog {
    ingredients: Vec<Ingredient>,
    by_key: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
    skin_types: Vec<SkinType>,
    skin_index: HashMap<String, usize>,
    routines: Vec<Routine>,
    profiles: BTreeMap<String, ProductProfile>,
    markers: MarkerSet,
    templates: NarrativeTemplates,
    scoring: ScoringConfig,
}

impl Catalog {
    pub fn load(dir: &Path) -> Result<Self> {
        let catalog = Self::from_sources(&TableSources::read_dir(dir)?)?;
        tracing::info!(
            "loaded {} ingredients and {} skin types from {}",
            catalog.ingredients.len(),
            catalog.skin_types.len(),
            dir.display()
        );
        Ok(catalog)
    }

    pub fn from_sources(src: &TableSources) -> Result<Self> {
        let roles = FunctionRoles::from_json(&src.function_roles)?;
        let scoring = ScoringConfig::from_json(&src.scoring)?;
        let markers = MarkerSet::from_json(&src.markers)?;
        let templates = NarrativeTemplates::from_json(&src.templates)?;

        let skin_records: Vec<SkinTypeRecord> = parse_table(SKIN_TYPES_FILE, &src.skin_types)?;
        if skin_records.len() != SKIN_TYPE_COUNT {
            return Err(AnalysisError::invalid_table(
                SKIN_TYPES_FILE,
                format!(
                    "expected {SKIN_TYPE_COUNT} skin types, found {}",
                    skin_records.len()
                ),
            ));
        }
        let mut skin_types = Vec::with_capacity(skin_records.len());
        let mut skin_index = HashMap::new();
        for (i, record) in skin_records.into_iter().enumerate() {
            let skin = SkinType::from_record(record, i + 1, &roles)?;
            if skin_index.insert(skin.id.clone(), i).is_some() {
                return Err(AnalysisError::invalid_table(
                    SKIN_TYPES_FILE,
                    format!("duplicate skin type id {}", skin.id),
                ));
            }
            skin_types.push(skin);
        }

        let ingredient_records: Vec<IngredientRecord> =
            parse_table(INGREDIENTS_FILE, &src.ingredients)?;
        let mut ingredients = Vec::with_capacity(ingredient_records.len());
        let mut by_key = HashMap::new();
        for record in ingredient_records {
            let ingredient = Ingredient::from_record(record, &roles)?;
            for (skin_id, weight) in &ingredient.affinities {
                if !skin_index.contains_key(skin_id) {
                    return Err(AnalysisError::invalid_table(
                        INGREDIENTS_FILE,
                        format!("{}: affinity for unknown skin type {skin_id}", ingredient.name),
                    ));
                }
                if !scoring.accepts_affinity(*weight) {
                    return Err(AnalysisError::invalid_table(
                        INGREDIENTS_FILE,
                        format!(
                            "{}: affinity {weight} for {skin_id} is outside the preference range",
                            ingredient.name
                        ),
                    ));
                }
            }
            if by_key.insert(ingredient.key.clone(), ingredients.len()).is_some() {
                return Err(AnalysisError::invalid_table(
                    INGREDIENTS_FILE,
                    format!("duplicate ingredient {}", ingredient.name),
                ));
            }
            ingredients.push(ingredient);
        }

        let mut by_alias = HashMap::new();
        for (i, ingredient) in ingredients.iter().enumerate() {
            for alias in &ingredient.aliases {
                if by_key.contains_key(alias) {
                    continue;
                }
                if let Some(previous) = by_alias.insert(alias.clone(), i) {
                    if previous != i {
                        tracing::warn!(
                            "alias '{}' claimed by both {} and {}",
                            alias,
                            ingredients[previous].name,
                            ingredient.name
                        );
                        by_alias.insert(alias.clone(), previous);
                    }
                }
            }
        }

        let profile_list: Vec<ProductProfile> =
            parse_table(PRODUCT_PROFILES_FILE, &src.product_profiles)?;
        let mut profiles = BTreeMap::new();
        for profile in profile_list {
            for function in profile
                .required_functions
                .iter()
                .chain(profile.excluded_functions.iter())
            {
                if !roles.is_role(function) {
                    tracing::warn!("profile {} references unknown role {}", profile.id, function);
                }
            }
            profiles.insert(profile.id.clone(), profile);
        }

        let mut routines: Vec<Routine> = parse_table(ROUTINES_FILE, &src.routines)?;
        for routine in &mut routines {
            routine.skin_types = routine.skin_types.iter().map(|s| normalize_name(s)).collect();
            if let Some(unknown) = routine
                .skin_types
                .iter()
                .find(|s| !skin_index.contains_key(*s))
            {
                return Err(AnalysisError::invalid_table(
                    ROUTINES_FILE,
                    format!("{}: unknown skin type {unknown}", routine.id),
                ));
            }
            if let Some(step) = routine
                .steps
                .iter()
                .find(|s| !profiles.contains_key(&s.profile))
            {
                return Err(AnalysisError::invalid_table(
                    ROUTINES_FILE,
                    format!("{}: step {} uses unknown profile {}", routine.id, step.step, step.profile),
                ));
            }
        }

        if markers.is_empty() {
            tracing::warn!("no 1% line markers configured; all ingredients weigh the same");
        }

        Ok(Self {
            ingredients,
            by_key,
            by_alias,
            skin_types,
            skin_index,
            routines,
            profiles,
            markers,
            templates,
            scoring,
        })
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    /// Exact lookup by normalized INCI name.
    pub fn ingredient(&self, key: &str) -> Option<&Ingredient> {
        self.by_key.get(key).map(|&i| &self.ingredients[i])
    }

    pub fn ingredient_by_alias(&self, alias: &str) -> Option<&Ingredient> {
        self.by_alias.get(alias).map(|&i| &self.ingredients[i])
    }

    pub fn require_ingredient(&self, name: &str) -> Result<&Ingredient> {
        matcher::resolve(&normalize_name(name), self)
            .map(|resolution| resolution.ingredient)
            .ok_or_else(|| AnalysisError::UnknownIngredient(name.trim().to_string()))
    }

    /// Parses an ingredient list, placing the 1% line at the first token that
    /// is a marker by name or resolves to a marker ingredient.
    pub fn parse(&self, text: &str) -> Result<ParsedProduct> {
        parse_ingredients_with(text, |name| {
            self.markers.matches(name)
                || matcher::resolve(name, self)
                    .is_some_and(|r| self.markers.contains(&r.ingredient.key))
        })
    }

    /// Accepts a skin type id (`dry-sensitive`) or its 1-based position (`1`..`36`).
    pub fn skin_type(&self, id: &str) -> Result<&SkinType> {
        let key = normalize_name(id);
        if let Some(&i) = self.skin_index.get(&key) {
            return Ok(&self.skin_types[i]);
        }
        key.parse::<usize>()
            .ok()
            .filter(|n| n.to_string() == key && (1..=self.skin_types.len()).contains(n))
            .map(|n| &self.skin_types[n - 1])
            .ok_or_else(|| AnalysisError::InvalidSkinType(id.trim().to_string()))
    }

    pub fn skin_types(&self) -> &[SkinType] {
        &self.skin_types
    }

    pub fn routines(&self) -> &[Routine] {
        &self.routines
    }

    pub fn profile(&self, id: &str) -> Option<&ProductProfile> {
        self.profiles.get(id)
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn templates(&self) -> &NarrativeTemplates {
        &self.templates
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }
}

#[cfg(test)]
pub(crate) fn fixture() -> Catalog {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    Catalog::load(&dir).expect("shipped data tables should load")
}
