use crate::error::{AnalysisError, Result};
use crate::scoring::narrative::TemplateBucket;
use serde::Deserialize;
use std::collections::BTreeMap;
use strum::IntoEnumIterator;
use tera::{Context, Tera};

const TABLE: &str = "templates.json";

#[derive(Debug, Clone, Deserialize)]
struct TemplateSetRecord {
    no_data: String,
    low: String,
    medium: String,
    high: String,
}

impl TemplateSetRecord {
    fn get(&self, bucket: TemplateBucket) -> &str {
        match bucket {
            TemplateBucket::NoData => &self.no_data,
            TemplateBucket::Low => &self.low,
            TemplateBucket::Medium => &self.medium,
            TemplateBucket::High => &self.high,
        }
    }
}

/// Narrative template sets, compiled once at load.
pub struct NarrativeTemplates {
    tera: Tera,
    sets: Vec<String>,
}

impl std::fmt::Debug for NarrativeTemplates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrativeTemplates")
            .field("sets", &self.sets)
            .finish()
    }
}

fn template_name(set: &str, bucket: TemplateBucket) -> String {
    format!("{set}.{bucket}")
}

impl NarrativeTemplates {
    pub fn from_json(json: &str) -> Result<Self> {
        let records: BTreeMap<String, TemplateSetRecord> =
            serde_json::from_str(json).map_err(|source| AnalysisError::Json {
                table: TABLE.into(),
                source,
            })?;
        if records.is_empty() {
            return Err(AnalysisError::invalid_table(TABLE, "no template sets defined"));
        }

        let mut tera = Tera::default();
        for (set, record) in &records {
            for bucket in TemplateBucket::iter() {
                tera.add_raw_template(&template_name(set, bucket), record.get(bucket))
                    .map_err(|e| {
                        AnalysisError::invalid_table(TABLE, format!("{set}.{bucket}: {e}"))
                    })?;
            }
        }

        Ok(Self {
            tera,
            sets: records.into_keys().collect(),
        })
    }

    pub fn has_set(&self, set: &str) -> bool {
        self.sets.iter().any(|s| s == set)
    }

    pub fn sets(&self) -> &[String] {
        &self.sets
    }

    pub fn render(&self, set: &str, bucket: TemplateBucket, context: &Context) -> Result<String> {
        if !self.has_set(set) {
            return Err(AnalysisError::MissingConfig(format!(
                "template set '{set}' (available: {})",
                self.sets.join(", ")
            )));
        }
        Ok(self.tera.render(&template_name(set, bucket), context)?)
    }
}
