use super::score::ScoreResult;
use crate::catalog::{Catalog, SkinType, Thresholds};
use crate::error::Result;
use serde::Serialize;
use strum::{Display, EnumIter};
use tera::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TemplateBucket {
    NoData,
    Low,
    Medium,
    High,
}

impl TemplateBucket {
    pub fn from_result(result: &ScoreResult, thresholds: &Thresholds) -> Self {
        if result.no_matched_data {
            TemplateBucket::NoData
        } else if result.score >= thresholds.high {
            TemplateBucket::High
        } else if result.score >= thresholds.medium {
            TemplateBucket::Medium
        } else {
            TemplateBucket::Low
        }
    }
}

/// "a", "a and b", "a, b and c".
pub fn join_natural<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [one] => one.as_ref().to_string(),
        [init @ .., last] => format!(
            "{} and {}",
            init.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(", "),
            last.as_ref()
        ),
    }
}

fn placement_sentence(result: &ScoreResult) -> String {
    match &result.line_marker {
        Some(marker) => format!(
            "{} of its ingredients sit above the 1% line, which starts at {}.",
            result.above_line_count, marker
        ),
        None => "No 1% line marker was found, so every ingredient is weighted equally.".to_string(),
    }
}

pub fn narrative_context(
    result: &ScoreResult,
    skin: &SkinType,
    product_name: &str,
    top_limit: usize,
) -> Context {
    let top: Vec<String> = result
        .top_functions(top_limit)
        .into_iter()
        .map(|(name, _)| name.to_lowercase())
        .collect();
    let detracting: Vec<String> = result
        .detracting_functions()
        .into_iter()
        .map(|(name, _)| name.to_lowercase())
        .collect();

    let mut ctx = Context::new();
    ctx.insert("product_name", product_name);
    ctx.insert("skin_type", &skin.name);
    ctx.insert("skin_type_id", &skin.id);
    ctx.insert("score", &format!("{:.0}", result.score));
    ctx.insert("score_exact", &result.score);
    ctx.insert("top_function_list", &top);
    ctx.insert(
        "top_functions",
        &if top.is_empty() {
            "no standout functions".to_string()
        } else {
            join_natural(&top)
        },
    );
    ctx.insert("detracting_functions", &join_natural(&detracting));
    ctx.insert(
        "problems",
        &if skin.problems.is_empty() {
            "everyday upkeep".to_string()
        } else {
            join_natural(&skin.problems)
        },
    );
    ctx.insert("placement", &placement_sentence(result));
    ctx.insert("matched_count", &result.matched.len());
    ctx.insert("unmatched_count", &result.unmatched.len());
    ctx.insert(
        "unmatched",
        &if result.unmatched.is_empty() {
            "none".to_string()
        } else {
            result.unmatched.join(", ")
        },
    );
    ctx
}

pub fn generate_narrative(
    result: &ScoreResult,
    skin: &SkinType,
    product_name: &str,
    template_set: &str,
    catalog: &Catalog,
) -> Result<String> {
    let config = catalog.scoring();
    let bucket = TemplateBucket::from_result(result, &config.thresholds);
    let ctx = narrative_context(result, skin, product_name, config.top_functions);
    let text = catalog.templates().render(template_set, bucket, &ctx)?;
    Ok(text.trim().to_string())
}
