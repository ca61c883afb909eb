use console::{measure_text_width, Style};
use std::path::Path;

use crate::analysis::Analysis;
use crate::catalog::{Catalog, Ingredient, SkinType};
use crate::scoring::{ImpactClass, MatchKind, TemplateBucket};
use crate::settings::Report;

pub const TREE_BRANCH: char = '\u{251C}';
pub const TREE_END: char = '\u{2514}';
pub const TREE_HORIZ: char = '\u{2500}';
pub const TREE_VERT: char = '\u{2502}';

const TREE_PREFIX_WIDTH: usize = 4;
const VALUE_COLUMN: usize = 28;

fn tree_branch() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_BRANCH, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_end() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_END, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_indent() -> String {
    dim().apply_to(format!("{}   ", TREE_VERT)).to_string()
}

fn branch_for(i: usize, count: usize) -> String {
    if i + 1 == count {
        tree_end()
    } else {
        tree_branch()
    }
}

pub fn dim() -> Style {
    Style::new().dim()
}

fn blue() -> Style {
    Style::new().blue()
}

fn magenta() -> Style {
    Style::new().magenta()
}

fn cyan() -> Style {
    Style::new().cyan()
}

fn green() -> Style {
    Style::new().green()
}

fn red() -> Style {
    Style::new().red()
}

fn yellow() -> Style {
    Style::new().yellow()
}

fn bold() -> Style {
    Style::new().bold()
}

fn init_prefix() -> String {
    blue().apply_to("[INIT]").to_string()
}

fn data_prefix() -> String {
    magenta().apply_to("[DATA]").to_string()
}

pub fn pad_label(label: &str, depth: usize) -> String {
    let prefix_width = depth * TREE_PREFIX_WIDTH;
    let target_width = VALUE_COLUMN.saturating_sub(prefix_width);
    let current_width = measure_text_width(label);
    if current_width < target_width {
        format!("{}{}", label, " ".repeat(target_width - current_width))
    } else {
        format!("{} ", label)
    }
}

pub fn format_signed(value: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "-" };
    format!("{}{:.2}", dim().apply_to(sign), value.abs())
}

fn score_style(bucket: TemplateBucket) -> Style {
    match bucket {
        TemplateBucket::High => green().bold(),
        TemplateBucket::Medium => yellow().bold(),
        TemplateBucket::Low => red().bold(),
        TemplateBucket::NoData => dim(),
    }
}

pub fn log_init(data_dir: &Path, catalog: &Catalog) {
    println!(
        "{} loaded {} ingredients, {} skin types and {} routines from {}",
        init_prefix(),
        bold().apply_to(catalog.ingredients().len()),
        bold().apply_to(catalog.skin_types().len()),
        bold().apply_to(catalog.routines().len()),
        cyan().apply_to(data_dir.display()),
    );
}

pub fn log_data_error(error: &str) {
    println!(
        "{} {} {}",
        data_prefix(),
        red().apply_to("failed to load tables:"),
        dim().apply_to(error)
    );
}

pub fn log_generic_error(prefix: &str, error: &str) {
    eprintln!("{} {}", red().apply_to(prefix), error);
}

pub fn log_skin_types(skin_types: &[SkinType]) {
    println!("{}", bold().apply_to("SKIN TYPES"));
    let count = skin_types.len();
    for (i, skin) in skin_types.iter().enumerate() {
        println!(
            "{}{}{} {}",
            branch_for(i, count),
            dim().apply_to(format!("{:>2} ", skin.position)),
            pad_label(&skin.id, 1),
            dim().apply_to(&skin.name)
        );
    }
}

fn match_note(kind: MatchKind, similarity: f64) -> String {
    match kind {
        MatchKind::Exact => String::new(),
        MatchKind::Alias => format!(" {}", dim().apply_to("(alias)")),
        MatchKind::Fuzzy => format!(
            " {}",
            yellow().apply_to(format!("(fuzzy {:.0}%)", similarity * 100.0))
        ),
    }
}

pub fn print_analysis(analysis: &Analysis, catalog: &Catalog, report: &Report) {
    let mut lines: Vec<String> = Vec::new();
    let score = &analysis.score;
    let bucket = TemplateBucket::from_result(score, &catalog.scoring().thresholds);

    lines.push(format!(
        "{} \"{}\" for {}",
        magenta().apply_to(bold().apply_to("[PRODUCT ANALYSIS]")),
        analysis.product_name,
        cyan().apply_to(&analysis.skin_type_name)
    ));

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("INGREDIENTS")));
    let count = score.matched.len();
    for (i, m) in score.matched.iter().enumerate() {
        let tier = if m.tier == crate::scoring::ConcentrationTier::AboveLine {
            dim().apply_to("above")
        } else {
            dim().apply_to("below")
        };
        lines.push(format!(
            "{}{} {} {}{}",
            branch_for(i, count + usize::from(!score.unmatched.is_empty())),
            pad_label(&m.name, 1),
            tier,
            format_signed(m.contribution),
            match_note(m.kind, m.similarity)
        ));
    }
    if !score.unmatched.is_empty() {
        lines.push(format!("{}{}", tree_end(), pad_label("unknown", 1)));
        let count = score.unmatched.len();
        for (i, name) in score.unmatched.iter().enumerate() {
            lines.push(format!(
                "    {}{}",
                branch_for(i, count),
                yellow().apply_to(name)
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("SCORE")));
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("1% line", 1),
        match &score.line_marker {
            Some(marker) => cyan().apply_to(marker.clone()).to_string(),
            None => dim().apply_to("not found").to_string(),
        }
    ));
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("normalization", 1),
        dim().apply_to(score.normalization)
    ));
    lines.push(format!("{}{}", tree_branch(), pad_label("functions", 1)));
    if score.contributions.is_empty() {
        lines.push(format!("{}{}{}", tree_indent(), tree_end(), dim().apply_to("none")));
    } else {
        let count = score.contributions.len();
        for (i, (function, value)) in score.contributions.iter().enumerate() {
            lines.push(format!(
                "{}{}{}{}",
                tree_indent(),
                branch_for(i, count),
                pad_label(function, 2),
                format_signed(*value)
            ));
        }
    }
    lines.push(format!(
        "{}{} {}",
        tree_end(),
        pad_label("total", 1),
        score_style(bucket).apply_to(format!("{:.0}%", score.score))
    ));

    if report.show_breakdown {
        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("BREAKDOWN")));
        for (i, class) in [ImpactClass::PositiveImpact, ImpactClass::NeutralFunctional]
            .into_iter()
            .enumerate()
        {
            let names = match class {
                ImpactClass::PositiveImpact => &analysis.breakdown.positive_impact,
                ImpactClass::NeutralFunctional => &analysis.breakdown.neutral_functional,
            };
            let value = if names.is_empty() {
                dim().apply_to("None identified.".to_string())
            } else {
                Style::new().apply_to(names.join(", "))
            };
            lines.push(format!(
                "{}{} {}",
                branch_for(i, 2),
                pad_label(&class.to_string(), 1),
                value
            ));
        }
    }

    if report.show_routines {
        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("ROUTINES")));
        if analysis.placements.is_empty() {
            lines.push(format!("{}{}", tree_end(), dim().apply_to("no suitable placements")));
        } else {
            let count = analysis.placements.len();
            for (i, placement) in analysis.placements.iter().enumerate() {
                lines.push(format!("{}{}", branch_for(i, count), placement));
            }
        }
    }

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("RESULT")));
    lines.push(format!("{}{}", tree_end(), analysis.narrative));

    println!("{}\n", lines.join("\n"));
}

pub fn print_ingredient(ingredient: &Ingredient, catalog: &Catalog, skin: Option<&SkinType>) {
    let mut lines: Vec<String> = Vec::new();
    let config = catalog.scoring();

    lines.push(format!(
        "{} {}",
        magenta().apply_to(bold().apply_to("[INGREDIENT]")),
        bold().apply_to(&ingredient.name)
    ));
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("aliases", 1),
        if ingredient.aliases.is_empty() {
            dim().apply_to("none".to_string())
        } else {
            Style::new().apply_to(ingredient.aliases.join(", "))
        }
    ));
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("marker", 1),
        if catalog.markers().contains(&ingredient.key) {
            cyan().apply_to("yes, starts the 1% line")
        } else {
            dim().apply_to("no")
        }
    ));
    lines.push(format!("{}{}", tree_end(), pad_label("functions", 1)));
    let count = ingredient.functions.len();
    for (i, function) in ingredient.functions.iter().enumerate() {
        let positive = if config.is_positive(function) {
            green().apply_to("positive")
        } else {
            dim().apply_to("functional")
        };
        lines.push(format!(
            "    {}{} {} {}",
            branch_for(i, count),
            pad_label(function, 2),
            positive,
            dim().apply_to(format!("weight {:.2}", config.role_weight(function)))
        ));
    }

    let skins: Vec<&SkinType> = match skin {
        Some(skin) => vec![skin],
        None => catalog.skin_types().iter().collect(),
    };

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("SUITABILITY")));
    let count = skins.len();
    for (i, skin) in skins.iter().enumerate() {
        let value = match ingredient.affinity(&skin.id) {
            Some(affinity) => format!("{} {}", format_signed(affinity), dim().apply_to("(affinity)")),
            None => {
                let prefs: Vec<String> = ingredient
                    .functions
                    .iter()
                    .filter(|f| config.role_weight(f) > 0.0)
                    .map(|f| format!("{} {}", f, skin.preference(f)))
                    .collect();
                if prefs.is_empty() {
                    dim().apply_to("neutral").to_string()
                } else {
                    prefs.join(", ")
                }
            }
        };
        lines.push(format!("{}{} {}", branch_for(i, count), pad_label(&skin.id, 1), value));
    }

    println!("{}\n", lines.join("\n"));
}
