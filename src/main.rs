use anyhow::{bail, Context, Result};
use beautyboostr::settings::settings;
use beautyboostr::utils::{log_data_error, log_init, log_skin_types, print_analysis};
use beautyboostr::{run_full_analysis, AnalysisRequest, Catalog};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing::subscriber::set_global_default;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Score a product's ingredient list against a skin type.
#[derive(Debug, Parser)]
#[command(name = "beautyboostr", version, about)]
struct Args {
    /// Ingredient list, comma separated, in label order
    ingredients: Option<String>,

    /// Read the ingredient list from a file instead
    #[arg(short, long, conflicts_with = "ingredients")]
    file: Option<PathBuf>,

    /// Skin type id or its 1-based position
    #[arg(short, long)]
    skin_type: Option<String>,

    /// Product name used in the narrative
    #[arg(short, long)]
    name: Option<String>,

    /// Narrative template set
    #[arg(short, long)]
    template_set: Option<String>,

    /// Directory holding the reference tables
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Print the full analysis as JSON
    #[arg(long)]
    json: bool,

    /// List every skin type and exit
    #[arg(long)]
    list_skin_types: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("beautyboostr=info".parse()?))
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        );
    set_global_default(subscriber).context("failed to set tracing subscriber")?;

    let args = Args::parse();
    let settings = settings();
    let data_dir = args.data_dir.clone().unwrap_or_else(|| settings.data.dir.clone());

    let catalog = match Catalog::load(&data_dir) {
        Ok(catalog) => catalog,
        Err(e) => {
            log_data_error(&e.to_string());
            return Err(e).with_context(|| format!("loading tables from {}", data_dir.display()));
        }
    };

    if args.list_skin_types {
        log_skin_types(catalog.skin_types());
        return Ok(());
    }

    let ingredients = match (&args.ingredients, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("reading ingredient list from {}", path.display()))?,
        (None, None) => bail!("provide an ingredient list or --file"),
    };
    let Some(skin_type) = args.skin_type.as_deref() else {
        bail!("--skin-type is required (see --list-skin-types)");
    };

    let request = AnalysisRequest {
        product_name: args
            .name
            .as_deref()
            .unwrap_or(&settings.narrative.default_product_name),
        ingredients: &ingredients,
        skin_type,
        template_set: args
            .template_set
            .as_deref()
            .unwrap_or(&settings.narrative.template_set),
    };
    let analysis = run_full_analysis(&request, &catalog)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        log_init(&data_dir, &catalog);
        print_analysis(&analysis, &catalog, &settings.report);
    }

    Ok(())
}
