use beautyboostr::settings::settings;
use beautyboostr::utils::{log_data_error, log_generic_error, print_ingredient};
use beautyboostr::Catalog;
use clap::Parser;
use std::path::PathBuf;
use std::process;

/// Show what the catalog knows about one ingredient.
#[derive(Debug, Parser)]
#[command(name = "lookup-ingredient", version, about)]
struct Args {
    /// INCI name, alias or a close spelling
    name: String,

    /// Only show suitability for this skin type
    #[arg(short, long)]
    skin_type: Option<String>,

    /// Directory holding the reference tables
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let data_dir = args
        .data_dir
        .unwrap_or_else(|| settings().data.dir.clone());
    let catalog = match Catalog::load(&data_dir) {
        Ok(catalog) => catalog,
        Err(e) => {
            log_data_error(&e.to_string());
            process::exit(1);
        }
    };

    let skin = match args.skin_type.as_deref().map(|id| catalog.skin_type(id)) {
        Some(Ok(skin)) => Some(skin),
        Some(Err(e)) => {
            log_generic_error("Skin type error:", &e.to_string());
            process::exit(1);
        }
        None => None,
    };

    match catalog.require_ingredient(&args.name) {
        Ok(ingredient) => print_ingredient(ingredient, &catalog, skin),
        Err(e) => {
            log_generic_error("Lookup error:", &e.to_string());
            process::exit(1);
        }
    }
}
