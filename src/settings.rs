use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static SETTINGS: OnceLock<Settings> = OnceLock::new();

pub const DATA_DIR_ENV: &str = "BEAUTYBOOSTR_DATA_DIR";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data: Data,
    pub narrative: Narrative,
    pub report: Report,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Data {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Narrative {
    pub template_set: String,
    pub default_product_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub show_routines: bool,
    pub show_breakdown: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data: Data {
                dir: PathBuf::from("data"),
            },
            narrative: Narrative {
                template_set: "default".to_string(),
                default_product_name: "This product".to_string(),
            },
            report: Report {
                show_routines: true,
                show_breakdown: true,
            },
        }
    }
}

impl Settings {
    pub fn load() -> &'static Settings {
        SETTINGS.get_or_init(|| Self::load_from_files(Path::new(".")))
    }

    pub fn load_from_files(root: &Path) -> Settings {
        let default_path = root.join("settings.default.ron");
        let override_path = root.join("settings.ron");

        let mut settings = if default_path.exists() {
            fs::read_to_string(&default_path)
                .ok()
                .and_then(|content| ron::from_str(&content).ok())
                .unwrap_or_default()
        } else {
            Settings::default()
        };

        if override_path.exists() {
            if let Ok(content) = fs::read_to_string(&override_path) {
                match ron::from_str::<Settings>(&content) {
                    Ok(overrides) => settings = overrides,
                    Err(e) => tracing::warn!("ignoring {}: {e}", override_path.display()),
                }
            }
        }

        if let Ok(dir) = env::var(DATA_DIR_ENV) {
            settings.data.dir = PathBuf::from(dir);
        }

        settings
    }
}

pub fn settings() -> &'static Settings {
    Settings::load()
}
