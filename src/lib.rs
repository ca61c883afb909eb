pub mod analysis;
pub mod catalog;
pub mod error;
pub mod scoring;
pub mod settings;
pub mod utils;

pub use analysis::{run_full_analysis, Analysis, AnalysisRequest};
pub use catalog::Catalog;
pub use error::{AnalysisError, Result};
