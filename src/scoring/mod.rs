pub mod breakdown;
pub mod matcher;
pub mod narrative;
pub mod parser;
pub mod routine;
pub mod score;

pub use breakdown::{build_breakdown, heuristic_functions, FormulaBreakdown, ImpactClass};
pub use matcher::{resolve, MatchKind, Resolution};
pub use narrative::{generate_narrative, TemplateBucket};
pub use parser::{parse_ingredients, ConcentrationTier, IngredientToken, MarkerSet, ParsedProduct};
pub use routine::{find_placements, RoutinePlacement};
pub use score::{score_product, DuplicateIngredient, MatchedIngredient, ScoreResult};
