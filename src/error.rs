use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("unknown ingredient: {0}")]
    UnknownIngredient(String),

    #[error("invalid skin type: {0} (expected one of the 36 skin type ids or 1-36)")]
    InvalidSkinType(String),

    #[error("cannot score empty list")]
    EmptyInput,

    #[error("missing config: {0}")]
    MissingConfig(String),

    #[error("invalid table {table}: {reason}")]
    InvalidTable { table: String, reason: String },

    #[error("failed to parse {table}: {source}")]
    Json {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

impl AnalysisError {
    pub fn invalid_table(table: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTable {
            table: table.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_message() {
        assert_eq!(AnalysisError::EmptyInput.to_string(), "cannot score empty list");
    }

    #[test]
    fn test_messages_name_the_input() {
        assert_eq!(
            AnalysisError::UnknownIngredient("Moon Dust".into()).to_string(),
            "unknown ingredient: Moon Dust"
        );
        assert!(AnalysisError::InvalidSkinType("37".into())
            .to_string()
            .starts_with("invalid skin type: 37"));
        assert_eq!(
            AnalysisError::invalid_table("markers.json", "empty").to_string(),
            "invalid table markers.json: empty"
        );
    }
}
