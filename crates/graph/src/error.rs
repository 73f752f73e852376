use ethica_facts::{FactsError, OracleError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Inference failed: {0}")]
    Oracle(#[from] OracleError),

    #[error("Fact loading failed: {0}")]
    Facts(#[from] FactsError),

    #[error("Configuration is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
