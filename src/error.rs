use thiserror::Error;

#[derive(Error, Debug)]
pub enum WandError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Invalid spell '{spell_id}': {reason}")]
    InvalidSpell { spell_id: String, reason: String },

    #[error("Unknown spell '{0}'")]
    UnknownSpell(String),

    #[error("Duplicate spell id '{0}'")]
    DuplicateSpell(String),
}

pub type WfResult<T> = Result<T, WandError>;
