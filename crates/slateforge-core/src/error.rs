use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlateForgeError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Error: {0}")]
    Data(String),

    #[error("Infeasible: {0}")]
    Infeasible(String),
}

pub type SfResult<T> = Result<T, SlateForgeError>;
