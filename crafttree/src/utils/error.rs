use thiserror::Error;

use crate::search::PathKey;

#[derive(Debug, Error)]
pub enum CraftError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration file '{file}': {source}")]
    ConfigParse {
        source: toml::de::Error,
        file: String,
    },

    #[error("Failed to decode solver output: {0}")]
    Json(#[from] serde_json::Error),

    /// A path entry of the solver output is not usable at all (e.g. not an array).
    #[error("Path `{key}` is not a valid recipe path: {reason}")]
    InvalidPath { key: PathKey, reason: String },

    #[error("No live session registered for path `{0}`")]
    SessionNotFound(PathKey),

    #[error("An unknown error occurred: {0}")]
    Unknown(String),
}

pub type CraftResult<T> = Result<T, CraftError>;
