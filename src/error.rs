use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Station catalog {} could not be read: {source}", path.display())]
    CatalogUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Line source {address} is unreachable: {source}")]
    SourceUnavailable {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Why a single observation line was rejected.
///
/// These never escape the stream: the caller logs them, counts them and
/// moves on to the next line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordParseError {
    #[error("line is not valid UTF-8 after byte {valid_up_to}")]
    NotUtf8 { valid_up_to: usize },

    #[error("line is {actual} bytes, need at least {required}")]
    TooShort { actual: usize, required: usize },

    #[error("field {field} is not valid ASCII")]
    NotAscii { field: &'static str },

    #[error("field {field} has non-numeric value '{value}'")]
    NotNumeric { field: &'static str, value: String },

    #[error("quality marker for {field} is missing or not a digit: '{value}'")]
    BadQuality { field: &'static str, value: String },

    #[error("invalid observation date '{0}'")]
    BadDate(String),
}
