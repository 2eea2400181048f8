use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library.
///
/// A missing record is not an error: lookups return `Option`. The filter
/// engine never fails; everything here comes from the data boundary or from
/// parsing user-supplied text.
#[derive(Error, Debug)]
pub enum Error {
    #[error("data provider failure: {0:#}")]
    Provider(#[from] anyhow::Error),

    #[error("invalid filing record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    #[error("duplicate filing identifier: {0}")]
    DuplicateId(String),

    #[error("unknown {kind}: {value:?}")]
    UnknownValue { kind: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn unknown(kind: &'static str, value: &str) -> Self {
        Error::UnknownValue {
            kind,
            value: value.to_string(),
        }
    }
}
