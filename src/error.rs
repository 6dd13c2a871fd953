//! Error types for shrubnet

use thiserror::Error;

/// Result type alias for shrubnet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in shrubnet operations
///
/// A lookup that finds no containing network is not an error; it is
/// reported as `Ok(None)`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not parse {input:?} as IP address or CIDR: {reason}")]
    AddressParse { input: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn address_parse(input: &str, reason: impl ToString) -> Self {
        Error::AddressParse {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error came from an unparsable address or network
    pub fn is_address_parse(&self) -> bool {
        matches!(self, Error::AddressParse { .. })
    }
}
