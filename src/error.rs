//! @ai:module:intent Define error types for the benchmark core
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Unified error type for mapping, aggregation and benchmark operations
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed equivalence file. Recovered by the registry.
    #[error("Mapping '{name}' unavailable: {reason}")]
    Configuration { name: String, reason: String },

    /// A symbol assigned to two classes while building a projection.
    #[error("Projection error: symbol {symbol} found in both '{first}' and '{second}'")]
    Consistency {
        symbol: String,
        first: String,
        second: String,
    },

    #[error("Service '{service}' not available: {reason}")]
    ClassifierUnavailable { service: String, reason: String },

    #[error("Service '{service}' could not be loaded: {reason}")]
    ServiceLoad { service: String, reason: String },

    #[error("Unsupported service: {0}")]
    UnknownService(String),

    #[error("Non numeric score for answer {symbol}")]
    NonNumericScore { symbol: String },

    #[error("Malformed strokes for sample {symbol}: {reason}")]
    MalformedStrokes { symbol: String, reason: String },

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// @ai:intent Whether the registry may recover from this error with the identity mapping
    /// @ai:effects pure
    pub fn is_recoverable_mapping_error(&self) -> bool {
        matches!(
            self,
            Error::Configuration { .. } | Error::Consistency { .. } | Error::FileRead { .. } | Error::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistency_error_message() {
        let err = Error::Consistency {
            symbol: "\\sum".to_string(),
            first: "sum".to_string(),
            second: "Sigma".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Projection error: symbol \\sum found in both 'sum' and 'Sigma'"
        );
        assert!(err.is_recoverable_mapping_error());
    }

    #[test]
    fn test_classifier_error_is_not_recoverable() {
        let err = Error::ClassifierUnavailable {
            service: "hwrt".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(!err.is_recoverable_mapping_error());
    }
}
