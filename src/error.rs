//! Error types for stream publishing

use std::fmt;
use thiserror::Error;

/// Result type alias for publisher operations
pub type Result<T> = std::result::Result<T, Error>;

/// Step of the two-step shape publication that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStep {
    /// Writing the shape document itself
    ShapeDocument,
    /// Linking the shape from the stream metadata
    MetadataPatch,
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishStep::ShapeDocument => write!(f, "shape document"),
            PublishStep::MetadataPatch => write!(f, "metadata patch"),
        }
    }
}

/// Main error type for the publisher
#[derive(Error, Debug)]
pub enum Error {
    /// Resource is missing a usable timestamp, or violates a serializer precondition
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Resource timestamp precedes the oldest bucket boundary
    #[error("Timestamp {timestamp} precedes the oldest bucket boundary {oldest}")]
    OutOfRange {
        /// Resource timestamp in milliseconds
        timestamp: i64,
        /// Oldest boundary in milliseconds
        oldest: i64,
    },

    /// A storage call failed or answered with a non-2xx status
    #[error("Transport error during {step} on {url}: {message}")]
    Transport {
        /// What the orchestrator was doing
        step: String,
        /// Target URL
        url: String,
        /// Response status, when a response was received
        status: Option<u16>,
        /// Response body or client error
        message: String,
    },

    /// Shape publication stopped halfway
    #[error("Shape publication failed at the {step} step: {source}")]
    ShapePublish {
        /// The step that failed; earlier steps already succeeded
        step: PublishStep,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// RDF syntax error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (config) error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error rejects a single resource rather than the whole run.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::MalformedInput(_) | Error::OutOfRange { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MalformedInput("no timestamp".to_string());
        assert_eq!(err.to_string(), "Malformed input: no timestamp");

        let err = Error::OutOfRange { timestamp: 5, oldest: 10 };
        assert_eq!(err.to_string(), "Timestamp 5 precedes the oldest bucket boundary 10");
    }

    #[test]
    fn test_shape_publish_names_the_step() {
        let err = Error::ShapePublish {
            step: PublishStep::MetadataPatch,
            source: Box::new(Error::Parse("boom".to_string())),
        };
        assert!(err.to_string().contains("metadata patch"));
    }

    #[test]
    fn test_rejection_classification() {
        assert!(Error::MalformedInput(String::new()).is_rejection());
        assert!(Error::OutOfRange { timestamp: 0, oldest: 1 }.is_rejection());
        assert!(!Error::Config(String::new()).is_rejection());
    }
}
