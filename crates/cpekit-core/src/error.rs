//! Error types for the cpekit engine

use thiserror::Error;

use crate::attribute::Attribute;
use crate::version::CpeVersion;

/// Result type alias using the cpekit Error
pub type Result<T> = std::result::Result<T, Error>;

/// Cpekit error types
///
/// Errors surface at the ingest boundary of a name or an applicability
/// document, or when a cross-version emission cannot preserve semantics.
/// Matching never constructs an error: incomparable operands simply do
/// not match.
#[derive(Error, Debug)]
pub enum Error {
    // === Component Errors ===
    #[error("Unknown attribute: {0}")]
    InvalidAttribute(String),

    #[error("Invalid value for attribute '{attribute}': {value}")]
    InvalidValue { attribute: Attribute, value: String },

    // === Name Errors ===
    #[error("Malformed CPE {version} name '{input}': {reason}")]
    InvalidFormat {
        version: CpeVersion,
        input: String,
        reason: String,
    },

    #[error("Incompatible conversion from {from_version} to {target}: {reason}")]
    Incompatible {
        from_version: CpeVersion,
        target: String,
        reason: String,
    },

    // === Applicability Language Errors ===
    #[error("Invalid applicability expression at {location}: {reason}")]
    InvalidExpression { location: String, reason: String },

    // === Operation Errors ===
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Get an error code for logging/metrics
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidAttribute(_) => "INVALID_ATTRIBUTE",
            Error::InvalidValue { .. } => "INVALID_VALUE",
            Error::InvalidFormat { .. } => "INVALID_FORMAT",
            Error::Incompatible { .. } => "INCOMPATIBLE",
            Error::InvalidExpression { .. } => "INVALID_EXPRESSION",
            Error::UnsupportedOperation(_) => "UNSUPPORTED_OPERATION",
            Error::Io(_) => "IO_ERROR",
            Error::Json(_) => "JSON_ERROR",
        }
    }

    /// Check if this error was raised while parsing a name
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            Error::InvalidAttribute(_)
                | Error::InvalidValue { .. }
                | Error::InvalidFormat { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = Error::InvalidAttribute("invented".into());
        assert_eq!(err.code(), "INVALID_ATTRIBUTE");
        assert!(err.is_parse());

        let err = Error::Incompatible {
            from_version: CpeVersion::V1_1,
            target: "2.3 formatted string".into(),
            reason: "name has more than one element".into(),
        };
        assert_eq!(err.code(), "INCOMPATIBLE");
        assert!(!err.is_parse());
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidValue {
            attribute: Attribute::Part,
            value: "j".into(),
        };
        assert_eq!(err.to_string(), "Invalid value for attribute 'part': j");
    }
}
