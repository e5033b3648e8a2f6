//! Error types for formatting and negotiation.

use thiserror::Error;

/// Result type alias using [`FormatError`].
pub type FormatResult<T> = Result<T, FormatError>;

/// Errors raised while producing a representation.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The rendered tree could not be serialized.
    #[error("failed to serialize representation: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A format name was referenced that is not registered.
    #[error("unknown format '{0}'")]
    UnknownFormat(String),

    /// A formatter refused to render the input.
    #[error("format '{format}' cannot render this entity: {reason}")]
    Unsupported {
        /// Format name
        format: String,
        /// Why rendering was refused
        reason: String,
    },
}

impl FormatError {
    /// Creates an [`FormatError::Unsupported`] error.
    #[must_use]
    pub fn unsupported(format: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            format: format.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FormatError::UnknownFormat("xml".to_string()).to_string(),
            "unknown format 'xml'"
        );
        assert_eq!(
            FormatError::unsupported("csv", "nested entities").to_string(),
            "format 'csv' cannot render this entity: nested entities"
        );
    }
}
