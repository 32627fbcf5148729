//! Bridge error model.

use thiserror::Error;

/// Result type used across the client and chat layers.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Failure taxonomy for remote operations.
///
/// Every variant is converted into a [`crate::Failure`] at the operation
/// boundary; UI-facing code never sees this type directly. A missing
/// permission rule is not an error at all (it allows).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// No authorization credential is stored; no network call was made.
    #[error("No authorization")]
    MissingCredential,

    /// The remote endpoint could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// The server answered with a non-zero result code.
    #[error("rejected ({code}): {message}")]
    Rejected { code: i64, message: String },
}

impl BridgeError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn rejected(code: i64, message: impl Into<String>) -> Self {
        Self::Rejected {
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_displays_server_compatible_message() {
        assert_eq!(BridgeError::MissingCredential.to_string(), "No authorization");
    }
}
