//! Response envelope shared by the enterprise and chat endpoints.
//!
//! Every remote endpoint answers `{code, data, message}`; success is
//! signalled by `code == 0`. Failed responses commonly carry `data: false`,
//! so `data` is decoded leniently: `null`, `false` and a missing field all
//! become `None`.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::BridgeError;

/// Well-known result codes.
pub struct RetCode;

impl RetCode {
    pub const SUCCESS: i64 = 0;
    /// Generic client-side failure code used when the server supplied none.
    pub const FAILURE: i64 = 1;
}

/// Decoded `{code, data, message}` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct ApiEnvelope<T> {
    pub code: i64,

    #[serde(default, deserialize_with = "lenient_data")]
    pub data: Option<T>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
}

impl<T> ApiEnvelope<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            code: RetCode::SUCCESS,
            data: Some(data),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == RetCode::SUCCESS
    }

    /// Split into data or a rejection.
    ///
    /// A zero code without data is treated as a rejection as well: callers
    /// that need a payload cannot proceed without one.
    pub fn into_result(self) -> Result<T, BridgeError> {
        match (self.code, self.data) {
            (RetCode::SUCCESS, Some(data)) => Ok(data),
            (code, _) => Err(BridgeError::rejected(code, self.message)),
        }
    }
}

impl<T> From<Failure> for ApiEnvelope<T> {
    fn from(value: Failure) -> Self {
        Self {
            code: value.code,
            data: None,
            message: value.message,
        }
    }
}

/// Uniform failure value returned by every bridge operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub code: i64,
    pub message: String,
}

impl Failure {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Convert a bridge error, using `fallback` for faults and for
    /// rejections that arrived without a message.
    pub fn from_error(err: &BridgeError, fallback: &str) -> Self {
        match err {
            BridgeError::Rejected { code, message } => {
                // A zero code only gets here when data was missing.
                let code = if *code == RetCode::SUCCESS { RetCode::FAILURE } else { *code };
                let message = if message.is_empty() { fallback } else { message.as_str() };
                Self::new(code, message)
            }
            BridgeError::MissingCredential => Self::new(RetCode::FAILURE, err.to_string()),
            BridgeError::Transport(_) | BridgeError::Parse(_) => {
                Self::new(RetCode::FAILURE, fallback)
            }
        }
    }
}

impl core::fmt::Display for Failure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

fn lenient_data<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null | serde_json::Value::Bool(false) => Ok(None),
        other => serde_json::from_value(other).map(Some).map_err(D::Error::custom),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
