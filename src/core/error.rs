use std::io;
use std::time::Duration;
use thiserror::Error;

/// Unified error type for reelchat.
///
/// `Api`, `Network` and `Timeout` together are the provider failures of a
/// turn: the completion could not be started or did not finish.
#[derive(Error, Debug)]
pub enum ReelError {
    /// Completion API errors (bad status, malformed stream, empty reply)
    #[error("API error: {0}")]
    Api(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input errors
    #[error("Input error: {0}")]
    Input(String),

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(String),

    /// The completion did not finish within the configured bound
    #[error("Completion timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Movie data lookup errors
    #[error("Lookup error: {0}")]
    Lookup(String),
}

/// Failures while turning a reply into a function call. All of them are
/// reported to the user and end only the dispatch, never the session.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// Required arguments missing; carries the prompt shown to the user
    #[error("{0}")]
    Validation(String),

    /// The reply looked like JSON but did not match the call schema
    #[error("invalid function call payload: {0}")]
    Parse(String),

    /// Missing or unknown `function` value
    #[error("unsupported function: {0}")]
    UnsupportedFunction(String),

    /// The lookup itself failed
    #[error("lookup failed: {0}")]
    Lookup(String),
}

impl ReelError {
    /// Whether the completion provider is to blame for a failed turn.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            ReelError::Api(_) | ReelError::Network(_) | ReelError::Timeout(_)
        )
    }
}

impl DispatchError {
    pub const INVALID_JSON: &'static str = "Invalid JSON format for function call.";
    pub const UNSUPPORTED: &'static str = "Unsupported function call.";

    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            DispatchError::Validation(prompt) => prompt.clone(),
            DispatchError::Parse(_) => Self::INVALID_JSON.to_string(),
            DispatchError::UnsupportedFunction(_) => Self::UNSUPPORTED.to_string(),
            DispatchError::Lookup(reason) => format!("Lookup failed: {}", reason),
        }
    }
}

impl From<reqwest::Error> for ReelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ReelError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            ReelError::Network(format!("Connection failed: {}", err))
        } else if err.is_status() {
            ReelError::Api(format!("API returned error status: {}", err))
        } else {
            ReelError::Network(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for ReelError {
    fn from(err: serde_json::Error) -> Self {
        ReelError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<serde_yml::Error> for ReelError {
    fn from(err: serde_yml::Error) -> Self {
        ReelError::Serialization(format!("YAML error: {}", err))
    }
}
