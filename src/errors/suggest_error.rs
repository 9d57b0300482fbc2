use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestErrorKind {
    InvalidParams,
    InvalidConfig,
    Unavailable,
    Timeout,
    Status,
    Internal,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestError {
    pub kind: SuggestErrorKind,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub retryable: bool,
}

impl SuggestError {
    pub fn new(kind: SuggestErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            hint: None,
            details: None,
            retryable: matches!(kind, SuggestErrorKind::Timeout | SuggestErrorKind::Unavailable),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(SuggestErrorKind::InvalidParams, "INVALID_PARAMS", message)
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(SuggestErrorKind::InvalidConfig, "INVALID_CONFIG", message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SuggestErrorKind::Unavailable, "UNAVAILABLE", message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(SuggestErrorKind::Timeout, "TIMEOUT", message)
    }

    /// Non-200 answer from the autocomplete endpoint.
    pub fn status(status: u16) -> Self {
        Self::new(
            SuggestErrorKind::Status,
            "HTTP_STATUS",
            format!("Autocomplete endpoint answered with status {}", status),
        )
        .with_details(serde_json::json!({ "status": status }))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(SuggestErrorKind::Internal, "INTERNAL", message)
    }

    /// Exit code used by the binary.
    pub fn exit_code(&self) -> i32 {
        match self.kind {
            SuggestErrorKind::InvalidConfig | SuggestErrorKind::InvalidParams => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for SuggestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for SuggestError {}

impl From<std::io::Error> for SuggestError {
    fn from(err: std::io::Error) -> Self {
        SuggestError::internal(err.to_string())
    }
}

impl From<reqwest::Error> for SuggestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return SuggestError::timeout("Autocomplete request timed out");
        }
        if let Some(status) = err.status() {
            return SuggestError::status(status.as_u16());
        }
        SuggestError::unavailable(err.to_string())
    }
}

impl From<url::ParseError> for SuggestError {
    fn from(err: url::ParseError) -> Self {
        SuggestError::invalid_config(format!("Invalid URL: {}", err))
    }
}
