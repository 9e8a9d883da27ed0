//! Error types for the API client and the classifier that produces them.

use serde::Deserialize;
use serde_json::Value;

/// Message used when the response body carries none.
pub const DEFAULT_MESSAGE: &str = "API request failed";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One field-level complaint from a 400 response's `validationErrors`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct FieldError {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// Any failure without a more specific kind. `status` is 0 when no response exists.
    #[error("{message} (status {status})")]
    Api {
        message: String,
        status: u16,
        body: Option<Value>,
        #[source]
        source: Option<BoxError>,
    },
    /// HTTP 400 carrying field-level validation errors.
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
        body: Option<Value>,
    },
    /// HTTP 401.
    #[error("Authentication failed: {message}")]
    Authentication { message: String, body: Option<Value> },
    /// HTTP 429, with the server's hint in seconds when it sent one.
    #[error("Rate limited: {message}")]
    RateLimit {
        message: String,
        retry_after: Option<u64>,
        body: Option<Value>,
    },
    /// The request never got a response (refused, reset, timed out).
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    pub fn message(&self) -> &str {
        match self {
            ApiError::Api { message, .. }
            | ApiError::Validation { message, .. }
            | ApiError::Authentication { message, .. }
            | ApiError::RateLimit { message, .. }
            | ApiError::Network { message, .. } => message,
        }
    }

    /// HTTP status of the failed response, or 0 when there was none.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Api { status, .. } => *status,
            ApiError::Validation { .. } => 400,
            ApiError::Authentication { .. } => 401,
            ApiError::RateLimit { .. } => 429,
            ApiError::Network { .. } => 0,
        }
    }

    pub fn body(&self) -> Option<&Value> {
        match self {
            ApiError::Api { body, .. }
            | ApiError::Validation { body, .. }
            | ApiError::Authentication { body, .. }
            | ApiError::RateLimit { body, .. } => body.as_ref(),
            ApiError::Network { .. } => None,
        }
    }

    /// Transient failures: no response at all, or a 5xx.
    ///
    /// Validation, authentication and rate-limit errors are never retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network { .. } => true,
            ApiError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Wraps an arbitrary cause as a status-0 base error.
    pub fn other(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ApiError::Api {
            message: message.into(),
            status: 0,
            body: None,
            source: Some(source.into()),
        }
    }
}

/// What went wrong with one attempt, before classification.
#[derive(Debug)]
pub enum TransportFailure {
    /// The server answered with a non-2xx status.
    Response {
        status: u16,
        body: Option<Value>,
        /// `Retry-After` header in seconds, if present and numeric.
        retry_after_header: Option<u64>,
    },
    /// Connection-level failure: refused, reset, or timed out.
    Connection(reqwest::Error),
    /// Anything else raised while performing the attempt.
    Other(BoxError),
}

/// Maps a failed attempt onto the [`ApiError`] taxonomy.
pub fn classify(failure: TransportFailure) -> ApiError {
    match failure {
        TransportFailure::Response {
            status,
            body,
            retry_after_header,
        } => {
            let message = resolve_message(body.as_ref());
            match status {
                400 => match body.as_ref().and_then(validation_errors) {
                    Some(errors) => ApiError::Validation {
                        message,
                        errors,
                        body,
                    },
                    None => ApiError::Api {
                        message,
                        status,
                        body,
                        source: None,
                    },
                },
                401 => ApiError::Authentication { message, body },
                429 => {
                    let retry_after = body
                        .as_ref()
                        .and_then(|b| b.get("retryAfter"))
                        .and_then(value_as_seconds)
                        .or(retry_after_header);
                    ApiError::RateLimit {
                        message,
                        retry_after,
                        body,
                    }
                }
                _ => ApiError::Api {
                    message,
                    status,
                    body,
                    source: None,
                },
            }
        }
        TransportFailure::Connection(source) => ApiError::Network {
            message: source.to_string(),
            source,
        },
        TransportFailure::Other(source) => ApiError::Api {
            message: source.to_string(),
            status: 0,
            body: None,
            source: Some(source),
        },
    }
}

fn resolve_message(body: Option<&Value>) -> String {
    body.and_then(|b| {
        ["message", "error"]
            .iter()
            .find_map(|key| b.get(key).and_then(Value::as_str))
    })
    .unwrap_or(DEFAULT_MESSAGE)
    .to_string()
}

fn validation_errors(body: &Value) -> Option<Vec<FieldError>> {
    let entries = body.get("validationErrors")?.as_array()?;
    Some(
        entries
            .iter()
            .map(|entry| match entry {
                Value::String(message) => FieldError {
                    message: Some(message.clone()),
                    ..Default::default()
                },
                other => FieldError::deserialize(other).unwrap_or_default(),
            })
            .collect(),
    )
}

fn value_as_seconds(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
