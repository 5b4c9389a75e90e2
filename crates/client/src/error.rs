//! Errors surfaced by the Covu API client.

use covu_core::validate::ValidationError;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::storage::StorageError;

/// Generic text shown for failures the user can do nothing about.
const GENERIC_SERVER_MESSAGE: &str = "Something went wrong on our side. Please try again.";
const GENERIC_NETWORK_MESSAGE: &str = "Could not reach Covu. Check your connection and try again.";

/// Why the session could not be renewed.
///
/// Cloneable because one failure is handed to every request that was
/// waiting on the same refresh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshFailure {
    #[error("no refresh token stored")]
    MissingRefreshToken,

    #[error("refresh rejected with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("refresh request failed: {0}")]
    Transport(String),

    #[error("could not access stored tokens: {0}")]
    Storage(String),
}

/// Errors that can occur when talking to the Covu API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 401 that refreshing the session could not fix.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Any other 4xx response.
    #[error("HTTP {status}: {message}")]
    Client { status: StatusCode, message: String },

    /// 5xx response.
    #[error("Server error: HTTP {status}")]
    Server { status: StatusCode, body: String },

    /// The session is gone and the user must sign in again.
    #[error("Session expired: {0}")]
    SessionExpired(RefreshFailure),

    /// The refresh this request was waiting on was abandoned.
    #[error("Token refresh was abandoned before completing")]
    RefreshAborted,

    /// The response body did not have the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Local storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Input rejected before any request was sent.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl ApiError {
    /// Build the error for a non-success response.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = extract_message(body);
        if status == StatusCode::UNAUTHORIZED {
            Self::Unauthorized { message }
        } else if status.is_server_error() {
            Self::Server {
                status,
                body: body.chars().take(500).collect(),
            }
        } else {
            Self::Client { status, message }
        }
    }

    /// HTTP status, when the error came from a response.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Client { status, .. } | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the user has to sign in again.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. } | Self::SessionExpired(_) | Self::RefreshAborted
        )
    }

    /// Text suitable for showing to the user.
    ///
    /// Backend validation messages and local validation errors are shown
    /// verbatim; server and network failures get a generic message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Client { message, .. } | Self::Unauthorized { message } => message.clone(),
            Self::Invalid(e) => capitalize(&e.to_string()),
            Self::SessionExpired(_) | Self::RefreshAborted => {
                "Your session has expired. Please log in again.".to_owned()
            }
            Self::Server { .. } | Self::Parse(_) => GENERIC_SERVER_MESSAGE.to_owned(),
            Self::Http(_) => GENERIC_NETWORK_MESSAGE.to_owned(),
            Self::Storage(e) => format!("Could not access local data: {e}"),
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Tries `message`, `detail`, `error`, `non_field_errors`, then the first
/// field error (`{"email": ["already taken"]}`), and falls back to the raw
/// body.
pub(crate) fn extract_message(body: &str) -> String {
    let fallback = || {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            "Request failed".to_owned()
        } else {
            trimmed.chars().take(200).collect()
        }
    };

    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
        return fallback();
    };

    for key in ["message", "detail", "error", "non_field_errors"] {
        if let Some(text) = map.get(key).and_then(first_text) {
            return text;
        }
    }

    map.iter()
        .find_map(|(field, value)| first_text(value).map(|text| format!("{field}: {text}")))
        .unwrap_or_else(fallback)
}

fn first_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(first_text),
        _ => None,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_keys_in_order() {
        assert_eq!(extract_message(r#"{"message":"Out of stock"}"#), "Out of stock");
        assert_eq!(
            extract_message(r#"{"detail":"Not found.","error":"x"}"#),
            "Not found."
        );
        assert_eq!(
            extract_message(r#"{"non_field_errors":["Invalid credentials"]}"#),
            "Invalid credentials"
        );
    }

    #[test]
    fn test_extract_message_first_field_error() {
        assert_eq!(
            extract_message(r#"{"email":["user with this email already exists."]}"#),
            "email: user with this email already exists."
        );
    }

    #[test]
    fn test_extract_message_falls_back_to_body() {
        assert_eq!(extract_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(extract_message(""), "Request failed");
        assert_eq!(extract_message(r#"{"count":1}"#), r#"{"count":1}"#);
    }

    #[test]
    fn test_from_response_classifies_status() {
        assert!(matches!(
            ApiError::from_response(StatusCode::UNAUTHORIZED, "{}"),
            ApiError::Unauthorized { .. }
        ));
        assert!(matches!(
            ApiError::from_response(StatusCode::BAD_REQUEST, r#"{"detail":"nope"}"#),
            ApiError::Client { message, .. } if message == "nope"
        ));
        assert!(matches!(
            ApiError::from_response(StatusCode::BAD_GATEWAY, "upstream"),
            ApiError::Server { .. }
        ));
    }

    #[test]
    fn test_user_message_hides_server_details() {
        let server = ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, "Traceback ...");
        assert_eq!(server.user_message(), GENERIC_SERVER_MESSAGE);

        let client = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"error":"Insufficient wallet balance"}"#,
        );
        assert_eq!(client.user_message(), "Insufficient wallet balance");

        let invalid = ApiError::Invalid(ValidationError::EmptyCart);
        assert_eq!(invalid.user_message(), "Your cart is empty");
    }

    #[test]
    fn test_auth_failures() {
        assert!(ApiError::SessionExpired(RefreshFailure::MissingRefreshToken).is_auth_failure());
        assert!(ApiError::RefreshAborted.is_auth_failure());
        assert!(!ApiError::Invalid(ValidationError::ZeroQuantity).is_auth_failure());
    }
}
