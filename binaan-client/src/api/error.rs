//! Error taxonomy for backend calls
//!
//! Every failure a request can produce ends up as one [`ApiError`]. Thunks
//! turn it into a user-facing message with [`ApiError::user_message`], which
//! prefers what the server said and otherwise falls back to the operation's
//! own message ("Failed to fetch kurikulum list").

use std::collections::BTreeMap;
use std::time::Duration;

use binaan_dispatch::Rejection;
use serde_json::Value;
use thiserror::Error;

/// Field name -> messages, as sent with a 422 response
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received
    #[error("{0}")]
    Transport(String),

    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Non-2xx response; `message` is the body's `message` field if any
    #[error("request failed with status code {status}")]
    Status { status: u16, message: Option<String> },

    /// 422 with per-field messages
    #[error("{message}")]
    Validation { message: String, errors: FieldErrors },

    /// 2xx response with `success: false`
    #[error("{0}")]
    Rejected(String),

    /// `success: true` but no `data`
    #[error("response has no data")]
    MissingData,

    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request could not be built (bad path, unreadable attachment)
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Classify a non-2xx response from its status and raw body
    pub fn from_response(status: u16, body: &str) -> Self {
        let json: Value = serde_json::from_str(body).unwrap_or(Value::Null);
        let message = json
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map(str::to_owned);

        if status == 422 {
            let errors = field_errors(json.get("errors"));
            if !errors.is_empty() {
                return ApiError::Validation {
                    message: message.unwrap_or_else(|| "The given data was invalid.".into()),
                    errors,
                };
            }
        }

        ApiError::Status { status, message }
    }

    pub fn from_transport(err: reqwest::Error, timeout: Option<Duration>) -> Self {
        match timeout {
            Some(limit) if err.is_timeout() => ApiError::Timeout(limit),
            _ => ApiError::Transport(err.to_string()),
        }
    }

    /// HTTP status if the server answered with an error
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Validation { .. } => Some(422),
            _ => None,
        }
    }

    /// Message to show the user.
    ///
    /// Validation errors are flattened one message per line. A server
    /// message wins over `fallback`; a bare status code never reaches the
    /// user.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Validation { message, errors } => {
                let lines: Vec<&str> = errors.values().flatten().map(String::as_str).collect();
                if lines.is_empty() {
                    message.clone()
                } else {
                    lines.join("\n")
                }
            }
            ApiError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Status { message: None, .. } => fallback.to_string(),
            ApiError::Rejected(message) | ApiError::Transport(message) => {
                if message.trim().is_empty() {
                    fallback.to_string()
                } else {
                    message.clone()
                }
            }
            ApiError::MissingData | ApiError::Decode(_) => format!("{fallback}: {self}"),
            ApiError::Timeout(_) | ApiError::InvalidRequest(_) => self.to_string(),
        }
    }

    /// Convert into the rejection a thunk settles with
    pub fn reject(self, fallback: &str) -> Rejection {
        Rejection::new(self.user_message(fallback))
    }
}

fn field_errors(errors: Option<&Value>) -> FieldErrors {
    let Some(Value::Object(map)) = errors else {
        return FieldErrors::new();
    };

    map.iter()
        .map(|(field, messages)| {
            let messages = match messages {
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect(),
                Value::String(single) => vec![single.clone()],
                _ => Vec::new(),
            };
            (field.clone(), messages)
        })
        .filter(|(_, messages): &(String, Vec<String>)| !messages.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_flattened() {
        let body = r#"{
            "message": "The given data was invalid.",
            "errors": {
                "nama_kurikulum": ["Nama kurikulum wajib diisi."],
                "tahun_berlaku": ["Tahun berlaku harus angka.", "Tahun berlaku minimal 2000."]
            }
        }"#;
        let err = ApiError::from_response(422, body);

        assert_eq!(err.status(), Some(422));
        assert_eq!(
            err.user_message("Failed to create kurikulum"),
            "Nama kurikulum wajib diisi.\nTahun berlaku harus angka.\nTahun berlaku minimal 2000."
        );
    }

    #[test]
    fn test_422_without_field_errors_is_a_status_error() {
        let err = ApiError::from_response(422, r#"{"message":"Periode sudah ditutup"}"#);
        assert!(matches!(err, ApiError::Status { status: 422, .. }));
        assert_eq!(err.user_message("fallback"), "Periode sudah ditutup");
    }

    #[test]
    fn test_server_message_wins_over_fallback() {
        let err = ApiError::from_response(403, r#"{"success":false,"message":"Akses ditolak"}"#);
        assert_eq!(err.user_message("Failed to fetch tutor report"), "Akses ditolak");
    }

    #[test]
    fn test_status_without_body_uses_fallback() {
        let err = ApiError::from_response(500, "");
        assert_eq!(
            err.user_message("Failed to fetch kurikulum list"),
            "Failed to fetch kurikulum list"
        );

        let html = ApiError::from_response(502, "<html>Bad Gateway</html>");
        assert_eq!(html.user_message("Failed"), "Failed");
    }

    #[test]
    fn test_transport_message_is_kept() {
        let err = ApiError::Transport("connection refused".into());
        assert_eq!(err.user_message("Failed"), "connection refused");
        assert_eq!(ApiError::Transport(String::new()).user_message("Failed"), "Failed");
    }

    #[test]
    fn test_shape_errors_mention_the_operation() {
        assert_eq!(
            ApiError::MissingData.user_message("Failed to fetch raport detail"),
            "Failed to fetch raport detail: response has no data"
        );
    }

    #[test]
    fn test_reject_carries_user_message() {
        let rejection = ApiError::Rejected("Data tidak ditemukan".into()).reject("Failed");
        assert_eq!(rejection.message(), "Data tidak ditemukan");
    }
}
