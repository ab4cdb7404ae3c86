//! # Error Handling
//!
//! Crate-level error types plus the remote error classifier: a pure mapping
//! from `(HTTP status | none, vendor body, fallback message)` into a closed
//! taxonomy of error codes, each carrying a retryability flag and a severity.
//! The classifier is the single authority on whether a remote failure is
//! worth retrying.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::models::LogLevel;

/// Closed taxonomy of remote API failure codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    SuspendedPayment,
    Unauthorized,
    RateLimit,
    Network,
    NotFound,
    ServerError,
    BadRequest,
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::SuspendedPayment => "SUSPENDED_PAYMENT",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::RateLimit => "RATE_LIMIT",
            ErrorCode::Network => "NETWORK",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ServerError => "SERVER_ERROR",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }
}

/// Outcome of classifying one remote failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub code: ErrorCode,
    /// HTTP status, or `None` for connectivity failures with no response
    pub status: Option<u16>,
    pub message: String,
    pub retryable: bool,
    pub severity: LogLevel,
}

/// Classify a remote failure into the closed taxonomy.
///
/// Precedence: connectivity failures first, then vendor-semantic error codes
/// from the response body, then the raw HTTP status. Vendor codes must win
/// over the status fallback: a 403 caused by billing suspension is a
/// `SUSPENDED_PAYMENT`, not a generic `UNAUTHORIZED`.
pub fn classify(status: Option<u16>, body: Option<&JsonValue>, fallback: &str) -> Classification {
    let message = extract_message(body).unwrap_or_else(|| fallback.to_string());

    let status = match status {
        None => {
            return Classification {
                code: ErrorCode::Network,
                status: None,
                message,
                retryable: true,
                severity: LogLevel::Error,
            };
        }
        Some(status) => status,
    };

    if let Some(vendor_code) = extract_vendor_code(body) {
        match vendor_code.as_str() {
            "SUSPENDED_PAYMENT" => {
                // Billing problem; retrying cannot help.
                return Classification {
                    code: ErrorCode::SuspendedPayment,
                    status: Some(status),
                    message,
                    retryable: false,
                    severity: LogLevel::Error,
                };
            }
            "RATE_LIMIT_EXCEEDED" | "RATE_LIMIT" => {
                return Classification {
                    code: ErrorCode::RateLimit,
                    status: Some(status),
                    message,
                    retryable: true,
                    severity: LogLevel::Warn,
                };
            }
            "AUTHENTICATION_DENIED" | "AUTHENTICATING_PROXY_DENIED" => {
                return Classification {
                    code: ErrorCode::Unauthorized,
                    status: Some(status),
                    message,
                    retryable: false,
                    severity: LogLevel::Error,
                };
            }
            _ => {}
        }
    }

    let (code, retryable, severity) = match status {
        400 => (ErrorCode::BadRequest, false, LogLevel::Error),
        401 | 403 => (ErrorCode::Unauthorized, false, LogLevel::Error),
        404 => (ErrorCode::NotFound, false, LogLevel::Error),
        429 => (ErrorCode::RateLimit, true, LogLevel::Warn),
        s if s >= 500 => (ErrorCode::ServerError, true, LogLevel::Error),
        // Conservative default: unrecognized failures are retried rather
        // than silently treated as permanent.
        _ => (ErrorCode::Unknown, true, LogLevel::Error),
    };

    Classification {
        code,
        status: Some(status),
        message,
        retryable,
        severity,
    }
}

fn extract_vendor_code(body: Option<&JsonValue>) -> Option<String> {
    body?.get("errorCode")?.as_str().map(|s| s.to_string())
}

fn extract_message(body: Option<&JsonValue>) -> Option<String> {
    let body = body?;
    if let Some(first) = body
        .get("errorMessages")
        .and_then(|v| v.as_array())
        .and_then(|a| a.first())
        .and_then(|m| m.as_str())
    {
        return Some(first.to_string());
    }
    body.get("message")
        .and_then(|m| m.as_str())
        .map(|s| s.to_string())
}

/// A classified remote API failure.
#[derive(Debug, Clone, Error)]
#[error("{} ({}): {}", .classification.code.as_str(), .classification.status.map(|s| s.to_string()).unwrap_or_else(|| "no response".to_string()), .classification.message)]
pub struct RemoteError {
    pub classification: Classification,
}

impl RemoteError {
    pub fn new(classification: Classification) -> Self {
        Self { classification }
    }

    pub fn code(&self) -> ErrorCode {
        self.classification.code
    }

    pub fn retryable(&self) -> bool {
        self.classification.retryable
    }
}

impl From<Classification> for RemoteError {
    fn from(classification: Classification) -> Self {
        Self { classification }
    }
}

/// Crate-level error for the sync engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("remote API error: {0}")]
    Remote(#[from] RemoteError),

    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    #[error("credential error: {0}")]
    Crypto(#[from] crate::crypto::CryptoError),

    #[error("invalid state: {0}")]
    State(String),
}

impl EngineError {
    /// Whether the workflow driver should keep retrying the run.
    ///
    /// Only classified-retryable remote failures qualify; everything else is
    /// surfaced immediately so the schedule is not hammering a call that
    /// cannot succeed.
    pub fn retryable(&self) -> bool {
        match self {
            EngineError::Remote(e) => e.retryable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_status_is_network() {
        let c = classify(None, None, "connection refused");
        assert_eq!(c.code, ErrorCode::Network);
        assert_eq!(c.status, None);
        assert!(c.retryable);
        assert_eq!(c.severity, LogLevel::Error);
        assert_eq!(c.message, "connection refused");
    }

    #[test]
    fn test_suspended_payment_wins_over_status_fallback() {
        // A 403 caused by billing suspension must not be reported as a
        // generic UNAUTHORIZED.
        let body = json!({"errorCode": "SUSPENDED_PAYMENT"});
        let c = classify(Some(403), Some(&body), "Forbidden");
        assert_eq!(c.code, ErrorCode::SuspendedPayment);
        assert!(!c.retryable);
        assert_eq!(c.severity, LogLevel::Error);
    }

    #[test]
    fn test_vendor_rate_limit_codes() {
        for code in ["RATE_LIMIT_EXCEEDED", "RATE_LIMIT"] {
            let body = json!({"errorCode": code});
            let c = classify(Some(400), Some(&body), "Bad Request");
            assert_eq!(c.code, ErrorCode::RateLimit);
            assert!(c.retryable);
            assert_eq!(c.severity, LogLevel::Warn);
        }
    }

    #[test]
    fn test_vendor_auth_codes() {
        for code in ["AUTHENTICATION_DENIED", "AUTHENTICATING_PROXY_DENIED"] {
            let body = json!({"errorCode": code});
            let c = classify(Some(400), Some(&body), "Bad Request");
            assert_eq!(c.code, ErrorCode::Unauthorized);
            assert!(!c.retryable);
        }
    }

    #[test]
    fn test_status_fallback_table() {
        let cases: &[(u16, ErrorCode, bool)] = &[
            (400, ErrorCode::BadRequest, false),
            (401, ErrorCode::Unauthorized, false),
            (403, ErrorCode::Unauthorized, false),
            (404, ErrorCode::NotFound, false),
            (429, ErrorCode::RateLimit, true),
            (500, ErrorCode::ServerError, true),
            (503, ErrorCode::ServerError, true),
            (418, ErrorCode::Unknown, true),
            (302, ErrorCode::Unknown, true),
        ];
        for (status, code, retryable) in cases {
            let c = classify(Some(*status), None, "status text");
            assert_eq!(c.code, *code, "status {}", status);
            assert_eq!(c.retryable, *retryable, "status {}", status);
        }
    }

    #[test]
    fn test_rate_limit_status_severity_warn() {
        let c = classify(Some(429), None, "Too Many Requests");
        assert_eq!(c.severity, LogLevel::Warn);
    }

    #[test]
    fn test_message_prefers_error_messages_array() {
        let body = json!({
            "errorMessages": ["The value 'X' does not exist for the field 'project'."],
            "message": "secondary",
        });
        let c = classify(Some(400), Some(&body), "Bad Request");
        assert_eq!(
            c.message,
            "The value 'X' does not exist for the field 'project'."
        );
    }

    #[test]
    fn test_message_falls_back_to_status_text() {
        let body = json!({"unexpected": true});
        let c = classify(Some(500), Some(&body), "Internal Server Error");
        assert_eq!(c.message, "Internal Server Error");
    }

    #[test]
    fn test_unknown_vendor_code_falls_through_to_status() {
        let body = json!({"errorCode": "SOMETHING_NEW"});
        let c = classify(Some(404), Some(&body), "Not Found");
        assert_eq!(c.code, ErrorCode::NotFound);
        assert!(!c.retryable);
    }

    #[test]
    fn test_engine_error_retryability() {
        let retryable = EngineError::Remote(RemoteError::new(classify(Some(500), None, "boom")));
        assert!(retryable.retryable());

        let permanent = EngineError::Remote(RemoteError::new(classify(Some(401), None, "denied")));
        assert!(!permanent.retryable());

        let state = EngineError::State("project not found".to_string());
        assert!(!state.retryable());
    }

    #[test]
    fn test_remote_error_display() {
        let err = RemoteError::new(classify(Some(429), None, "Too Many Requests"));
        let rendered = err.to_string();
        assert!(rendered.contains("RATE_LIMIT"));
        assert!(rendered.contains("429"));

        let err = RemoteError::new(classify(None, None, "connect timeout"));
        assert!(err.to_string().contains("no response"));
    }
}
