//! Core types shared by the Osonish notification crates.
//!
//! This crate defines:
//! - `SmsError`: the error type used by every gateway client
//! - `SendReport`: uniform result of a delivered message
//! - `phone`: Uzbek phone number normalization
//! - `code`: verification code generation and the in-memory code store
//! - `template`: SMS text templates with a `{code}` placeholder

pub mod code;
pub mod phone;
pub mod template;

use serde::Serialize;
use uuid::Uuid;

pub use code::{
    generate_code, CodeStore, VerifyError, CODE_TTL, MAX_ATTEMPTS, RESEND_COOLDOWN, TEST_CODE,
};
pub use phone::{is_test_number, normalize_phone, TEST_NUMBER};
pub use template::{CodeTemplate, CODE_PLACEHOLDER, DEFAULT_CODE_TEMPLATE};

/// Errors that can occur while talking to a notification gateway.
#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    /// HTTP transport error (connection, timeout, malformed response body).
    #[error("http error: {0}")]
    Http(String),

    /// Authentication failed or the gateway rejected our token.
    #[error("auth error: {0}")]
    Auth(String),

    /// The request was rejected before it left the process.
    #[error("invalid request: {0}")]
    Invalid(String),

    /// The gateway answered with a non-success status.
    #[error("provider error: {0}")]
    Provider(String),

    /// Anything that does not fit the buckets above.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

/// Result of a successfully submitted message.
///
/// `raw` keeps the gateway's response verbatim so callers can inspect
/// fields we do not model.
#[derive(Debug, Clone, Serialize)]
pub struct SendReport {
    /// Message id assigned by the gateway, or a local fallback id.
    pub id: String,
    /// Which backend produced this report, e.g. `"eskiz"` or `"expo"`.
    pub provider: &'static str,
    /// Unmodified response payload.
    pub raw: serde_json::Value,
}

/// Generates a local id for responses that did not carry one.
pub fn fallback_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_id_unique() {
        let a = fallback_id();
        let b = fallback_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn test_error_display() {
        let err = SmsError::Provider("HTTP 400: bad request".to_string());
        assert_eq!(err.to_string(), "provider error: HTTP 400: bad request");

        let err = SmsError::Auth("token rejected".to_string());
        assert_eq!(err.to_string(), "auth error: token rejected");
    }

    #[test]
    fn test_send_report_serializes_raw() {
        let report = SendReport {
            id: "4385062".to_string(),
            provider: "eskiz",
            raw: serde_json::json!({"id": "4385062", "status": "waiting"}),
        };
        let out = serde_json::to_value(&report).unwrap();
        assert_eq!(out["provider"], "eskiz");
        assert_eq!(out["raw"]["status"], "waiting");
    }
}
