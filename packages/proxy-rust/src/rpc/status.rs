//! Error taxonomy and total status translation.
//!
//! Every response envelope carries a `Status`. Operation failures never
//! surface as raw errors to the transport; they are translated here into
//! a typed status and delivered as a normal response.

use serde::{Deserialize, Serialize};

/// Failures an operation body can produce.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The category pool's queue was full at submission time.
    #[error("flow limit")]
    Overloaded,
    /// The request was malformed or semantically invalid.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// The proxy gave up waiting on a downstream broker.
    #[error("proxy timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    /// Anything else, including unexpected collaborator failures.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Application-level status codes shared by every response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCode {
    Ok,
    /// Used uniquely for pool saturation.
    TooManyRequests,
    BadRequest,
    ProxyTimeout,
    InternalServerError,
}

impl StatusCode {
    /// Fallback message used when an error carries a blank message.
    #[must_use]
    pub fn default_message(self) -> &'static str {
        match self {
            StatusCode::Ok => "ok",
            StatusCode::TooManyRequests => "flow limit",
            StatusCode::BadRequest => "bad request",
            StatusCode::ProxyTimeout => "proxy timeout",
            StatusCode::InternalServerError => "internal server error",
        }
    }
}

/// Typed status carried in every response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub code: StatusCode,
    pub message: String,
}

impl Status {
    /// Builds a status, substituting the code's default message when the
    /// supplied message is blank so the status message is never empty.
    #[must_use]
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            code.default_message().to_string()
        } else {
            message
        };
        Self { code, message }
    }

    /// Success status.
    #[must_use]
    pub fn ok() -> Self {
        Self::new(StatusCode::Ok, "")
    }

    /// The saturation status written by the rejection path. No other
    /// condition maps to `TooManyRequests`.
    #[must_use]
    pub fn flow_limited() -> Self {
        Self::new(StatusCode::TooManyRequests, "flow limit")
    }

    /// Translates any operation failure into a status. Total: every
    /// `ProxyError` value, including unexpected internal ones, produces a
    /// well-formed status with a non-Ok code.
    #[must_use]
    pub fn from_error(error: &ProxyError) -> Self {
        let code = match error {
            ProxyError::Overloaded => StatusCode::TooManyRequests,
            ProxyError::BadRequest(_) => StatusCode::BadRequest,
            ProxyError::Timeout { .. } => StatusCode::ProxyTimeout,
            ProxyError::Internal(_) => StatusCode::InternalServerError,
        };
        Self::new(code, error.to_string())
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_limited_uses_too_many_requests() {
        let status = Status::flow_limited();
        assert_eq!(status.code, StatusCode::TooManyRequests);
        assert_eq!(status.message, "flow limit");
    }

    #[test]
    fn translation_covers_every_variant() {
        let cases = [
            (ProxyError::Overloaded, StatusCode::TooManyRequests),
            (
                ProxyError::BadRequest("missing topic".to_string()),
                StatusCode::BadRequest,
            ),
            (
                ProxyError::Timeout { timeout_ms: 3000 },
                StatusCode::ProxyTimeout,
            ),
            (
                ProxyError::Internal(anyhow::anyhow!("broker unavailable")),
                StatusCode::InternalServerError,
            ),
        ];
        for (error, expected) in cases {
            let status = Status::from_error(&error);
            assert_eq!(status.code, expected);
            assert!(!status.message.is_empty());
        }
    }

    #[test]
    fn internal_error_is_distinct_from_saturation() {
        let status = Status::from_error(&ProxyError::Internal(anyhow::anyhow!("boom")));
        assert_ne!(status.code, StatusCode::TooManyRequests);
    }

    #[test]
    fn blank_message_replaced_with_default() {
        let status = Status::new(StatusCode::InternalServerError, "");
        assert_eq!(status.message, "internal server error");

        let status = Status::new(StatusCode::BadRequest, "   ");
        assert_eq!(status.message, "bad request");
    }

    #[test]
    fn default_status_is_ok() {
        let status = Status::default();
        assert_eq!(status.code, StatusCode::Ok);
        assert_eq!(status.message, "ok");
    }
}
