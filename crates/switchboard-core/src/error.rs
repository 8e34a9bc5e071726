//! The error taxonomy surfaced at the wire boundary.
//!
//! Every failure that crosses the kernel boundary is folded into an
//! [`ApiError`] carrying an [`ErrorKind`]. Validation and state errors
//! never mutate state; execution failures still produce a receipt and an
//! audit event before surfacing here.

use serde::Serialize;
use thiserror::Error;

/// Classification of a surfaced error, mapped 1:1 onto HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Missing or invalid credentials or agent key.
    Authentication,
    /// Capability disabled, cross-agent access, or caller not permitted.
    Authorization,
    /// Input failed effector validation or schema parse.
    Validation,
    /// Unknown id.
    NotFound,
    /// Duplicate name or repeated decision.
    Conflict,
    /// State machine precondition violated.
    State,
    /// Plan hash mismatch at execute time.
    Integrity,
    /// Policy-enforced rate limit.
    RateLimit,
    /// Unexpected failure.
    Internal,
}

impl ErrorKind {
    /// The HTTP status this kind maps to.
    #[must_use]
    pub fn http_status(self) -> u16 {
        match self {
            Self::Authentication => 401,
            Self::Authorization => 403,
            Self::Validation | Self::State | Self::Integrity => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::RateLimit => 429,
            Self::Internal => 500,
        }
    }

    /// Stable string code used in error bodies and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authentication => "AUTHENTICATION",
            Self::Authorization => "AUTHORIZATION",
            Self::Validation => "VALIDATION",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::State => "STATE",
            Self::Integrity => "INTEGRITY",
            Self::RateLimit => "RATE_LIMIT",
            Self::Internal => "INTERNAL",
        }
    }
}

/// An error surfaced to a caller of the control plane.
#[derive(Debug, Clone, Error)]
#[error("{}: {message}", kind.as_str())]
pub struct ApiError {
    /// Error classification.
    pub kind: ErrorKind,
    /// Human-readable detail.
    pub message: String,
}

/// Result alias for kernel-boundary operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Build an error of the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// AUTHENTICATION error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// AUTHORIZATION error.
    #[must_use]
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// VALIDATION error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// NOT_FOUND error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// CONFLICT error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// STATE error.
    #[must_use]
    pub fn state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::State, message)
    }

    /// INTEGRITY error.
    #[must_use]
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Integrity, message)
    }

    /// RATE_LIMIT error.
    #[must_use]
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimit, message)
    }

    /// INTERNAL error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorKind::Authentication.http_status(), 401);
        assert_eq!(ErrorKind::Authorization.http_status(), 403);
        assert_eq!(ErrorKind::Validation.http_status(), 400);
        assert_eq!(ErrorKind::NotFound.http_status(), 404);
        assert_eq!(ErrorKind::Conflict.http_status(), 409);
        assert_eq!(ErrorKind::State.http_status(), 400);
        assert_eq!(ErrorKind::Integrity.http_status(), 400);
        assert_eq!(ErrorKind::RateLimit.http_status(), 429);
        assert_eq!(ErrorKind::Internal.http_status(), 500);
    }

    #[test]
    fn test_display_includes_code() {
        let err = ApiError::integrity("plan hash mismatch");
        assert_eq!(err.to_string(), "INTEGRITY: plan hash mismatch");
    }
}
