// Error handling module
// Error taxonomy for the session pipeline

use std::time::Duration;

use thiserror::Error;

/// Ways the refresh-token exchange can fail
#[derive(Error, Debug)]
pub enum RefreshFailure {
    /// The auth endpoint rate-limited the exchange (HTTP 429)
    #[error("refresh rate-limited by auth endpoint: {message}")]
    RateLimited { message: String },

    /// The auth endpoint rejected the exchange (refresh token invalid or revoked)
    #[error("refresh rejected: {status} - {message}")]
    Rejected { status: u16, message: String },

    /// Transport-level failure reaching the auth endpoint
    #[error("refresh transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl RefreshFailure {
    /// Rate-limited failures are recoverable and must not invalidate credentials
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, RefreshFailure::RateLimited { .. })
    }
}

/// Errors surfaced by the session guard
#[derive(Error, Debug)]
pub enum SessionError {
    /// The request failed unauthorized and the refresh flow could not recover it
    #[error("unauthorized: {status} - {message}")]
    Unauthorized { status: u16, message: String },

    /// Refresh attempt rejected locally: the cooldown window is still open
    #[error("token refresh in cooldown, retry after {retry_after:?}")]
    RefreshCooldown { retry_after: Duration },

    /// The refresh exchange itself failed
    #[error("token refresh failed: {0}")]
    RefreshFailed(#[from] RefreshFailure),

    /// Transport failure on the guarded request, propagated untouched
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Internal pipeline error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SessionError::Unauthorized {
            status: 401,
            message: "token expired".to_string(),
        };
        assert_eq!(err.to_string(), "unauthorized: 401 - token expired");

        let err = SessionError::RefreshFailed(RefreshFailure::Rejected {
            status: 400,
            message: "invalid refresh token".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "token refresh failed: refresh rejected: 400 - invalid refresh token"
        );
    }

    #[test]
    fn test_cooldown_message_carries_remaining_window() {
        let err = SessionError::RefreshCooldown {
            retry_after: Duration::from_secs(7),
        };
        assert!(err.to_string().contains("7s"));
    }

    #[test]
    fn test_rate_limited_detection() {
        let rate_limited = RefreshFailure::RateLimited {
            message: "slow down".to_string(),
        };
        assert!(rate_limited.is_rate_limited());

        let rejected = RefreshFailure::Rejected {
            status: 401,
            message: "revoked".to_string(),
        };
        assert!(!rejected.is_rate_limited());
    }

    #[test]
    fn test_internal_error_from_anyhow() {
        let err = SessionError::from(anyhow::anyhow!("request body is not cloneable"));
        assert_eq!(
            err.to_string(),
            "internal error: request body is not cloneable"
        );
    }
}
