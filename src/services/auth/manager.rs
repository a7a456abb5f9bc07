//! Authentication manager interface consumed by the request interceptor.
use async_trait::async_trait;
use thiserror::Error;

use super::{Authentication, UnverifiedToken};

/// Why a credential was rejected.
///
/// Returned as a value; the interceptor branches on it and never retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticationError {
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("token expired")]
    Expired,
    #[error("account disabled: {0}")]
    Disabled(String),
    #[error("authentication service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthenticationError {
    pub fn invalid_token(reason: impl Into<String>) -> Self {
        Self::InvalidToken(reason.into())
    }

    /// Short machine-readable code (used in `WWW-Authenticate` and logs).
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidToken(_) | Self::Expired | Self::Disabled(_) => "invalid_token",
            Self::ServiceUnavailable(_) => "temporarily_unavailable",
        }
    }
}

/// Verifies an unverified credential and produces an identity.
///
/// Implementations must be cheap to share (`Arc<dyn AuthenticationManager>`).
/// Blocking work such as remote key fetches is the implementation's concern.
#[async_trait]
pub trait AuthenticationManager: Send + Sync + 'static {
    async fn authenticate(
        &self,
        token: UnverifiedToken,
    ) -> Result<Authentication, AuthenticationError>;
}
