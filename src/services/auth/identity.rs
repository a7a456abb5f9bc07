use chrono::{DateTime, Utc};
use serde::Serialize;

/// Identity returned by an [`AuthenticationManager`](super::AuthenticationManager)
/// once a credential has been accepted.
///
/// The interceptor never looks inside; it only stores this value in the
/// request's [`SecurityContext`](super::SecurityContext).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Authentication {
    pub principal: String,
    pub authorities: Vec<String>,
    pub authenticated_at: DateTime<Utc>,
}

impl Authentication {
    pub fn new(principal: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            authorities: Vec::new(),
            authenticated_at: Utc::now(),
        }
    }

    pub fn with_authorities<I, S>(mut self, authorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authorities = authorities.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }
}
