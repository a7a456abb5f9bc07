//! Request-scoped holder of the current authenticated identity.
//!
//! Lives in the request extensions, so every request carries its own copy
//! and nothing leaks between concurrent requests.

use super::Authentication;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    authentication: Option<Authentication>,
}

impl SecurityContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever identity was stored before.
    pub fn set_authenticated(&mut self, authentication: Authentication) {
        self.authentication = Some(authentication);
    }

    pub fn clear(&mut self) {
        self.authentication = None;
    }

    pub fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authentication.is_some()
    }

    pub fn into_authentication(self) -> Option<Authentication> {
        self.authentication
    }
}
