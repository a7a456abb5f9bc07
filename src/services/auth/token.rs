//! Raw bearer credential as handed to the authentication manager.

use std::fmt;

/// A credential pulled off the request that nobody has checked yet.
///
/// - The raw string is opaque here; its structure is the manager's business.
/// - Debug output never prints the credential.
pub struct UnverifiedToken {
    raw: String,
}

impl UnverifiedToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn into_inner(self) -> String {
        self.raw
    }

    /// Always `false`: the envelope only ever carries unverified input.
    pub fn is_authenticated(&self) -> bool {
        false
    }
}

impl fmt::Debug for UnverifiedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnverifiedToken")
            .field("raw", &"[REDACTED]")
            .field("len", &self.raw.len())
            .finish()
    }
}
