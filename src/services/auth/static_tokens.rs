//! Pre-shared token table used by the bundled server.
//!
//! This is a collaborator for local/dev deployments: it looks credentials up
//! in a fixed table. It does not verify signatures or parse claims.
use std::collections::HashMap;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::{Authentication, AuthenticationError, AuthenticationManager, UnverifiedToken};

/// One configured token and the identity it maps to.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticTokenEntry {
    pub token: String,
    pub principal: String,
    pub authorities: Vec<String>,
}

impl std::fmt::Debug for StaticTokenEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the token
        f.debug_struct("StaticTokenEntry")
            .field("principal", &self.principal)
            .field("authorities", &self.authorities)
            .finish()
    }
}

struct Grant {
    principal: String,
    authorities: Vec<String>,
}

/// Tokens are kept only as SHA-256 digests.
pub struct StaticTokenManager {
    grants: HashMap<[u8; 32], Grant>,
}

impl std::fmt::Debug for StaticTokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenManager")
            .field("tokens", &self.grants.len())
            .finish()
    }
}

impl StaticTokenManager {
    pub fn new(entries: impl IntoIterator<Item = StaticTokenEntry>) -> Self {
        let grants = entries
            .into_iter()
            .map(|e| {
                (
                    digest(&e.token),
                    Grant {
                        principal: e.principal,
                        authorities: e.authorities,
                    },
                )
            })
            .collect();

        Self { grants }
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

#[async_trait]
impl AuthenticationManager for StaticTokenManager {
    async fn authenticate(
        &self,
        token: UnverifiedToken,
    ) -> Result<Authentication, AuthenticationError> {
        if token.as_str().is_empty() {
            return Err(AuthenticationError::invalid_token("empty credential"));
        }

        let grant = self
            .grants
            .get(&digest(token.as_str()))
            .ok_or_else(|| AuthenticationError::invalid_token("unknown token"))?;

        Ok(Authentication::new(grant.principal.clone())
            .with_authorities(grant.authorities.iter().cloned()))
    }
}

fn digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}
