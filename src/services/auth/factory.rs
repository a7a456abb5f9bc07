/// Factory: build the request interceptor from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::middleware::auth::{RequestAuthenticator, TokenExtractor};
use crate::services::auth::{BearerEntryPoint, StaticTokenManager};

pub fn build_authenticator(config: &Config) -> RequestAuthenticator {
    let manager = StaticTokenManager::new(config.auth.static_tokens.iter().cloned());
    if manager.is_empty() {
        tracing::warn!("no static tokens configured; every bearer credential will be rejected");
    }

    let entry_point = match &config.auth.realm {
        Some(realm) => BearerEntryPoint::with_realm(realm.clone()),
        None => BearerEntryPoint::new(),
    };

    let extractor = TokenExtractor::new(config.auth.token_param.clone())
        .with_form_tokens(config.auth.form_tokens)
        .with_form_body_limit(config.auth.form_body_limit);

    RequestAuthenticator::new(Arc::new(manager), Arc::new(entry_point)).with_extractor(extractor)
}
