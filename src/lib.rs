//! Bearer credential interception for axum services.
//!
//! [`RequestAuthenticator`] pulls a bearer credential off each request
//! (`Authorization: Bearer <token>`, then `?key=<token>`), hands it to an
//! [`AuthenticationManager`], and either records the resulting identity in the
//! request's [`SecurityContext`] or lets an [`AuthenticationEntryPoint`] write
//! the rejection. `OPTIONS` preflights and credential-less requests pass
//! straight through.
//!
//! ```ignore
//! let authenticator = RequestAuthenticator::new(
//!     Arc::new(StaticTokenManager::new(entries)),
//!     Arc::new(BearerEntryPoint::new()),
//! );
//! let app = middleware::auth::access::apply(routes, authenticator);
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;

pub use middleware::auth::{RequestAuthenticator, TokenExtractor, TokenSource};
pub use services::auth::{
    Authentication, AuthenticationEntryPoint, AuthenticationError, AuthenticationManager,
    BearerEntryPoint, SecurityContext, StaticTokenEntry, StaticTokenManager, UnverifiedToken,
};
