pub mod context;
pub mod entry_point;
pub mod factory;
pub mod identity;
pub mod manager;
pub mod static_tokens;
pub mod token;

pub use context::SecurityContext;
pub use entry_point::{AuthenticationEntryPoint, BearerEntryPoint};
pub use factory::build_authenticator;
pub use identity::Authentication;
pub use manager::{AuthenticationError, AuthenticationManager};
pub use static_tokens::{StaticTokenEntry, StaticTokenManager};
pub use token::UnverifiedToken;
