pub mod access;
pub mod extract;

pub use access::RequestAuthenticator;
pub use extract::{TokenExtractor, TokenSource};
