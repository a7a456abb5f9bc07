//! Produces the response for a rejected credential.
use axum::{
    body::Body,
    http::{HeaderValue, Request, header},
    response::{IntoResponse, Response},
};

use crate::error::AppError;

use super::AuthenticationError;

/// Writes the rejection response once the interceptor gives up on a request.
///
/// The interceptor calls this exactly once per rejected request, with the
/// original request, and returns the result verbatim.
pub trait AuthenticationEntryPoint: Send + Sync + 'static {
    fn commence(&self, request: &Request<Body>, error: &AuthenticationError) -> Response;
}

/// RFC 6750 style rejection: 401 + `WWW-Authenticate: Bearer ...` + JSON body.
#[derive(Debug, Clone)]
pub struct BearerEntryPoint {
    realm: Option<String>,
}

impl BearerEntryPoint {
    pub fn new() -> Self {
        Self { realm: None }
    }

    pub fn with_realm(realm: impl Into<String>) -> Self {
        Self {
            realm: Some(realm.into()),
        }
    }

    fn challenge(&self, error: &AuthenticationError) -> String {
        let mut params = Vec::with_capacity(3);
        if let Some(realm) = &self.realm {
            params.push(format!("realm=\"{}\"", quote_safe(realm)));
        }
        params.push(format!("error=\"{}\"", error.code()));
        let description = AppError::from(error).to_string();
        params.push(format!("error_description=\"{}\"", quote_safe(&description)));

        format!("Bearer {}", params.join(", "))
    }
}

impl Default for BearerEntryPoint {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthenticationEntryPoint for BearerEntryPoint {
    fn commence(&self, request: &Request<Body>, error: &AuthenticationError) -> Response {
        tracing::debug!(
            method = %request.method(),
            path = %request.uri().path(),
            code = error.code(),
            "commencing bearer challenge"
        );

        let mut res = AppError::from(error).into_response();
        match HeaderValue::from_str(&self.challenge(error)) {
            Ok(value) => {
                res.headers_mut().insert(header::WWW_AUTHENTICATE, value);
            }
            Err(_) => {
                res.headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
            }
        }
        res
    }
}

// Quoted-string values in the challenge must not carry quotes or backslashes.
fn quote_safe(s: &str) -> String {
    s.chars().filter(|c| *c != '"' && *c != '\\').collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn request() -> Request<Body> {
        Request::builder().uri("/api/v1/me").body(Body::empty()).unwrap()
    }

    #[test]
    fn commence_sets_401_and_challenge() {
        let res = BearerEntryPoint::new()
            .commence(&request(), &AuthenticationError::invalid_token("bad sig"));

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let challenge = res.headers()[header::WWW_AUTHENTICATE].to_str().unwrap();
        assert!(challenge.starts_with("Bearer "));
        assert!(challenge.contains("error=\"invalid_token\""));
        assert!(!challenge.contains("bad sig"));
    }

    #[test]
    fn realm_is_included_when_configured() {
        let res = BearerEntryPoint::with_realm("api")
            .commence(&request(), &AuthenticationError::Expired);

        let challenge = res.headers()[header::WWW_AUTHENTICATE].to_str().unwrap();
        assert!(challenge.starts_with("Bearer realm=\"api\", error=\"invalid_token\""));
    }

    #[test]
    fn unavailable_backend_uses_distinct_code() {
        let res = BearerEntryPoint::new().commence(
            &request(),
            &AuthenticationError::ServiceUnavailable("jwks timeout".into()),
        );

        let challenge = res.headers()[header::WWW_AUTHENTICATE].to_str().unwrap();
        assert!(challenge.contains("error=\"temporarily_unavailable\""));
    }
}
