use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::{Authentication, SecurityContext};

use super::{CurrentAuthentication, MaybeAuthentication};

fn authentication(parts: &Parts) -> Option<Authentication> {
    parts
        .extensions
        .get::<SecurityContext>()
        .and_then(|ctx| ctx.authentication())
        .cloned()
}

/// Missing context (interceptor not applied, or no credential sent) is a 401.
impl<S> FromRequestParts<S> for CurrentAuthentication
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authentication(parts)
            .map(CurrentAuthentication)
            .ok_or_else(|| AppError::unauthorized("authentication required"))
    }
}

impl<S> FromRequestParts<S> for MaybeAuthentication
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthentication(authentication(parts)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(ctx: Option<SecurityContext>) -> Parts {
        let mut req = Request::builder().uri("/").body(()).unwrap();
        if let Some(ctx) = ctx {
            req.extensions_mut().insert(ctx);
        }
        req.into_parts().0
    }

    #[tokio::test]
    async fn current_requires_identity() {
        let mut parts = parts_with(Some(SecurityContext::new()));
        let res = CurrentAuthentication::from_request_parts(&mut parts, &()).await;
        assert!(matches!(res, Err(AppError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn current_reads_identity() {
        let mut ctx = SecurityContext::new();
        ctx.set_authenticated(Authentication::new("alice"));
        let mut parts = parts_with(Some(ctx));

        let CurrentAuthentication(auth) =
            CurrentAuthentication::from_request_parts(&mut parts, &())
                .await
                .unwrap();
        assert_eq!(auth.principal, "alice");
    }

    #[tokio::test]
    async fn maybe_allows_anonymous() {
        let mut parts = parts_with(None);
        let MaybeAuthentication(auth) = MaybeAuthentication::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(auth.is_none());
    }
}
