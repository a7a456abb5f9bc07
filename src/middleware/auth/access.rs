//! Bearer credential interception.
//!
//! Flow per request:
//! - `OPTIONS` (CORS preflight) passes through untouched
//! - Look for a credential in the header, then the query, then the form body.
//!   Without one the request continues anonymously.
//! - Hand it to the AuthenticationManager. On success store it in the
//!   SecurityContext and continue.
//! - On failure clear the SecurityContext and return the entry point's
//!   response. `next` is not called.
//! - A form body that cannot be buffered is answered with 413 / 400.

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;

use crate::error::AppError;

use crate::services::auth::{
    AuthenticationEntryPoint, AuthenticationManager, SecurityContext, UnverifiedToken,
};

use super::extract::{TokenExtractor, TokenSource};

/// Gate every request through credential extraction exactly once.
///
/// Collaborators are passed in explicitly; the struct is cheap to clone and
/// holds no per-request state.
#[derive(Clone)]
pub struct RequestAuthenticator {
    manager: Arc<dyn AuthenticationManager>,
    entry_point: Arc<dyn AuthenticationEntryPoint>,
    extractor: TokenExtractor,
}

impl std::fmt::Debug for RequestAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestAuthenticator")
            .field("extractor", &self.extractor)
            .finish_non_exhaustive()
    }
}

impl RequestAuthenticator {
    pub fn new(
        manager: Arc<dyn AuthenticationManager>,
        entry_point: Arc<dyn AuthenticationEntryPoint>,
    ) -> Self {
        Self {
            manager,
            entry_point,
            extractor: TokenExtractor::default(),
        }
    }

    pub fn with_extractor(mut self, extractor: TokenExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn extractor(&self) -> &TokenExtractor {
        &self.extractor
    }

    /// Header then query lookup; see [`TokenExtractor::extract_token`].
    pub fn extract_token<B>(&self, req: &Request<B>) -> Option<String> {
        self.extractor.extract_token(req)
    }

    /// Runs the interception decision path, calling `next` at most once.
    pub async fn intercept<F, Fut>(&self, req: Request<Body>, next: F) -> Response
    where
        F: FnOnce(Request<Body>) -> Fut,
        Fut: Future<Output = Response>,
    {
        if *req.method() == Method::OPTIONS {
            // CORS preflight
            return next(req).await;
        }

        let (mut req, found) = match self.resolve_token(req).await {
            Ok(resolved) => resolved,
            Err(res) => return res,
        };

        let Some((token, source)) = found else {
            if req.extensions().get::<SecurityContext>().is_none() {
                req.extensions_mut().insert(SecurityContext::new());
            }
            return next(req).await;
        };

        tracing::debug!(source = source.as_str(), "bearer credential found");

        match self.manager.authenticate(UnverifiedToken::new(token)).await {
            Ok(authentication) => {
                tracing::debug!(
                    principal = %authentication.principal,
                    "request authenticated"
                );
                update_context(&mut req, |ctx| ctx.set_authenticated(authentication));
                next(req).await
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    source = source.as_str(),
                    method = %req.method(),
                    path = %req.uri().path(),
                    "bearer authentication failed"
                );
                update_context(&mut req, SecurityContext::clear);
                self.entry_point.commence(&req, &err)
            }
        }
    }

    /// Finds the credential, buffering a form body when needed.
    ///
    /// `Err` carries a finished response: a form body that fails to buffer
    /// is already consumed, so the request cannot continue.
    async fn resolve_token(&self, req: Request<Body>) -> Result<Resolved, Response> {
        if let Some(found) = self.extractor.locate(&req) {
            return Ok((req, Some(found)));
        }
        if !self.extractor.accepts_form(&req) {
            return Ok((req, None));
        }

        // Buffer the form body, then hand the same bytes downstream.
        let (parts, body) = req.into_parts();
        let limit = self.extractor.form_body_limit();
        match axum::body::to_bytes(body, limit).await {
            Ok(bytes) => {
                let token = self.extractor.token_from_form(&bytes);
                let req = Request::from_parts(parts, Body::from(bytes));
                Ok((req, token.map(|t| (t, TokenSource::Form))))
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    method = %parts.method,
                    path = %parts.uri.path(),
                    "failed to buffer form body"
                );
                let app_err = if err.into_inner().is::<LengthLimitError>() {
                    AppError::payload_too_large(limit)
                } else {
                    AppError::bad_request("unreadable form body")
                };
                Err(app_err.into_response())
            }
        }
    }
}

type Resolved = (Request<Body>, Option<(String, TokenSource)>);

fn update_context(req: &mut Request<Body>, f: impl FnOnce(&mut SecurityContext)) {
    let mut ctx = req
        .extensions_mut()
        .remove::<SecurityContext>()
        .unwrap_or_default();
    f(&mut ctx);
    req.extensions_mut().insert(ctx);
}

/// Installs the interceptor on every route of the given Router.
///
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::auth::access::apply(v1, authenticator);
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply<S>(router: Router<S>, authenticator: RequestAuthenticator) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(
        authenticator,
        access_middleware,
    ))
}

async fn access_middleware(
    State(authenticator): State<RequestAuthenticator>,
    req: Request<Body>,
    next: Next,
) -> Response {
    authenticator.intercept(req, |req| next.run(req)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::http::StatusCode;

    use crate::services::auth::{Authentication, AuthenticationError};

    #[derive(Default)]
    struct FakeManager {
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
        reject: bool,
    }

    #[async_trait]
    impl AuthenticationManager for FakeManager {
        async fn authenticate(
            &self,
            token: UnverifiedToken,
        ) -> Result<Authentication, AuthenticationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(token.as_str().to_string());
            if self.reject {
                Err(AuthenticationError::invalid_token("rejected"))
            } else {
                Ok(Authentication::new(format!("user-{}", token.as_str())))
            }
        }
    }

    #[derive(Default)]
    struct FakeEntryPoint {
        calls: AtomicUsize,
        saw_cleared_context: Mutex<Option<bool>>,
    }

    impl AuthenticationEntryPoint for FakeEntryPoint {
        fn commence(&self, request: &Request<Body>, _error: &AuthenticationError) -> Response {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let cleared = request
                .extensions()
                .get::<SecurityContext>()
                .is_some_and(|ctx| !ctx.is_authenticated());
            *self.saw_cleared_context.lock().unwrap() = Some(cleared);
            StatusCode::UNAUTHORIZED.into_response()
        }
    }

    fn authenticator(
        reject: bool,
    ) -> (RequestAuthenticator, Arc<FakeManager>, Arc<FakeEntryPoint>) {
        let manager = Arc::new(FakeManager {
            reject,
            ..FakeManager::default()
        });
        let entry_point = Arc::new(FakeEntryPoint::default());
        let auth = RequestAuthenticator::new(manager.clone(), entry_point.clone());
        (auth, manager, entry_point)
    }

    fn request(method: Method, uri: &str, authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn preflight_skips_authentication() {
        let (auth, manager, entry_point) = authenticator(true);
        let next_calls = AtomicUsize::new(0);

        let res = auth
            .intercept(
                request(Method::OPTIONS, "/?key=x", Some("Bearer abc")),
                |req| {
                    next_calls.fetch_add(1, Ordering::SeqCst);
                    // No context is attached for preflight.
                    assert!(req.extensions().get::<SecurityContext>().is_none());
                    async { StatusCode::NO_CONTENT.into_response() }
                },
            )
            .await;

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert_eq!(next_calls.load(Ordering::SeqCst), 1);
        assert_eq!(manager.calls.load(Ordering::SeqCst), 0);
        assert_eq!(entry_point.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_token_passes_through_anonymous() {
        let (auth, manager, _) = authenticator(false);

        let res = auth
            .intercept(request(Method::GET, "/", Some("Basic abc123")), |req| {
                let anonymous = req
                    .extensions()
                    .get::<SecurityContext>()
                    .is_some_and(|ctx| !ctx.is_authenticated());
                assert!(anonymous);
                async { StatusCode::OK.into_response() }
            })
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(manager.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn success_sets_context_and_continues() {
        let (auth, manager, entry_point) = authenticator(false);

        let res = auth
            .intercept(request(Method::GET, "/", Some("Bearer abc123")), |req| {
                let principal = req
                    .extensions()
                    .get::<SecurityContext>()
                    .and_then(|ctx| ctx.authentication())
                    .map(|a| a.principal.clone());
                assert_eq!(principal.as_deref(), Some("user-abc123"));
                async { StatusCode::OK.into_response() }
            })
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(*manager.seen.lock().unwrap(), vec!["abc123".to_string()]);
        assert_eq!(entry_point.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn success_replaces_prior_context() {
        let (auth, _, _) = authenticator(false);
        let mut req = request(Method::GET, "/", Some("Bearer fresh"));
        let mut stale = SecurityContext::new();
        stale.set_authenticated(Authentication::new("stale"));
        req.extensions_mut().insert(stale);

        auth.intercept(req, |req| {
            let principal = req
                .extensions()
                .get::<SecurityContext>()
                .and_then(|ctx| ctx.authentication())
                .map(|a| a.principal.clone());
            assert_eq!(principal.as_deref(), Some("user-fresh"));
            async { StatusCode::OK.into_response() }
        })
        .await;
    }

    #[tokio::test]
    async fn rejection_clears_context_and_halts() {
        let (auth, manager, entry_point) = authenticator(true);
        let next_calls = AtomicUsize::new(0);
        let mut req = request(Method::GET, "/", Some("Bearer abc123"));
        let mut stale = SecurityContext::new();
        stale.set_authenticated(Authentication::new("stale"));
        req.extensions_mut().insert(stale);

        let res = auth
            .intercept(req, |_| {
                next_calls.fetch_add(1, Ordering::SeqCst);
                async { StatusCode::OK.into_response() }
            })
            .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(next_calls.load(Ordering::SeqCst), 0);
        assert_eq!(manager.calls.load(Ordering::SeqCst), 1);
        assert_eq!(entry_point.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*entry_point.saw_cleared_context.lock().unwrap(), Some(true));
    }

    #[tokio::test]
    async fn form_field_is_used_and_body_preserved() {
        let (auth, manager, _) = authenticator(false);
        let req = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header("content-type", "application/x-www-form-urlencoded")
            .header("content-length", "13")
            .body(Body::from("key=form-tok1"))
            .unwrap();

        let res = auth
            .intercept(req, |req| async move {
                let body = axum::body::to_bytes(req.into_body(), 1024).await.unwrap();
                assert_eq!(&body[..], b"key=form-tok1");
                StatusCode::OK.into_response()
            })
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(*manager.seen.lock().unwrap(), vec!["form-tok1".to_string()]);
    }

    #[tokio::test]
    async fn oversized_form_body_is_rejected_without_next() {
        let (auth, manager, entry_point) = authenticator(false);
        let auth = auth.with_extractor(TokenExtractor::default().with_form_body_limit(8));
        let next_calls = AtomicUsize::new(0);
        // Declared length fits the limit, the actual body does not.
        let req = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header("content-type", "application/x-www-form-urlencoded")
            .header("content-length", "4")
            .body(Body::from("name=alice&amount=100"))
            .unwrap();

        let res = auth
            .intercept(req, |_| {
                next_calls.fetch_add(1, Ordering::SeqCst);
                async { StatusCode::OK.into_response() }
            })
            .await;

        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(next_calls.load(Ordering::SeqCst), 0);
        assert_eq!(manager.calls.load(Ordering::SeqCst), 0);
        assert_eq!(entry_point.calls.load(Ordering::SeqCst), 0);
    }
}
