//! Bearer credential lookup.
//!
//! Order: `Authorization: Bearer <token>` header, then the `key` query
//! parameter, then (for url-encoded form posts only) a form field of the
//! same name. First hit wins; malformed input just means "not here".

use axum::http::{HeaderMap, Request, Uri, header};

pub const BEARER_SCHEME: &str = "Bearer";
pub const DEFAULT_TOKEN_PARAM: &str = "key";
pub const DEFAULT_FORM_BODY_LIMIT: usize = 64 * 1024;

/// Where a credential was found (logged, never the credential itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Header,
    Query,
    Form,
}

impl TokenSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Query => "query",
            Self::Form => "form",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenExtractor {
    param: String,
    form_tokens: bool,
    form_body_limit: usize,
}

impl Default for TokenExtractor {
    fn default() -> Self {
        Self {
            param: DEFAULT_TOKEN_PARAM.to_string(),
            form_tokens: true,
            form_body_limit: DEFAULT_FORM_BODY_LIMIT,
        }
    }
}

impl TokenExtractor {
    pub fn new(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            ..Self::default()
        }
    }

    pub fn with_form_tokens(mut self, enabled: bool) -> Self {
        self.form_tokens = enabled;
        self
    }

    pub fn with_form_body_limit(mut self, limit: usize) -> Self {
        self.form_body_limit = limit;
        self
    }

    pub fn param(&self) -> &str {
        &self.param
    }

    pub fn form_body_limit(&self) -> usize {
        self.form_body_limit
    }

    /// Header first, then query. Reads the request only.
    pub fn extract_token<B>(&self, req: &Request<B>) -> Option<String> {
        self.locate(req).map(|(token, _)| token)
    }

    pub fn locate<B>(&self, req: &Request<B>) -> Option<(String, TokenSource)> {
        if let Some(token) = token_from_header(req.headers()) {
            return Some((token, TokenSource::Header));
        }

        token_from_query(req.uri(), &self.param).map(|token| (token, TokenSource::Query))
    }

    /// Whether the body may be buffered to look for a form field.
    ///
    /// Requires a url-encoded content type and a declared length within the
    /// limit, so the body is never partially consumed.
    pub fn accepts_form<B>(&self, req: &Request<B>) -> bool {
        if !self.form_tokens {
            return false;
        }

        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .is_some_and(|mime| {
                mime.trim()
                    .eq_ignore_ascii_case("application/x-www-form-urlencoded")
            });

        let declared_len = req
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());

        is_form && declared_len.is_some_and(|len| len <= self.form_body_limit)
    }

    pub fn token_from_form(&self, body: &[u8]) -> Option<String> {
        first_pair(body, &self.param)
    }
}

/// `Authorization: Bearer <token>`; the scheme is matched ignoring case.
///
/// The value is split on single spaces (trailing empty segments dropped) and
/// must yield exactly `scheme` and `credentials`. Anything else is ignored.
pub fn token_from_header(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;

    let mut parts: Vec<&str> = value.split(' ').collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }

    match parts.as_slice() {
        [scheme, credentials] if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => {
            Some((*credentials).to_string())
        }
        _ => None,
    }
}

/// First value of `param` in the query string, percent-decoded.
/// A present-but-empty value still counts as present.
pub fn token_from_query(uri: &Uri, param: &str) -> Option<String> {
    first_pair(uri.query()?.as_bytes(), param)
}

fn first_pair(input: &[u8], param: &str) -> Option<String> {
    url::form_urlencoded::parse(input)
        .find(|(k, _)| k == param)
        .map(|(_, v)| v.into_owned())
}
