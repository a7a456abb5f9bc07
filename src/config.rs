/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, CORS 許可、Auth 設定など)
 * - 設定値のバリデーション (不正なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::middleware::auth::extract::{DEFAULT_FORM_BODY_LIMIT, DEFAULT_TOKEN_PARAM};
use crate::services::auth::StaticTokenEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings for the bearer interceptor and its bundled collaborators.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub token_param: String,
    pub form_tokens: bool,
    pub form_body_limit: usize,
    pub realm: Option<String>,
    pub static_tokens: Vec<StaticTokenEntry>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_param: DEFAULT_TOKEN_PARAM.to_string(),
            form_tokens: true,
            form_body_limit: DEFAULT_FORM_BODY_LIMIT,
            realm: None,
            static_tokens: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub request_timeout: Duration,
    pub body_limit_bytes: usize,

    pub auth: AuthConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = match std::env::var("PORT") {
            Ok(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            Err(_) => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_timeout = std::env::var("REQUEST_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let body_limit_bytes = std::env::var("BODY_LIMIT_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        let token_param =
            std::env::var("AUTH_TOKEN_PARAM").unwrap_or_else(|_| DEFAULT_TOKEN_PARAM.to_string());
        if token_param.trim().is_empty() {
            return Err(ConfigError::Invalid("AUTH_TOKEN_PARAM"));
        }

        let form_tokens = match std::env::var("AUTH_FORM_TOKENS") {
            Ok(v) => parse_bool(&v).ok_or(ConfigError::Invalid("AUTH_FORM_TOKENS"))?,
            Err(_) => true,
        };

        let form_body_limit = match std::env::var("AUTH_FORM_BODY_LIMIT") {
            Ok(v) => v
                .parse::<usize>()
                .map_err(|_| ConfigError::Invalid("AUTH_FORM_BODY_LIMIT"))?,
            Err(_) => DEFAULT_FORM_BODY_LIMIT,
        };
        if form_body_limit > body_limit_bytes {
            return Err(ConfigError::Invalid("AUTH_FORM_BODY_LIMIT"));
        }

        let realm = std::env::var("AUTH_REALM")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let static_tokens = match std::env::var("AUTH_STATIC_TOKENS") {
            Ok(v) => parse_static_tokens(&v)?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            request_timeout,
            body_limit_bytes,
            auth: AuthConfig {
                token_param,
                form_tokens,
                form_body_limit,
                realm,
                static_tokens,
            },
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `token=principal[:authority|authority],...`
pub fn parse_static_tokens(raw: &str) -> Result<Vec<StaticTokenEntry>, ConfigError> {
    const KEY: &str = "AUTH_STATIC_TOKENS";

    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|item| {
            let (token, rest) = item.split_once('=').ok_or(ConfigError::Invalid(KEY))?;
            let (principal, authorities) = match rest.split_once(':') {
                Some((p, a)) => (p, a),
                None => (rest, ""),
            };

            let token = token.trim();
            let principal = principal.trim();
            if token.is_empty() || principal.is_empty() {
                return Err(ConfigError::Invalid(KEY));
            }

            Ok(StaticTokenEntry {
                token: token.to_string(),
                principal: principal.to_string(),
                authorities: authorities
                    .split('|')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            })
        })
        .collect()
}
