/*
 * Responsibility
 * - Config読み込み → collaborator 生成 → Router 組み立て
 * - Middleware の適用 (HTTP / CORS / security headers / bearer interceptor)
 * - axum::serve() で起動
 */
use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    error::AppError,
    middleware::{self, auth::RequestAuthenticator},
    services::auth::build_authenticator,
};

pub async fn run() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    tracing::info!(
        addr = %config.addr,
        env = ?config.app_env,
        static_tokens = config.auth.static_tokens.len(),
        "configuration loaded"
    );

    let authenticator = build_authenticator(&config);
    tracing::info!(
        token_param = authenticator.extractor().param(),
        "bearer interceptor ready"
    );
    let app = build_router(&config, authenticator);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,bearer_gate=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Outermost first: http (request id / limits / trace) → CORS → security
/// headers → bearer interceptor on `/api/v1`.
pub fn build_router(config: &Config, authenticator: RequestAuthenticator) -> Router {
    let v1 = middleware::auth::access::apply(api::v1::routes(), authenticator);

    let app = Router::new()
        .nest("/api/v1", v1)
        .fallback(|| async { AppError::not_found("route") });

    let app = middleware::security_headers::apply(app);
    let app = middleware::cors::apply(app, config);
    middleware::http::apply(app, config)
}
