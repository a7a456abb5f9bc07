/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - bearer interceptor は app.rs で v1 全体に掛ける (ここでは掛けない)
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{
    health::health,
    me::{me, whoami},
};

pub fn routes() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/me", get(me))
        .route("/whoami", get(whoami))
}
