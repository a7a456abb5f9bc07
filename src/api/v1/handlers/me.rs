/*
 * Responsibility
 * - GET /me: interceptor が確立した identity を返す
 * - GET /whoami: anonymous も許可 (authenticated フラグ付き)
 */
use axum::Json;
use serde_json::{Value, json};

use crate::api::v1::extractors::{CurrentAuthentication, MaybeAuthentication};
use crate::services::auth::Authentication;

pub async fn me(CurrentAuthentication(auth): CurrentAuthentication) -> Json<Authentication> {
    Json(auth)
}

pub async fn whoami(MaybeAuthentication(auth): MaybeAuthentication) -> Json<Value> {
    match auth {
        Some(auth) => Json(json!({
            "authenticated": true,
            "principal": auth.principal,
        })),
        None => Json(json!({ "authenticated": false })),
    }
}
