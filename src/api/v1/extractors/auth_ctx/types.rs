/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - interceptor が SecurityContext を request extensions に格納し、handler はこの型だけを受け取る
 */

use crate::services::auth::Authentication;

/// The identity established for this request; rejects anonymous requests.
#[derive(Debug, Clone)]
pub struct CurrentAuthentication(pub Authentication);

/// The identity, if the request carried an accepted credential.
#[derive(Debug, Clone)]
pub struct MaybeAuthentication(pub Option<Authentication>);
