/*
 * Responsibility
 * - middleware の公開インターフェース (re-export)
 * - auth (bearer interceptor), cors, http, security_headers
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
