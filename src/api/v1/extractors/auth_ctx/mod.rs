/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - interceptor が extensions に入れた SecurityContext を handler に提供する
 * - HTTP / axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - CurrentAuthentication (必須: 無ければ 401)
 * - MaybeAuthentication (任意: anonymous も許可)
 */

mod core;
mod types;

pub use types::{CurrentAuthentication, MaybeAuthentication};
