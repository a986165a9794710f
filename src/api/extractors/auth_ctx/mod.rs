/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - access middleware が積んだ RequestContext から認証済み identity (AuthCtx) を handler に渡す
 * - HTTP / axum 依存は core に閉じ込める
 */

mod core;

pub use core::AuthCtxExtractor;
