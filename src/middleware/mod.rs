/*
 * Responsibility
 * - middleware の公開インターフェース (re-export)
 * - auth::access (認可判定), cors, http (request-id / timeout / trace)
 */
pub mod auth;
pub mod cors;
pub mod http;
