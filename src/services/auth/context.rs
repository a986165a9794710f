/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - access gate が検証して request extensions に格納し、handler はこの型だけを受け取る
 */
use super::groups::GroupSet;
use super::token::Claims;

/// Identity attached to an authenticated request.
///
/// - `principal` は username (なければ `sub`)
/// - `groups` はサポート対象グループとの積集合 (claim の全グループではない)
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub principal: String,
    pub claims: Claims,
    pub groups: GroupSet,
}

impl AuthCtx {
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }
}

/// Per-request context produced by the access gate.
///
/// Anonymous only for allowlisted paths.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    identity: Option<AuthCtx>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(identity: AuthCtx) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn identity(&self) -> Option<&AuthCtx> {
        self.identity.as_ref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.identity.is_none()
    }
}
