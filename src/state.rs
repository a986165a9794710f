/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - ex: access gate, pet store, forced sign-out recorder, グループ名
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::repos::PetStore;
use crate::services::auth::AccessGate;
use crate::services::auth::revocation::ForcedSignOutRecorder;

#[derive(Clone, Debug)]
pub struct GroupNames {
    pub admins: String,
    pub users: String,
}

#[derive(Clone)]
pub struct AppState {
    pub access: Arc<AccessGate>,
    pub sign_out: Arc<ForcedSignOutRecorder>,
    pub pets: Arc<dyn PetStore>,
    pub groups: GroupNames,
}

impl AppState {
    pub fn new(
        access: Arc<AccessGate>,
        sign_out: Arc<ForcedSignOutRecorder>,
        pets: Arc<dyn PetStore>,
        groups: GroupNames,
    ) -> Self {
        Self {
            access,
            sign_out,
            pets,
            groups,
        }
    }
}
