//! 用户角色绑定

use admin_common::{AuditInfo, UserId};

use super::role::RoleId;

define_id!(
    /// 用户角色绑定 ID
    UserRoleId
);

/// 用户角色绑定：用户持有角色，由 assigned_by 授予
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRole {
    pub id: UserRoleId,
    pub user_id: UserId,
    pub role_id: RoleId,
    pub assigned_by: UserId,
    pub audit_info: AuditInfo,
}

impl UserRole {
    pub fn new(user_id: UserId, role_id: RoleId, assigned_by: UserId) -> Self {
        Self {
            id: UserRoleId::new(),
            user_id,
            role_id,
            assigned_by,
            audit_info: AuditInfo::default(),
        }
    }
}
