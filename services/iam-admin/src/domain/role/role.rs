//! 角色实体

use admin_common::AuditInfo;

use super::permission::Permission;
use crate::domain::search::SortableField;

define_id!(
    /// 角色 ID
    RoleId
);

/// 角色实体
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    /// 全局唯一
    pub name: String,
    pub permissions: Vec<Permission>,
    pub audit_info: AuditInfo,
}

impl Role {
    pub const SORTABLE_FIELDS: &'static [SortableField] = &[
        SortableField::new("id", "id"),
        SortableField::new("name", "name"),
        SortableField::new("createdAt", "created_at"),
        SortableField::new("updatedAt", "updated_at"),
    ];

    pub fn new(name: String) -> Self {
        Self {
            id: RoleId::new(),
            name,
            permissions: Vec::new(),
            audit_info: AuditInfo::default(),
        }
    }

    /// 追加权限（已存在的跳过）
    pub fn add_permission(&mut self, permission: Permission) {
        if !self.permissions.iter().any(|p| p.id == permission.id) {
            self.permissions.push(permission);
        }
    }

    pub fn has_permission_code(&self, code: &str) -> bool {
        self.permissions.iter().any(|p| p.code == code)
    }

    pub fn permission_codes(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(|p| p.code.as_str())
    }
}
