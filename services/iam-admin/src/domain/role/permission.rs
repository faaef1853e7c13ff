//! 权限实体

use admin_common::AuditInfo;

use super::role::RoleId;
use crate::domain::search::SortableField;

define_id!(
    /// 权限 ID
    PermissionId
);

/// 权限实体
///
/// 权限代码形如 `users:read`；与角色为多对多关系
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub id: PermissionId,
    /// 权限代码（全局唯一）
    pub code: String,
    /// 显示名称（全局唯一）
    pub name: String,
    /// 关联的角色
    pub role_ids: Vec<RoleId>,
    pub audit_info: AuditInfo,
}

impl Permission {
    pub const SORTABLE_FIELDS: &'static [SortableField] = &[
        SortableField::new("id", "id"),
        SortableField::new("code", "code"),
        SortableField::new("name", "name"),
        SortableField::new("createdAt", "created_at"),
        SortableField::new("updatedAt", "updated_at"),
    ];

    pub fn new(code: String, name: String) -> Self {
        Self {
            id: PermissionId::new(),
            code,
            name,
            role_ids: Vec::new(),
            audit_info: AuditInfo::default(),
        }
    }
}
