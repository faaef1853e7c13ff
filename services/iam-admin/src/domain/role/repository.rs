//! 角色 / 权限 / 用户角色仓储接口

use admin_common::UserId;
use admin_errors::AppResult;
use async_trait::async_trait;

use super::permission::{Permission, PermissionId};
use super::role::{Role, RoleId};
use super::user_role::UserRole;
use crate::domain::search::SearchCriteria;
use crate::domain::user::Email;

/// 权限仓储接口
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// 批量创建权限（不含角色关联）
    async fn create_many(&self, permissions: &[Permission]) -> AppResult<()>;

    async fn update(&self, permission: &Permission) -> AppResult<()>;

    /// 按 ID 查找，附带角色关联
    async fn find_by_ids(&self, ids: &[PermissionId]) -> AppResult<Vec<Permission>>;

    /// 按代码查找，附带角色关联
    async fn find_by_codes(&self, codes: &[String]) -> AppResult<Vec<Permission>>;

    /// 名称或代码与给定值冲突的权限（可排除某个权限自身）
    async fn find_conflicts(
        &self,
        names: &[String],
        codes: &[String],
        exclude: Option<&PermissionId>,
    ) -> AppResult<Vec<Permission>>;

    /// 名称 / 代码 / ID 文本的区分大小写子串搜索
    async fn search(&self, criteria: &SearchCriteria) -> AppResult<(Vec<Permission>, u64)>;

    async fn delete_by_ids(&self, ids: &[PermissionId]) -> AppResult<u64>;
}

/// 角色仓储接口
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn create(&self, role: &Role) -> AppResult<()>;

    /// 更新角色字段（不含权限关联）
    async fn update(&self, role: &Role) -> AppResult<()>;

    /// 按 ID 查找，附带权限
    async fn find_by_ids(&self, ids: &[RoleId]) -> AppResult<Vec<Role>>;

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// 名称 / ID 文本的区分大小写子串搜索
    async fn search(&self, criteria: &SearchCriteria) -> AppResult<(Vec<Role>, u64)>;

    async fn delete_by_ids(&self, ids: &[RoleId]) -> AppResult<u64>;
}

/// 角色权限关联仓储接口
#[async_trait]
pub trait RolePermissionRepository: Send + Sync {
    /// 为角色追加权限（已存在的关联保留）
    async fn attach(&self, role_id: &RoleId, permission_ids: &[PermissionId]) -> AppResult<()>;

    /// 清除这些权限的全部角色关联
    async fn detach_permissions(&self, permission_ids: &[PermissionId]) -> AppResult<u64>;
}

/// 用户角色查询过滤器，未提供的条件不做限制
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRoleFilter {
    pub user_ids: Option<Vec<UserId>>,
    pub role_ids: Option<Vec<RoleId>>,
    pub assigned_by_ids: Option<Vec<UserId>>,
}

impl UserRoleFilter {
    pub fn matches(&self, binding: &UserRole) -> bool {
        self.user_ids
            .as_ref()
            .is_none_or(|ids| ids.contains(&binding.user_id))
            && self
                .role_ids
                .as_ref()
                .is_none_or(|ids| ids.contains(&binding.role_id))
            && self
                .assigned_by_ids
                .as_ref()
                .is_none_or(|ids| ids.contains(&binding.assigned_by))
    }
}

/// 用户角色关联仓储接口
#[async_trait]
pub trait UserRoleRepository: Send + Sync {
    async fn create_many(&self, bindings: &[UserRole]) -> AppResult<()>;

    async fn find(&self, filter: &UserRoleFilter) -> AppResult<Vec<UserRole>>;

    /// 被绑定用户或授予者邮箱匹配的最近一条绑定
    async fn find_latest_by_email(&self, email: &Email) -> AppResult<Option<UserRole>>;

    /// 将这些用户授予的绑定改记为被绑定用户自授予，返回改动条数
    async fn reattribute_granted_by(&self, assigners: &[UserId]) -> AppResult<u64>;

    /// 删除 user_id ∈ user_ids 且 role_id ∈ role_ids 的绑定
    async fn delete_by_users_and_roles(
        &self,
        user_ids: &[UserId],
        role_ids: &[RoleId],
    ) -> AppResult<u64>;
}
