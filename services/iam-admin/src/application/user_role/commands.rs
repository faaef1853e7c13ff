//! 用户角色命令定义

use admin_common::UserId;

use crate::domain::role::RoleId;

/// 为用户绑定一组角色
#[derive(Debug, Clone)]
pub struct AssignRolesCommand {
    pub user_id: UserId,
    pub role_ids: Vec<RoleId>,
    /// 授予者
    pub assigned_by: UserId,
}
