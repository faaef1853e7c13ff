//! 角色相关命令定义

use crate::application::require_text;

/// 创建角色命令
#[derive(Debug, Clone)]
pub struct CreateRoleCommand {
    pub name: String,
    /// 权限代码，必须全部存在
    pub permissions: Vec<String>,
}

impl CreateRoleCommand {
    pub fn validate(&self) -> Result<(), String> {
        require_text("Role name", &self.name, 200)
    }
}

/// 更新角色命令
#[derive(Debug, Clone, Default)]
pub struct UpdateRoleCommand {
    /// 必填
    pub name: Option<String>,
}

impl UpdateRoleCommand {
    /// 校验并取出名称
    pub fn into_name(self) -> Result<String, String> {
        let name = self.name.ok_or_else(|| "Role name is required".to_string())?;
        require_text("Role name", &name, 200)?;
        Ok(name)
    }
}
