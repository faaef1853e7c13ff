//! 权限相关命令定义

use crate::application::require_text;
use crate::domain::role::RoleId;

/// 创建权限命令
#[derive(Debug, Clone)]
pub struct CreatePermissionCommand {
    pub name: String,
    pub code: String,
    /// 创建后关联到这些角色
    pub role_ids: Vec<RoleId>,
}

impl CreatePermissionCommand {
    pub fn validate(&self) -> Result<(), String> {
        require_text("Permission name", &self.name, 200)?;
        require_text("Permission code", &self.code, 200)?;
        if self.code.chars().any(char::is_whitespace) {
            return Err("Permission code cannot contain whitespace".to_string());
        }
        Ok(())
    }
}

/// 更新权限命令（部分更新）
#[derive(Debug, Clone, Default)]
pub struct UpdatePermissionCommand {
    pub name: Option<String>,
    pub code: Option<String>,
}

impl UpdatePermissionCommand {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            require_text("Permission name", name, 200)?;
        }
        if let Some(code) = &self.code {
            require_text("Permission code", code, 200)?;
        }
        Ok(())
    }
}
