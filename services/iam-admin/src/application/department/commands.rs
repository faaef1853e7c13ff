//! 部门相关命令定义

use crate::application::require_text;

#[derive(Debug, Clone)]
pub struct CreateDepartmentCommand {
    pub name: String,
    pub country: String,
}

impl CreateDepartmentCommand {
    pub fn validate(&self) -> Result<(), String> {
        require_text("Department name", &self.name, 200)?;
        require_text("Country", &self.country, 100)
    }
}

/// 部分更新
#[derive(Debug, Clone, Default)]
pub struct UpdateDepartmentCommand {
    pub name: Option<String>,
    pub country: Option<String>,
}

impl UpdateDepartmentCommand {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            require_text("Department name", name, 200)?;
        }
        if let Some(country) = &self.country {
            require_text("Country", country, 100)?;
        }
        Ok(())
    }
}
