//! 用户相关命令定义

use chrono::NaiveDate;

use crate::application::require_text;
use crate::domain::department::DepartmentId;
use crate::domain::role::RoleId;

/// 密码最短长度
pub const MIN_PASSWORD_LENGTH: usize = 8;

fn check_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}

fn check_phone(phone: &Option<String>) -> Result<(), String> {
    match phone {
        Some(phone) if phone.chars().count() > 50 => {
            Err("Phone cannot exceed 50 characters".to_string())
        }
        _ => Ok(()),
    }
}

/// 创建用户命令
#[derive(Debug, Clone)]
pub struct CreateUserCommand {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub department_ids: Vec<DepartmentId>,
    pub role_ids: Vec<RoleId>,
}

impl CreateUserCommand {
    pub fn validate(&self) -> Result<(), String> {
        require_text("First name", &self.first_name, 100)?;
        require_text("Last name", &self.last_name, 100)?;
        check_password(&self.password)?;
        check_phone(&self.phone)
    }
}

/// 更新用户命令（部分更新）
#[derive(Debug, Clone, Default)]
pub struct UpdateUserCommand {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_active: Option<bool>,
    pub is_email_verified: Option<bool>,
    pub is_two_factor_enabled: Option<bool>,
}

impl UpdateUserCommand {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(first_name) = &self.first_name {
            require_text("First name", first_name, 100)?;
        }
        if let Some(last_name) = &self.last_name {
            require_text("Last name", last_name, 100)?;
        }
        if let Some(password) = &self.password {
            check_password(password)?;
        }
        check_phone(&self.phone)
    }
}
