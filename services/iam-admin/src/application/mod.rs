//! 应用层
//!
//! 每个服务持有 `Arc<dyn Store>`；多步写操作在一个 Unit of Work 中执行，
//! 事务内逻辑写成 `..._in(repos, ..)` 形式，便于服务之间组合。

pub mod auth;
pub mod department;
pub mod permission;
pub mod role;
pub mod seed;
pub mod user;
pub mod user_role;

pub use auth::AuthService;
pub use department::DepartmentService;
pub use permission::PermissionService;
pub use role::RoleService;
pub use seed::{SystemAccount, seed_system};
pub use user::UserService;
pub use user_role::UserRoleService;

use admin_errors::{AppError, AppResult};

/// 校验必填文本字段
pub(crate) fn require_text(field: &str, value: &str, max_len: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} cannot be empty", field));
    }
    if value.chars().count() > max_len {
        return Err(format!("{} cannot exceed {} characters", field, max_len));
    }
    Ok(())
}

/// 批量操作的 ID 列表不能为空
pub(crate) fn require_ids<T>(ids: &[T], entity: &str) -> AppResult<()> {
    if ids.is_empty() {
        return Err(AppError::validation(format!(
            "At least one {} id is required",
            entity
        )));
    }
    Ok(())
}
