//! 权限管理

pub mod commands;
pub mod service;

pub use commands::{CreatePermissionCommand, UpdatePermissionCommand};
pub use service::PermissionService;
