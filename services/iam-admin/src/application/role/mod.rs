//! 角色管理

pub mod commands;
pub mod service;

pub use commands::{CreateRoleCommand, UpdateRoleCommand};
pub use service::RoleService;
