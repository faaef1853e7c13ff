//! 用户角色绑定

pub mod commands;
pub mod service;

pub use commands::AssignRolesCommand;
pub use service::{BINDING_CHUNK_SIZE, UserRoleService};
