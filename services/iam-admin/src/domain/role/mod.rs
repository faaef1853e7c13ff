//! RBAC 角色权限领域模块

#![allow(clippy::module_inception)]

pub mod permission;
pub mod repository;
pub mod role;
pub mod user_role;

pub use permission::{Permission, PermissionId};
pub use repository::{
    PermissionRepository, RolePermissionRepository, RoleRepository, UserRoleFilter,
    UserRoleRepository,
};
pub use role::{Role, RoleId};
pub use user_role::{UserRole, UserRoleId};
