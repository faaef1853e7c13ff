//! HTTP 处理器

pub mod auth;
pub mod departments;
pub mod permissions;
pub mod roles;
pub mod system;
pub mod user_roles;
pub mod users;
