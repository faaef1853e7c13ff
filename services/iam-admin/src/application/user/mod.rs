//! 用户管理

pub mod commands;
pub mod service;

pub use commands::{CreateUserCommand, MIN_PASSWORD_LENGTH, UpdateUserCommand};
pub use service::UserService;
