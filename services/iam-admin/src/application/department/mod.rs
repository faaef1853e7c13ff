//! 部门管理

pub mod commands;
pub mod service;

pub use commands::{CreateDepartmentCommand, UpdateDepartmentCommand};
pub use service::DepartmentService;
