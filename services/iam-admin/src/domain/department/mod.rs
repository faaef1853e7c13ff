//! 部门领域模块

#![allow(clippy::module_inception)]

pub mod department;
pub mod repository;

pub use department::{Department, DepartmentId};
pub use repository::DepartmentRepository;
