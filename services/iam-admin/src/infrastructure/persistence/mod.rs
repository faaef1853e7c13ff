//! 持久化层模块

pub mod department_repository;
pub mod error_mapper;
pub mod executor;
pub mod migrations;
pub mod permission_repository;
pub mod role_permission_repository;
pub mod role_repository;
pub mod unit_of_work;
pub mod user_repository;
pub mod user_role_repository;

pub use department_repository::PgDepartmentRepository;
pub use executor::{PgExecutor, SharedTx};
pub use migrations::run_migrations;
pub use permission_repository::PgPermissionRepository;
pub use role_permission_repository::PgRolePermissionRepository;
pub use role_repository::PgRoleRepository;
pub use unit_of_work::{PgRepositories, PostgresStore, PostgresUnitOfWork};
pub use user_repository::PgUserRepository;
pub use user_role_repository::PgUserRoleRepository;
