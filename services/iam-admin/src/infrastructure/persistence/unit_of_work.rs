//! PostgreSQL Unit of Work 实现

use std::sync::Arc;

use admin_errors::{AppError, AppResult};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tokio::sync::Mutex;

use super::executor::{PgExecutor, SharedTx};
use super::{
    PgDepartmentRepository, PgPermissionRepository, PgRolePermissionRepository, PgRoleRepository,
    PgUserRepository, PgUserRoleRepository,
};
use crate::domain::department::DepartmentRepository;
use crate::domain::role::{
    PermissionRepository, RolePermissionRepository, RoleRepository, UserRoleRepository,
};
use crate::domain::unit_of_work::{Repositories, UnitOfWork, UnitOfWorkFactory};
use crate::domain::user::UserRepository;

/// 绑定在同一个执行器上的一组仓储
pub struct PgRepositories {
    permissions: PgPermissionRepository,
    roles: PgRoleRepository,
    role_permissions: PgRolePermissionRepository,
    departments: PgDepartmentRepository,
    users: PgUserRepository,
    user_roles: PgUserRoleRepository,
}

impl PgRepositories {
    pub fn new(exec: PgExecutor) -> Self {
        Self {
            permissions: PgPermissionRepository::new(exec.clone()),
            roles: PgRoleRepository::new(exec.clone()),
            role_permissions: PgRolePermissionRepository::new(exec.clone()),
            departments: PgDepartmentRepository::new(exec.clone()),
            users: PgUserRepository::new(exec.clone()),
            user_roles: PgUserRoleRepository::new(exec),
        }
    }
}

impl Repositories for PgRepositories {
    fn permissions(&self) -> &dyn PermissionRepository {
        &self.permissions
    }

    fn roles(&self) -> &dyn RoleRepository {
        &self.roles
    }

    fn role_permissions(&self) -> &dyn RolePermissionRepository {
        &self.role_permissions
    }

    fn departments(&self) -> &dyn DepartmentRepository {
        &self.departments
    }

    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn user_roles(&self) -> &dyn UserRoleRepository {
        &self.user_roles
    }
}

/// 将 Repositories 委托给内部的 `repos` 字段
macro_rules! delegate_repositories {
    ($name:ident) => {
        impl Repositories for $name {
            fn permissions(&self) -> &dyn PermissionRepository {
                self.repos.permissions()
            }

            fn roles(&self) -> &dyn RoleRepository {
                self.repos.roles()
            }

            fn role_permissions(&self) -> &dyn RolePermissionRepository {
                self.repos.role_permissions()
            }

            fn departments(&self) -> &dyn DepartmentRepository {
                self.repos.departments()
            }

            fn users(&self) -> &dyn UserRepository {
                self.repos.users()
            }

            fn user_roles(&self) -> &dyn UserRoleRepository {
                self.repos.user_roles()
            }
        }
    };
}

/// 基于连接池的存储：非事务读写，并负责开启事务
pub struct PostgresStore {
    pool: PgPool,
    repos: PgRepositories,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repos: PgRepositories::new(PgExecutor::Pool(pool.clone())),
            pool,
        }
    }
}

delegate_repositories!(PostgresStore);

#[async_trait]
impl UnitOfWorkFactory for PostgresStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {}", e)))?;

        Ok(Box::new(PostgresUnitOfWork::new(tx)))
    }
}

/// Postgres Unit of Work 实现
///
/// 未提交即被丢弃时，sqlx 事务在 drop 时自动回滚。
pub struct PostgresUnitOfWork {
    tx: SharedTx,
    repos: PgRepositories,
}

impl PostgresUnitOfWork {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        let tx: SharedTx = Arc::new(Mutex::new(Some(tx)));
        Self {
            repos: PgRepositories::new(PgExecutor::Tx(tx.clone())),
            tx,
        }
    }

    async fn take(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.tx
            .lock()
            .await
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed"))
    }
}

delegate_repositories!(PostgresUnitOfWork);

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn commit(self: Box<Self>) -> AppResult<()> {
        let tx = self.take().await?;
        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit transaction: {}", e)))
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        let tx = self.take().await?;
        tx.rollback()
            .await
            .map_err(|e| AppError::database(format!("Failed to rollback transaction: {}", e)))
    }
}
