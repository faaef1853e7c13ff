//! Unit of Work 模式
//!
//! 提供跨多个 Repository 的事务协调能力，确保操作的原子性。

use admin_errors::AppResult;
use async_trait::async_trait;
use tracing::warn;

use crate::domain::department::DepartmentRepository;
use crate::domain::role::{
    PermissionRepository, RolePermissionRepository, RoleRepository, UserRoleRepository,
};
use crate::domain::user::UserRepository;

/// 仓储访问入口
///
/// 连接池与事务两种实现共用同一组访问器，应用层的事务内逻辑
/// 以 `R: Repositories + ?Sized` 为参数，两种场景复用同一份代码。
pub trait Repositories: Send + Sync {
    fn permissions(&self) -> &dyn PermissionRepository;

    fn roles(&self) -> &dyn RoleRepository;

    fn role_permissions(&self) -> &dyn RolePermissionRepository;

    fn departments(&self) -> &dyn DepartmentRepository;

    fn users(&self) -> &dyn UserRepository;

    fn user_roles(&self) -> &dyn UserRoleRepository;
}

/// Unit of Work trait
#[async_trait]
pub trait UnitOfWork: Repositories {
    /// 提交事务
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// 回滚事务
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Unit of Work 工厂 trait
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    /// 开始新的事务
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;
}

/// 存储：非事务读写 + 开启事务
pub trait Store: Repositories + UnitOfWorkFactory {}

impl<T: Repositories + UnitOfWorkFactory> Store for T {}

/// 按结果提交或回滚
///
/// 回滚失败只记录日志，返回原始错误。
pub async fn finish<T>(uow: Box<dyn UnitOfWork>, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback().await {
                warn!(error = %rollback_err, "Transaction rollback failed");
            }
            Err(err)
        }
    }
}
