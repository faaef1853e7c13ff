//! IAM Admin Service - 用户 / 角色 / 权限 / 部门管理
//!
//! RBAC 管理后台：JWT 登录、权限守卫与各实体的增删改查

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;

use std::sync::Arc;

use admin_bootstrap::Infrastructure;
use admin_common::RequestContext;
use admin_errors::AppResult;
use axum::Router;
use tracing::info;

use api::http::{AppState, router};
use application::{SystemAccount, seed_system};
use domain::unit_of_work::Store;
use domain::user::{Argon2PasswordHasher, PasswordHasher};
use infrastructure::persistence::{PostgresStore, run_migrations};

/// 完成迁移与系统账号初始化后构建路由
pub async fn build(infra: Infrastructure) -> AppResult<Router> {
    let pool = infra.postgres_pool();
    let config = infra.config();

    run_migrations(&pool).await?;

    let store: Arc<dyn Store> = Arc::new(PostgresStore::new(pool.clone()));
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());

    let account = SystemAccount::from(&config.system);
    seed_system(
        &RequestContext::internal("seed"),
        store.as_ref(),
        hasher.as_ref(),
        &account,
    )
    .await?;

    let state = AppState::new(
        store,
        hasher,
        infra.token_service(),
        config.auth.permission_source,
    )?
    .with_pool(pool)
    .with_metrics(infra.metrics_handle());

    info!(
        permission_source = ?config.auth.permission_source,
        "IAM admin service initialized"
    );
    Ok(router(state))
}
