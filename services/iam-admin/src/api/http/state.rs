//! 路由共享状态

use std::sync::Arc;

use admin_auth_core::TokenService;
use admin_config::PermissionSource;
use admin_errors::AppResult;
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;

use crate::application::{
    AuthService, DepartmentService, PermissionService, RoleService, UserRoleService, UserService,
};
use crate::domain::unit_of_work::Store;
use crate::domain::user::PasswordHasher;

#[derive(Clone)]
pub struct AppState {
    pub permissions: Arc<PermissionService>,
    pub roles: Arc<RoleService>,
    pub departments: Arc<DepartmentService>,
    pub users: Arc<UserService>,
    pub user_roles: Arc<UserRoleService>,
    pub auth: Arc<AuthService>,
    pub tokens: Arc<TokenService>,
    /// 守卫使用的权限来源
    pub permission_source: PermissionSource,
    /// 健康检查使用的连接池
    pub pool: Option<PgPool>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<TokenService>,
        permission_source: PermissionSource,
    ) -> AppResult<Self> {
        Ok(Self {
            permissions: Arc::new(PermissionService::new(store.clone())),
            roles: Arc::new(RoleService::new(store.clone())),
            departments: Arc::new(DepartmentService::new(store.clone())),
            users: Arc::new(UserService::new(store.clone(), hasher.clone())),
            user_roles: Arc::new(UserRoleService::new(store.clone())),
            auth: Arc::new(AuthService::new(store, hasher, tokens.clone())?),
            tokens,
            permission_source,
            pool: None,
            metrics: None,
        })
    }

    pub fn with_pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
