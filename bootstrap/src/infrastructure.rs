//! 基础设施资源管理

use std::sync::Arc;

use admin_adapter_postgres::{PostgresConfig, RetryConfig, create_pool_with_retry};
use admin_auth_core::TokenService;
use admin_config::AppConfig;
use admin_errors::{AppError, AppResult};
use metrics_exporter_prometheus::PrometheusHandle;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::info;

/// 基础设施资源容器，由 bootstrap 统一初始化
#[derive(Clone)]
pub struct Infrastructure {
    config: Arc<AppConfig>,
    postgres_pool: PgPool,
    token_service: Arc<TokenService>,
    metrics: PrometheusHandle,
}

impl Infrastructure {
    /// 从配置创建基础设施资源（连接失败时重试）
    pub async fn from_config(config: AppConfig, metrics: PrometheusHandle) -> AppResult<Self> {
        let expires_in = config
            .jwt
            .expires_in_secs()
            .map_err(|e| AppError::internal(e.to_string()))?;

        let pg_config = PostgresConfig::new(config.database.url.expose_secret())
            .with_max_connections(config.database.max_connections);
        let postgres_pool = create_pool_with_retry(&pg_config, &RetryConfig::default()).await?;

        let token_service = Arc::new(TokenService::new(
            config.jwt.secret.expose_secret(),
            expires_in,
            config.jwt.issuer.clone(),
            config.jwt.audience.clone(),
        ));
        info!(
            expires_in,
            issuer = %config.jwt.issuer,
            "Token service initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            postgres_pool,
            token_service,
            metrics,
        })
    }

    /// 获取应用配置
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 获取 PostgreSQL 连接池
    pub fn postgres_pool(&self) -> PgPool {
        self.postgres_pool.clone()
    }

    /// 获取 Token 服务
    pub fn token_service(&self) -> Arc<TokenService> {
        self.token_service.clone()
    }

    /// 获取 Prometheus 句柄（用于 /metrics）
    pub fn metrics_handle(&self) -> PrometheusHandle {
        self.metrics.clone()
    }
}
