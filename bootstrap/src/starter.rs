//! 服务启动器
//!
//! 提供统一的服务启动模式

use std::future::Future;
use std::net::SocketAddr;

use admin_config::AppConfig;
use admin_errors::AppResult;
use admin_telemetry::init_metrics;
use axum::{Router, middleware};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::infrastructure::Infrastructure;
use crate::metrics::track_http_metrics;
use crate::runtime::{init_runtime, shutdown_signal};

/// 运行 HTTP 服务
///
/// 统一入口，负责：
/// 1. 加载配置
/// 2. 初始化运行时（日志）与 Prometheus recorder
/// 3. 创建基础设施资源（数据库连接池、TokenService）
/// 4. 调用闭包构建路由（迁移、初始化数据等由服务自行完成）
/// 5. 启动服务器并处理 graceful shutdown
///
/// ```ignore
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     admin_bootstrap::run("config", |infra| async move {
///         Ok(my_service::router(infra))
///     })
///     .await
/// }
/// ```
pub async fn run<F, Fut>(config_dir: &str, router_builder: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(Infrastructure) -> Fut,
    Fut: Future<Output = AppResult<Router>>,
{
    let config = AppConfig::load(config_dir)?;
    init_runtime(&config);

    info!("Starting {} service", config.app_name);

    let metrics = init_metrics()?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let infra = Infrastructure::from_config(config, metrics).await?;
    let app = router_builder(infra)
        .await?
        .layer(middleware::from_fn(track_http_metrics))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Service stopped");
    Ok(())
}
