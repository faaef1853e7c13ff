//! admin-bootstrap - 统一服务启动骨架
//!
//! 配置加载、日志初始化、基础设施创建与 HTTP 服务生命周期

mod infrastructure;
mod metrics;
mod runtime;
mod starter;

pub use infrastructure::*;
pub use metrics::*;
pub use runtime::*;
pub use starter::*;
