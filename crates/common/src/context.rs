//! 请求上下文
//!
//! 由 HTTP 中间件创建，显式地沿调用链传入各个应用服务。

use uuid::Uuid;

use crate::types::UserId;

/// 请求上下文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// 追踪 ID (x-request-id / x-trace-id，缺省时生成)
    pub trace_id: String,
    /// 当前操作者（已认证用户）
    pub actor: Option<UserId>,
}

impl RequestContext {
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            actor: None,
        }
    }

    /// 生成新的追踪 ID
    pub fn generate() -> Self {
        Self::new(Uuid::now_v7().to_string())
    }

    /// 内部任务（启动初始化等）使用的上下文
    pub fn internal(task: &str) -> Self {
        Self::new(format!("internal:{}", task))
    }

    pub fn with_actor(mut self, actor: UserId) -> Self {
        self.actor = Some(actor);
        self
    }
}
