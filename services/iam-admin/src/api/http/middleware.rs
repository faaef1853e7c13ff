//! 中间件：请求追踪 / JWT 认证 / 权限守卫

use admin_auth_core::{Claims, PermissionGuard};
use admin_common::RequestContext;
use admin_config::PermissionSource;
use admin_errors::{AppError, AppResult};
use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use super::state::AppState;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
pub const TRACE_ID_HEADER: HeaderName = HeaderName::from_static("x-trace-id");

/// 追踪中间件
///
/// 追踪 ID 取自 `x-request-id` / `x-trace-id`，缺省时生成 UUID v7，
/// 写入请求扩展并回写到响应头。
pub async fn trace_context(mut request: Request, next: Next) -> Response {
    let incoming = [&REQUEST_ID_HEADER, &TRACE_ID_HEADER].into_iter().find_map(|name| {
        request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    });

    let ctx = match incoming {
        Some(trace_id) => RequestContext::new(trace_id),
        None => RequestContext::generate(),
    };
    let trace_id = ctx.trace_id.clone();
    request.extensions_mut().insert(ctx);

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// JWT 认证中间件
///
/// 校验 Bearer 令牌，将 Claims 注入请求扩展，并记录调用方
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            warn!("Missing or invalid authorization header");
            AppError::unauthorized("Missing bearer token")
        })?;

    let claims = state.tokens.validate_access_token(token).inspect_err(|e| {
        warn!(error = %e, "Token validation failed");
    })?;
    let user_id = claims.user_id()?;
    debug!(user_id = %user_id, "Token validated");

    let ctx = request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_else(RequestContext::generate)
        .with_actor(user_id);
    request.extensions_mut().insert(ctx);
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// 守卫状态：共享状态 + 路由声明的所需权限
#[derive(Clone)]
pub struct GuardState {
    pub app: AppState,
    pub required: &'static [&'static str],
}

/// 权限守卫中间件
///
/// 须在认证中间件之后运行
pub async fn permission_guard(
    State(guard): State<GuardState>,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    let claims = request
        .extensions()
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| AppError::unauthorized("Authentication required"))?;
    let ctx = request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_else(RequestContext::generate);

    let granted = match guard.app.permission_source {
        PermissionSource::Token => claims.permissions.clone(),
        PermissionSource::Store => {
            match guard.app.auth.resolve_permissions(&ctx, claims.user_id()?).await {
                Ok(permissions) => permissions,
                // 没有角色视为没有权限
                Err(AppError::Unauthorized(_)) => Vec::new(),
                Err(e) => return Err(e),
            }
        }
    };

    if let Err(e) = PermissionGuard::check(guard.required, &granted) {
        metrics::counter!("auth_guard_denied_total").increment(1);
        warn!(user_id = %claims.sub, required = ?guard.required, "Permission denied");
        return Err(e);
    }

    Ok(next.run(request).await)
}
