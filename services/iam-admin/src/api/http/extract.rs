//! 请求提取器
//!
//! 解析失败统一转为 Problem Details（400），不使用 axum 默认的纯文本拒绝。

use std::str::FromStr;

use admin_auth_core::Claims;
use admin_common::RequestContext;
use admin_errors::AppError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

/// JSON 请求体
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| AppError::validation(e.body_text()))?;
        Ok(Self(value))
    }
}

/// 查询参数
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| AppError::validation(e.body_text()))?;
        Ok(Self(value))
    }
}

/// 已认证调用方的 Claims（由认证中间件注入）
pub struct AuthClaims(pub Claims);

impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthClaims)
            .ok_or_else(|| AppError::unauthorized("Authentication required"))
    }
}

/// 请求上下文（由追踪中间件注入，缺失时新建）
pub struct Ctx(pub RequestContext);

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_else(RequestContext::generate);
        Ok(Self(ctx))
    }
}

/// 解析路径中的 ID
pub fn parse_id<T: FromStr>(raw: &str, entity: &str) -> Result<T, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid {} id '{}'", entity, raw)))
}

/// 解析逗号分隔的 ID 列表，忽略空项
pub fn parse_id_list<T: FromStr>(raw: &str, entity: &str) -> Result<Vec<T>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_id(s, entity))
        .collect()
}

/// 逗号分隔的文本列表
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
