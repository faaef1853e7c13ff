//! 认证处理器

use axum::{Json, extract::State};

use crate::api::http::dto::{LoginRequest, LoginResponse, MeResponse};
use crate::api::http::extract::{ApiJson, AuthClaims, Ctx};
use crate::api::http::state::AppState;
use admin_errors::AppResult;

pub async fn login(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let result = state.auth.login(&ctx, &req.email, &req.password).await?;
    Ok(Json(LoginResponse {
        access_token: result.access_token,
        token_type: "Bearer",
        expires_in: result.expires_in,
    }))
}

/// 当前调用方（来自令牌）
pub async fn me(AuthClaims(claims): AuthClaims) -> Json<MeResponse> {
    Json(MeResponse {
        id: claims.sub,
        email: claims.email,
        permissions: claims.permissions,
        expires_at: claims.exp,
    })
}
