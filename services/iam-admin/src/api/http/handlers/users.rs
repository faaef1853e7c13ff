//! 用户处理器

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::Value;

use crate::api::http::dto::{
    CreateUserRequest, DeleteRequest, DeleteResponse, SearchParams, UpdateUserRequest,
    UserResponse, paged,
};
use crate::api::http::extract::{ApiJson, ApiQuery, Ctx, parse_id};
use crate::api::http::state::AppState;
use crate::application::user::{CreateUserCommand, UpdateUserCommand};
use admin_common::UserId;
use admin_errors::AppResult;

impl From<UpdateUserRequest> for UpdateUserCommand {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password: req.password,
            phone: req.phone,
            date_of_birth: req.date_of_birth,
            is_active: req.is_active,
            is_email_verified: req.is_email_verified,
            is_two_factor_enabled: req.is_two_factor_enabled,
        }
    }
}

/// 创建用户；角色绑定的授予者为当前调用方
pub async fn create(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let cmd = CreateUserCommand {
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        password: req.password,
        phone: req.phone,
        date_of_birth: req.date_of_birth,
        department_ids: req.department_ids,
        role_ids: req.role_ids,
    };
    let created_by = ctx.actor;
    let user = state.users.create(&ctx, cmd, created_by).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn find_by_id(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let id = UserId::from_uuid(parse_id(&id, "user")?);
    let user = state.users.find_by_id(&ctx, id).await?;
    Ok(Json(user.into()))
}

pub async fn find_by_email(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(email): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = state.users.find_by_email(&ctx, &email).await?;
    Ok(Json(user.into()))
}

pub async fn search(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> AppResult<Json<Value>> {
    let result = state.users.search(&ctx, params.into()).await?;
    Ok(Json(paged("users", result, UserResponse::from)))
}

pub async fn update_by_id(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let id = UserId::from_uuid(parse_id(&id, "user")?);
    let user = state.users.update_by_id(&ctx, id, req.into()).await?;
    Ok(Json(user.into()))
}

pub async fn update_by_email(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(email): Path<String>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state.users.update_by_email(&ctx, &email, req.into()).await?;
    Ok(Json(user.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(req): ApiJson<DeleteRequest<UserId>>,
) -> AppResult<Json<DeleteResponse>> {
    let deleted = state.users.delete_by_ids(&ctx, &req.ids).await?;
    Ok(Json(DeleteResponse { deleted }))
}
