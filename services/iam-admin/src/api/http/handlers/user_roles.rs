//! 用户角色处理器

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::api::http::dto::{
    AssignRoleRequest, CreateUserRolesRequest, UnassignRequest, UnassignResponse, UserRoleQuery,
    UserRoleResponse,
};
use crate::api::http::extract::{ApiJson, ApiQuery, Ctx, parse_id_list};
use crate::api::http::state::AppState;
use crate::application::user_role::AssignRolesCommand;
use crate::domain::role::UserRoleFilter;
use admin_common::UserId;
use admin_errors::{AppError, AppResult};
use uuid::Uuid;

fn parse_user_ids(raw: Option<String>, entity: &str) -> AppResult<Option<Vec<UserId>>> {
    raw.map(|raw| {
        parse_id_list::<Uuid>(&raw, entity).map(|ids| ids.into_iter().map(UserId::from_uuid).collect())
    })
    .transpose()
}

pub async fn create(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(req): ApiJson<CreateUserRolesRequest>,
) -> AppResult<(StatusCode, Json<Vec<UserRoleResponse>>)> {
    let assigned_by = req
        .assigned_by_id
        .or(ctx.actor)
        .ok_or_else(|| AppError::validation("assignedById is required"))?;

    let cmd = AssignRolesCommand {
        user_id: req.user_id,
        role_ids: req.role_ids,
        assigned_by,
    };
    let bindings = state.user_roles.create(&ctx, cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(bindings.into_iter().map(Into::into).collect()),
    ))
}

pub async fn find(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(query): ApiQuery<UserRoleQuery>,
) -> AppResult<Json<Vec<UserRoleResponse>>> {
    let filter = UserRoleFilter {
        user_ids: parse_user_ids(query.user_ids, "user")?,
        role_ids: query
            .role_ids
            .map(|raw| parse_id_list(&raw, "role"))
            .transpose()?,
        assigned_by_ids: parse_user_ids(query.assigned_by_ids, "assigning user")?,
    };

    let bindings = state.user_roles.find(&ctx, &filter).await?;
    Ok(Json(bindings.into_iter().map(Into::into).collect()))
}

pub async fn find_by_email(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(email): Path<String>,
) -> AppResult<Json<UserRoleResponse>> {
    let binding = state.user_roles.find_by_user_email(&ctx, &email).await?;
    Ok(Json(binding.into()))
}

pub async fn assign(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(req): ApiJson<AssignRoleRequest>,
) -> AppResult<(StatusCode, Json<UserRoleResponse>)> {
    let binding = state
        .user_roles
        .assign_role_to_user(&ctx, req.user_id, req.role_id)
        .await?;
    Ok((StatusCode::CREATED, Json(binding.into())))
}

pub async fn unassign(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(req): ApiJson<UnassignRequest>,
) -> AppResult<Json<UnassignResponse>> {
    let unassigned = state
        .user_roles
        .unassign_role_from_user(&ctx, &req.user_ids, &req.role_ids)
        .await?;
    Ok(Json(UnassignResponse { unassigned }))
}
