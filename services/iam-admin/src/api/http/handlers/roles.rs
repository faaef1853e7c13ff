//! 角色处理器

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::Value;

use crate::api::http::dto::{
    AddPermissionsRequest, CreateRoleRequest, DeleteRequest, DeleteResponse, IdsQuery,
    RoleResponse, SearchParams, UpdateRoleRequest, paged,
};
use crate::api::http::extract::{ApiJson, ApiQuery, Ctx, parse_id, parse_id_list};
use crate::api::http::state::AppState;
use crate::application::role::{CreateRoleCommand, UpdateRoleCommand};
use crate::domain::role::RoleId;
use admin_errors::{AppError, AppResult};

pub async fn create(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(req): ApiJson<CreateRoleRequest>,
) -> AppResult<(StatusCode, Json<RoleResponse>)> {
    let cmd = CreateRoleCommand {
        name: req.name,
        permissions: req.permissions,
    };
    let role = state.roles.create(&ctx, cmd).await?;
    Ok((StatusCode::CREATED, Json(role.into())))
}

pub async fn find(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(query): ApiQuery<IdsQuery>,
) -> AppResult<Json<Vec<RoleResponse>>> {
    let raw = query
        .ids
        .ok_or_else(|| AppError::validation("Query parameter 'ids' is required"))?;
    let ids: Vec<RoleId> = parse_id_list(&raw, "role")?;

    let roles = state.roles.find_by_ids(&ctx, &ids).await?;
    Ok(Json(roles.into_iter().map(Into::into).collect()))
}

pub async fn search(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> AppResult<Json<Value>> {
    let result = state.roles.search(&ctx, params.into()).await?;
    Ok(Json(paged("roles", result, RoleResponse::from)))
}

pub async fn update(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateRoleRequest>,
) -> AppResult<Json<RoleResponse>> {
    let id: RoleId = parse_id(&id, "role")?;
    let role = state
        .roles
        .update(&ctx, id, UpdateRoleCommand { name: req.name })
        .await?;
    Ok(Json(role.into()))
}

pub async fn add_permissions(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<AddPermissionsRequest>,
) -> AppResult<Json<RoleResponse>> {
    let id: RoleId = parse_id(&id, "role")?;
    let role = state
        .roles
        .add_permissions_to_role(&ctx, &req.permission_ids, id)
        .await?;
    Ok(Json(role.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(req): ApiJson<DeleteRequest<RoleId>>,
) -> AppResult<Json<DeleteResponse>> {
    let deleted = state.roles.delete_by_ids(&ctx, &req.ids).await?;
    Ok(Json(DeleteResponse { deleted }))
}
