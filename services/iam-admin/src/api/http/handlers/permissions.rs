//! 权限处理器

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::Value;

use crate::api::http::dto::{
    CreatePermissionRequest, DeleteRequest, DeleteResponse, PermissionLookupQuery,
    PermissionResponse, SearchParams, UpdatePermissionRequest, paged,
};
use crate::api::http::extract::{ApiJson, ApiQuery, Ctx, parse_id, parse_id_list, split_list};
use crate::api::http::state::AppState;
use crate::application::permission::{CreatePermissionCommand, UpdatePermissionCommand};
use crate::domain::role::PermissionId;
use admin_errors::{AppError, AppResult};

pub async fn create(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(req): ApiJson<Vec<CreatePermissionRequest>>,
) -> AppResult<(StatusCode, Json<Vec<PermissionResponse>>)> {
    let cmds = req
        .into_iter()
        .map(|r| CreatePermissionCommand {
            name: r.name,
            code: r.code,
            role_ids: r.role_ids,
        })
        .collect();

    let permissions = state.permissions.create(&ctx, cmds).await?;
    Ok((
        StatusCode::CREATED,
        Json(permissions.into_iter().map(Into::into).collect()),
    ))
}

/// `?ids=` 或 `?codes=`
pub async fn find(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(query): ApiQuery<PermissionLookupQuery>,
) -> AppResult<Json<Vec<PermissionResponse>>> {
    let permissions = match (query.ids, query.codes) {
        (Some(ids), _) => {
            let ids: Vec<PermissionId> = parse_id_list(&ids, "permission")?;
            state.permissions.find_by_ids(&ctx, &ids).await?
        }
        (None, Some(codes)) => state.permissions.find_by_codes(&ctx, &split_list(&codes)).await?,
        (None, None) => {
            return Err(AppError::validation("Either 'ids' or 'codes' is required"));
        }
    };
    Ok(Json(permissions.into_iter().map(Into::into).collect()))
}

pub async fn search(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> AppResult<Json<Value>> {
    let result = state.permissions.search(&ctx, params.into()).await?;
    Ok(Json(paged("permissions", result, PermissionResponse::from)))
}

pub async fn update(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdatePermissionRequest>,
) -> AppResult<Json<PermissionResponse>> {
    let id: PermissionId = parse_id(&id, "permission")?;
    let cmd = UpdatePermissionCommand {
        name: req.name,
        code: req.code,
    };
    let permission = state.permissions.update(&ctx, id, cmd).await?;
    Ok(Json(permission.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(req): ApiJson<DeleteRequest<PermissionId>>,
) -> AppResult<Json<DeleteResponse>> {
    let deleted = state.permissions.delete_by_ids(&ctx, &req.ids).await?;
    Ok(Json(DeleteResponse { deleted }))
}
