//! 部门处理器

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::Value;

use crate::api::http::dto::{
    CreateDepartmentRequest, DeleteRequest, DeleteResponse, DepartmentResponse, IdsQuery,
    SearchParams, UpdateDepartmentRequest, paged,
};
use crate::api::http::extract::{ApiJson, ApiQuery, Ctx, parse_id, parse_id_list};
use crate::api::http::state::AppState;
use crate::application::department::{CreateDepartmentCommand, UpdateDepartmentCommand};
use crate::domain::department::DepartmentId;
use admin_errors::{AppError, AppResult};

pub async fn create(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(req): ApiJson<CreateDepartmentRequest>,
) -> AppResult<(StatusCode, Json<DepartmentResponse>)> {
    let cmd = CreateDepartmentCommand {
        name: req.name,
        country: req.country,
    };
    let department = state.departments.create(&ctx, cmd).await?;
    Ok((StatusCode::CREATED, Json(department.into())))
}

pub async fn find(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(query): ApiQuery<IdsQuery>,
) -> AppResult<Json<Vec<DepartmentResponse>>> {
    let raw = query
        .ids
        .ok_or_else(|| AppError::validation("Query parameter 'ids' is required"))?;
    let ids: Vec<DepartmentId> = parse_id_list(&raw, "department")?;

    let departments = state.departments.find_by_ids(&ctx, &ids).await?;
    Ok(Json(departments.into_iter().map(Into::into).collect()))
}

pub async fn search(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> AppResult<Json<Value>> {
    let result = state.departments.search(&ctx, params.into()).await?;
    Ok(Json(paged("departments", result, DepartmentResponse::from)))
}

pub async fn update(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateDepartmentRequest>,
) -> AppResult<Json<DepartmentResponse>> {
    let id: DepartmentId = parse_id(&id, "department")?;
    let cmd = UpdateDepartmentCommand {
        name: req.name,
        country: req.country,
    };
    let department = state.departments.update(&ctx, id, cmd).await?;
    Ok(Json(department.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(req): ApiJson<DeleteRequest<DepartmentId>>,
) -> AppResult<Json<DeleteResponse>> {
    let deleted = state.departments.delete_by_ids(&ctx, &req.ids).await?;
    Ok(Json(DeleteResponse { deleted }))
}
