//! 部门服务

use std::sync::Arc;

use admin_common::{PagedResult, RequestContext};
use admin_errors::{AppError, AppResult};
use tracing::info;

use super::commands::{CreateDepartmentCommand, UpdateDepartmentCommand};
use crate::application::require_ids;
use crate::domain::department::{Department, DepartmentId};
use crate::domain::search::SearchQuery;
use crate::domain::unit_of_work::{Repositories, Store, finish};
use crate::domain::{join_display, missing_ids};

pub struct DepartmentService {
    store: Arc<dyn Store>,
}

impl DepartmentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id, name = %cmd.name))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        cmd: CreateDepartmentCommand,
    ) -> AppResult<Department> {
        cmd.validate().map_err(AppError::validation)?;

        let repo = self.store.departments();
        if repo.find_by_name(&cmd.name).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Department with name '{}' already exists",
                cmd.name
            )));
        }

        let department = Department::new(cmd.name, cmd.country);
        repo.create(&department).await?;

        info!(department_id = %department.id, "Department created");
        Ok(department)
    }

    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn find_by_ids(
        &self,
        ctx: &RequestContext,
        ids: &[DepartmentId],
    ) -> AppResult<Vec<Department>> {
        require_ids(ids, "department")?;
        let departments = self.store.departments().find_by_ids(ids).await?;
        if departments.is_empty() {
            return Err(AppError::not_found(format!(
                "Departments not found: {}",
                join_display(ids)
            )));
        }
        Ok(departments)
    }

    /// 全部解析，任一缺失即 NotFound；空列表直接通过
    pub async fn resolve_in<R: Repositories + ?Sized>(
        repos: &R,
        ids: &[DepartmentId],
    ) -> AppResult<Vec<Department>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let departments = repos.departments().find_by_ids(ids).await?;
        let missing = missing_ids(ids, departments.iter().map(|d| d.id));
        if !missing.is_empty() {
            return Err(AppError::not_found(format!(
                "Departments not found: {}",
                join_display(&missing)
            )));
        }
        Ok(departments)
    }

    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn search(
        &self,
        ctx: &RequestContext,
        query: SearchQuery,
    ) -> AppResult<PagedResult<Department>> {
        let criteria = query.resolve(Department::SORTABLE_FIELDS)?;
        let (items, total) = self.store.departments().search(&criteria).await?;
        Ok(PagedResult::new(items, total, &criteria.page))
    }

    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id, department_id = %id))]
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: DepartmentId,
        cmd: UpdateDepartmentCommand,
    ) -> AppResult<Department> {
        cmd.validate().map_err(AppError::validation)?;

        let repo = self.store.departments();
        let mut department = repo
            .find_by_ids(&[id])
            .await?
            .pop()
            .ok_or_else(|| AppError::not_found(format!("Department {} not found", id)))?;

        if department.apply_update(cmd.name, cmd.country)
            && let Some(other) = repo.find_by_name(&department.name).await?
            && other.id != id
        {
            return Err(AppError::conflict(format!(
                "Department with name '{}' already exists",
                department.name
            )));
        }

        repo.update(&department).await?;

        repo.find_by_ids(&[id])
            .await?
            .pop()
            .ok_or_else(|| AppError::not_found(format!("Department {} not found", id)))
    }

    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn delete_by_ids(&self, ctx: &RequestContext, ids: &[DepartmentId]) -> AppResult<u64> {
        require_ids(ids, "department")?;

        let uow = self.store.begin().await?;
        let result = Self::delete_in(&*uow, ids).await;
        let deleted = finish(uow, result).await?;

        info!(deleted, "Departments deleted");
        Ok(deleted)
    }

    async fn delete_in<R: Repositories + ?Sized>(repos: &R, ids: &[DepartmentId]) -> AppResult<u64> {
        Self::resolve_in(repos, ids).await?;
        repos.departments().delete_by_ids(ids).await
    }
}
