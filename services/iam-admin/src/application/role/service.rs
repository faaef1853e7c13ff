//! 角色服务

use std::sync::Arc;

use admin_common::{PagedResult, RequestContext};
use admin_errors::{AppError, AppResult};
use tracing::info;

use super::commands::{CreateRoleCommand, UpdateRoleCommand};
use crate::application::permission::PermissionService;
use crate::application::require_ids;
use crate::domain::role::{PermissionId, Role, RoleId};
use crate::domain::search::SearchQuery;
use crate::domain::unit_of_work::{Repositories, Store, finish};
use crate::domain::{join_display, missing_ids};

pub struct RoleService {
    store: Arc<dyn Store>,
}

impl RoleService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// 创建角色并挂载权限
    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id, name = %cmd.name))]
    pub async fn create(&self, ctx: &RequestContext, cmd: CreateRoleCommand) -> AppResult<Role> {
        cmd.validate().map_err(AppError::validation)?;

        let uow = self.store.begin().await?;
        let result = Self::create_in(&*uow, cmd).await;
        let role = finish(uow, result).await?;

        info!(role_id = %role.id, "Role created");
        Ok(role)
    }

    async fn create_in<R: Repositories + ?Sized>(repos: &R, cmd: CreateRoleCommand) -> AppResult<Role> {
        if repos.roles().find_by_name(&cmd.name).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Role with name '{}' already exists",
                cmd.name
            )));
        }

        let permissions = PermissionService::resolve_codes_in(repos, &cmd.permissions).await?;

        let role = Role::new(cmd.name);
        repos.roles().create(&role).await?;

        let permission_ids: Vec<PermissionId> = permissions.iter().map(|p| p.id).collect();
        repos
            .role_permissions()
            .attach(&role.id, &permission_ids)
            .await?;

        Self::load_in(repos, role.id).await
    }

    /// 为角色追加权限，已有的关联保留
    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id, role_id = %role_id))]
    pub async fn add_permissions_to_role(
        &self,
        ctx: &RequestContext,
        permission_ids: &[PermissionId],
        role_id: RoleId,
    ) -> AppResult<Role> {
        require_ids(permission_ids, "permission")?;

        let uow = self.store.begin().await?;
        let result = Self::add_permissions_in(&*uow, permission_ids, role_id).await;
        let role = finish(uow, result).await?;

        info!(added = permission_ids.len(), "Permissions attached to role");
        Ok(role)
    }

    async fn add_permissions_in<R: Repositories + ?Sized>(
        repos: &R,
        permission_ids: &[PermissionId],
        role_id: RoleId,
    ) -> AppResult<Role> {
        Self::load_in(repos, role_id).await?;

        let found = repos.permissions().find_by_ids(permission_ids).await?;
        let missing = missing_ids(permission_ids, found.iter().map(|p| p.id));
        if !missing.is_empty() {
            return Err(AppError::not_found(format!(
                "Permissions not found: {}",
                join_display(&missing)
            )));
        }

        repos
            .role_permissions()
            .attach(&role_id, permission_ids)
            .await?;
        Self::load_in(repos, role_id).await
    }

    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn find_by_ids(&self, ctx: &RequestContext, ids: &[RoleId]) -> AppResult<Vec<Role>> {
        require_ids(ids, "role")?;
        let roles = self.store.roles().find_by_ids(ids).await?;
        if roles.is_empty() {
            return Err(AppError::not_found(format!(
                "Roles not found: {}",
                join_display(ids)
            )));
        }
        Ok(roles)
    }

    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn search(&self, ctx: &RequestContext, query: SearchQuery) -> AppResult<PagedResult<Role>> {
        let criteria = query.resolve(Role::SORTABLE_FIELDS)?;
        let (items, total) = self.store.roles().search(&criteria).await?;
        Ok(PagedResult::new(items, total, &criteria.page))
    }

    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id, role_id = %id))]
    pub async fn update(&self, ctx: &RequestContext, id: RoleId, cmd: UpdateRoleCommand) -> AppResult<Role> {
        let name = cmd.into_name().map_err(AppError::validation)?;

        let repos = &*self.store;
        let mut role = Self::load_in(repos, id).await?;

        if let Some(other) = repos.roles().find_by_name(&name).await?
            && other.id != id
        {
            return Err(AppError::conflict(format!(
                "Role with name '{}' already exists",
                name
            )));
        }

        role.name = name;
        role.audit_info.touch();
        repos.roles().update(&role).await?;

        Self::load_in(repos, id).await
    }

    /// 删除角色；仍绑定到用户的角色由外键拒绝（Conflict）
    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn delete_by_ids(&self, ctx: &RequestContext, ids: &[RoleId]) -> AppResult<u64> {
        require_ids(ids, "role")?;

        let uow = self.store.begin().await?;
        let result = Self::delete_in(&*uow, ids).await;
        let deleted = finish(uow, result).await?;

        info!(deleted, "Roles deleted");
        Ok(deleted)
    }

    async fn delete_in<R: Repositories + ?Sized>(repos: &R, ids: &[RoleId]) -> AppResult<u64> {
        let found = repos.roles().find_by_ids(ids).await?;
        let missing = missing_ids(ids, found.iter().map(|r| r.id));
        if !missing.is_empty() {
            return Err(AppError::not_found(format!(
                "Roles not found: {}",
                join_display(&missing)
            )));
        }

        repos.roles().delete_by_ids(ids).await
    }

    async fn load_in<R: Repositories + ?Sized>(repos: &R, id: RoleId) -> AppResult<Role> {
        repos
            .roles()
            .find_by_ids(&[id])
            .await?
            .pop()
            .ok_or_else(|| AppError::not_found(format!("Role {} not found", id)))
    }
}
