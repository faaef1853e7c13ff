//! 权限服务

use std::collections::HashSet;
use std::sync::Arc;

use admin_common::{PagedResult, RequestContext};
use admin_errors::{AppError, AppResult};
use tracing::info;

use super::commands::{CreatePermissionCommand, UpdatePermissionCommand};
use crate::application::require_ids;
use crate::domain::role::{Permission, PermissionId, RoleId};
use crate::domain::search::SearchQuery;
use crate::domain::unit_of_work::{Repositories, Store, finish};
use crate::domain::{join_display, missing_ids};

pub struct PermissionService {
    store: Arc<dyn Store>,
}

impl PermissionService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// 批量创建权限
    ///
    /// 批次内任一名称或代码已存在则整体拒绝。
    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id, count = cmds.len()))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        cmds: Vec<CreatePermissionCommand>,
    ) -> AppResult<Vec<Permission>> {
        if cmds.is_empty() {
            return Err(AppError::validation("At least one permission is required"));
        }
        for cmd in &cmds {
            cmd.validate().map_err(AppError::validation)?;
        }
        check_batch_duplicates(&cmds)?;

        let uow = self.store.begin().await?;
        let result = Self::create_in(&*uow, cmds).await;
        let permissions = finish(uow, result).await?;

        info!(count = permissions.len(), "Permissions created");
        Ok(permissions)
    }

    async fn create_in<R: Repositories + ?Sized>(
        repos: &R,
        cmds: Vec<CreatePermissionCommand>,
    ) -> AppResult<Vec<Permission>> {
        let names: Vec<String> = cmds.iter().map(|c| c.name.clone()).collect();
        let codes: Vec<String> = cmds.iter().map(|c| c.code.clone()).collect();

        let conflicts = repos
            .permissions()
            .find_conflicts(&names, &codes, None)
            .await?;
        if !conflicts.is_empty() {
            let taken: Vec<String> = conflicts
                .iter()
                .map(|p| format!("{} ({})", p.name, p.code))
                .collect();
            return Err(AppError::conflict(format!(
                "Permissions already exist: {}",
                taken.join(", ")
            )));
        }

        let role_ids: Vec<RoleId> = cmds.iter().flat_map(|c| c.role_ids.iter().copied()).collect();
        if !role_ids.is_empty() {
            let found = repos.roles().find_by_ids(&role_ids).await?;
            let missing = missing_ids(&role_ids, found.iter().map(|r| r.id));
            if !missing.is_empty() {
                return Err(AppError::not_found(format!(
                    "Roles not found: {}",
                    join_display(&missing)
                )));
            }
        }

        let mut permissions = Vec::with_capacity(cmds.len());
        for cmd in cmds {
            let mut permission = Permission::new(cmd.code, cmd.name);
            let mut seen = HashSet::new();
            permission.role_ids = cmd.role_ids.into_iter().filter(|id| seen.insert(*id)).collect();
            permissions.push(permission);
        }

        repos.permissions().create_many(&permissions).await?;
        for permission in &permissions {
            for role_id in &permission.role_ids {
                repos
                    .role_permissions()
                    .attach(role_id, &[permission.id])
                    .await?;
            }
        }

        Ok(permissions)
    }

    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn find_by_ids(
        &self,
        ctx: &RequestContext,
        ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>> {
        require_ids(ids, "permission")?;
        let permissions = self.store.permissions().find_by_ids(ids).await?;
        if permissions.is_empty() {
            return Err(AppError::not_found(format!(
                "Permissions not found: {}",
                join_display(ids)
            )));
        }
        Ok(permissions)
    }

    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn find_by_codes(
        &self,
        ctx: &RequestContext,
        codes: &[String],
    ) -> AppResult<Vec<Permission>> {
        if codes.is_empty() {
            return Err(AppError::validation("At least one permission code is required"));
        }
        let permissions = self.store.permissions().find_by_codes(codes).await?;
        if permissions.is_empty() {
            return Err(AppError::not_found(format!(
                "Permissions not found for codes: {}",
                codes.join(", ")
            )));
        }
        Ok(permissions)
    }

    /// 将权限代码全部解析为权限，任一未命中即 NotFound
    pub async fn resolve_codes_in<R: Repositories + ?Sized>(
        repos: &R,
        codes: &[String],
    ) -> AppResult<Vec<Permission>> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }

        let permissions = repos.permissions().find_by_codes(codes).await?;
        let found: HashSet<&str> = permissions.iter().map(|p| p.code.as_str()).collect();
        let mut seen = HashSet::new();
        let unresolved: Vec<&str> = codes
            .iter()
            .map(String::as_str)
            .filter(|c| !found.contains(c) && seen.insert(*c))
            .collect();
        if !unresolved.is_empty() {
            return Err(AppError::not_found(format!(
                "Permissions not found for codes: {}",
                unresolved.join(", ")
            )));
        }
        Ok(permissions)
    }

    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn search(
        &self,
        ctx: &RequestContext,
        query: SearchQuery,
    ) -> AppResult<PagedResult<Permission>> {
        let criteria = query.resolve(Permission::SORTABLE_FIELDS)?;
        let (items, total) = self.store.permissions().search(&criteria).await?;
        Ok(PagedResult::new(items, total, &criteria.page))
    }

    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id, permission_id = %id))]
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: PermissionId,
        cmd: UpdatePermissionCommand,
    ) -> AppResult<Permission> {
        cmd.validate().map_err(AppError::validation)?;

        let repo = self.store.permissions();
        let mut permission = repo
            .find_by_ids(&[id])
            .await?
            .pop()
            .ok_or_else(|| AppError::not_found(format!("Permission {} not found", id)))?;

        let names: Vec<String> = cmd.name.iter().cloned().collect();
        let codes: Vec<String> = cmd.code.iter().cloned().collect();
        if !names.is_empty() || !codes.is_empty() {
            let conflicts = repo.find_conflicts(&names, &codes, Some(&id)).await?;
            if let Some(other) = conflicts.first() {
                return Err(AppError::conflict(format!(
                    "Permission '{}' ({}) already uses this name or code",
                    other.name, other.code
                )));
            }
        }

        if let Some(name) = cmd.name {
            permission.name = name;
        }
        if let Some(code) = cmd.code {
            permission.code = code;
        }
        permission.audit_info.touch();
        repo.update(&permission).await?;

        repo.find_by_ids(&[id])
            .await?
            .pop()
            .ok_or_else(|| AppError::not_found(format!("Permission {} not found", id)))
    }

    /// 删除权限：先解除角色关联，再删除记录
    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn delete_by_ids(&self, ctx: &RequestContext, ids: &[PermissionId]) -> AppResult<u64> {
        require_ids(ids, "permission")?;

        let uow = self.store.begin().await?;
        let result = Self::delete_in(&*uow, ids).await;
        let deleted = finish(uow, result).await?;

        info!(deleted, "Permissions deleted");
        Ok(deleted)
    }

    async fn delete_in<R: Repositories + ?Sized>(repos: &R, ids: &[PermissionId]) -> AppResult<u64> {
        let found = repos.permissions().find_by_ids(ids).await?;
        let missing = missing_ids(ids, found.iter().map(|p| p.id));
        if !missing.is_empty() {
            return Err(AppError::not_found(format!(
                "Permissions not found: {}",
                join_display(&missing)
            )));
        }

        repos.role_permissions().detach_permissions(ids).await?;
        repos.permissions().delete_by_ids(ids).await
    }
}

/// 批次内部的名称 / 代码重复
fn check_batch_duplicates(cmds: &[CreatePermissionCommand]) -> AppResult<()> {
    let mut names = HashSet::new();
    let mut codes = HashSet::new();
    let mut duplicates = Vec::new();
    for cmd in cmds {
        if !names.insert(cmd.name.as_str()) {
            duplicates.push(format!("name '{}'", cmd.name));
        }
        if !codes.insert(cmd.code.as_str()) {
            duplicates.push(format!("code '{}'", cmd.code));
        }
    }
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(AppError::conflict(format!(
            "Duplicate entries in request: {}",
            duplicates.join(", ")
        )))
    }
}
