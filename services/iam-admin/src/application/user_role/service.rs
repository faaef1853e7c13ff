//! 用户角色服务

use std::collections::HashSet;
use std::sync::Arc;

use admin_common::{RequestContext, UserId};
use admin_errors::{AppError, AppResult};
use tracing::info;

use super::commands::AssignRolesCommand;
use crate::application::require_ids;
use crate::domain::role::{RoleId, UserRole, UserRoleFilter};
use crate::domain::unit_of_work::{Repositories, Store, finish};
use crate::domain::user::Email;
use crate::domain::{join_display, missing_ids};

/// 批量写入绑定时的分块大小
pub const BINDING_CHUNK_SIZE: usize = 50;

pub struct UserRoleService {
    store: Arc<dyn Store>,
}

impl UserRoleService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// 为用户绑定角色（每个角色一条绑定）
    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id, user_id = %cmd.user_id))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        cmd: AssignRolesCommand,
    ) -> AppResult<Vec<UserRole>> {
        require_ids(&cmd.role_ids, "role")?;

        let uow = self.store.begin().await?;
        let result = Self::create_in(&*uow, cmd.user_id, &cmd.role_ids, cmd.assigned_by).await;
        let bindings = finish(uow, result).await?;

        info!(count = bindings.len(), "Roles assigned to user");
        Ok(bindings)
    }

    /// 事务内创建绑定，供用户创建流程复用
    pub async fn create_in<R: Repositories + ?Sized>(
        repos: &R,
        user_id: UserId,
        role_ids: &[RoleId],
        assigned_by: UserId,
    ) -> AppResult<Vec<UserRole>> {
        if repos.users().find_by_id(&user_id).await?.is_none() {
            return Err(AppError::not_found(format!("User {} not found", user_id)));
        }
        if assigned_by != user_id && repos.users().find_by_id(&assigned_by).await?.is_none() {
            return Err(AppError::not_found(format!(
                "Assigning user {} not found",
                assigned_by
            )));
        }

        let mut seen = HashSet::new();
        let role_ids: Vec<RoleId> = role_ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        let roles = repos.roles().find_by_ids(&role_ids).await?;
        let missing = missing_ids(&role_ids, roles.iter().map(|r| r.id));
        if !missing.is_empty() {
            return Err(AppError::not_found(format!(
                "Roles not found: {}",
                join_display(&missing)
            )));
        }

        let existing = repos
            .user_roles()
            .find(&UserRoleFilter {
                user_ids: Some(vec![user_id]),
                role_ids: Some(role_ids.clone()),
                assigned_by_ids: None,
            })
            .await?;
        if !existing.is_empty() {
            let bound: Vec<RoleId> = existing.iter().map(|b| b.role_id).collect();
            return Err(AppError::conflict(format!(
                "User {} already has roles: {}",
                user_id,
                join_display(&bound)
            )));
        }

        let bindings: Vec<UserRole> = role_ids
            .into_iter()
            .map(|role_id| UserRole::new(user_id, role_id, assigned_by))
            .collect();
        for chunk in bindings.chunks(BINDING_CHUNK_SIZE) {
            repos.user_roles().create_many(chunk).await?;
        }

        Ok(bindings)
    }

    /// 各过滤条件取交集，未提供的条件不限制
    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn find(&self, ctx: &RequestContext, filter: &UserRoleFilter) -> AppResult<Vec<UserRole>> {
        self.store.user_roles().find(filter).await
    }

    /// 被绑定用户或授予者邮箱匹配的最近一条绑定
    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn find_by_user_email(&self, ctx: &RequestContext, email: &str) -> AppResult<UserRole> {
        let email = Email::parse(email)?;
        self.store
            .user_roles()
            .find_latest_by_email(&email)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No role binding found for '{}'", email)))
    }

    /// 以用户自身为授予者绑定单个角色
    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id, user_id = %user_id, role_id = %role_id))]
    pub async fn assign_role_to_user(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<UserRole> {
        let uow = self.store.begin().await?;
        let result = Self::create_in(&*uow, user_id, &[role_id], user_id).await;
        let mut bindings = finish(uow, result).await?;

        bindings
            .pop()
            .ok_or_else(|| AppError::internal("Role binding was not created"))
    }

    /// 解除绑定；任一列表为空时不做查询直接返回 false
    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn unassign_role_from_user(
        &self,
        ctx: &RequestContext,
        user_ids: &[UserId],
        role_ids: &[RoleId],
    ) -> AppResult<bool> {
        if user_ids.is_empty() || role_ids.is_empty() {
            return Ok(false);
        }

        let removed = self
            .store
            .user_roles()
            .delete_by_users_and_roles(user_ids, role_ids)
            .await?;
        if removed == 0 {
            return Err(AppError::not_found("No matching role bindings to unassign"));
        }

        info!(removed, "Roles unassigned");
        Ok(true)
    }
}
