//! 用户服务

use std::collections::HashSet;
use std::sync::Arc;

use admin_common::{PagedResult, RequestContext, UserId};
use admin_errors::{AppError, AppResult};
use tracing::info;

use super::commands::{CreateUserCommand, UpdateUserCommand};
use crate::application::department::DepartmentService;
use crate::application::require_ids;
use crate::application::user_role::UserRoleService;
use crate::domain::department::DepartmentId;
use crate::domain::role::{RoleId, UserRoleFilter};
use crate::domain::search::SearchQuery;
use crate::domain::unit_of_work::{Repositories, Store, finish};
use crate::domain::user::{Email, PasswordHasher, User};
use crate::domain::{join_display, missing_ids};

pub struct UserService {
    store: Arc<dyn Store>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    /// 创建用户
    ///
    /// 用户、部门归属与角色绑定在同一事务中写入，任一步失败全部回滚。
    /// 角色绑定的授予者为 `created_by`，缺省时为新用户自身。
    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        cmd: CreateUserCommand,
        created_by: Option<UserId>,
    ) -> AppResult<User> {
        cmd.validate().map_err(AppError::validation)?;
        let email = Email::parse(&cmd.email)?;

        let uow = self.store.begin().await?;
        let result = self.create_in(&*uow, cmd, email, created_by).await;
        let user = finish(uow, result).await?;

        info!(user_id = %user.id, "User created");
        Ok(user)
    }

    async fn create_in<R: Repositories + ?Sized>(
        &self,
        repos: &R,
        cmd: CreateUserCommand,
        email: Email,
        created_by: Option<UserId>,
    ) -> AppResult<User> {
        let departments = DepartmentService::resolve_in(repos, &cmd.department_ids).await?;
        let owned: Vec<&str> = departments
            .iter()
            .filter(|d| d.user_id.is_some())
            .map(|d| d.name.as_str())
            .collect();
        if !owned.is_empty() {
            return Err(AppError::conflict(format!(
                "Departments already belong to another user: {}",
                owned.join(", ")
            )));
        }

        if repos.users().exists_by_email(&email, None).await? {
            return Err(AppError::conflict(format!(
                "User with email '{}' already exists",
                email
            )));
        }

        let password = self.hasher.hash(&cmd.password)?;
        let mut user = User::new(cmd.first_name, cmd.last_name, email, password);
        user.phone = cmd.phone;
        user.date_of_birth = cmd.date_of_birth;
        user.issue_tokens();

        repos.users().create(&user).await?;

        let department_ids: Vec<DepartmentId> = departments.iter().map(|d| d.id).collect();
        let claimed = repos
            .departments()
            .assign_to_user(&department_ids, &user.id)
            .await?;
        // 并发创建抢占了同一部门
        if claimed != department_ids.len() as u64 {
            return Err(AppError::conflict(
                "Departments were claimed by another user concurrently",
            ));
        }

        if !cmd.role_ids.is_empty() {
            let assigned_by = created_by.unwrap_or(user.id);
            UserRoleService::create_in(repos, user.id, &cmd.role_ids, assigned_by).await?;
        }

        Self::load_in(repos, &user.id).await
    }

    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id, user_id = %id))]
    pub async fn find_by_id(&self, ctx: &RequestContext, id: UserId) -> AppResult<User> {
        Self::load_in(&*self.store, &id).await
    }

    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn find_by_email(&self, ctx: &RequestContext, email: &str) -> AppResult<User> {
        let email = Email::parse(email)?;
        self.store
            .users()
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User with email '{}' not found", email)))
    }

    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn search(&self, ctx: &RequestContext, query: SearchQuery) -> AppResult<PagedResult<User>> {
        let criteria = query.resolve(User::SORTABLE_FIELDS)?;
        let (items, total) = self.store.users().search(&criteria).await?;
        Ok(PagedResult::new(items, total, &criteria.page))
    }

    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id, user_id = %id))]
    pub async fn update_by_id(
        &self,
        ctx: &RequestContext,
        id: UserId,
        cmd: UpdateUserCommand,
    ) -> AppResult<User> {
        cmd.validate().map_err(AppError::validation)?;
        let user = Self::load_in(&*self.store, &id).await?;
        self.apply_update(user, cmd).await
    }

    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn update_by_email(
        &self,
        ctx: &RequestContext,
        email: &str,
        cmd: UpdateUserCommand,
    ) -> AppResult<User> {
        cmd.validate().map_err(AppError::validation)?;
        let user = self.find_by_email(ctx, email).await?;
        self.apply_update(user, cmd).await
    }

    async fn apply_update(&self, mut user: User, cmd: UpdateUserCommand) -> AppResult<User> {
        let repo = self.store.users();

        if let Some(email) = cmd.email {
            let email = Email::parse(email)?;
            if repo.exists_by_email(&email, Some(&user.id)).await? {
                return Err(AppError::conflict(format!(
                    "User with email '{}' already exists",
                    email
                )));
            }
            user.email = email;
        }
        if let Some(password) = cmd.password {
            user.password = self.hasher.hash(&password)?;
        }
        if let Some(first_name) = cmd.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = cmd.last_name {
            user.last_name = last_name;
        }
        if let Some(phone) = cmd.phone {
            user.phone = Some(phone);
        }
        if let Some(date_of_birth) = cmd.date_of_birth {
            user.date_of_birth = Some(date_of_birth);
        }
        if let Some(is_active) = cmd.is_active {
            user.is_active = is_active;
        }
        if let Some(is_email_verified) = cmd.is_email_verified {
            user.is_email_verified = is_email_verified;
        }
        if let Some(is_two_factor_enabled) = cmd.is_two_factor_enabled {
            user.is_two_factor_enabled = is_two_factor_enabled;
        }
        user.audit_info.touch();

        repo.update(&user).await?;
        info!(user_id = %user.id, "User updated");

        Self::load_in(&*self.store, &user.id).await
    }

    /// 删除用户：先解除其角色绑定，其授予他人的绑定改记为自授予，再删除用户
    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn delete_by_ids(&self, ctx: &RequestContext, ids: &[UserId]) -> AppResult<u64> {
        require_ids(ids, "user")?;

        let uow = self.store.begin().await?;
        let result = Self::delete_in(&*uow, ids).await;
        let deleted = finish(uow, result).await?;

        info!(deleted, "Users deleted");
        Ok(deleted)
    }

    async fn delete_in<R: Repositories + ?Sized>(repos: &R, ids: &[UserId]) -> AppResult<u64> {
        let found = repos.users().find_by_ids(ids).await?;
        let missing = missing_ids(ids, found.iter().map(|u| u.id));
        if !missing.is_empty() {
            return Err(AppError::not_found(format!(
                "Users not found: {}",
                join_display(&missing)
            )));
        }

        let bindings = repos
            .user_roles()
            .find(&UserRoleFilter {
                user_ids: Some(ids.to_vec()),
                ..Default::default()
            })
            .await?;
        if !bindings.is_empty() {
            let mut seen = HashSet::new();
            let role_ids: Vec<RoleId> = bindings
                .iter()
                .map(|b| b.role_id)
                .filter(|id| seen.insert(*id))
                .collect();
            repos
                .user_roles()
                .delete_by_users_and_roles(ids, &role_ids)
                .await?;
        }

        let reattributed = repos.user_roles().reattribute_granted_by(ids).await?;
        if reattributed > 0 {
            info!(reattributed, "Role bindings granted by deleted users re-attributed");
        }

        repos.users().delete_by_ids(ids).await
    }

    async fn load_in<R: Repositories + ?Sized>(repos: &R, id: &UserId) -> AppResult<User> {
        repos
            .users()
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {} not found", id)))
    }
}
