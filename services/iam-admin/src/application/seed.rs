//! 系统账号初始化
//!
//! 启动时写入系统用户、System 部门、System 角色、`root_all` 权限
//! 以及用户自授予的角色绑定。系统用户已存在时整体跳过；
//! 部门、角色、权限已存在时复用。

use admin_auth_core::ROOT_PERMISSION;
use admin_common::RequestContext;
use admin_errors::AppResult;
use secrecy::{ExposeSecret, Secret};
use tracing::{info, warn};

use crate::domain::department::Department;
use crate::domain::role::{Permission, Role, UserRole};
use crate::domain::unit_of_work::{Repositories, Store, finish};
use crate::domain::user::{Email, PasswordHasher, User};

pub const SYSTEM_NAME: &str = "System";

/// 系统账号
#[derive(Debug, Clone)]
pub struct SystemAccount {
    pub email: String,
    pub password: Secret<String>,
    pub first_name: String,
    pub last_name: String,
}

impl From<&admin_config::SystemConfig> for SystemAccount {
    fn from(config: &admin_config::SystemConfig) -> Self {
        Self {
            email: config.email.clone(),
            password: config.password.clone(),
            first_name: config.first_name.clone(),
            last_name: config.last_name.clone(),
        }
    }
}

/// 幂等初始化，返回本次是否写入
#[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id))]
pub async fn seed_system(
    ctx: &RequestContext,
    store: &dyn Store,
    hasher: &dyn PasswordHasher,
    account: &SystemAccount,
) -> AppResult<bool> {
    let email = Email::parse(&account.email)?;

    let uow = store.begin().await?;
    let result = seed_in(&*uow, hasher, account, email).await;
    let seeded = finish(uow, result).await?;

    if seeded {
        info!(email = %account.email, "System account seeded");
    } else {
        info!(email = %account.email, "System account already present, seed skipped");
    }
    Ok(seeded)
}

async fn seed_in<R: Repositories + ?Sized>(
    repos: &R,
    hasher: &dyn PasswordHasher,
    account: &SystemAccount,
    email: Email,
) -> AppResult<bool> {
    if repos.users().find_by_email(&email).await?.is_some() {
        return Ok(false);
    }

    let password = hasher.hash(account.password.expose_secret())?;
    let mut user = User::new(
        account.first_name.clone(),
        account.last_name.clone(),
        email,
        password,
    );
    user.is_email_verified = true;
    repos.users().create(&user).await?;

    // System 部门 / 角色 / root_all 权限可能已由先前的系统账号创建
    match repos.departments().find_by_name(SYSTEM_NAME).await? {
        Some(department) => {
            let claimed = repos
                .departments()
                .assign_to_user(&[department.id], &user.id)
                .await?;
            if claimed == 0 {
                warn!(
                    department_id = %department.id,
                    "System department belongs to another user, left unchanged"
                );
            }
        }
        None => {
            let mut department =
                Department::new(SYSTEM_NAME.to_string(), SYSTEM_NAME.to_string());
            department.user_id = Some(user.id);
            repos.departments().create(&department).await?;
        }
    }

    let role = match repos.roles().find_by_name(SYSTEM_NAME).await? {
        Some(role) => role,
        None => {
            let role = Role::new(SYSTEM_NAME.to_string());
            repos.roles().create(&role).await?;
            role
        }
    };

    let existing = repos
        .permissions()
        .find_by_codes(&[ROOT_PERMISSION.to_string()])
        .await?;
    let permission = match existing.into_iter().next() {
        Some(permission) => permission,
        None => {
            let permission =
                Permission::new(ROOT_PERMISSION.to_string(), "Root access".to_string());
            repos
                .permissions()
                .create_many(std::slice::from_ref(&permission))
                .await?;
            permission
        }
    };
    if !role.has_permission_code(ROOT_PERMISSION) {
        repos
            .role_permissions()
            .attach(&role.id, &[permission.id])
            .await?;
    }

    repos
        .user_roles()
        .create_many(&[UserRole::new(user.id, role.id, user.id)])
        .await?;

    Ok(true)
}
