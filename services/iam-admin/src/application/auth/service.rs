//! 认证服务
//!
//! 登录状态机：凭证接收 -> 用户解析 -> 密码校验 -> 激活检查 -> 角色解析
//! -> 权限解析 -> 签发令牌。任一步失败都以 Unauthorized 结束，不签发令牌。

use std::collections::HashSet;
use std::sync::Arc;

use admin_auth_core::TokenService;
use admin_common::{RequestContext, UserId};
use admin_errors::{AppError, AppResult};
use tracing::{error, info, warn};

use crate::domain::role::{RoleId, UserRoleFilter};
use crate::domain::unit_of_work::Store;
use crate::domain::user::{Email, HashedPassword, PasswordHasher};

/// 登录结果
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub access_token: String,
    pub expires_in: i64,
}

pub struct AuthService {
    store: Arc<dyn Store>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<TokenService>,
    /// 未知邮箱时用于对齐耗时的哈希
    dummy_hash: HashedPassword,
}

fn record_login(outcome: &'static str) {
    metrics::counter!("auth_login_total", "outcome" => outcome).increment(1);
}

impl AuthService {
    pub fn new(
        store: Arc<dyn Store>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<TokenService>,
    ) -> AppResult<Self> {
        let dummy_hash = hasher.hash("timing-equalisation-placeholder")?;
        Ok(Self {
            store,
            hasher,
            tokens,
            dummy_hash,
        })
    }

    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn login(&self, ctx: &RequestContext, email: &str, password: &str) -> AppResult<LoginResult> {
        let user = match Email::parse(email) {
            Ok(email) => self.store.users().find_by_email(&email).await?,
            Err(_) => None,
        };

        let Some(user) = user else {
            // 未知邮箱同样执行一次哈希校验
            let _ = self.hasher.verify(password, &self.dummy_hash);
            record_login("unknown_user");
            warn!("Login failed: unknown email");
            return Err(AppError::unauthorized("Authentication failed"));
        };

        match self.hasher.verify(password, &user.password) {
            Ok(true) => {}
            Ok(false) => {
                record_login("invalid_credentials");
                warn!(user_id = %user.id, "Login failed: invalid credentials");
                return Err(AppError::unauthorized("Invalid credentials"));
            }
            Err(e) => {
                record_login("invalid_credentials");
                error!(user_id = %user.id, error = %e, "Stored password hash is unusable");
                return Err(AppError::unauthorized("Invalid credentials"));
            }
        }

        if !user.is_active {
            record_login("disabled");
            warn!(user_id = %user.id, "Login failed: account disabled");
            return Err(AppError::unauthorized("Account is disabled"));
        }

        let permissions = match self.resolve_permissions(ctx, user.id).await {
            Ok(permissions) => permissions,
            Err(e) => {
                record_login("no_access");
                warn!(user_id = %user.id, error = %e, "Login failed: no access");
                return Err(e);
            }
        };

        let access_token = self
            .tokens
            .generate_access_token(&user.id, user.email.as_str(), permissions)?;

        record_login("success");
        info!(user_id = %user.id, "User logged in");

        Ok(LoginResult {
            access_token,
            expires_in: self.tokens.access_token_expires_in(),
        })
    }

    /// 解析用户的权限代码（跨角色展开，保留重复）
    #[tracing::instrument(skip_all, fields(trace_id = %ctx.trace_id, user_id = %user_id))]
    pub async fn resolve_permissions(&self, ctx: &RequestContext, user_id: UserId) -> AppResult<Vec<String>> {
        let bindings = self
            .store
            .user_roles()
            .find(&UserRoleFilter {
                user_ids: Some(vec![user_id]),
                ..Default::default()
            })
            .await?;
        if bindings.is_empty() {
            return Err(AppError::unauthorized("No roles assigned"));
        }

        let mut seen = HashSet::new();
        let role_ids: Vec<RoleId> = bindings
            .iter()
            .map(|b| b.role_id)
            .filter(|id| seen.insert(*id))
            .collect();

        // 外键保证绑定的角色存在，只有存储不一致时才会走到这里
        let roles = self.store.roles().find_by_ids(&role_ids).await?;
        if roles.is_empty() {
            return Err(AppError::unauthorized("No permissions assigned"));
        }

        Ok(roles
            .iter()
            .flat_map(|r| r.permission_codes().map(str::to_string))
            .collect())
    }
}
