//! admin-auth-core - 认证核心库
//!
//! JWT Claims / TokenService / 权限守卫判定

use std::collections::HashSet;

use admin_common::UserId;
use admin_errors::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 超级权限：持有者通过任何权限检查
pub const ROOT_PERMISSION: &str = "root_all";

/// JWT Claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    /// 权限编码（跨角色展开，可能重复）
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
    /// JWT ID
    pub jti: String,
    #[serde(default)]
    pub iss: String,
    #[serde(default)]
    pub aud: String,
}

impl Claims {
    pub fn new(
        user_id: &UserId,
        email: &str,
        permissions: Vec<String>,
        expires_in_secs: i64,
        issuer: &str,
        audience: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.0.to_string(),
            email: email.to_string(),
            permissions,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expires_in_secs)).timestamp(),
            jti: Uuid::now_v7().to_string(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
        }
    }

    pub fn user_id(&self) -> AppResult<UserId> {
        Uuid::parse_str(&self.sub)
            .map(UserId::from_uuid)
            .map_err(|_| AppError::unauthorized("Invalid user ID in token"))
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    pub fn has_all_permissions(&self, permissions: &[&str]) -> bool {
        permissions.iter().all(|p| self.has_permission(p))
    }
}

/// Token 服务
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: i64,
    issuer: String,
    audience: String,
}

impl TokenService {
    pub fn new(
        secret: &str,
        access_token_expires_in: i64,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in,
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    /// 生成访问令牌 (HS256)
    pub fn generate_access_token(
        &self,
        user_id: &UserId,
        email: &str,
        permissions: Vec<String>,
    ) -> AppResult<String> {
        let claims = Claims::new(
            user_id,
            email,
            permissions,
            self.access_token_expires_in,
            &self.issuer,
            &self.audience,
        );

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))
    }

    /// 验证访问令牌：签名、过期时间、签发者、受众
    pub fn validate_access_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::unauthorized(format!("Invalid token: {}", e)))?
            .claims;

        if claims.jti.is_empty() {
            return Err(AppError::unauthorized("Token ID (jti) missing"));
        }

        Ok(claims)
    }

    /// 获取访问令牌过期时间（秒）
    pub fn access_token_expires_in(&self) -> i64 {
        self.access_token_expires_in
    }
}

/// 权限守卫
///
/// 判定规则：
/// 1. 未声明所需权限 -> 放行
/// 2. 调用方没有任何权限 -> Forbidden
/// 3. 调用方持有 [`ROOT_PERMISSION`] -> 放行
/// 4. 否则必须持有全部所需权限（合取）
pub struct PermissionGuard;

impl PermissionGuard {
    pub fn check<S: AsRef<str>>(required: &[&str], granted: &[S]) -> AppResult<()> {
        if required.is_empty() {
            return Ok(());
        }
        if granted.is_empty() {
            return Err(AppError::forbidden("No permissions assigned"));
        }

        let granted: HashSet<&str> = granted.iter().map(AsRef::as_ref).collect();
        if granted.contains(ROOT_PERMISSION) {
            return Ok(());
        }

        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|p| !granted.contains(p))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Missing required permissions: {}",
                missing.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", 3600, "iam-admin", "iam-admin-api")
    }

    #[test]
    fn test_token_round_trip_carries_permissions() {
        let svc = service();
        let user_id = UserId::new();
        let token = svc
            .generate_access_token(
                &user_id,
                "ops@example.com",
                vec!["users:read".to_string(), "users:read".to_string()],
            )
            .unwrap();

        let claims = svc.validate_access_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.email, "ops@example.com");
        assert_eq!(claims.permissions.len(), 2);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(claims.has_all_permissions(&["users:read"]));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let svc = TokenService::new("test-secret", -60, "iam-admin", "iam-admin-api");
        let token = svc
            .generate_access_token(&UserId::new(), "a@example.com", vec![])
            .unwrap();

        let err = svc.validate_access_token(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let other = TokenService::new("other-secret", 3600, "iam-admin", "iam-admin-api");
        let token = other
            .generate_access_token(&UserId::new(), "a@example.com", vec![])
            .unwrap();

        assert!(matches!(
            service().validate_access_token(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_wrong_audience_is_rejected() {
        let other = TokenService::new("test-secret", 3600, "iam-admin", "another-api");
        let token = other
            .generate_access_token(&UserId::new(), "a@example.com", vec![])
            .unwrap();

        assert!(service().validate_access_token(&token).is_err());
    }

    #[test]
    fn test_malformed_token_is_rejected() {
        assert!(matches!(
            service().validate_access_token("not-a-jwt"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_guard_allows_when_nothing_required() {
        let none: [&str; 0] = [];
        assert!(PermissionGuard::check(&[], &none).is_ok());
    }

    #[test]
    fn test_guard_denies_empty_grant() {
        let none: [&str; 0] = [];
        let err = PermissionGuard::check(&["users:read"], &none).unwrap_err();
        assert_eq!(err.to_string(), "Forbidden: No permissions assigned");
    }

    #[test]
    fn test_guard_root_bypass() {
        assert!(PermissionGuard::check(&["users:delete", "roles:update"], &["root_all"]).is_ok());
    }

    #[test]
    fn test_guard_requires_all() {
        let granted = vec!["users:read".to_string()];
        assert!(PermissionGuard::check(&["users:read"], &granted).is_ok());

        let err = PermissionGuard::check(&["users:read", "users:update"], &granted).unwrap_err();
        match err {
            AppError::Forbidden(msg) => {
                assert_eq!(msg, "Missing required permissions: users:update");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
