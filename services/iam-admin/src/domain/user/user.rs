//! 用户实体

use admin_common::{AuditInfo, UserId, utils::random_token};
use chrono::{DateTime, Duration, NaiveDate, Utc};

use super::email::Email;
use super::password::HashedPassword;
use crate::domain::department::DepartmentId;
use crate::domain::search::SortableField;

/// 密码重置令牌有效期（小时）
pub const PASSWORD_RESET_TTL_HOURS: i64 = 1;

/// 用户实体
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password: HashedPassword,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_active: bool,
    pub is_email_verified: bool,
    pub is_two_factor_enabled: bool,
    pub email_verification_token: Option<String>,
    pub password_reset_token: Option<String>,
    pub password_reset_expires: Option<DateTime<Utc>>,
    /// 归属于该用户的部门
    pub department_ids: Vec<DepartmentId>,
    pub audit_info: AuditInfo,
}

impl User {
    pub const SORTABLE_FIELDS: &'static [SortableField] = &[
        SortableField::new("id", "id"),
        SortableField::new("firstName", "first_name"),
        SortableField::new("lastName", "last_name"),
        SortableField::new("email", "email"),
        SortableField::new("isActive", "is_active"),
        SortableField::new("createdAt", "created_at"),
        SortableField::new("updatedAt", "updated_at"),
    ];

    pub fn new(first_name: String, last_name: String, email: Email, password: HashedPassword) -> Self {
        Self {
            id: UserId::new(),
            first_name,
            last_name,
            email,
            password,
            phone: None,
            date_of_birth: None,
            is_active: true,
            is_email_verified: false,
            is_two_factor_enabled: false,
            email_verification_token: None,
            password_reset_token: None,
            password_reset_expires: None,
            department_ids: Vec::new(),
            audit_info: AuditInfo::default(),
        }
    }

    /// 生成邮箱验证令牌与密码重置令牌
    pub fn issue_tokens(&mut self) {
        self.email_verification_token = Some(random_token());
        self.password_reset_token = Some(random_token());
        self.password_reset_expires = Some(Utc::now() + Duration::hours(PASSWORD_RESET_TTL_HOURS));
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(
            "Ada".to_string(),
            "Lovelace".to_string(),
            Email::parse("ada@example.com").unwrap(),
            HashedPassword("$argon2id$stub".to_string()),
        )
    }

    #[test]
    fn test_defaults() {
        let user = user();
        assert!(user.is_active);
        assert!(!user.is_email_verified);
        assert!(!user.is_two_factor_enabled);
        assert!(user.department_ids.is_empty());
        assert_eq!(user.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_issue_tokens() {
        let mut user = user();
        user.issue_tokens();

        let verification = user.email_verification_token.clone().unwrap();
        let reset = user.password_reset_token.clone().unwrap();
        assert_eq!(verification.len(), 64);
        assert_ne!(verification, reset);

        let expires = user.password_reset_expires.unwrap();
        let ttl = expires - Utc::now();
        assert!(ttl > Duration::minutes(59) && ttl <= Duration::hours(1));
    }
}
