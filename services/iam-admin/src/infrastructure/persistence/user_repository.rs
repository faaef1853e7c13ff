//! PostgreSQL 用户仓储实现

use std::collections::HashMap;

use admin_common::{AuditInfo, UserId};
use admin_errors::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::executor::PgExecutor;
use crate::domain::department::DepartmentId;
use crate::domain::search::SearchCriteria;
use crate::domain::user::{Email, HashedPassword, User, UserRepository};

const USER_COLUMNS: &str = r#"
    id, first_name, last_name, email, password, phone, date_of_birth,
    is_active, is_email_verified, is_two_factor_enabled,
    email_verification_token, password_reset_token, password_reset_expires,
    created_at, updated_at
"#;

pub struct PgUserRepository {
    exec: PgExecutor,
}

impl PgUserRepository {
    pub fn new(exec: PgExecutor) -> Self {
        Self { exec }
    }

    async fn load_departments(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<DepartmentId>>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Uuid, Uuid)> = self
            .exec
            .fetch_all(
                sqlx::query_as(
                    r#"
                    SELECT user_id, id FROM departments
                    WHERE user_id = ANY($1)
                    ORDER BY created_at
                    "#,
                )
                .bind(user_ids),
            )
            .await?;

        let mut map: HashMap<Uuid, Vec<DepartmentId>> = HashMap::new();
        for (user_id, department_id) in rows {
            map.entry(user_id)
                .or_default()
                .push(DepartmentId::from_uuid(department_id));
        }
        Ok(map)
    }

    async fn with_departments(&self, rows: Vec<UserRow>) -> AppResult<Vec<User>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut departments = self.load_departments(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let depts = departments.remove(&r.id).unwrap_or_default();
                r.into_user(depts)
            })
            .collect())
    }

    async fn find_one(&self, row: Option<UserRow>) -> AppResult<Option<User>> {
        match row {
            Some(r) => Ok(self.with_departments(vec![r]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: &User) -> AppResult<()> {
        self.exec
            .execute(
                sqlx::query(
                    r#"
                    INSERT INTO users (
                        id, first_name, last_name, email, password, phone, date_of_birth,
                        is_active, is_email_verified, is_two_factor_enabled,
                        email_verification_token, password_reset_token, password_reset_expires,
                        created_at, updated_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
                    "#,
                )
                .bind(user.id.0)
                .bind(&user.first_name)
                .bind(&user.last_name)
                .bind(user.email.as_str())
                .bind(user.password.as_str())
                .bind(&user.phone)
                .bind(user.date_of_birth)
                .bind(user.is_active)
                .bind(user.is_email_verified)
                .bind(user.is_two_factor_enabled)
                .bind(&user.email_verification_token)
                .bind(&user.password_reset_token)
                .bind(user.password_reset_expires)
                .bind(user.audit_info.created_at)
                .bind(user.audit_info.updated_at),
            )
            .await?;
        Ok(())
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        self.exec
            .execute(
                sqlx::query(
                    r#"
                    UPDATE users
                    SET first_name = $2, last_name = $3, email = $4, password = $5,
                        phone = $6, date_of_birth = $7, is_active = $8,
                        is_email_verified = $9, is_two_factor_enabled = $10,
                        email_verification_token = $11, password_reset_token = $12,
                        password_reset_expires = $13, updated_at = $14
                    WHERE id = $1
                    "#,
                )
                .bind(user.id.0)
                .bind(&user.first_name)
                .bind(&user.last_name)
                .bind(user.email.as_str())
                .bind(user.password.as_str())
                .bind(&user.phone)
                .bind(user.date_of_birth)
                .bind(user.is_active)
                .bind(user.is_email_verified)
                .bind(user.is_two_factor_enabled)
                .bind(&user.email_verification_token)
                .bind(&user.password_reset_token)
                .bind(user.password_reset_expires)
                .bind(user.audit_info.updated_at),
            )
            .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = self
            .exec
            .fetch_optional(sqlx::query_as::<_, UserRow>(&sql).bind(id.0))
            .await?;
        self.find_one(row).await
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<User>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        let sql = format!(
            "SELECT {} FROM users WHERE id = ANY($1) ORDER BY created_at",
            USER_COLUMNS
        );
        let rows = self
            .exec
            .fetch_all(sqlx::query_as::<_, UserRow>(&sql).bind(&ids))
            .await?;
        self.with_departments(rows).await
    }

    async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let row = self
            .exec
            .fetch_optional(sqlx::query_as::<_, UserRow>(&sql).bind(email.as_str()))
            .await?;
        self.find_one(row).await
    }

    async fn exists_by_email(&self, email: &Email, exclude: Option<&UserId>) -> AppResult<bool> {
        let (exists,): (bool,) = self
            .exec
            .fetch_one(
                sqlx::query_as(
                    r#"
                    SELECT EXISTS(
                        SELECT 1 FROM users
                        WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2)
                    )
                    "#,
                )
                .bind(email.as_str())
                .bind(exclude.map(|id| id.0)),
            )
            .await?;
        Ok(exists)
    }

    async fn search(&self, criteria: &SearchCriteria) -> AppResult<(Vec<User>, u64)> {
        let pattern = criteria.like_pattern();
        let filter = r#"($1::text IS NULL
            OR first_name ILIKE $1 OR last_name ILIKE $1
            OR email ILIKE $1 OR id::text ILIKE $1)"#;

        let count_sql = format!("SELECT COUNT(*) FROM users WHERE {}", filter);
        let (total,): (i64,) = self
            .exec
            .fetch_one(sqlx::query_as(&count_sql).bind(&pattern))
            .await?;

        let sql = format!(
            "SELECT {} FROM users WHERE {} ORDER BY {} {}, id LIMIT $2 OFFSET $3",
            USER_COLUMNS,
            filter,
            criteria.sort_column,
            criteria.sort_order.as_sql()
        );
        let rows = self
            .exec
            .fetch_all(
                sqlx::query_as::<_, UserRow>(&sql)
                    .bind(&pattern)
                    .bind(i64::from(criteria.page.limit))
                    .bind(criteria.page.offset() as i64),
            )
            .await?;

        Ok((self.with_departments(rows).await?, total as u64))
    }

    async fn delete_by_ids(&self, ids: &[UserId]) -> AppResult<u64> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        self.exec
            .execute(sqlx::query("DELETE FROM users WHERE id = ANY($1)").bind(&ids))
            .await
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    phone: Option<String>,
    date_of_birth: Option<NaiveDate>,
    is_active: bool,
    is_email_verified: bool,
    is_two_factor_enabled: bool,
    email_verification_token: Option<String>,
    password_reset_token: Option<String>,
    password_reset_expires: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, department_ids: Vec<DepartmentId>) -> User {
        User {
            id: UserId::from_uuid(self.id),
            first_name: self.first_name,
            last_name: self.last_name,
            email: Email::from_trusted(self.email),
            password: HashedPassword(self.password),
            phone: self.phone,
            date_of_birth: self.date_of_birth,
            is_active: self.is_active,
            is_email_verified: self.is_email_verified,
            is_two_factor_enabled: self.is_two_factor_enabled,
            email_verification_token: self.email_verification_token,
            password_reset_token: self.password_reset_token,
            password_reset_expires: self.password_reset_expires,
            department_ids,
            audit_info: AuditInfo {
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        }
    }
}
