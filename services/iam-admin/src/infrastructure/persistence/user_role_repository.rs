//! PostgreSQL 用户角色仓储实现

use admin_common::{AuditInfo, UserId};
use admin_errors::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::executor::PgExecutor;
use crate::domain::role::{RoleId, UserRole, UserRoleFilter, UserRoleId, UserRoleRepository};
use crate::domain::user::Email;

pub struct PgUserRoleRepository {
    exec: PgExecutor,
}

impl PgUserRoleRepository {
    pub fn new(exec: PgExecutor) -> Self {
        Self { exec }
    }
}

fn uuids<T, F: Fn(&T) -> Uuid>(ids: &Option<Vec<T>>, f: F) -> Option<Vec<Uuid>> {
    ids.as_ref().map(|ids| ids.iter().map(f).collect())
}

#[async_trait]
impl UserRoleRepository for PgUserRoleRepository {
    async fn create_many(&self, bindings: &[UserRole]) -> AppResult<()> {
        if bindings.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = bindings.iter().map(|b| b.id.0).collect();
        let user_ids: Vec<Uuid> = bindings.iter().map(|b| b.user_id.0).collect();
        let role_ids: Vec<Uuid> = bindings.iter().map(|b| b.role_id.0).collect();
        let assigned_by: Vec<Uuid> = bindings.iter().map(|b| b.assigned_by.0).collect();
        let created_at: Vec<DateTime<Utc>> =
            bindings.iter().map(|b| b.audit_info.created_at).collect();
        let updated_at: Vec<DateTime<Utc>> =
            bindings.iter().map(|b| b.audit_info.updated_at).collect();

        self.exec
            .execute(
                sqlx::query(
                    r#"
                    INSERT INTO user_roles (id, user_id, role_id, assigned_by, created_at, updated_at)
                    SELECT * FROM UNNEST(
                        $1::uuid[], $2::uuid[], $3::uuid[], $4::uuid[],
                        $5::timestamptz[], $6::timestamptz[]
                    )
                    "#,
                )
                .bind(&ids)
                .bind(&user_ids)
                .bind(&role_ids)
                .bind(&assigned_by)
                .bind(&created_at)
                .bind(&updated_at),
            )
            .await?;
        Ok(())
    }

    async fn find(&self, filter: &UserRoleFilter) -> AppResult<Vec<UserRole>> {
        let rows = self
            .exec
            .fetch_all(
                sqlx::query_as::<_, UserRoleRow>(
                    r#"
                    SELECT id, user_id, role_id, assigned_by, created_at, updated_at
                    FROM user_roles
                    WHERE ($1::uuid[] IS NULL OR user_id = ANY($1))
                      AND ($2::uuid[] IS NULL OR role_id = ANY($2))
                      AND ($3::uuid[] IS NULL OR assigned_by = ANY($3))
                    ORDER BY created_at
                    "#,
                )
                .bind(uuids(&filter.user_ids, |id| id.0))
                .bind(uuids(&filter.role_ids, |id| id.0))
                .bind(uuids(&filter.assigned_by_ids, |id| id.0)),
            )
            .await?;
        Ok(rows.into_iter().map(UserRoleRow::into_user_role).collect())
    }

    async fn find_latest_by_email(&self, email: &Email) -> AppResult<Option<UserRole>> {
        let row = self
            .exec
            .fetch_optional(
                sqlx::query_as::<_, UserRoleRow>(
                    r#"
                    SELECT ur.id, ur.user_id, ur.role_id, ur.assigned_by, ur.created_at, ur.updated_at
                    FROM user_roles ur
                    JOIN users u ON u.id = ur.user_id
                    JOIN users a ON a.id = ur.assigned_by
                    WHERE u.email = $1 OR a.email = $1
                    ORDER BY ur.created_at DESC, ur.id DESC
                    LIMIT 1
                    "#,
                )
                .bind(email.as_str()),
            )
            .await?;
        Ok(row.map(UserRoleRow::into_user_role))
    }

    async fn reattribute_granted_by(&self, assigners: &[UserId]) -> AppResult<u64> {
        let assigners: Vec<Uuid> = assigners.iter().map(|id| id.0).collect();
        self.exec
            .execute(
                sqlx::query(
                    r#"
                    UPDATE user_roles SET assigned_by = user_id, updated_at = NOW()
                    WHERE assigned_by = ANY($1)
                    "#,
                )
                .bind(&assigners),
            )
            .await
    }

    async fn delete_by_users_and_roles(
        &self,
        user_ids: &[UserId],
        role_ids: &[RoleId],
    ) -> AppResult<u64> {
        let user_ids: Vec<Uuid> = user_ids.iter().map(|id| id.0).collect();
        let role_ids: Vec<Uuid> = role_ids.iter().map(|id| id.0).collect();
        self.exec
            .execute(
                sqlx::query("DELETE FROM user_roles WHERE user_id = ANY($1) AND role_id = ANY($2)")
                    .bind(&user_ids)
                    .bind(&role_ids),
            )
            .await
    }
}

#[derive(sqlx::FromRow)]
struct UserRoleRow {
    id: Uuid,
    user_id: Uuid,
    role_id: Uuid,
    assigned_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRoleRow {
    fn into_user_role(self) -> UserRole {
        UserRole {
            id: UserRoleId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            role_id: RoleId::from_uuid(self.role_id),
            assigned_by: UserId::from_uuid(self.assigned_by),
            audit_info: AuditInfo {
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        }
    }
}
