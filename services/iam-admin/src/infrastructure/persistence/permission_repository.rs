//! PostgreSQL 权限仓储实现

use std::collections::HashMap;

use admin_common::AuditInfo;
use admin_errors::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::executor::PgExecutor;
use crate::domain::role::{Permission, PermissionId, PermissionRepository, RoleId};
use crate::domain::search::SearchCriteria;

const PERMISSION_COLUMNS: &str = "id, code, name, created_at, updated_at";

pub struct PgPermissionRepository {
    exec: PgExecutor,
}

impl PgPermissionRepository {
    pub fn new(exec: PgExecutor) -> Self {
        Self { exec }
    }

    /// 批量加载权限的角色关联
    async fn load_role_ids(&self, permission_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<RoleId>>> {
        if permission_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Uuid, Uuid)> = self
            .exec
            .fetch_all(
                sqlx::query_as(
                    r#"
                    SELECT permission_id, role_id
                    FROM role_permissions
                    WHERE permission_id = ANY($1)
                    ORDER BY created_at
                    "#,
                )
                .bind(permission_ids),
            )
            .await?;

        let mut map: HashMap<Uuid, Vec<RoleId>> = HashMap::new();
        for (permission_id, role_id) in rows {
            map.entry(permission_id)
                .or_default()
                .push(RoleId::from_uuid(role_id));
        }
        Ok(map)
    }

    async fn with_roles(&self, rows: Vec<PermissionRow>) -> AppResult<Vec<Permission>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut role_ids = self.load_role_ids(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let roles = role_ids.remove(&r.id).unwrap_or_default();
                r.into_permission(roles)
            })
            .collect())
    }
}

#[async_trait]
impl PermissionRepository for PgPermissionRepository {
    async fn create_many(&self, permissions: &[Permission]) -> AppResult<()> {
        for permission in permissions {
            self.exec
                .execute(
                    sqlx::query(
                        r#"
                        INSERT INTO permissions (id, code, name, created_at, updated_at)
                        VALUES ($1, $2, $3, $4, $5)
                        "#,
                    )
                    .bind(permission.id.0)
                    .bind(&permission.code)
                    .bind(&permission.name)
                    .bind(permission.audit_info.created_at)
                    .bind(permission.audit_info.updated_at),
                )
                .await?;
        }
        Ok(())
    }

    async fn update(&self, permission: &Permission) -> AppResult<()> {
        self.exec
            .execute(
                sqlx::query(
                    "UPDATE permissions SET code = $2, name = $3, updated_at = $4 WHERE id = $1",
                )
                .bind(permission.id.0)
                .bind(&permission.code)
                .bind(&permission.name)
                .bind(permission.audit_info.updated_at),
            )
            .await?;
        Ok(())
    }

    async fn find_by_ids(&self, ids: &[PermissionId]) -> AppResult<Vec<Permission>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        let sql = format!(
            "SELECT {} FROM permissions WHERE id = ANY($1) ORDER BY created_at",
            PERMISSION_COLUMNS
        );
        let rows = self
            .exec
            .fetch_all(sqlx::query_as::<_, PermissionRow>(&sql).bind(&ids))
            .await?;
        self.with_roles(rows).await
    }

    async fn find_by_codes(&self, codes: &[String]) -> AppResult<Vec<Permission>> {
        let sql = format!(
            "SELECT {} FROM permissions WHERE code = ANY($1) ORDER BY created_at",
            PERMISSION_COLUMNS
        );
        let rows = self
            .exec
            .fetch_all(sqlx::query_as::<_, PermissionRow>(&sql).bind(codes))
            .await?;
        self.with_roles(rows).await
    }

    async fn find_conflicts(
        &self,
        names: &[String],
        codes: &[String],
        exclude: Option<&PermissionId>,
    ) -> AppResult<Vec<Permission>> {
        let sql = format!(
            r#"
            SELECT {} FROM permissions
            WHERE (name = ANY($1) OR code = ANY($2))
              AND ($3::uuid IS NULL OR id <> $3)
            ORDER BY created_at
            "#,
            PERMISSION_COLUMNS
        );
        let rows = self
            .exec
            .fetch_all(
                sqlx::query_as::<_, PermissionRow>(&sql)
                    .bind(names)
                    .bind(codes)
                    .bind(exclude.map(|id| id.0)),
            )
            .await?;
        self.with_roles(rows).await
    }

    async fn search(&self, criteria: &SearchCriteria) -> AppResult<(Vec<Permission>, u64)> {
        let pattern = criteria.like_pattern();
        let filter = "($1::text IS NULL OR name LIKE $1 OR code LIKE $1 OR id::text LIKE $1)";

        let count_sql = format!("SELECT COUNT(*) FROM permissions WHERE {}", filter);
        let (total,): (i64,) = self
            .exec
            .fetch_one(sqlx::query_as(&count_sql).bind(&pattern))
            .await?;

        let sql = format!(
            "SELECT {} FROM permissions WHERE {} ORDER BY {} {}, id LIMIT $2 OFFSET $3",
            PERMISSION_COLUMNS,
            filter,
            criteria.sort_column,
            criteria.sort_order.as_sql()
        );
        let rows = self
            .exec
            .fetch_all(
                sqlx::query_as::<_, PermissionRow>(&sql)
                    .bind(&pattern)
                    .bind(i64::from(criteria.page.limit))
                    .bind(criteria.page.offset() as i64),
            )
            .await?;

        Ok((self.with_roles(rows).await?, total as u64))
    }

    async fn delete_by_ids(&self, ids: &[PermissionId]) -> AppResult<u64> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        self.exec
            .execute(sqlx::query("DELETE FROM permissions WHERE id = ANY($1)").bind(&ids))
            .await
    }
}

#[derive(sqlx::FromRow)]
struct PermissionRow {
    id: Uuid,
    code: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PermissionRow {
    fn into_permission(self, role_ids: Vec<RoleId>) -> Permission {
        Permission {
            id: PermissionId::from_uuid(self.id),
            code: self.code,
            name: self.name,
            role_ids,
            audit_info: AuditInfo {
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        }
    }
}
