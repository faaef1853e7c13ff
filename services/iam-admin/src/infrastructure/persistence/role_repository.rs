//! PostgreSQL 角色仓储实现

use std::collections::HashMap;

use admin_common::AuditInfo;
use admin_errors::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::executor::PgExecutor;
use crate::domain::role::{Permission, PermissionId, Role, RoleId, RoleRepository};
use crate::domain::search::SearchCriteria;

pub struct PgRoleRepository {
    exec: PgExecutor,
}

impl PgRoleRepository {
    pub fn new(exec: PgExecutor) -> Self {
        Self { exec }
    }

    /// 批量加载角色的权限（每个权限附带其全部角色关联）
    async fn load_permissions(&self, role_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<Permission>>> {
        if role_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = self
            .exec
            .fetch_all(
                sqlx::query_as::<_, RolePermissionRow>(
                    r#"
                    SELECT rp.role_id, p.id, p.code, p.name, p.created_at, p.updated_at,
                           ARRAY(
                               SELECT other.role_id FROM role_permissions other
                               WHERE other.permission_id = p.id
                               ORDER BY other.created_at
                           ) AS role_ids
                    FROM role_permissions rp
                    JOIN permissions p ON p.id = rp.permission_id
                    WHERE rp.role_id = ANY($1)
                    ORDER BY rp.created_at, p.code
                    "#,
                )
                .bind(role_ids),
            )
            .await?;

        let mut map: HashMap<Uuid, Vec<Permission>> = HashMap::new();
        for row in rows {
            let role_id = row.role_id;
            map.entry(role_id).or_default().push(row.into_permission());
        }
        Ok(map)
    }

    async fn with_permissions(&self, rows: Vec<RoleRow>) -> AppResult<Vec<Role>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut permissions = self.load_permissions(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let perms = permissions.remove(&r.id).unwrap_or_default();
                r.into_role(perms)
            })
            .collect())
    }
}

#[async_trait]
impl RoleRepository for PgRoleRepository {
    async fn create(&self, role: &Role) -> AppResult<()> {
        self.exec
            .execute(
                sqlx::query(
                    "INSERT INTO roles (id, name, created_at, updated_at) VALUES ($1, $2, $3, $4)",
                )
                .bind(role.id.0)
                .bind(&role.name)
                .bind(role.audit_info.created_at)
                .bind(role.audit_info.updated_at),
            )
            .await?;
        Ok(())
    }

    async fn update(&self, role: &Role) -> AppResult<()> {
        self.exec
            .execute(
                sqlx::query("UPDATE roles SET name = $2, updated_at = $3 WHERE id = $1")
                    .bind(role.id.0)
                    .bind(&role.name)
                    .bind(role.audit_info.updated_at),
            )
            .await?;
        Ok(())
    }

    async fn find_by_ids(&self, ids: &[RoleId]) -> AppResult<Vec<Role>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        let rows = self
            .exec
            .fetch_all(
                sqlx::query_as::<_, RoleRow>(
                    r#"
                    SELECT id, name, created_at, updated_at
                    FROM roles WHERE id = ANY($1)
                    ORDER BY created_at
                    "#,
                )
                .bind(&ids),
            )
            .await?;
        self.with_permissions(rows).await
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let row = self
            .exec
            .fetch_optional(
                sqlx::query_as::<_, RoleRow>(
                    "SELECT id, name, created_at, updated_at FROM roles WHERE name = $1",
                )
                .bind(name),
            )
            .await?;

        match row {
            Some(r) => Ok(self.with_permissions(vec![r]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn search(&self, criteria: &SearchCriteria) -> AppResult<(Vec<Role>, u64)> {
        let pattern = criteria.like_pattern();
        let filter = "($1::text IS NULL OR name LIKE $1 OR id::text LIKE $1)";

        let count_sql = format!("SELECT COUNT(*) FROM roles WHERE {}", filter);
        let (total,): (i64,) = self
            .exec
            .fetch_one(sqlx::query_as(&count_sql).bind(&pattern))
            .await?;

        let sql = format!(
            r#"
            SELECT id, name, created_at, updated_at
            FROM roles WHERE {}
            ORDER BY {} {}, id
            LIMIT $2 OFFSET $3
            "#,
            filter,
            criteria.sort_column,
            criteria.sort_order.as_sql()
        );
        let rows = self
            .exec
            .fetch_all(
                sqlx::query_as::<_, RoleRow>(&sql)
                    .bind(&pattern)
                    .bind(i64::from(criteria.page.limit))
                    .bind(criteria.page.offset() as i64),
            )
            .await?;

        Ok((self.with_permissions(rows).await?, total as u64))
    }

    async fn delete_by_ids(&self, ids: &[RoleId]) -> AppResult<u64> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        self.exec
            .execute(sqlx::query("DELETE FROM roles WHERE id = ANY($1)").bind(&ids))
            .await
    }
}

#[derive(sqlx::FromRow)]
struct RoleRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoleRow {
    fn into_role(self, permissions: Vec<Permission>) -> Role {
        Role {
            id: RoleId::from_uuid(self.id),
            name: self.name,
            permissions,
            audit_info: AuditInfo {
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct RolePermissionRow {
    role_id: Uuid,
    id: Uuid,
    code: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    role_ids: Vec<Uuid>,
}

impl RolePermissionRow {
    fn into_permission(self) -> Permission {
        Permission {
            id: PermissionId::from_uuid(self.id),
            code: self.code,
            name: self.name,
            role_ids: self.role_ids.into_iter().map(RoleId::from_uuid).collect(),
            audit_info: AuditInfo {
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        }
    }
}
