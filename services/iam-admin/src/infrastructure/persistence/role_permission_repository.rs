//! PostgreSQL 角色权限关联仓储实现

use admin_errors::AppResult;
use async_trait::async_trait;
use uuid::Uuid;

use super::executor::PgExecutor;
use crate::domain::role::{PermissionId, RoleId, RolePermissionRepository};

pub struct PgRolePermissionRepository {
    exec: PgExecutor,
}

impl PgRolePermissionRepository {
    pub fn new(exec: PgExecutor) -> Self {
        Self { exec }
    }
}

#[async_trait]
impl RolePermissionRepository for PgRolePermissionRepository {
    async fn attach(&self, role_id: &RoleId, permission_ids: &[PermissionId]) -> AppResult<()> {
        if permission_ids.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = permission_ids.iter().map(|id| id.0).collect();
        self.exec
            .execute(
                sqlx::query(
                    r#"
                    INSERT INTO role_permissions (role_id, permission_id)
                    SELECT $1, permission_id FROM UNNEST($2::uuid[]) AS t(permission_id)
                    ON CONFLICT (role_id, permission_id) DO NOTHING
                    "#,
                )
                .bind(role_id.0)
                .bind(&ids),
            )
            .await?;
        Ok(())
    }

    async fn detach_permissions(&self, permission_ids: &[PermissionId]) -> AppResult<u64> {
        let ids: Vec<Uuid> = permission_ids.iter().map(|id| id.0).collect();
        self.exec
            .execute(
                sqlx::query("DELETE FROM role_permissions WHERE permission_id = ANY($1)")
                    .bind(&ids),
            )
            .await
    }
}
