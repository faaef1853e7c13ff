//! PostgreSQL 部门仓储实现

use admin_common::{AuditInfo, UserId};
use admin_errors::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::executor::PgExecutor;
use crate::domain::department::{Department, DepartmentId, DepartmentRepository};
use crate::domain::search::SearchCriteria;

const DEPARTMENT_COLUMNS: &str = "id, name, country, user_id, created_at, updated_at";

pub struct PgDepartmentRepository {
    exec: PgExecutor,
}

impl PgDepartmentRepository {
    pub fn new(exec: PgExecutor) -> Self {
        Self { exec }
    }
}

#[async_trait]
impl DepartmentRepository for PgDepartmentRepository {
    async fn create(&self, department: &Department) -> AppResult<()> {
        self.exec
            .execute(
                sqlx::query(
                    r#"
                    INSERT INTO departments (id, name, country, user_id, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(department.id.0)
                .bind(&department.name)
                .bind(&department.country)
                .bind(department.user_id.map(|u| u.0))
                .bind(department.audit_info.created_at)
                .bind(department.audit_info.updated_at),
            )
            .await?;
        Ok(())
    }

    async fn update(&self, department: &Department) -> AppResult<()> {
        self.exec
            .execute(
                sqlx::query(
                    r#"
                    UPDATE departments
                    SET name = $2, country = $3, user_id = $4, updated_at = $5
                    WHERE id = $1
                    "#,
                )
                .bind(department.id.0)
                .bind(&department.name)
                .bind(&department.country)
                .bind(department.user_id.map(|u| u.0))
                .bind(department.audit_info.updated_at),
            )
            .await?;
        Ok(())
    }

    async fn find_by_ids(&self, ids: &[DepartmentId]) -> AppResult<Vec<Department>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        let sql = format!(
            "SELECT {} FROM departments WHERE id = ANY($1) ORDER BY created_at",
            DEPARTMENT_COLUMNS
        );
        let rows = self
            .exec
            .fetch_all(sqlx::query_as::<_, DepartmentRow>(&sql).bind(&ids))
            .await?;
        Ok(rows.into_iter().map(DepartmentRow::into_department).collect())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Department>> {
        let sql = format!("SELECT {} FROM departments WHERE name = $1", DEPARTMENT_COLUMNS);
        let row = self
            .exec
            .fetch_optional(sqlx::query_as::<_, DepartmentRow>(&sql).bind(name))
            .await?;
        Ok(row.map(DepartmentRow::into_department))
    }

    async fn search(&self, criteria: &SearchCriteria) -> AppResult<(Vec<Department>, u64)> {
        let pattern = criteria.like_pattern();
        let filter = "($1::text IS NULL OR name LIKE $1 OR country LIKE $1)";

        let count_sql = format!("SELECT COUNT(*) FROM departments WHERE {}", filter);
        let (total,): (i64,) = self
            .exec
            .fetch_one(sqlx::query_as(&count_sql).bind(&pattern))
            .await?;

        let sql = format!(
            "SELECT {} FROM departments WHERE {} ORDER BY {} {}, id LIMIT $2 OFFSET $3",
            DEPARTMENT_COLUMNS,
            filter,
            criteria.sort_column,
            criteria.sort_order.as_sql()
        );
        let rows = self
            .exec
            .fetch_all(
                sqlx::query_as::<_, DepartmentRow>(&sql)
                    .bind(&pattern)
                    .bind(i64::from(criteria.page.limit))
                    .bind(criteria.page.offset() as i64),
            )
            .await?;

        Ok((
            rows.into_iter().map(DepartmentRow::into_department).collect(),
            total as u64,
        ))
    }

    async fn assign_to_user(&self, ids: &[DepartmentId], user_id: &UserId) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        self.exec
            .execute(
                sqlx::query(
                    r#"
                    UPDATE departments SET user_id = $2, updated_at = NOW()
                    WHERE id = ANY($1) AND (user_id IS NULL OR user_id = $2)
                    "#,
                )
                .bind(&ids)
                .bind(user_id.0),
            )
            .await
    }

    async fn delete_by_ids(&self, ids: &[DepartmentId]) -> AppResult<u64> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        self.exec
            .execute(sqlx::query("DELETE FROM departments WHERE id = ANY($1)").bind(&ids))
            .await
    }
}

#[derive(sqlx::FromRow)]
struct DepartmentRow {
    id: Uuid,
    name: String,
    country: String,
    user_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DepartmentRow {
    fn into_department(self) -> Department {
        Department {
            id: DepartmentId::from_uuid(self.id),
            name: self.name,
            country: self.country,
            user_id: self.user_id.map(UserId::from_uuid),
            audit_info: AuditInfo {
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        }
    }
}
