//! 数据库迁移
//!
//! 唯一索引与外键兜底应用层的先查后写检查。

use admin_adapter_postgres::{Migration, MigrationManager};
use admin_errors::{AppError, AppResult};
use sqlx::PgPool;
use tracing::{info, warn};

const INITIAL_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    first_name VARCHAR(100) NOT NULL,
    last_name VARCHAR(100) NOT NULL,
    email VARCHAR(255) NOT NULL,
    password TEXT NOT NULL,
    phone VARCHAR(50),
    date_of_birth DATE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    is_email_verified BOOLEAN NOT NULL DEFAULT FALSE,
    is_two_factor_enabled BOOLEAN NOT NULL DEFAULT FALSE,
    email_verification_token VARCHAR(128),
    password_reset_token VARCHAR(128),
    password_reset_expires TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE UNIQUE INDEX IF NOT EXISTS uq_users_email ON users (email);

CREATE TABLE IF NOT EXISTS departments (
    id UUID PRIMARY KEY,
    name VARCHAR(200) NOT NULL,
    country VARCHAR(100) NOT NULL,
    user_id UUID REFERENCES users (id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE UNIQUE INDEX IF NOT EXISTS uq_departments_name ON departments (name);
CREATE INDEX IF NOT EXISTS idx_departments_user_id ON departments (user_id);

CREATE TABLE IF NOT EXISTS roles (
    id UUID PRIMARY KEY,
    name VARCHAR(200) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE UNIQUE INDEX IF NOT EXISTS uq_roles_name ON roles (name);

CREATE TABLE IF NOT EXISTS permissions (
    id UUID PRIMARY KEY,
    code VARCHAR(200) NOT NULL,
    name VARCHAR(200) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE UNIQUE INDEX IF NOT EXISTS uq_permissions_code ON permissions (code);
CREATE UNIQUE INDEX IF NOT EXISTS uq_permissions_name ON permissions (name);

CREATE TABLE IF NOT EXISTS role_permissions (
    role_id UUID NOT NULL REFERENCES roles (id) ON DELETE CASCADE,
    permission_id UUID NOT NULL REFERENCES permissions (id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (role_id, permission_id)
);
CREATE INDEX IF NOT EXISTS idx_role_permissions_permission_id ON role_permissions (permission_id);

CREATE TABLE IF NOT EXISTS user_roles (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users (id),
    role_id UUID NOT NULL REFERENCES roles (id),
    assigned_by UUID NOT NULL REFERENCES users (id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_user_roles_user_role UNIQUE (user_id, role_id)
);
CREATE INDEX IF NOT EXISTS idx_user_roles_role_id ON user_roles (role_id);
CREATE INDEX IF NOT EXISTS idx_user_roles_assigned_by ON user_roles (assigned_by);
"#;

/// 用户删除前由应用层解除其持有的绑定、改记其授予的绑定；
/// 外键保持 RESTRICT，未处理的引用直接拒绝删除。
const USER_ROLE_FOREIGN_KEYS: &str = r#"
ALTER TABLE user_roles
    DROP CONSTRAINT IF EXISTS user_roles_user_id_fkey,
    ADD CONSTRAINT user_roles_user_id_fkey
        FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE RESTRICT;

ALTER TABLE user_roles
    DROP CONSTRAINT IF EXISTS user_roles_assigned_by_fkey,
    ADD CONSTRAINT user_roles_assigned_by_fkey
        FOREIGN KEY (assigned_by) REFERENCES users (id) ON DELETE RESTRICT;
"#;

/// 服务的全部迁移（按版本号排列）
pub fn migrations() -> Vec<Migration> {
    vec![
        Migration::new(1, "initial_schema", INITIAL_SCHEMA),
        Migration::new(2, "user_role_foreign_keys", USER_ROLE_FOREIGN_KEYS),
    ]
}

/// 执行迁移，任一失败即中止启动
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    let manager = MigrationManager::new(pool.clone());
    let result = manager.migrate(&migrations()).await?;

    if !result.is_success() {
        for err in &result.errors {
            warn!(version = err.version, error = %err.error, "Migration failed");
        }
        return Err(AppError::internal(format!(
            "{} migration(s) failed",
            result.errors.len()
        )));
    }

    info!(
        applied = result.applied_count(),
        skipped = result.skipped.len(),
        "Database migrations completed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_are_unique_and_ordered() {
        let migrations = migrations();
        let versions: Vec<i64> = migrations.iter().map(|m| m.version).collect();
        let mut sorted = versions.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(versions, sorted);
    }

    #[test]
    fn test_schema_declares_unique_indexes() {
        for index in [
            "uq_users_email",
            "uq_departments_name",
            "uq_roles_name",
            "uq_permissions_code",
            "uq_permissions_name",
            "uq_user_roles_user_role",
        ] {
            assert!(INITIAL_SCHEMA.contains(index), "missing {}", index);
        }
    }

    #[test]
    fn test_user_role_references_restrict_user_delete() {
        for constraint in ["user_roles_user_id_fkey", "user_roles_assigned_by_fkey"] {
            assert!(USER_ROLE_FOREIGN_KEYS.contains(constraint), "missing {}", constraint);
        }
        assert_eq!(USER_ROLE_FOREIGN_KEYS.matches("ON DELETE RESTRICT").count(), 2);
    }
}
