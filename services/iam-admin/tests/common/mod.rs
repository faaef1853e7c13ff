//! 测试公共设施
//!
//! 内存版 Store：事务开始时复制快照，提交时整体写回，回滚时丢弃。
//! 唯一约束与外键按迁移脚本的语义模拟（冲突一律 Conflict）。

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use admin_auth_core::TokenService;
use admin_common::{RequestContext, SortOrder, UserId};
use admin_config::PermissionSource;
use admin_errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::SecondsFormat;

use iam_admin::api::http::AppState;
use iam_admin::application::permission::CreatePermissionCommand;
use iam_admin::application::role::CreateRoleCommand;
use iam_admin::application::user::CreateUserCommand;
use iam_admin::domain::department::{Department, DepartmentId, DepartmentRepository};
use iam_admin::domain::role::{
    Permission, PermissionId, PermissionRepository, Role, RoleId, RolePermissionRepository,
    RoleRepository, UserRole, UserRoleFilter, UserRoleRepository,
};
use iam_admin::domain::search::SearchCriteria;
use iam_admin::domain::unit_of_work::{Repositories, Store, UnitOfWork, UnitOfWorkFactory};
use iam_admin::domain::user::{Argon2PasswordHasher, Email, PasswordHasher, User, UserRepository};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const DEFAULT_PASSWORD: &str = "s3cret-passw0rd";

/// 表数据
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub users: Vec<User>,
    pub departments: Vec<Department>,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
    pub role_permissions: Vec<(RoleId, PermissionId)>,
    pub user_roles: Vec<UserRole>,
}

fn unique_violation(constraint: &str) -> AppError {
    AppError::conflict(format!(
        "Duplicate value violates unique constraint '{}'",
        constraint
    ))
}

fn fk_violation(constraint: &str) -> AppError {
    AppError::conflict(format!(
        "Record is still referenced (constraint '{}')",
        constraint
    ))
}

impl Tables {
    fn user(&self, user: &User) -> User {
        let mut user = user.clone();
        user.department_ids = self
            .departments
            .iter()
            .filter(|d| d.user_id == Some(user.id))
            .map(|d| d.id)
            .collect();
        user
    }

    fn permission(&self, permission: &Permission) -> Permission {
        let mut permission = permission.clone();
        permission.role_ids = self
            .role_permissions
            .iter()
            .filter(|(_, p)| *p == permission.id)
            .map(|(r, _)| *r)
            .collect();
        permission
    }

    fn role(&self, role: &Role) -> Role {
        let mut role = role.clone();
        role.permissions = self
            .role_permissions
            .iter()
            .filter(|(r, _)| *r == role.id)
            .filter_map(|(_, p)| self.permissions.iter().find(|perm| perm.id == *p))
            .map(|p| self.permission(p))
            .collect();
        role
    }

    fn user_exists(&self, id: &UserId) -> bool {
        self.users.iter().any(|u| u.id == *id)
    }
}

fn timestamp(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// 按白名单列排序后分页，次序键为 id 升序
fn paginate<T>(
    mut rows: Vec<T>,
    criteria: &SearchCriteria,
    key: impl Fn(&T, &str) -> String,
    id: impl Fn(&T) -> String,
) -> (Vec<T>, u64) {
    let column = criteria.sort_column;
    rows.sort_by(|a, b| {
        let primary = key(a, column).cmp(&key(b, column));
        let primary = match criteria.sort_order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary.then_with(|| id(a).cmp(&id(b)))
    });

    let total = rows.len() as u64;
    let items = rows
        .into_iter()
        .skip(criteria.page.offset() as usize)
        .take(criteria.page.limit as usize)
        .collect();
    (items, total)
}

/// 一组共享同一份表数据的仓储
#[derive(Clone, Default)]
pub struct MemRepos {
    tables: Arc<Mutex<Tables>>,
    binding_batches: Arc<Mutex<Vec<usize>>>,
}

impl MemRepos {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("tables lock poisoned")
    }
}

impl Repositories for MemRepos {
    fn permissions(&self) -> &dyn PermissionRepository {
        self
    }

    fn roles(&self) -> &dyn RoleRepository {
        self
    }

    fn role_permissions(&self) -> &dyn RolePermissionRepository {
        self
    }

    fn departments(&self) -> &dyn DepartmentRepository {
        self
    }

    fn users(&self) -> &dyn UserRepository {
        self
    }

    fn user_roles(&self) -> &dyn UserRoleRepository {
        self
    }
}

#[async_trait]
impl PermissionRepository for MemRepos {
    async fn create_many(&self, permissions: &[Permission]) -> AppResult<()> {
        let mut t = self.tables();
        for permission in permissions {
            if t.permissions.iter().any(|p| p.code == permission.code) {
                return Err(unique_violation("uq_permissions_code"));
            }
            if t.permissions.iter().any(|p| p.name == permission.name) {
                return Err(unique_violation("uq_permissions_name"));
            }
            let mut stored = permission.clone();
            stored.role_ids.clear();
            t.permissions.push(stored);
        }
        Ok(())
    }

    async fn update(&self, permission: &Permission) -> AppResult<()> {
        let mut t = self.tables();
        let others = t.permissions.iter().filter(|p| p.id != permission.id);
        for other in others {
            if other.code == permission.code {
                return Err(unique_violation("uq_permissions_code"));
            }
            if other.name == permission.name {
                return Err(unique_violation("uq_permissions_name"));
            }
        }
        if let Some(stored) = t.permissions.iter_mut().find(|p| p.id == permission.id) {
            stored.code = permission.code.clone();
            stored.name = permission.name.clone();
            stored.audit_info.updated_at = permission.audit_info.updated_at;
        }
        Ok(())
    }

    async fn find_by_ids(&self, ids: &[PermissionId]) -> AppResult<Vec<Permission>> {
        let t = self.tables();
        Ok(t.permissions
            .iter()
            .filter(|p| ids.contains(&p.id))
            .map(|p| t.permission(p))
            .collect())
    }

    async fn find_by_codes(&self, codes: &[String]) -> AppResult<Vec<Permission>> {
        let t = self.tables();
        Ok(t.permissions
            .iter()
            .filter(|p| codes.contains(&p.code))
            .map(|p| t.permission(p))
            .collect())
    }

    async fn find_conflicts(
        &self,
        names: &[String],
        codes: &[String],
        exclude: Option<&PermissionId>,
    ) -> AppResult<Vec<Permission>> {
        let t = self.tables();
        Ok(t.permissions
            .iter()
            .filter(|p| names.contains(&p.name) || codes.contains(&p.code))
            .filter(|p| exclude.is_none_or(|id| p.id != *id))
            .map(|p| t.permission(p))
            .collect())
    }

    async fn search(&self, criteria: &SearchCriteria) -> AppResult<(Vec<Permission>, u64)> {
        let t = self.tables();
        let rows: Vec<Permission> = t
            .permissions
            .iter()
            .filter(|p| criteria.matches(&[&p.name, &p.code, &p.id.to_string()], false))
            .map(|p| t.permission(p))
            .collect();
        Ok(paginate(
            rows,
            criteria,
            |p, column| match column {
                "code" => p.code.clone(),
                "name" => p.name.clone(),
                "created_at" => timestamp(&p.audit_info.created_at),
                "updated_at" => timestamp(&p.audit_info.updated_at),
                _ => p.id.to_string(),
            },
            |p| p.id.to_string(),
        ))
    }

    async fn delete_by_ids(&self, ids: &[PermissionId]) -> AppResult<u64> {
        let mut t = self.tables();
        let before = t.permissions.len();
        t.permissions.retain(|p| !ids.contains(&p.id));
        t.role_permissions.retain(|(_, p)| !ids.contains(p));
        Ok((before - t.permissions.len()) as u64)
    }
}

#[async_trait]
impl RoleRepository for MemRepos {
    async fn create(&self, role: &Role) -> AppResult<()> {
        let mut t = self.tables();
        if t.roles.iter().any(|r| r.name == role.name) {
            return Err(unique_violation("uq_roles_name"));
        }
        let mut stored = role.clone();
        stored.permissions.clear();
        t.roles.push(stored);
        Ok(())
    }

    async fn update(&self, role: &Role) -> AppResult<()> {
        let mut t = self.tables();
        if t.roles.iter().any(|r| r.id != role.id && r.name == role.name) {
            return Err(unique_violation("uq_roles_name"));
        }
        if let Some(stored) = t.roles.iter_mut().find(|r| r.id == role.id) {
            stored.name = role.name.clone();
            stored.audit_info.updated_at = role.audit_info.updated_at;
        }
        Ok(())
    }

    async fn find_by_ids(&self, ids: &[RoleId]) -> AppResult<Vec<Role>> {
        let t = self.tables();
        Ok(t.roles
            .iter()
            .filter(|r| ids.contains(&r.id))
            .map(|r| t.role(r))
            .collect())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let t = self.tables();
        Ok(t.roles.iter().find(|r| r.name == name).map(|r| t.role(r)))
    }

    async fn search(&self, criteria: &SearchCriteria) -> AppResult<(Vec<Role>, u64)> {
        let t = self.tables();
        let rows: Vec<Role> = t
            .roles
            .iter()
            .filter(|r| criteria.matches(&[&r.name, &r.id.to_string()], false))
            .map(|r| t.role(r))
            .collect();
        Ok(paginate(
            rows,
            criteria,
            |r, column| match column {
                "name" => r.name.clone(),
                "created_at" => timestamp(&r.audit_info.created_at),
                "updated_at" => timestamp(&r.audit_info.updated_at),
                _ => r.id.to_string(),
            },
            |r| r.id.to_string(),
        ))
    }

    async fn delete_by_ids(&self, ids: &[RoleId]) -> AppResult<u64> {
        let mut t = self.tables();
        if t.user_roles.iter().any(|b| ids.contains(&b.role_id)) {
            return Err(fk_violation("user_roles_role_id_fkey"));
        }
        let before = t.roles.len();
        t.roles.retain(|r| !ids.contains(&r.id));
        t.role_permissions.retain(|(r, _)| !ids.contains(r));
        Ok((before - t.roles.len()) as u64)
    }
}

#[async_trait]
impl RolePermissionRepository for MemRepos {
    async fn attach(&self, role_id: &RoleId, permission_ids: &[PermissionId]) -> AppResult<()> {
        let mut t = self.tables();
        if !t.roles.iter().any(|r| r.id == *role_id) {
            return Err(fk_violation("role_permissions_role_id_fkey"));
        }
        for permission_id in permission_ids {
            if !t.permissions.iter().any(|p| p.id == *permission_id) {
                return Err(fk_violation("role_permissions_permission_id_fkey"));
            }
            if !t.role_permissions.contains(&(*role_id, *permission_id)) {
                t.role_permissions.push((*role_id, *permission_id));
            }
        }
        Ok(())
    }

    async fn detach_permissions(&self, permission_ids: &[PermissionId]) -> AppResult<u64> {
        let mut t = self.tables();
        let before = t.role_permissions.len();
        t.role_permissions.retain(|(_, p)| !permission_ids.contains(p));
        Ok((before - t.role_permissions.len()) as u64)
    }
}

#[async_trait]
impl DepartmentRepository for MemRepos {
    async fn create(&self, department: &Department) -> AppResult<()> {
        let mut t = self.tables();
        if t.departments.iter().any(|d| d.name == department.name) {
            return Err(unique_violation("uq_departments_name"));
        }
        if let Some(user_id) = &department.user_id
            && !t.user_exists(user_id)
        {
            return Err(fk_violation("departments_user_id_fkey"));
        }
        t.departments.push(department.clone());
        Ok(())
    }

    async fn update(&self, department: &Department) -> AppResult<()> {
        let mut t = self.tables();
        if t
            .departments
            .iter()
            .any(|d| d.id != department.id && d.name == department.name)
        {
            return Err(unique_violation("uq_departments_name"));
        }
        if let Some(stored) = t.departments.iter_mut().find(|d| d.id == department.id) {
            stored.name = department.name.clone();
            stored.country = department.country.clone();
            stored.audit_info.updated_at = department.audit_info.updated_at;
        }
        Ok(())
    }

    async fn find_by_ids(&self, ids: &[DepartmentId]) -> AppResult<Vec<Department>> {
        let t = self.tables();
        Ok(t.departments
            .iter()
            .filter(|d| ids.contains(&d.id))
            .cloned()
            .collect())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Department>> {
        let t = self.tables();
        Ok(t.departments.iter().find(|d| d.name == name).cloned())
    }

    async fn search(&self, criteria: &SearchCriteria) -> AppResult<(Vec<Department>, u64)> {
        let t = self.tables();
        let rows: Vec<Department> = t
            .departments
            .iter()
            .filter(|d| criteria.matches(&[&d.name, &d.country], false))
            .cloned()
            .collect();
        Ok(paginate(
            rows,
            criteria,
            |d, column| match column {
                "name" => d.name.clone(),
                "country" => d.country.clone(),
                "created_at" => timestamp(&d.audit_info.created_at),
                "updated_at" => timestamp(&d.audit_info.updated_at),
                _ => d.id.to_string(),
            },
            |d| d.id.to_string(),
        ))
    }

    async fn assign_to_user(&self, ids: &[DepartmentId], user_id: &UserId) -> AppResult<u64> {
        let mut t = self.tables();
        if !ids.is_empty() && !t.user_exists(user_id) {
            return Err(fk_violation("departments_user_id_fkey"));
        }
        let mut claimed = 0;
        for department in t.departments.iter_mut().filter(|d| {
            ids.contains(&d.id) && d.user_id.is_none_or(|owner| owner == *user_id)
        }) {
            department.user_id = Some(*user_id);
            claimed += 1;
        }
        Ok(claimed)
    }

    async fn delete_by_ids(&self, ids: &[DepartmentId]) -> AppResult<u64> {
        let mut t = self.tables();
        let before = t.departments.len();
        t.departments.retain(|d| !ids.contains(&d.id));
        Ok((before - t.departments.len()) as u64)
    }
}

#[async_trait]
impl UserRepository for MemRepos {
    async fn create(&self, user: &User) -> AppResult<()> {
        let mut t = self.tables();
        if t.users.iter().any(|u| u.email == user.email) {
            return Err(unique_violation("uq_users_email"));
        }
        let mut stored = user.clone();
        stored.department_ids.clear();
        t.users.push(stored);
        Ok(())
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let mut t = self.tables();
        if t.users.iter().any(|u| u.id != user.id && u.email == user.email) {
            return Err(unique_violation("uq_users_email"));
        }
        if let Some(stored) = t.users.iter_mut().find(|u| u.id == user.id) {
            let created_at = stored.audit_info.created_at;
            *stored = user.clone();
            stored.department_ids.clear();
            stored.audit_info.created_at = created_at;
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        let t = self.tables();
        Ok(t.users.iter().find(|u| u.id == *id).map(|u| t.user(u)))
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<User>> {
        let t = self.tables();
        Ok(t.users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .map(|u| t.user(u))
            .collect())
    }

    async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>> {
        let t = self.tables();
        Ok(t.users.iter().find(|u| u.email == *email).map(|u| t.user(u)))
    }

    async fn exists_by_email(&self, email: &Email, exclude: Option<&UserId>) -> AppResult<bool> {
        let t = self.tables();
        Ok(t.users
            .iter()
            .any(|u| u.email == *email && exclude.is_none_or(|id| u.id != *id)))
    }

    async fn search(&self, criteria: &SearchCriteria) -> AppResult<(Vec<User>, u64)> {
        let t = self.tables();
        let rows: Vec<User> = t
            .users
            .iter()
            .filter(|u| {
                criteria.matches(
                    &[
                        &u.first_name,
                        &u.last_name,
                        u.email.as_str(),
                        &u.id.to_string(),
                    ],
                    true,
                )
            })
            .map(|u| t.user(u))
            .collect();
        Ok(paginate(
            rows,
            criteria,
            |u, column| match column {
                "first_name" => u.first_name.clone(),
                "last_name" => u.last_name.clone(),
                "email" => u.email.to_string(),
                "is_active" => u.is_active.to_string(),
                "created_at" => timestamp(&u.audit_info.created_at),
                "updated_at" => timestamp(&u.audit_info.updated_at),
                _ => u.id.to_string(),
            },
            |u| u.id.to_string(),
        ))
    }

    async fn delete_by_ids(&self, ids: &[UserId]) -> AppResult<u64> {
        let mut t = self.tables();
        if t.user_roles.iter().any(|b| ids.contains(&b.user_id)) {
            return Err(fk_violation("user_roles_user_id_fkey"));
        }
        if t.user_roles.iter().any(|b| ids.contains(&b.assigned_by)) {
            return Err(fk_violation("user_roles_assigned_by_fkey"));
        }
        let before = t.users.len();
        t.users.retain(|u| !ids.contains(&u.id));
        for department in t.departments.iter_mut() {
            if department.user_id.is_some_and(|id| ids.contains(&id)) {
                department.user_id = None;
            }
        }
        Ok((before - t.users.len()) as u64)
    }
}

#[async_trait]
impl UserRoleRepository for MemRepos {
    async fn create_many(&self, bindings: &[UserRole]) -> AppResult<()> {
        self.binding_batches
            .lock()
            .expect("batch log lock poisoned")
            .push(bindings.len());

        let mut t = self.tables();
        for binding in bindings {
            if !t.user_exists(&binding.user_id) || !t.user_exists(&binding.assigned_by) {
                return Err(fk_violation("user_roles_user_id_fkey"));
            }
            if !t.roles.iter().any(|r| r.id == binding.role_id) {
                return Err(fk_violation("user_roles_role_id_fkey"));
            }
            if t
                .user_roles
                .iter()
                .any(|b| b.user_id == binding.user_id && b.role_id == binding.role_id)
            {
                return Err(unique_violation("uq_user_roles_user_role"));
            }
            t.user_roles.push(binding.clone());
        }
        Ok(())
    }

    async fn find(&self, filter: &UserRoleFilter) -> AppResult<Vec<UserRole>> {
        let t = self.tables();
        Ok(t.user_roles
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect())
    }

    async fn find_latest_by_email(&self, email: &Email) -> AppResult<Option<UserRole>> {
        let t = self.tables();
        let ids: Vec<UserId> = t
            .users
            .iter()
            .filter(|u| u.email == *email)
            .map(|u| u.id)
            .collect();
        Ok(t.user_roles
            .iter()
            .filter(|b| ids.contains(&b.user_id) || ids.contains(&b.assigned_by))
            .max_by(|a, b| {
                a.audit_info
                    .created_at
                    .cmp(&b.audit_info.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            })
            .cloned())
    }

    async fn reattribute_granted_by(&self, assigners: &[UserId]) -> AppResult<u64> {
        let mut t = self.tables();
        let mut changed = 0;
        for binding in t
            .user_roles
            .iter_mut()
            .filter(|b| assigners.contains(&b.assigned_by))
        {
            binding.assigned_by = binding.user_id;
            binding.audit_info.touch();
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete_by_users_and_roles(
        &self,
        user_ids: &[UserId],
        role_ids: &[RoleId],
    ) -> AppResult<u64> {
        let mut t = self.tables();
        let before = t.user_roles.len();
        t.user_roles
            .retain(|b| !(user_ids.contains(&b.user_id) && role_ids.contains(&b.role_id)));
        Ok((before - t.user_roles.len()) as u64)
    }
}

/// 内存存储
#[derive(Clone, Default)]
pub struct InMemoryStore {
    repos: MemRepos,
    commits: Arc<AtomicUsize>,
    rollbacks: Arc<AtomicUsize>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 已提交数据的快照
    pub fn snapshot(&self) -> Tables {
        self.repos.tables().clone()
    }

    /// 绕过约束直接改写已提交数据（模拟不一致的存储）
    pub fn tamper(&self, f: impl FnOnce(&mut Tables)) {
        f(&mut self.repos.tables());
    }

    /// 每次写入用户角色绑定时的批大小
    pub fn binding_batches(&self) -> Vec<usize> {
        self.repos
            .binding_batches
            .lock()
            .expect("batch log lock poisoned")
            .clone()
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }
}

impl Repositories for InMemoryStore {
    fn permissions(&self) -> &dyn PermissionRepository {
        &self.repos
    }

    fn roles(&self) -> &dyn RoleRepository {
        &self.repos
    }

    fn role_permissions(&self) -> &dyn RolePermissionRepository {
        &self.repos
    }

    fn departments(&self) -> &dyn DepartmentRepository {
        &self.repos
    }

    fn users(&self) -> &dyn UserRepository {
        &self.repos
    }

    fn user_roles(&self) -> &dyn UserRoleRepository {
        &self.repos
    }
}

#[async_trait]
impl UnitOfWorkFactory for InMemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let working = MemRepos {
            tables: Arc::new(Mutex::new(self.snapshot())),
            binding_batches: self.repos.binding_batches.clone(),
        };
        Ok(Box::new(MemUnitOfWork {
            working,
            committed: self.repos.tables.clone(),
            commits: self.commits.clone(),
            rollbacks: self.rollbacks.clone(),
        }))
    }
}

struct MemUnitOfWork {
    working: MemRepos,
    committed: Arc<Mutex<Tables>>,
    commits: Arc<AtomicUsize>,
    rollbacks: Arc<AtomicUsize>,
}

impl Repositories for MemUnitOfWork {
    fn permissions(&self) -> &dyn PermissionRepository {
        &self.working
    }

    fn roles(&self) -> &dyn RoleRepository {
        &self.working
    }

    fn role_permissions(&self) -> &dyn RolePermissionRepository {
        &self.working
    }

    fn departments(&self) -> &dyn DepartmentRepository {
        &self.working
    }

    fn users(&self) -> &dyn UserRepository {
        &self.working
    }

    fn user_roles(&self) -> &dyn UserRoleRepository {
        &self.working
    }
}

#[async_trait]
impl UnitOfWork for MemUnitOfWork {
    async fn commit(self: Box<Self>) -> AppResult<()> {
        let working = self.working.tables().clone();
        *self.committed.lock().expect("tables lock poisoned") = working;
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------- 测试数据 ----------

pub fn ctx() -> RequestContext {
    RequestContext::new("test-trace")
}

/// 低成本参数的 Argon2id
pub fn hasher() -> Arc<dyn PasswordHasher> {
    Arc::new(Argon2PasswordHasher::with_params(8, 1, 1).expect("argon2 params"))
}

pub fn tokens() -> Arc<TokenService> {
    Arc::new(TokenService::new(JWT_SECRET, 3600, "iam-admin", "iam-admin-api"))
}

pub fn app_state(store: &Arc<InMemoryStore>, source: PermissionSource) -> AppState {
    let store: Arc<dyn Store> = store.clone();
    AppState::new(store, hasher(), tokens(), source).expect("app state")
}

/// 创建权限，名称取 `Permission <code>`
pub async fn create_permissions(state: &AppState, codes: &[&str]) -> Vec<Permission> {
    let cmds = codes
        .iter()
        .map(|code| CreatePermissionCommand {
            name: format!("Permission {}", code),
            code: code.to_string(),
            role_ids: vec![],
        })
        .collect();
    state
        .permissions
        .create(&ctx(), cmds)
        .await
        .expect("create permissions")
}

pub async fn create_role(state: &AppState, name: &str, codes: &[&str]) -> Role {
    state
        .roles
        .create(
            &ctx(),
            CreateRoleCommand {
                name: name.to_string(),
                permissions: codes.iter().map(|c| c.to_string()).collect(),
            },
        )
        .await
        .expect("create role")
}

pub fn user_command(email: &str, role_ids: Vec<RoleId>) -> CreateUserCommand {
    CreateUserCommand {
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        password: DEFAULT_PASSWORD.to_string(),
        phone: None,
        date_of_birth: None,
        department_ids: vec![],
        role_ids,
    }
}

pub async fn create_user(state: &AppState, email: &str, role_ids: Vec<RoleId>) -> User {
    state
        .users
        .create(&ctx(), user_command(email, role_ids), None)
        .await
        .expect("create user")
}

/// 创建持有给定权限的用户并登录，返回访问令牌
pub async fn login_with_permissions(state: &AppState, email: &str, codes: &[&str]) -> String {
    create_permissions(state, codes).await;
    let role = create_role(state, &format!("Role for {}", email), codes).await;
    create_user(state, email, vec![role.id]).await;
    state
        .auth
        .login(&ctx(), email, DEFAULT_PASSWORD)
        .await
        .expect("login")
        .access_token
}
