//! 请求 / 响应 DTO（camelCase）

use admin_common::{PageRequest, PagedResult, SortOrder, SortRequest, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::domain::department::{Department, DepartmentId};
use crate::domain::role::{Permission, PermissionId, Role, RoleId, UserRole, UserRoleId};
use crate::domain::search::SearchQuery;
use crate::domain::user::User;

// ---------- 通用 ----------

/// 搜索参数
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub value: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_field: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl From<SearchParams> for SearchQuery {
    fn from(params: SearchParams) -> Self {
        let page_defaults = PageRequest::default();
        let sort_defaults = SortRequest::default();
        SearchQuery {
            value: params.value,
            page: PageRequest::new(
                params.page.unwrap_or(page_defaults.page),
                params.limit.unwrap_or(page_defaults.limit),
            ),
            sort: SortRequest {
                field: params.sort_field.unwrap_or(sort_defaults.field),
                order: params.sort_order.unwrap_or(sort_defaults.order),
            },
        }
    }
}

/// 分页响应：`{total, page, limit, totalPages, <key>: [...]}`
pub fn paged<T, U: Serialize>(key: &str, result: PagedResult<T>, f: impl FnMut(T) -> U) -> Value {
    let total_pages = result.total_pages();
    let result = result.map(f);

    let mut body = Map::new();
    body.insert("total".to_string(), json!(result.total));
    body.insert("page".to_string(), json!(result.page));
    body.insert("limit".to_string(), json!(result.limit));
    body.insert("totalPages".to_string(), json!(total_pages));
    body.insert(key.to_string(), json!(result.items));
    Value::Object(body)
}

/// 批量删除请求
#[derive(Debug, Deserialize)]
pub struct DeleteRequest<T> {
    pub ids: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: u64,
}

// ---------- 认证 ----------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: String,
    pub email: String,
    pub permissions: Vec<String>,
    pub expires_at: i64,
}

// ---------- 权限 ----------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermissionRequest {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub role_ids: Vec<RoleId>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePermissionRequest {
    pub name: Option<String>,
    pub code: Option<String>,
}

/// `?ids=a,b` 或 `?codes=x,y`
#[derive(Debug, Deserialize)]
pub struct PermissionLookupQuery {
    pub ids: Option<String>,
    pub codes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResponse {
    pub id: PermissionId,
    pub code: String,
    pub name: String,
    pub role_ids: Vec<RoleId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Permission> for PermissionResponse {
    fn from(p: Permission) -> Self {
        Self {
            id: p.id,
            code: p.code,
            name: p.name,
            role_ids: p.role_ids,
            created_at: p.audit_info.created_at,
            updated_at: p.audit_info.updated_at,
        }
    }
}

// ---------- 角色 ----------

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPermissionsRequest {
    pub permission_ids: Vec<PermissionId>,
}

#[derive(Debug, Deserialize)]
pub struct IdsQuery {
    pub ids: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub id: RoleId,
    pub name: String,
    pub permissions: Vec<PermissionResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Role> for RoleResponse {
    fn from(r: Role) -> Self {
        Self {
            id: r.id,
            name: r.name,
            permissions: r.permissions.into_iter().map(Into::into).collect(),
            created_at: r.audit_info.created_at,
            updated_at: r.audit_info.updated_at,
        }
    }
}

// ---------- 部门 ----------

#[derive(Debug, Deserialize)]
pub struct CreateDepartmentRequest {
    pub name: String,
    pub country: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDepartmentRequest {
    pub name: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentResponse {
    pub id: DepartmentId,
    pub name: String,
    pub country: String,
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Department> for DepartmentResponse {
    fn from(d: Department) -> Self {
        Self {
            id: d.id,
            name: d.name,
            country: d.country,
            user_id: d.user_id,
            created_at: d.audit_info.created_at,
            updated_at: d.audit_info.updated_at,
        }
    }
}

// ---------- 用户 ----------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub department_ids: Vec<DepartmentId>,
    #[serde(default)]
    pub role_ids: Vec<RoleId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_active: Option<bool>,
    pub is_email_verified: Option<bool>,
    pub is_two_factor_enabled: Option<bool>,
}

/// 用户响应，不含密码与各类令牌
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_active: bool,
    pub is_email_verified: bool,
    pub is_two_factor_enabled: bool,
    pub department_ids: Vec<DepartmentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email.into_inner(),
            phone: u.phone,
            date_of_birth: u.date_of_birth,
            is_active: u.is_active,
            is_email_verified: u.is_email_verified,
            is_two_factor_enabled: u.is_two_factor_enabled,
            department_ids: u.department_ids,
            created_at: u.audit_info.created_at,
            updated_at: u.audit_info.updated_at,
        }
    }
}

// ---------- 用户角色 ----------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRolesRequest {
    pub user_id: UserId,
    pub role_ids: Vec<RoleId>,
    /// 缺省为当前调用方
    pub assigned_by_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleRequest {
    pub user_id: UserId,
    pub role_id: RoleId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignRequest {
    #[serde(default)]
    pub user_ids: Vec<UserId>,
    #[serde(default)]
    pub role_ids: Vec<RoleId>,
}

#[derive(Debug, Serialize)]
pub struct UnassignResponse {
    pub unassigned: bool,
}

/// 逗号分隔的过滤条件
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRoleQuery {
    pub user_ids: Option<String>,
    pub role_ids: Option<String>,
    pub assigned_by_ids: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRoleResponse {
    pub id: UserRoleId,
    pub user_id: UserId,
    pub role_id: RoleId,
    pub assigned_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRole> for UserRoleResponse {
    fn from(b: UserRole) -> Self {
        Self {
            id: b.id,
            user_id: b.user_id,
            role_id: b.role_id,
            assigned_by: b.assigned_by,
            created_at: b.audit_info.created_at,
            updated_at: b.audit_info.updated_at,
        }
    }
}
