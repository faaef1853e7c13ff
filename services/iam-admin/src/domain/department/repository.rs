//! 部门仓储接口

use admin_common::UserId;
use admin_errors::AppResult;
use async_trait::async_trait;

use super::department::{Department, DepartmentId};
use crate::domain::search::SearchCriteria;

#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    async fn create(&self, department: &Department) -> AppResult<()>;

    async fn update(&self, department: &Department) -> AppResult<()>;

    async fn find_by_ids(&self, ids: &[DepartmentId]) -> AppResult<Vec<Department>>;

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Department>>;

    /// 名称 / 国家的区分大小写子串搜索
    async fn search(&self, criteria: &SearchCriteria) -> AppResult<(Vec<Department>, u64)>;

    /// 将无主（或已归属该用户）的部门归属到用户，返回实际归属数
    async fn assign_to_user(&self, ids: &[DepartmentId], user_id: &UserId) -> AppResult<u64>;

    async fn delete_by_ids(&self, ids: &[DepartmentId]) -> AppResult<u64>;
}
