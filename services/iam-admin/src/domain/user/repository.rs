//! 用户仓储接口

use admin_common::UserId;
use admin_errors::AppResult;
use async_trait::async_trait;

use super::email::Email;
use super::user::User;
use crate::domain::search::SearchCriteria;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> AppResult<()>;

    /// 更新用户字段（不含部门归属）
    async fn update(&self, user: &User) -> AppResult<()>;

    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>>;

    async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<User>>;

    async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>>;

    /// 邮箱是否已被占用（可排除某个用户自身）
    async fn exists_by_email(&self, email: &Email, exclude: Option<&UserId>) -> AppResult<bool>;

    /// 名字 / 姓氏 / 邮箱 / ID 文本的不区分大小写子串搜索
    async fn search(&self, criteria: &SearchCriteria) -> AppResult<(Vec<User>, u64)>;

    async fn delete_by_ids(&self, ids: &[UserId]) -> AppResult<u64>;
}
