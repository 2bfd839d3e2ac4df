//! Repository trait 定义

use async_trait::async_trait;
use tado_common::{TaskId, UserId};
use tado_errors::AppResult;

use super::task::{Task, TaskListFilter};
use super::user::{Email, User};

/// 任务仓储
///
/// 所有查询都以 owner 为边界，跨用户访问在仓储层就不可能发生。
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn insert(&self, task: &Task) -> AppResult<()>;

    async fn find_by_id(&self, id: &TaskId, owner: &UserId) -> AppResult<Option<Task>>;

    async fn list(&self, owner: &UserId, filter: &TaskListFilter, limit: i64)
    -> AppResult<Vec<Task>>;

    async fn update(&self, task: &Task) -> AppResult<()>;

    /// 返回是否实际删除了一行
    async fn delete(&self, id: &TaskId, owner: &UserId) -> AppResult<bool>;
}

/// 用户仓储
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: &User) -> AppResult<()>;

    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>>;

    async fn list_all(&self) -> AppResult<Vec<User>>;

    async fn update(&self, user: &User) -> AppResult<()>;

    async fn delete(&self, id: &UserId) -> AppResult<bool>;
}
