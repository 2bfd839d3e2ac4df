//! 任务应用服务
//!
//! 读路径：先查缓存，miss 再落库并回填。
//! 写路径：先提交数据变更，随后同步执行按 owner 的缓存失效，
//! 失效完成（或失败被记录）之后才返回给调用方。

use std::sync::Arc;
use tado_common::{TaskId, UserId};
use tado_errors::{AppError, AppResult};
use tracing::info;

use crate::domain::{NewTask, Task, TaskListFilter, TaskRepository, TaskUpdate};
use crate::infrastructure::cache::{CacheOutcome, TaskCache, keys};

#[derive(Clone)]
pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
    cache: TaskCache,
    list_cap: i64,
}

impl TaskService {
    pub fn new(repo: Arc<dyn TaskRepository>, cache: TaskCache, list_cap: i64) -> Self {
        Self {
            repo,
            cache,
            list_cap,
        }
    }

    pub async fn create(&self, owner: UserId, input: NewTask) -> AppResult<Task> {
        let task = Task::new(owner, input)?;
        self.repo.insert(&task).await?;

        self.cache.invalidate_for_owner(&owner, Some(&task.id)).await;

        info!(task_id = %task.id, %owner, "Task created");
        Ok(task)
    }

    pub async fn list(
        &self,
        owner: &UserId,
        filter: &TaskListFilter,
    ) -> AppResult<(Vec<Task>, CacheOutcome)> {
        let key = keys::task_list_key(owner, filter);

        if let Some(tasks) = self.cache.get_json::<Vec<Task>>(&key).await {
            return Ok((tasks, CacheOutcome::Hit));
        }

        let tasks = self.repo.list(owner, filter, self.list_cap).await?;
        self.cache.set_json(&key, &tasks).await;

        Ok((tasks, CacheOutcome::Miss))
    }

    pub async fn get(&self, owner: &UserId, id: &TaskId) -> AppResult<(Task, CacheOutcome)> {
        let key = keys::task_key(id);

        // 实体键只由任务 id 派生，命中后仍须校验归属
        if let Some(task) = self.cache.get_json::<Task>(&key).await {
            if task.owner == *owner {
                return Ok((task, CacheOutcome::Hit));
            }
            return Err(AppError::not_found("Task not found"));
        }

        let task = self
            .repo
            .find_by_id(id, owner)
            .await?
            .ok_or_else(|| AppError::not_found("Task not found"))?;

        self.cache.set_json(&key, &task).await;
        Ok((task, CacheOutcome::Miss))
    }

    pub async fn update(
        &self,
        owner: &UserId,
        id: &TaskId,
        update: TaskUpdate,
    ) -> AppResult<Task> {
        let mut task = self
            .repo
            .find_by_id(id, owner)
            .await?
            .ok_or_else(|| AppError::not_found("Task not found"))?;

        task.apply(update)?;
        self.repo.update(&task).await?;

        self.cache.invalidate_for_owner(owner, Some(id)).await;

        info!(task_id = %id, %owner, "Task updated");
        Ok(task)
    }

    pub async fn archive(&self, owner: &UserId, id: &TaskId) -> AppResult<Task> {
        let mut task = self
            .repo
            .find_by_id(id, owner)
            .await?
            .ok_or_else(|| AppError::not_found("Task not found"))?;

        task.archive();
        self.repo.update(&task).await?;

        self.cache.invalidate_for_owner(owner, Some(id)).await;

        info!(task_id = %id, %owner, "Task archived");
        Ok(task)
    }

    pub async fn delete(&self, owner: &UserId, id: &TaskId) -> AppResult<()> {
        let deleted = self.repo.delete(id, owner).await?;
        if !deleted {
            return Err(AppError::not_found("Task not found"));
        }

        self.cache.invalidate_for_owner(owner, Some(id)).await;

        info!(task_id = %id, %owner, "Task deleted");
        Ok(())
    }
}
