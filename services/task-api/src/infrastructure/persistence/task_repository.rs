//! PostgreSQL 任务 Repository 实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tado_common::{TaskId, UserId};
use tado_errors::{AppError, AppResult};
use uuid::Uuid;

use crate::domain::{SortOrder, Subtask, Task, TaskListFilter, TaskRepository, TaskStatus};

pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn insert(&self, task: &Task) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tasks (id, owner_id, title, description, subtasks, status,
                               due_date, completed_at, archived, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(task.id.0)
        .bind(task.owner.0)
        .bind(&task.title)
        .bind(&task.description)
        .bind(Json(&task.subtasks))
        .bind(task.status.as_str())
        .bind(task.due_date)
        .bind(task.completed_at)
        .bind(task.archived)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert task: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &TaskId, owner: &UserId) -> AppResult<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, owner_id, title, description, subtasks, status,
                   due_date, completed_at, archived, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id.0)
        .bind(owner.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find task: {}", e)))?;

        row.map(|r| r.into_task()).transpose()
    }

    async fn list(
        &self,
        owner: &UserId,
        filter: &TaskListFilter,
        limit: i64,
    ) -> AppResult<Vec<Task>> {
        // 排序列来自 SortField 白名单枚举，插值是安全的
        let order = match filter.sort.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let sql = format!(
            r#"
            SELECT id, owner_id, title, description, subtasks, status,
                   due_date, completed_at, archived, created_at, updated_at
            FROM tasks
            WHERE owner_id = $1
              AND archived = $2
              AND ($3::text IS NULL OR status = $3)
              AND ($4::text IS NULL OR title ILIKE $4 OR description ILIKE $4
                   OR EXISTS (SELECT 1 FROM jsonb_array_elements(subtasks) s
                              WHERE s->>'title' ILIKE $4))
            ORDER BY {} {}
            LIMIT $5
            "#,
            filter.sort.field.column(),
            order
        );

        let rows = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(owner.0)
            .bind(filter.archived)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.q.as_ref().map(|q| format!("%{}%", q)))
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list tasks: {}", e)))?;

        rows.into_iter().map(|r| r.into_task()).collect()
    }

    async fn update(&self, task: &Task) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE tasks SET
                title = $3, description = $4, subtasks = $5, status = $6,
                due_date = $7, completed_at = $8, archived = $9, updated_at = $10
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(task.id.0)
        .bind(task.owner.0)
        .bind(&task.title)
        .bind(&task.description)
        .bind(Json(&task.subtasks))
        .bind(task.status.as_str())
        .bind(task.due_date)
        .bind(task.completed_at)
        .bind(task.archived)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update task: {}", e)))?;

        Ok(())
    }

    async fn delete(&self, id: &TaskId, owner: &UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(id.0)
            .bind(owner.0)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete task: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    description: String,
    subtasks: Json<Vec<Subtask>>,
    status: String,
    due_date: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    archived: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskRow {
    fn into_task(self) -> AppResult<Task> {
        Ok(Task {
            id: TaskId::from_uuid(self.id),
            owner: UserId::from_uuid(self.owner_id),
            title: self.title,
            description: self.description,
            subtasks: self.subtasks.0,
            status: TaskStatus::parse(&self.status)
                .map_err(|_| AppError::database(format!("Unknown task status: {}", self.status)))?,
            due_date: self.due_date,
            completed_at: self.completed_at,
            archived: self.archived,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
