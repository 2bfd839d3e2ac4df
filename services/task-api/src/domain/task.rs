//! 任务实体和查询过滤器

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tado_common::{TaskId, UserId};
use tado_errors::{AppError, AppResult};
use uuid::Uuid;

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    InProgress,
    Done,
    Expired,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in-progress",
            Self::Done => "done",
            Self::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> AppResult<Self> {
        match s {
            "in-progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            "expired" => Ok(Self::Expired),
            other => Err(AppError::validation(format!("Invalid status: {}", other))),
        }
    }
}

/// 子任务
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub done: bool,
}

/// 任务实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub owner: UserId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 创建任务的输入
#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subtasks: Vec<SubtaskInput>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubtaskInput {
    pub title: String,
    #[serde(default)]
    pub done: bool,
}

/// 更新任务的输入（缺省字段不修改）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subtasks: Option<Vec<SubtaskInput>>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(owner: UserId, input: NewTask) -> AppResult<Self> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::validation("Title is required"));
        }

        let now = Utc::now();
        let status = input.status.unwrap_or(TaskStatus::InProgress);
        // 创建即完成的任务直接打完成时间戳
        let completed_at = (status == TaskStatus::Done).then_some(now);

        Ok(Self {
            id: TaskId::new(),
            owner,
            title,
            description: input.description.unwrap_or_default(),
            subtasks: input
                .subtasks
                .into_iter()
                .map(|s| Subtask {
                    id: Uuid::now_v7(),
                    title: s.title,
                    done: s.done,
                })
                .collect(),
            status,
            due_date: input.due_date,
            completed_at,
            archived: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// 应用更新，维护 status/completed_at 的一致性
    pub fn apply(&mut self, update: TaskUpdate) -> AppResult<()> {
        if let Some(title) = update.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(AppError::validation("Title must not be empty"));
            }
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(subtasks) = update.subtasks {
            self.subtasks = subtasks
                .into_iter()
                .map(|s| Subtask {
                    id: Uuid::now_v7(),
                    title: s.title,
                    done: s.done,
                })
                .collect();
        }
        if let Some(due_date) = update.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(status) = update.status {
            match status {
                TaskStatus::Done => {
                    if self.completed_at.is_none() {
                        self.completed_at = Some(Utc::now());
                    }
                }
                _ => self.completed_at = None,
            }
            self.status = status;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn archive(&mut self) {
        self.archived = true;
        self.updated_at = Utc::now();
    }
}

/// 排序字段白名单
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    DueDate,
    CompletedAt,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::DueDate => "due_date",
            Self::CompletedAt => "completed_at",
        }
    }

    /// 对应的数据库列名（白名单，可安全插入 SQL）
    pub fn column(&self) -> &'static str {
        self.as_str()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// 排序规格，形如 `created_at:desc`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            order: SortOrder::Desc,
        }
    }
}

impl SortSpec {
    /// 解析 `field:order`，无法识别的字段或顺序回退为默认值
    pub fn parse(s: &str) -> Self {
        let (field_raw, order_raw) = s.split_once(':').unwrap_or((s, "desc"));

        let field = match field_raw {
            "updated_at" => SortField::UpdatedAt,
            "due_date" => SortField::DueDate,
            "completed_at" => SortField::CompletedAt,
            _ => SortField::CreatedAt,
        };
        let order = match order_raw {
            "asc" => SortOrder::Asc,
            _ => SortOrder::Desc,
        };

        Self { field, order }
    }

    /// 规范化形式，用于缓存键
    pub fn canonical(&self) -> String {
        format!("{}:{}", self.field.as_str(), self.order.as_str())
    }
}

/// 列表查询过滤器
///
/// 缓存键由该结构的规范化形式派生，字段顺序和默认值固定。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskListFilter {
    pub status: Option<TaskStatus>,
    pub q: Option<String>,
    pub sort: SortSpec,
    pub archived: bool,
}
