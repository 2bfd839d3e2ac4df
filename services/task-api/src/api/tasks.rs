//! 任务路由处理器

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tado_common::TaskId;
use tado_errors::AppResult;
use uuid::Uuid;

use crate::domain::{NewTask, SortSpec, TaskListFilter, TaskStatus, TaskUpdate};
use crate::state::AppState;

use super::middleware::AuthClaims;

/// 列表查询参数
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

impl ListQuery {
    fn into_filter(self) -> AppResult<TaskListFilter> {
        let status = self
            .status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(TaskStatus::parse)
            .transpose()?;

        Ok(TaskListFilter {
            status,
            q: self.q.filter(|q| !q.is_empty()),
            sort: self
                .sort
                .as_deref()
                .map(SortSpec::parse)
                .unwrap_or_default(),
            archived: self.archived,
        })
    }
}

pub async fn create(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Json(input): Json<NewTask>,
) -> AppResult<Response> {
    let owner = claims.user_id()?;
    let task = state.tasks.create(owner, input).await?;
    Ok((StatusCode::CREATED, Json(task)).into_response())
}

pub async fn list(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    let owner = claims.user_id()?;
    let filter = query.into_filter()?;

    let (tasks, outcome) = state.tasks.list(&owner, &filter).await?;
    Ok(([("x-cache", outcome.as_str())], Json(tasks)).into_response())
}

pub async fn get(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let owner = claims.user_id()?;
    let id = TaskId::from_uuid(id);

    let (task, outcome) = state.tasks.get(&owner, &id).await?;
    Ok(([("x-cache", outcome.as_str())], Json(task)).into_response())
}

pub async fn update(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Path(id): Path<Uuid>,
    Json(input): Json<TaskUpdate>,
) -> AppResult<Response> {
    let owner = claims.user_id()?;
    let id = TaskId::from_uuid(id);

    let task = state.tasks.update(&owner, &id, input).await?;
    Ok(Json(task).into_response())
}

pub async fn archive(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let owner = claims.user_id()?;
    let id = TaskId::from_uuid(id);

    let task = state.tasks.archive(&owner, &id).await?;
    Ok(Json(task).into_response())
}

pub async fn delete(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let owner = claims.user_id()?;
    let id = TaskId::from_uuid(id);

    state.tasks.delete(&owner, &id).await?;
    Ok(Json(json!({ "message": "Deleted" })).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let query = ListQuery {
            status: None,
            q: None,
            sort: None,
            archived: false,
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter, TaskListFilter::default());
    }

    #[test]
    fn test_list_query_rejects_unknown_status() {
        let query = ListQuery {
            status: Some("cancelled".to_string()),
            q: None,
            sort: None,
            archived: false,
        };
        assert!(query.into_filter().is_err());
    }

    #[test]
    fn test_empty_strings_treated_as_absent() {
        let query = ListQuery {
            status: Some(String::new()),
            q: Some(String::new()),
            sort: None,
            archived: true,
        };
        let filter = query.into_filter().unwrap();
        assert!(filter.status.is_none());
        assert!(filter.q.is_none());
        assert!(filter.archived);
    }
}
