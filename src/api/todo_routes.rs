//! Todo route handlers
//!
//! Each handler is a thin shim over [`TodoFacade`]; errors are mapped by
//! [`error_response`].

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Json},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use super::{error_response, ApiError, AppState, JsonBody};
use crate::edition::{CompositionReport, Edition};
use crate::models::{Todo, TodoUpdate};
use crate::ui::{TodoListProps, UiEdition};

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct EditionResponse {
    pub edition: Edition,
    pub ui_edition: UiEdition,
    pub composition: CompositionReport,
}

pub(super) async fn health_check() -> Json<JsonValue> {
    Json(json!({ "status": "ok" }))
}

pub(super) async fn describe_edition(
    State(state): State<AppState>,
) -> Result<Json<EditionResponse>, ApiError> {
    let composition = state.facade.describe().await.map_err(error_response)?;
    Ok(Json(EditionResponse {
        edition: state.facade.edition(),
        ui_edition: state.ui_edition,
        composition,
    }))
}

pub(super) async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, ApiError> {
    state
        .facade
        .list_all()
        .await
        .map(Json)
        .map_err(error_response)
}

pub(super) async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Todo>, ApiError> {
    state
        .facade
        .get_by_id(id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub(super) async fn create_todo(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateTodoRequest>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let todo = state
        .facade
        .create(&req.title)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub(super) async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(update): JsonBody<TodoUpdate>,
) -> Result<Json<Todo>, ApiError> {
    state
        .facade
        .update(id, update)
        .await
        .map(Json)
        .map_err(error_response)
}

pub(super) async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .facade
        .delete(id)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(error_response)
}

pub(super) async fn call_extension(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: Option<Json<JsonValue>>,
) -> Result<Json<JsonValue>, ApiError> {
    let payload = payload.map(|Json(value)| value).unwrap_or(JsonValue::Null);
    state
        .facade
        .call_extension(&name, payload)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Server-side render of the TodoList view picked by the UI edition.
pub(super) async fn render_todo_list(
    State(state): State<AppState>,
) -> Result<Html<String>, ApiError> {
    let todos = state.facade.list_all().await.map_err(error_response)?;
    let view = state.todo_list.mount();
    view.settled().await;
    Ok(Html(view.render(&TodoListProps { todos })))
}
