//! REST API for the todo service
//!
//! ## Endpoints
//!
//! - `GET /todos` - list todos
//! - `GET /todos/:id` - fetch one todo
//! - `POST /todos` - create a todo from `{"title": ...}`
//! - `PUT /todos/:id` - update from `{"isCompleted": ..., "title"?: ...}`
//! - `DELETE /todos/:id` - delete a todo
//! - `POST /todos/extensions/:name` - run an edition-only operation
//! - `GET /edition` - active editions and which one supplies each operation
//! - `GET /health` - liveness
//! - `GET /` - the TodoList view for the configured UI edition

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::ServiceError;
use crate::services::TodoFacade;
use crate::ui::{EditionLoader, TodoListProps, UiEdition};

mod todo_routes;

/// Shared state for the todo routes
#[derive(Clone)]
pub struct AppState {
    pub facade: Arc<TodoFacade>,
    pub ui_edition: UiEdition,
    pub todo_list: EditionLoader<TodoListProps>,
}

impl AppState {
    pub fn new(
        facade: Arc<TodoFacade>,
        ui_edition: UiEdition,
        todo_list: EditionLoader<TodoListProps>,
    ) -> Self {
        Self {
            facade,
            ui_edition,
            todo_list,
        }
    }
}

pub type ApiError = (StatusCode, Json<JsonValue>);

/// Map a service error onto an HTTP status with a `{"error": ...}` body.
pub(crate) fn error_response(error: ServiceError) -> ApiError {
    let status = match &error {
        ServiceError::NotFound { .. } | ServiceError::UnknownExtension(_) => StatusCode::NOT_FOUND,
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("Request failed: {}", error);
    }
    (status, Json(json!({ "error": error.to_string() })))
}

/// `Json` body extractor whose rejections use the same `{"error": ...}`
/// body as every other error response.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_response(rejection)),
        }
    }
}

fn rejection_response(rejection: JsonRejection) -> ApiError {
    (
        rejection.status(),
        Json(json!({ "error": rejection.body_text() })),
    )
}

/// Create the todo API router with CORS and request tracing
pub fn create_todo_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(todo_routes::render_todo_list))
        .route("/health", get(todo_routes::health_check))
        .route("/edition", get(todo_routes::describe_edition))
        .route(
            "/todos",
            get(todo_routes::list_todos).post(todo_routes::create_todo),
        )
        .route(
            "/todos/:id",
            get(todo_routes::get_todo)
                .put(todo_routes::update_todo)
                .delete(todo_routes::delete_todo),
        )
        .route("/todos/extensions/:name", post(todo_routes::call_extension))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
