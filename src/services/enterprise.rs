//! Enterprise edition override
//!
//! Replaces `update` so a supplied title is applied as well as the completion
//! flag, and adds the `clear_completed` extension. Everything else defers to
//! the base it was loaded with.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use tracing::info;

use super::base::{persist, validate_title};
use super::todo_service::{TodoService, UPDATE};
use crate::database::TodoStore;
use crate::error::ServiceResult;
use crate::models::{Todo, TodoUpdate};

pub const CLEAR_COMPLETED: &str = "clear_completed";

pub struct EnterpriseTodoService {
    base: Arc<dyn TodoService>,
}

impl EnterpriseTodoService {
    pub fn new(base: Arc<dyn TodoService>) -> Self {
        Self { base }
    }

    async fn clear_completed(&self, store: &dyn TodoStore) -> ServiceResult<JsonValue> {
        let mut removed = Vec::new();
        for todo in self.base.find_all(store).await? {
            if todo.is_completed && store.delete(todo.id).await? {
                removed.push(todo.id);
            }
        }
        info!("Cleared {} completed todos", removed.len());
        Ok(json!({ "removed": removed.len(), "ids": removed }))
    }
}

#[async_trait]
impl TodoService for EnterpriseTodoService {
    fn operations(&self) -> BTreeSet<&'static str> {
        [UPDATE, CLEAR_COMPLETED].into()
    }

    async fn find_all(&self, store: &dyn TodoStore) -> ServiceResult<Vec<Todo>> {
        self.base.find_all(store).await
    }

    async fn find_one(&self, store: &dyn TodoStore, id: i64) -> ServiceResult<Todo> {
        self.base.find_one(store, id).await
    }

    async fn create(&self, store: &dyn TodoStore, title: &str) -> ServiceResult<Todo> {
        self.base.create(store, title).await
    }

    /// Applies the completion flag and, when present, a new title.
    async fn update(
        &self,
        store: &dyn TodoStore,
        id: i64,
        update: TodoUpdate,
    ) -> ServiceResult<Todo> {
        let mut todo = self.base.find_one(store, id).await?;
        if let Some(title) = update.title.as_deref() {
            todo.title = validate_title(title)?.to_string();
        }
        todo.is_completed = update.is_completed;
        persist(store, todo).await
    }

    async fn remove(&self, store: &dyn TodoStore, id: i64) -> ServiceResult<()> {
        self.base.remove(store, id).await
    }

    async fn call_extension(
        &self,
        store: &dyn TodoStore,
        name: &str,
        payload: JsonValue,
    ) -> ServiceResult<JsonValue> {
        match name {
            CLEAR_COMPLETED => self.clear_completed(store).await,
            _ => self.base.call_extension(store, name, payload).await,
        }
    }
}
