//! Base (community) todo service

use std::collections::BTreeSet;

use async_trait::async_trait;
use tracing::debug;

use super::todo_service::{TodoService, CORE_OPERATIONS};
use crate::database::TodoStore;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Todo, TodoUpdate};

#[derive(Debug, Clone, Copy, Default)]
pub struct BaseTodoService;

impl BaseTodoService {
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn validate_title(title: &str) -> ServiceResult<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ServiceError::Validation("title must not be empty".to_string()));
    }
    Ok(title)
}

/// Save through the store. An update whose row was deleted after it was read
/// is reported as `NotFound`, same as reading a missing id.
pub(crate) async fn persist(store: &dyn TodoStore, todo: Todo) -> ServiceResult<Todo> {
    let id = todo.id;
    store.save(todo).await?.ok_or(ServiceError::NotFound { id })
}

#[async_trait]
impl TodoService for BaseTodoService {
    fn operations(&self) -> BTreeSet<&'static str> {
        CORE_OPERATIONS.into_iter().collect()
    }

    async fn find_all(&self, store: &dyn TodoStore) -> ServiceResult<Vec<Todo>> {
        Ok(store.find_all().await?)
    }

    async fn find_one(&self, store: &dyn TodoStore, id: i64) -> ServiceResult<Todo> {
        store
            .find_one(id)
            .await?
            .ok_or(ServiceError::NotFound { id })
    }

    async fn create(&self, store: &dyn TodoStore, title: &str) -> ServiceResult<Todo> {
        let title = validate_title(title)?;
        persist(store, Todo::new(title)).await
    }

    /// Sets the completion flag. The title in `update` is ignored here.
    async fn update(
        &self,
        store: &dyn TodoStore,
        id: i64,
        update: TodoUpdate,
    ) -> ServiceResult<Todo> {
        let mut todo = self.find_one(store, id).await?;
        if update.title.is_some() {
            debug!("Ignoring title change for todo {}", id);
        }
        todo.is_completed = update.is_completed;
        persist(store, todo).await
    }

    async fn remove(&self, store: &dyn TodoStore, id: i64) -> ServiceResult<()> {
        if store.delete(id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound { id })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryTodoStore;

    #[tokio::test]
    async fn create_trims_and_rejects_blank_titles() {
        let store = MemoryTodoStore::new();
        let service = BaseTodoService::new();

        let todo = service.create(&store, "  buy milk ").await.unwrap();
        assert_eq!(todo.title, "buy milk");
        assert!(!todo.is_completed);

        let err = service.create(&store, "   ").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn update_sets_status_and_ignores_title() {
        let store = MemoryTodoStore::new();
        let service = BaseTodoService::new();
        let todo = service.create(&store, "buy milk").await.unwrap();

        let updated = service
            .update(&store, todo.id, TodoUpdate::status(true).with_title("new title"))
            .await
            .unwrap();
        assert_eq!(updated.title, "buy milk");
        assert!(updated.is_completed);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = MemoryTodoStore::new();
        let service = BaseTodoService::new();

        assert!(service.find_one(&store, 9).await.unwrap_err().is_not_found());
        assert!(service
            .update(&store, 9, TodoUpdate::status(true))
            .await
            .unwrap_err()
            .is_not_found());
        assert!(service.remove(&store, 9).await.unwrap_err().is_not_found());
    }

    /// Deletes each row right after handing it out, as a concurrent
    /// `remove` landing between read and write would.
    struct DeleteAfterRead(MemoryTodoStore);

    #[async_trait]
    impl TodoStore for DeleteAfterRead {
        async fn find_all(&self) -> anyhow::Result<Vec<Todo>> {
            self.0.find_all().await
        }
        async fn find_one(&self, id: i64) -> anyhow::Result<Option<Todo>> {
            let found = self.0.find_one(id).await?;
            self.0.delete(id).await?;
            Ok(found)
        }
        async fn save(&self, todo: Todo) -> anyhow::Result<Option<Todo>> {
            self.0.save(todo).await
        }
        async fn delete(&self, id: i64) -> anyhow::Result<bool> {
            self.0.delete(id).await
        }
    }

    #[tokio::test]
    async fn update_racing_a_delete_is_not_found() {
        let store = DeleteAfterRead(MemoryTodoStore::new());
        let service = BaseTodoService::new();
        let todo = service.create(&store, "buy milk").await.unwrap();

        let err = service
            .update(&store, todo.id, TodoUpdate::status(true))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { id } if id == todo.id));
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn base_defines_exactly_the_core_operations() {
        let ops = BaseTodoService.operations();
        assert_eq!(ops.len(), CORE_OPERATIONS.len());
        assert!(CORE_OPERATIONS.iter().all(|op| ops.contains(op)));
    }

    #[tokio::test]
    async fn base_has_no_extensions() {
        let store = MemoryTodoStore::new();
        let err = BaseTodoService
            .call_extension(&store, "clear_completed", serde_json::Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UnknownExtension(name) if name == "clear_completed"));
    }
}
