//! In-memory todo store

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use super::TodoStore;
use crate::models::Todo;

#[derive(Debug, Default)]
struct Inner {
    rows: BTreeMap<i64, Todo>,
    last_id: i64,
}

/// Todo store backed by a `BTreeMap`, so listings come back in id order.
/// Ids are never reused, matching an autoincrement column.
#[derive(Debug, Default)]
pub struct MemoryTodoStore {
    inner: RwLock<Inner>,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn find_all(&self) -> Result<Vec<Todo>> {
        let inner = self.inner.read().await;
        Ok(inner.rows.values().cloned().collect())
    }

    async fn find_one(&self, id: i64) -> Result<Option<Todo>> {
        let inner = self.inner.read().await;
        Ok(inner.rows.get(&id).cloned())
    }

    async fn save(&self, mut todo: Todo) -> Result<Option<Todo>> {
        let mut inner = self.inner.write().await;
        if todo.is_saved() {
            if !inner.rows.contains_key(&todo.id) {
                return Ok(None);
            }
            inner.rows.insert(todo.id, todo.clone());
            info!("Updated Todo {}", todo.id);
        } else {
            inner.last_id += 1;
            todo.id = inner.last_id;
            inner.rows.insert(todo.id, todo.clone());
            info!("Created Todo {} for '{}'", todo.id, todo.title);
        }
        Ok(Some(todo))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let removed = inner.rows.remove(&id).is_some();
        if removed {
            info!("Deleted Todo {}", id);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn assigns_increasing_ids_without_reuse() {
        let store = MemoryTodoStore::new();
        let a = store.save(Todo::new("a")).await.unwrap().unwrap();
        let b = store.save(Todo::new("b")).await.unwrap().unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        assert!(store.delete(b.id).await.unwrap());
        let c = store.save(Todo::new("c")).await.unwrap().unwrap();
        assert_eq!(c.id, 3);
    }

    #[tokio::test]
    async fn save_overwrites_existing_rows() {
        let store = MemoryTodoStore::new();
        let mut todo = store.save(Todo::new("a")).await.unwrap().unwrap();
        todo.is_completed = true;
        store.save(todo.clone()).await.unwrap();

        assert_eq!(store.find_one(todo.id).await.unwrap(), Some(todo));
        assert_eq!(store.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn updating_a_missing_row_saves_nothing() {
        let store = MemoryTodoStore::new();
        let ghost = Todo {
            id: 42,
            title: "ghost".to_string(),
            is_completed: false,
        };
        assert_eq!(store.save(ghost).await.unwrap(), None);
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_went_away() {
        let store = MemoryTodoStore::new();
        let todo = store.save(Todo::new("a")).await.unwrap().unwrap();
        assert!(store.delete(todo.id).await.unwrap());
        assert!(!store.delete(todo.id).await.unwrap());
        assert!(store.find_all().await.unwrap().is_empty());
    }
}
