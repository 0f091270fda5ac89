//! The todo capability interface

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::database::TodoStore;
use crate::edition::Composable;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Todo, TodoUpdate};

use super::ComposedTodoService;

pub const FIND_ALL: &str = "find_all";
pub const FIND_ONE: &str = "find_one";
pub const CREATE: &str = "create";
pub const UPDATE: &str = "update";
pub const REMOVE: &str = "remove";

/// Every operation a base implementation must define.
pub const CORE_OPERATIONS: [&str; 5] = [FIND_ALL, FIND_ONE, CREATE, UPDATE, REMOVE];

/// Operations over todos, implemented by the base service and by edition
/// overrides.
///
/// Implementations are stateless with respect to storage: the store is passed
/// into every call by the facade.
#[async_trait]
pub trait TodoService: Send + Sync {
    /// Operations this implementation defines itself. Overrides list only
    /// what they replace or add; everything else is routed to the base.
    fn operations(&self) -> BTreeSet<&'static str>;

    async fn find_all(&self, store: &dyn TodoStore) -> ServiceResult<Vec<Todo>>;

    async fn find_one(&self, store: &dyn TodoStore, id: i64) -> ServiceResult<Todo>;

    async fn create(&self, store: &dyn TodoStore, title: &str) -> ServiceResult<Todo>;

    async fn update(
        &self,
        store: &dyn TodoStore,
        id: i64,
        update: TodoUpdate,
    ) -> ServiceResult<Todo>;

    async fn remove(&self, store: &dyn TodoStore, id: i64) -> ServiceResult<()>;

    /// Edition-specific operations outside the core set, invoked by name.
    async fn call_extension(
        &self,
        _store: &dyn TodoStore,
        name: &str,
        _payload: JsonValue,
    ) -> ServiceResult<JsonValue> {
        Err(ServiceError::UnknownExtension(name.to_string()))
    }
}

impl Composable for dyn TodoService {
    fn defined_operations(&self) -> BTreeSet<&'static str> {
        self.operations()
    }

    fn compose(base: Arc<Self>, overlay: Arc<Self>) -> Arc<Self> {
        Arc::new(ComposedTodoService::new(base, overlay))
    }
}
