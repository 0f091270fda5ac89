//! Per-operation routing between a base and an override

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::todo_service::{TodoService, CREATE, FIND_ALL, FIND_ONE, REMOVE, UPDATE};
use crate::database::TodoStore;
use crate::error::ServiceResult;
use crate::models::{Todo, TodoUpdate};

/// Routes each operation to the override when the override defines it,
/// otherwise to the base. Built once by the merger.
pub struct ComposedTodoService {
    base: Arc<dyn TodoService>,
    overlay: Arc<dyn TodoService>,
    overridden: BTreeSet<&'static str>,
}

impl ComposedTodoService {
    pub fn new(base: Arc<dyn TodoService>, overlay: Arc<dyn TodoService>) -> Self {
        let overridden = overlay.operations();
        Self {
            base,
            overlay,
            overridden,
        }
    }

    fn route(&self, operation: &str) -> &dyn TodoService {
        if self.overridden.contains(operation) {
            self.overlay.as_ref()
        } else {
            self.base.as_ref()
        }
    }
}

#[async_trait]
impl TodoService for ComposedTodoService {
    fn operations(&self) -> BTreeSet<&'static str> {
        self.base
            .operations()
            .union(&self.overridden)
            .copied()
            .collect()
    }

    async fn find_all(&self, store: &dyn TodoStore) -> ServiceResult<Vec<Todo>> {
        self.route(FIND_ALL).find_all(store).await
    }

    async fn find_one(&self, store: &dyn TodoStore, id: i64) -> ServiceResult<Todo> {
        self.route(FIND_ONE).find_one(store, id).await
    }

    async fn create(&self, store: &dyn TodoStore, title: &str) -> ServiceResult<Todo> {
        self.route(CREATE).create(store, title).await
    }

    async fn update(
        &self,
        store: &dyn TodoStore,
        id: i64,
        update: TodoUpdate,
    ) -> ServiceResult<Todo> {
        self.route(UPDATE).update(store, id, update).await
    }

    async fn remove(&self, store: &dyn TodoStore, id: i64) -> ServiceResult<()> {
        self.route(REMOVE).remove(store, id).await
    }

    async fn call_extension(
        &self,
        store: &dyn TodoStore,
        name: &str,
        payload: JsonValue,
    ) -> ServiceResult<JsonValue> {
        self.route(name).call_extension(store, name, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryTodoStore;
    use crate::error::ServiceError;
    use crate::services::BaseTodoService;

    /// Claims only `create`, and would misbehave on anything else.
    struct LoudCreate;

    #[async_trait]
    impl TodoService for LoudCreate {
        fn operations(&self) -> BTreeSet<&'static str> {
            [CREATE, "shout"].into()
        }
        async fn find_all(&self, _store: &dyn TodoStore) -> ServiceResult<Vec<Todo>> {
            Err(ServiceError::Validation("not routed here".into()))
        }
        async fn find_one(&self, _store: &dyn TodoStore, _id: i64) -> ServiceResult<Todo> {
            Err(ServiceError::Validation("not routed here".into()))
        }
        async fn create(&self, store: &dyn TodoStore, title: &str) -> ServiceResult<Todo> {
            crate::services::base::persist(store, Todo::new(title.to_uppercase())).await
        }
        async fn update(
            &self,
            _store: &dyn TodoStore,
            _id: i64,
            _update: TodoUpdate,
        ) -> ServiceResult<Todo> {
            Err(ServiceError::Validation("not routed here".into()))
        }
        async fn remove(&self, _store: &dyn TodoStore, _id: i64) -> ServiceResult<()> {
            Err(ServiceError::Validation("not routed here".into()))
        }
        async fn call_extension(
            &self,
            _store: &dyn TodoStore,
            name: &str,
            payload: JsonValue,
        ) -> ServiceResult<JsonValue> {
            Ok(serde_json::json!({ "op": name, "echo": payload }))
        }
    }

    fn composed() -> ComposedTodoService {
        ComposedTodoService::new(Arc::new(BaseTodoService::new()), Arc::new(LoudCreate))
    }

    #[tokio::test]
    async fn routes_each_operation_independently() {
        let store = MemoryTodoStore::new();
        let service = composed();

        let todo = service.create(&store, "buy milk").await.unwrap();
        assert_eq!(todo.title, "BUY MILK");

        assert_eq!(service.find_all(&store).await.unwrap(), vec![todo.clone()]);
        let done = service
            .update(&store, todo.id, TodoUpdate::status(true))
            .await
            .unwrap();
        assert!(done.is_completed);
        service.remove(&store, todo.id).await.unwrap();
        assert!(service.find_one(&store, todo.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn extra_override_operations_pass_through() {
        let store = MemoryTodoStore::new();
        let service = composed();

        let ops = service.operations();
        assert!(ops.contains("shout"));
        assert!(ops.contains(FIND_ALL) && ops.contains(REMOVE));

        let echoed = service
            .call_extension(&store, "shout", serde_json::json!(1))
            .await
            .unwrap();
        assert_eq!(echoed, serde_json::json!({ "op": "shout", "echo": 1 }));

        assert!(matches!(
            service
                .call_extension(&store, "whisper", JsonValue::Null)
                .await
                .unwrap_err(),
            ServiceError::UnknownExtension(_)
        ));
    }
}
