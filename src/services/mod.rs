//! Todo services
//!
//! [`TodoService`] is the capability interface every edition implements.
//! [`BaseTodoService`] is the community implementation; edition overrides
//! register against the same component and are overlaid on it by the merger.
//! Callers only ever see the [`TodoFacade`].

use std::sync::Arc;

use crate::edition::{ComponentName, Edition, ImplementationRegistry};

mod base;
mod composed;
mod enterprise;
mod facade;
mod todo_service;

pub use base::BaseTodoService;
pub use composed::ComposedTodoService;
pub use enterprise::{EnterpriseTodoService, CLEAR_COMPLETED};
pub use facade::TodoFacade;
pub use todo_service::{TodoService, CORE_OPERATIONS, CREATE, FIND_ALL, FIND_ONE, REMOVE, UPDATE};

/// Logical name of the todo service component.
pub const TODO_SERVICE: ComponentName = ComponentName::from_static("todo/todo.service");

/// Registry of every todo service implementation shipped in this build.
///
/// The cloud edition has no override of its own and runs on the base.
pub fn builtin_registry() -> ImplementationRegistry<dyn TodoService> {
    let mut registry: ImplementationRegistry<dyn TodoService> = ImplementationRegistry::new();
    registry
        .register_base(TODO_SERVICE, || async {
            Ok(Arc::new(BaseTodoService::new()) as Arc<dyn TodoService>)
        })
        .register_override(TODO_SERVICE, Edition::Enterprise, |base| async move {
            Ok(Arc::new(EnterpriseTodoService::new(base)) as Arc<dyn TodoService>)
        });
    registry
}
