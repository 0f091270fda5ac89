//! Stable-shaped todo facade
//!
//! The facade resolves its implementation exactly once (selector output →
//! locator → merger) and forwards every call to it with the shared store.
//! Concurrent first callers share one in-flight resolution; a failed
//! resolution is cached and returned to every later caller.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tokio::sync::OnceCell;
use tracing::{error, info};

use super::todo_service::TodoService;
use super::TODO_SERVICE;
use crate::database::TodoStore;
use crate::edition::{
    CapabilityMerger, ComponentName, CompositionReport, Edition, ImplementationLocator,
    ImplementationRegistry,
};
use crate::error::{LoadError, ServiceError, ServiceResult};
use crate::models::{Todo, TodoUpdate};

struct Resolved {
    service: Arc<dyn TodoService>,
    report: CompositionReport,
}

pub struct TodoFacade {
    store: Arc<dyn TodoStore>,
    component: ComponentName,
    edition: Edition,
    locator: ImplementationLocator,
    merger: CapabilityMerger<dyn TodoService>,
    resolved: OnceCell<Result<Resolved, Arc<LoadError>>>,
}

impl TodoFacade {
    pub fn new(
        store: Arc<dyn TodoStore>,
        registry: Arc<ImplementationRegistry<dyn TodoService>>,
        edition: Edition,
    ) -> Self {
        Self::for_component(store, registry, edition, TODO_SERVICE)
    }

    pub fn for_component(
        store: Arc<dyn TodoStore>,
        registry: Arc<ImplementationRegistry<dyn TodoService>>,
        edition: Edition,
        component: ComponentName,
    ) -> Self {
        Self {
            store,
            component,
            edition,
            locator: ImplementationLocator::new(),
            merger: CapabilityMerger::new(registry),
            resolved: OnceCell::new(),
        }
    }

    pub fn edition(&self) -> Edition {
        self.edition
    }

    /// Resolve eagerly, e.g. at startup so a missing base aborts the process
    /// before it serves anything.
    pub async fn initialize(&self) -> Result<(), Arc<LoadError>> {
        self.resolved().await.map(|_| ())
    }

    async fn resolved(&self) -> Result<&Resolved, Arc<LoadError>> {
        self.resolved
            .get_or_init(|| async {
                let descriptor = self.locator.locate(&self.component, self.edition);
                match self.merger.compose(&descriptor).await {
                    Ok(composition) => {
                        info!(
                            "Resolved {} for the {} edition",
                            self.component, self.edition
                        );
                        Ok(Resolved {
                            service: composition.implementation,
                            report: composition.report,
                        })
                    }
                    Err(e) => {
                        error!("Todo facade is unusable: {}", e);
                        Err(Arc::new(e))
                    }
                }
            })
            .await
            .as_ref()
            .map_err(Arc::clone)
    }

    async fn service(&self) -> ServiceResult<&dyn TodoService> {
        self.resolved()
            .await
            .map(|resolved| resolved.service.as_ref())
            .map_err(ServiceError::Unavailable)
    }

    /// Which edition supplies each operation.
    pub async fn describe(&self) -> ServiceResult<CompositionReport> {
        self.resolved()
            .await
            .map(|resolved| resolved.report.clone())
            .map_err(ServiceError::Unavailable)
    }

    pub async fn list_all(&self) -> ServiceResult<Vec<Todo>> {
        self.service().await?.find_all(self.store.as_ref()).await
    }

    pub async fn get_by_id(&self, id: i64) -> ServiceResult<Todo> {
        self.service().await?.find_one(self.store.as_ref(), id).await
    }

    pub async fn create(&self, title: &str) -> ServiceResult<Todo> {
        self.service().await?.create(self.store.as_ref(), title).await
    }

    pub async fn update_status(&self, id: i64, is_completed: bool) -> ServiceResult<Todo> {
        self.update(id, TodoUpdate::status(is_completed)).await
    }

    pub async fn update(&self, id: i64, update: TodoUpdate) -> ServiceResult<Todo> {
        self.service()
            .await?
            .update(self.store.as_ref(), id, update)
            .await
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.service().await?.remove(self.store.as_ref(), id).await
    }

    pub async fn call_extension(&self, name: &str, payload: JsonValue) -> ServiceResult<JsonValue> {
        self.service()
            .await?
            .call_extension(self.store.as_ref(), name, payload)
            .await
    }
}
