//! Multi-edition todo service
//!
//! The todo service ships in three editions (community, enterprise, cloud).
//! Callers use [`services::TodoFacade`], which resolves the edition-specific
//! implementation once from [`edition`] and forwards every operation to it.
//! The [`ui`] module does the same for the TodoList view on the client side.

pub mod config;
pub mod database;
pub mod edition;
pub mod error;
pub mod models;
pub mod services;
pub mod ui;

#[cfg(feature = "server")]
pub mod api;

pub use config::{AppConfig, RawConfig};
pub use edition::{current_edition, Edition, EditionSelector};
pub use error::{ConfigurationError, LoadError, OverrideLoadWarning, ServiceError, UiLoadError};
pub use models::{Todo, TodoUpdate};
pub use services::{builtin_registry, TodoFacade, TodoService};
