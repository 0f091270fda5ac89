//! Edition-specific UI components
//!
//! The UI side is single tier: a component name plus the UI edition selects
//! exactly one artifact (`@ce/components/todo/TodoList.ce`,
//! `@ee/components/todo/TodoList.ee`). There is no base to fall back to.
//!
//! UI editions are configured separately from backend editions and use
//! their own allow-list (`ce`, `ee`).

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use tracing::debug;

use crate::error::UiLoadError;

mod loader;
mod todo_list;

pub use loader::{EditionLoader, MountedComponent, LOADING_PLACEHOLDER};
pub use todo_list::{
    builtin_ui_registry, TodoListCe, TodoListEe, TodoListProps, TODO_LIST_DIR, TODO_LIST_FILE,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UiEdition {
    #[default]
    Ce,
    Ee,
}

impl UiEdition {
    pub const ALLOWED: [UiEdition; 2] = [UiEdition::Ce, UiEdition::Ee];

    pub fn as_str(&self) -> &'static str {
        match self {
            UiEdition::Ce => "ce",
            UiEdition::Ee => "ee",
        }
    }

    /// Resolve a raw setting: absent or blank selects `ce`.
    pub fn select(raw: Option<&str>) -> Result<Self, UiLoadError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(value) => value.parse(),
        }
    }
}

impl fmt::Display for UiEdition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UiEdition {
    type Err = UiLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UiEdition::ALLOWED
            .into_iter()
            .find(|edition| edition.as_str() == s)
            .ok_or_else(|| UiLoadError::UnrecognizedEdition {
                value: s.to_string(),
                allowed: UiEdition::ALLOWED.iter().map(UiEdition::as_str).collect(),
            })
    }
}

/// A renderable UI implementation taking properties `P`.
pub trait UiComponent<P>: Send + Sync {
    fn render(&self, props: &P) -> String;
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Import path of a component for an edition.
pub fn component_path(load_dir: &str, file_name: &str, edition: UiEdition) -> String {
    format!("@{edition}/components/{load_dir}/{file_name}.{edition}")
}

type ComponentFactory<P> =
    Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<Arc<dyn UiComponent<P>>>> + Send + Sync>;

/// Registration table of UI components keyed by import path.
pub struct UiRegistry<P> {
    components: HashMap<String, ComponentFactory<P>>,
}

impl<P> Default for UiRegistry<P> {
    fn default() -> Self {
        Self {
            components: HashMap::new(),
        }
    }
}

impl<P: 'static> UiRegistry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F, Fut>(
        &mut self,
        load_dir: &str,
        file_name: &str,
        edition: UiEdition,
        factory: F,
    ) -> &mut Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Arc<dyn UiComponent<P>>>> + Send + 'static,
    {
        self.components.insert(
            component_path(load_dir, file_name, edition),
            Arc::new(move || factory().boxed()),
        );
        self
    }
}

/// Load the UI implementation of `file_name` for `edition`.
///
/// The edition is validated on every call; an unknown value fails without
/// touching the registry.
pub async fn load_component<P: 'static>(
    registry: &UiRegistry<P>,
    load_dir: &str,
    file_name: &str,
    edition: &str,
) -> Result<Arc<dyn UiComponent<P>>, UiLoadError> {
    let edition = UiEdition::select(Some(edition))?;
    let location = component_path(load_dir, file_name, edition);
    debug!("Loading UI component {}", location);

    let factory = registry
        .components
        .get(&location)
        .ok_or_else(|| UiLoadError::ComponentNotFound {
            location: location.clone(),
        })?;
    factory().await.map_err(|e| UiLoadError::Failed {
        location,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo(&'static str);

    impl UiComponent<String> for Echo {
        fn render(&self, props: &String) -> String {
            format!("{}:{}", self.0, props)
        }
    }

    fn registry() -> UiRegistry<String> {
        let mut registry = UiRegistry::new();
        registry
            .register("todo", "TodoList", UiEdition::Ce, || async {
                Ok(Arc::new(Echo("ce")) as Arc<dyn UiComponent<String>>)
            })
            .register("todo", "TodoList", UiEdition::Ee, || async {
                Ok(Arc::new(Echo("ee")) as Arc<dyn UiComponent<String>>)
            });
        registry
    }

    #[test]
    fn ui_edition_defaults_to_ce() {
        assert_eq!(UiEdition::select(None).unwrap(), UiEdition::Ce);
        assert_eq!(UiEdition::select(Some("")).unwrap(), UiEdition::Ce);
        assert_eq!(UiEdition::select(Some("ee")).unwrap(), UiEdition::Ee);
    }

    #[test]
    fn component_paths_follow_the_edition_root() {
        assert_eq!(
            component_path("todo", "TodoList", UiEdition::Ee),
            "@ee/components/todo/TodoList.ee"
        );
    }

    #[tokio::test]
    async fn loads_the_edition_specific_component() {
        let registry = registry();
        let ce = load_component(&registry, "todo", "TodoList", "ce")
            .await
            .ok()
            .unwrap();
        let ee = load_component(&registry, "todo", "TodoList", "ee")
            .await
            .ok()
            .unwrap();
        let props = "x".to_string();
        assert_eq!(ce.render(&props), "ce:x");
        assert_eq!(ee.render(&props), "ee:x");
    }

    #[tokio::test]
    async fn backend_edition_names_are_not_ui_editions() {
        let err = load_component(&registry(), "todo", "TodoList", "enterprise")
            .await
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            "Unrecognized edition: enterprise. Allowed editions are: ce, ee"
        );
    }

    #[tokio::test]
    async fn no_fallback_between_editions() {
        let mut registry: UiRegistry<String> = UiRegistry::new();
        registry.register("todo", "TodoList", UiEdition::Ce, || async {
            Ok(Arc::new(Echo("ce")) as Arc<dyn UiComponent<String>>)
        });

        let err = load_component(&registry, "todo", "TodoList", "ee")
            .await
            .err()
            .unwrap();
        assert_eq!(
            err,
            UiLoadError::ComponentNotFound {
                location: "@ee/components/todo/TodoList.ee".to_string()
            }
        );
    }

    #[tokio::test]
    async fn factory_errors_surface_as_failed_loads() {
        let mut registry: UiRegistry<String> = UiRegistry::new();
        registry.register("todo", "TodoList", UiEdition::Ce, || async {
            Err(anyhow::anyhow!("chunk missing"))
        });

        let err = load_component(&registry, "todo", "TodoList", "ce")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, UiLoadError::Failed { ref reason, .. } if reason == "chunk missing"));
    }
}
