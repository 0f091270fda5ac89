//! Startup-time registration table of component implementations
//!
//! Implementations are registered against a [`Location`] instead of being
//! looked up by path at runtime. Base factories build the implementation
//! from nothing; override factories receive the loaded base so operations
//! they do not redefine can defer to it.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use thiserror::Error;

use super::{ComponentName, Edition, Location};

type BaseFactory<T> = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<Arc<T>>> + Send + Sync>;
type OverrideFactory<T> =
    Arc<dyn Fn(Arc<T>) -> BoxFuture<'static, anyhow::Result<Arc<T>>> + Send + Sync>;

/// Why a registered implementation could not be produced.
#[derive(Error, Debug)]
pub enum LoadFailure {
    #[error("no implementation registered at {0}")]
    NotRegistered(Location),

    #[error("{0}")]
    Failed(anyhow::Error),

    #[error("loader panicked: {0}")]
    Panicked(String),
}

pub struct ImplementationRegistry<T: ?Sized> {
    bases: HashMap<Location, BaseFactory<T>>,
    overrides: HashMap<Location, OverrideFactory<T>>,
}

impl<T: ?Sized> Default for ImplementationRegistry<T> {
    fn default() -> Self {
        Self {
            bases: HashMap::new(),
            overrides: HashMap::new(),
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for ImplementationRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut locations: Vec<String> = self
            .bases
            .keys()
            .chain(self.overrides.keys())
            .map(ToString::to_string)
            .collect();
        locations.sort();
        f.debug_struct("ImplementationRegistry")
            .field("locations", &locations)
            .finish()
    }
}

impl<T: ?Sized + Send + Sync + 'static> ImplementationRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the base implementation of `component`. Replaces any earlier
    /// registration.
    pub fn register_base<F, Fut>(&mut self, component: ComponentName, factory: F) -> &mut Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Arc<T>>> + Send + 'static,
    {
        self.bases
            .insert(Location::base(component), Arc::new(move || factory().boxed()));
        self
    }

    /// Register the `edition` override of `component`.
    pub fn register_override<F, Fut>(
        &mut self,
        component: ComponentName,
        edition: Edition,
        factory: F,
    ) -> &mut Self
    where
        F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Arc<T>>> + Send + 'static,
    {
        self.overrides.insert(
            Location::override_for(component, edition),
            Arc::new(move |base| factory(base).boxed()),
        );
        self
    }

    pub fn contains(&self, location: &Location) -> bool {
        self.bases.contains_key(location) || self.overrides.contains_key(location)
    }

    pub async fn load_base(&self, location: &Location) -> Result<Arc<T>, LoadFailure> {
        let factory = self
            .bases
            .get(location)
            .ok_or_else(|| LoadFailure::NotRegistered(location.clone()))?;
        guarded(factory()).await
    }

    pub async fn load_override(
        &self,
        location: &Location,
        base: Arc<T>,
    ) -> Result<Arc<T>, LoadFailure> {
        let factory = self
            .overrides
            .get(location)
            .ok_or_else(|| LoadFailure::NotRegistered(location.clone()))?;
        guarded(factory(base)).await
    }
}

/// Run a factory future, turning both errors and panics into [`LoadFailure`].
async fn guarded<T: ?Sized>(
    load: BoxFuture<'static, anyhow::Result<Arc<T>>>,
) -> Result<Arc<T>, LoadFailure> {
    match AssertUnwindSafe(load).catch_unwind().await {
        Ok(Ok(implementation)) => Ok(implementation),
        Ok(Err(e)) => Err(LoadFailure::Failed(e)),
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(LoadFailure::Panicked(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct Fixed(&'static str);

    impl Greeter for Fixed {
        fn greet(&self) -> String {
            self.0.to_string()
        }
    }

    const GREETER: ComponentName = ComponentName::from_static("greeter");

    #[tokio::test]
    async fn loads_registered_base() {
        let mut registry: ImplementationRegistry<dyn Greeter> = ImplementationRegistry::new();
        registry.register_base(GREETER, || async {
            Ok(Arc::new(Fixed("hello")) as Arc<dyn Greeter>)
        });

        let base = registry.load_base(&Location::base(GREETER)).await.unwrap();
        assert_eq!(base.greet(), "hello");
        assert!(registry.contains(&Location::base(GREETER)));
    }

    #[tokio::test]
    async fn override_factory_receives_the_base() {
        struct Shout(Arc<dyn Greeter>);
        impl Greeter for Shout {
            fn greet(&self) -> String {
                self.0.greet().to_uppercase()
            }
        }

        let mut registry: ImplementationRegistry<dyn Greeter> = ImplementationRegistry::new();
        registry.register_override(GREETER, Edition::Enterprise, |base| async move {
            Ok(Arc::new(Shout(base)) as Arc<dyn Greeter>)
        });

        let location = Location::override_for(GREETER, Edition::Enterprise);
        let loaded = registry
            .load_override(&location, Arc::new(Fixed("hi")))
            .await
            .unwrap();
        assert_eq!(loaded.greet(), "HI");
    }

    #[tokio::test]
    async fn missing_registration_is_reported() {
        let registry: ImplementationRegistry<dyn Greeter> = ImplementationRegistry::new();
        let err = registry
            .load_base(&Location::base(GREETER))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, LoadFailure::NotRegistered(_)));
        assert_eq!(err.to_string(), "no implementation registered at src/greeter");
    }

    #[tokio::test]
    async fn factory_errors_and_panics_become_failures() {
        let mut registry: ImplementationRegistry<dyn Greeter> = ImplementationRegistry::new();
        registry
            .register_base(GREETER, || async { Err(anyhow::anyhow!("disk on fire")) })
            .register_override(GREETER, Edition::Cloud, |_base| async move {
                if true {
                    panic!("override exploded");
                }
                Ok(Arc::new(Fixed("never")) as Arc<dyn Greeter>)
            });

        let err = registry
            .load_base(&Location::base(GREETER))
            .await
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "disk on fire");

        let err = registry
            .load_override(
                &Location::override_for(GREETER, Edition::Cloud),
                Arc::new(Fixed("base")),
            )
            .await
            .err()
            .unwrap();
        assert!(matches!(err, LoadFailure::Panicked(ref m) if m == "override exploded"));
    }
}
