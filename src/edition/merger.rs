//! Base + override composition

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::{ComponentName, Edition, ImplementationDescriptor, ImplementationRegistry, Location};
use crate::error::{LoadError, OverrideLoadWarning};

/// A capability interface whose implementations can be overlaid per
/// operation.
pub trait Composable: Send + Sync + 'static {
    /// Names of the operations this implementation defines itself. For a base
    /// that is the whole interface; for an override, only what it replaces
    /// or adds.
    fn defined_operations(&self) -> BTreeSet<&'static str>;

    /// Build an implementation that routes every operation in
    /// `overlay.defined_operations()` to `overlay` and the rest to `base`.
    fn compose(base: Arc<Self>, overlay: Arc<Self>) -> Arc<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Base,
    Override,
}

/// What the merger did, for logs and the `/edition` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositionReport {
    pub component: ComponentName,
    pub edition: Edition,
    pub base_location: Location,
    pub override_location: Option<Location>,
    pub override_applied: bool,
    #[serde(serialize_with = "serialize_warning")]
    pub warning: Option<OverrideLoadWarning>,
    pub operations: BTreeMap<&'static str, Provenance>,
}

fn serialize_warning<S: serde::Serializer>(
    warning: &Option<OverrideLoadWarning>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match warning {
        Some(warning) => serializer.collect_str(warning),
        None => serializer.serialize_none(),
    }
}

pub struct Composition<T: ?Sized> {
    pub implementation: Arc<T>,
    pub report: CompositionReport,
}

/// Loads the base and optional override of a component and overlays them.
pub struct CapabilityMerger<T: ?Sized> {
    registry: Arc<ImplementationRegistry<T>>,
}

impl<T: ?Sized> Clone for CapabilityMerger<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T: ?Sized + Composable> CapabilityMerger<T> {
    pub fn new(registry: Arc<ImplementationRegistry<T>>) -> Self {
        Self { registry }
    }

    /// Compose the implementation described by `descriptor`.
    ///
    /// A base that cannot be loaded is fatal. An override that is absent or
    /// fails to load is recorded as an [`OverrideLoadWarning`] and the base is
    /// returned untouched.
    pub async fn compose(
        &self,
        descriptor: &ImplementationDescriptor,
    ) -> Result<Composition<T>, LoadError> {
        let base = self
            .registry
            .load_base(&descriptor.base)
            .await
            .map_err(|e| LoadError::MissingBaseImplementation {
                location: descriptor.base.to_string(),
                reason: e.to_string(),
            })?;
        info!("Loaded base module {}", descriptor.base);

        let mut report = CompositionReport {
            component: descriptor.component.clone(),
            edition: descriptor.edition,
            base_location: descriptor.base.clone(),
            override_location: descriptor.override_location.clone(),
            override_applied: false,
            warning: None,
            operations: base
                .defined_operations()
                .into_iter()
                .map(|op| (op, Provenance::Base))
                .collect(),
        };

        let Some(location) = &descriptor.override_location else {
            return Ok(Composition {
                implementation: base,
                report,
            });
        };

        match self.registry.load_override(location, Arc::clone(&base)).await {
            Ok(overlay) => {
                let overridden = overlay.defined_operations();
                info!(
                    "Loaded {} module {}, overriding {:?}",
                    descriptor.edition, location, overridden
                );
                report
                    .operations
                    .extend(overridden.into_iter().map(|op| (op, Provenance::Override)));
                report.override_applied = true;
                Ok(Composition {
                    implementation: T::compose(base, overlay),
                    report,
                })
            }
            Err(e) => {
                let warning = OverrideLoadWarning {
                    location: location.to_string(),
                    reason: e.to_string(),
                };
                warn!("{}", warning);
                report.warning = Some(warning);
                Ok(Composition {
                    implementation: base,
                    report,
                })
            }
        }
    }
}
