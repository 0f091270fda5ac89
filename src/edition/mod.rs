//! Edition selection and implementation loading
//!
//! An edition is read once at startup and never changes for the life of the
//! process. Loading a component for an edition goes through three steps:
//!
//! 1. [`EditionSelector`] validates the configured edition against the
//!    allow-list.
//! 2. [`ImplementationLocator`] turns `(component, edition)` into an
//!    [`ImplementationDescriptor`]: the base location plus, for non-default
//!    editions, an override location.
//! 3. [`CapabilityMerger`] loads the base from the [`ImplementationRegistry`],
//!    overlays the override when one loads, and records which side supplies
//!    each operation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

mod locator;
mod merger;
mod registry;

pub use locator::{ComponentName, ImplementationDescriptor, ImplementationLocator, Location, Tier};
pub use merger::{CapabilityMerger, Composable, Composition, CompositionReport, Provenance};
pub use registry::{ImplementationRegistry, LoadFailure};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edition {
    #[default]
    Community,
    Enterprise,
    Cloud,
}

impl Edition {
    pub const ALL: [Edition; 3] = [Edition::Community, Edition::Enterprise, Edition::Cloud];

    pub fn as_str(&self) -> &'static str {
        match self {
            Edition::Community => "community",
            Edition::Enterprise => "enterprise",
            Edition::Cloud => "cloud",
        }
    }

    /// The default edition ships only base implementations.
    pub fn is_default(&self) -> bool {
        *self == Edition::default()
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Edition {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Edition::ALL
            .into_iter()
            .find(|edition| edition.as_str() == s)
            .ok_or_else(|| ConfigurationError::UnknownEdition {
                value: s.to_string(),
                allowed: Edition::ALL.iter().map(Edition::as_str).collect(),
            })
    }
}

/// Validates the configured edition against a fixed allow-list.
///
/// A deployment may narrow the allow-list (for example a build that does not
/// ship the cloud edition), but the list is fixed once the selector exists.
#[derive(Debug, Clone)]
pub struct EditionSelector {
    allowed: Vec<Edition>,
    default: Edition,
}

impl Default for EditionSelector {
    fn default() -> Self {
        Self {
            allowed: Edition::ALL.to_vec(),
            default: Edition::default(),
        }
    }
}

impl EditionSelector {
    /// Restrict the allow-list. The default edition is always allowed.
    pub fn with_allowed(allowed: impl IntoIterator<Item = Edition>) -> Self {
        let default = Edition::default();
        let mut allowed: Vec<Edition> = allowed.into_iter().collect();
        if !allowed.contains(&default) {
            allowed.insert(0, default);
        }
        allowed.sort();
        allowed.dedup();
        Self { allowed, default }
    }

    pub fn allowed(&self) -> &[Edition] {
        &self.allowed
    }

    /// Resolve a raw configuration value. Absent or blank values select the
    /// default edition; anything outside the allow-list is an error.
    pub fn select(&self, raw: Option<&str>) -> Result<Edition, ConfigurationError> {
        let value = match raw.map(str::trim) {
            None | Some("") => return Ok(self.default),
            Some(value) => value,
        };

        let unknown = || ConfigurationError::UnknownEdition {
            value: value.to_string(),
            allowed: self.allowed.iter().map(Edition::as_str).collect(),
        };

        let edition = Edition::from_str(value).map_err(|_| unknown())?;
        if self.allowed.contains(&edition) {
            Ok(edition)
        } else {
            Err(unknown())
        }
    }
}

/// Resolve the edition from a raw value with the full allow-list.
pub fn current_edition(raw: Option<&str>) -> Result<Edition, ConfigurationError> {
    EditionSelector::default().select(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_or_blank_selects_community() {
        assert_eq!(current_edition(None).unwrap(), Edition::Community);
        assert_eq!(current_edition(Some("")).unwrap(), Edition::Community);
        assert_eq!(current_edition(Some("  ")).unwrap(), Edition::Community);
    }

    #[test]
    fn every_allowed_value_parses() {
        for edition in Edition::ALL {
            assert_eq!(current_edition(Some(edition.as_str())).unwrap(), edition);
        }
        assert_eq!(current_edition(Some(" cloud ")).unwrap(), Edition::Cloud);
    }

    #[test]
    fn unknown_value_is_a_configuration_error() {
        let err = current_edition(Some("premium")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unrecognized edition: premium. Allowed editions are: community, enterprise, cloud"
        );
    }

    #[test]
    fn matching_is_exact() {
        assert!(current_edition(Some("Enterprise")).is_err());
        assert!(current_edition(Some("ee")).is_err());
    }

    #[test]
    fn narrowed_allow_list_rejects_excluded_editions() {
        let selector = EditionSelector::with_allowed([Edition::Enterprise]);
        assert_eq!(selector.allowed(), &[Edition::Community, Edition::Enterprise]);
        assert_eq!(selector.select(Some("enterprise")).unwrap(), Edition::Enterprise);

        let err = selector.select(Some("cloud")).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownEdition {
                value: "cloud".to_string(),
                allowed: vec!["community", "enterprise"],
            }
        );
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(
            serde_json::to_value(Edition::Enterprise).unwrap(),
            serde_json::json!("enterprise")
        );
    }
}
