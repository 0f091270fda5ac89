//! Component name → implementation location mapping

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use super::Edition;

/// Logical name of a loadable component, e.g. `todo/todo.service`.
/// Not a filesystem path: the locator owns the name → location mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ComponentName(Cow<'static, str>);

impl ComponentName {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which tier of the two-tier resolution a location belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    Base,
    Override(Edition),
}

/// Where an implementation of a component lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub tier: Tier,
    pub component: ComponentName,
}

impl Location {
    pub fn base(component: ComponentName) -> Self {
        Self {
            tier: Tier::Base,
            component,
        }
    }

    pub fn override_for(component: ComponentName, edition: Edition) -> Self {
        Self {
            tier: Tier::Override(edition),
            component,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tier {
            Tier::Base => write!(f, "src/{}", self.component),
            Tier::Override(edition) => write!(f, "{edition}/src/{}.{edition}", self.component),
        }
    }
}

impl Serialize for Location {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of locating a component for an edition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplementationDescriptor {
    pub component: ComponentName,
    pub edition: Edition,
    pub base: Location,
    /// Absent for the default edition. Present does not mean it exists:
    /// the merger decides what to do when it cannot be loaded.
    pub override_location: Option<Location>,
}

/// Computes implementation locations. Pure: never consults the registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImplementationLocator;

impl ImplementationLocator {
    pub fn new() -> Self {
        Self
    }

    pub fn locate(&self, component: &ComponentName, edition: Edition) -> ImplementationDescriptor {
        let base = Location::base(component.clone());
        let override_location =
            (!edition.is_default()).then(|| Location::override_for(component.clone(), edition));

        debug!(
            component = %component,
            edition = %edition,
            base = %base,
            override_location = ?override_location.as_ref().map(ToString::to_string),
            "Located implementation"
        );

        ImplementationDescriptor {
            component: component.clone(),
            edition,
            base,
            override_location,
        }
    }
}
