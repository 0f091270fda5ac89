//! Process configuration
//!
//! Read once at startup and passed down explicitly. Nothing below the binary
//! reads the environment.

use std::net::SocketAddr;

use crate::database::DatabaseConfig;
use crate::edition::{Edition, EditionSelector};
use crate::error::ConfigurationError;
use crate::ui::UiEdition;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Unvalidated settings as they arrive from flags or the environment.
#[derive(Debug, Clone, Default)]
pub struct RawConfig {
    pub edition: Option<String>,
    pub ui_edition: Option<String>,
    pub database_url: Option<String>,
    pub bind_addr: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub edition: Edition,
    pub ui_edition: UiEdition,
    pub database: DatabaseConfig,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    /// Validate raw settings against the full edition allow-list.
    pub fn from_raw(raw: RawConfig) -> Result<Self, ConfigurationError> {
        Self::from_raw_with(raw, &EditionSelector::default())
    }

    pub fn from_raw_with(
        raw: RawConfig,
        selector: &EditionSelector,
    ) -> Result<Self, ConfigurationError> {
        let edition = selector.select(raw.edition.as_deref())?;

        let ui_edition = UiEdition::select(raw.ui_edition.as_deref()).map_err(|_| {
            ConfigurationError::UnknownEdition {
                value: raw.ui_edition.clone().unwrap_or_default(),
                allowed: UiEdition::ALLOWED.iter().map(UiEdition::as_str).collect(),
            }
        })?;

        let database = raw
            .database_url
            .filter(|url| !url.trim().is_empty())
            .map(DatabaseConfig::new)
            .unwrap_or_default();

        let bind_addr = raw
            .bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse::<SocketAddr>()
            .map_err(|e| ConfigurationError::Invalid {
                key: "BIND_ADDR",
                message: format!("{e}"),
            })?;

        Ok(Self {
            edition,
            ui_edition,
            database,
            bind_addr,
        })
    }
}
