//! Error taxonomy for the todo service
//!
//! Startup errors (`ConfigurationError`, `LoadError`) abort initialisation.
//! `OverrideLoadWarning` never escapes the merger. `ServiceError` is the
//! per-call error the facade hands back to the boundary layer unchanged.

use std::sync::Arc;

use thiserror::Error;

/// Process-fatal configuration problems, raised before anything is loaded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Unrecognized edition: {value}. Allowed editions are: {}", allowed.join(", "))]
    UnknownEdition {
        value: String,
        allowed: Vec<&'static str>,
    },

    #[error("Invalid configuration value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Failure to obtain an implementation the system cannot run without.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to load base module: {location}. Error: {reason}")]
    MissingBaseImplementation { location: String, reason: String },
}

/// Recorded when an override is absent or fails to load. The merger logs it
/// and carries on with the base implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Override module {location} not loaded, falling back to base module: {reason}")]
pub struct OverrideLoadWarning {
    pub location: String,
    pub reason: String,
}

/// Per-call errors surfaced by the todo facade.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Todo with id {id} not found")]
    NotFound { id: i64 },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Operation '{0}' is not available in this edition")]
    UnknownExtension(String),

    #[error("Todo service is unusable: {0}")]
    Unavailable(Arc<LoadError>),

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}

/// Errors from the frontend edition loader.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UiLoadError {
    #[error("Unrecognized edition: {value}. Allowed editions are: {}", allowed.join(", "))]
    UnrecognizedEdition {
        value: String,
        allowed: Vec<&'static str>,
    },

    #[error("No UI component registered at {location}")]
    ComponentNotFound { location: String },

    #[error("Failed to load UI component {location}: {reason}")]
    Failed { location: String, reason: String },
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
