//! Todo entity shared by the store, the services and the HTTP surface

use serde::{Deserialize, Serialize};

/// Id carried by a todo that has not been saved yet. Stores never assign it.
pub const UNSAVED_ID: i64 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    #[cfg_attr(feature = "database", sqlx(rename = "isCompleted"))]
    pub is_completed: bool,
}

impl Todo {
    /// A fresh, incomplete todo awaiting its id from the store.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: UNSAVED_ID,
            title: title.into(),
            is_completed: false,
        }
    }

    pub fn is_saved(&self) -> bool {
        self.id != UNSAVED_ID
    }
}

/// Changes requested by an update call. Whether `title` is honoured depends
/// on the active edition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoUpdate {
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl TodoUpdate {
    pub fn status(is_completed: bool) -> Self {
        Self {
            is_completed,
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
