//! Construction options.

use serde::Deserialize;

use crate::error::ConfigurationError;
use crate::row::Row;
use crate::sort::{SortDirection, SortState};

/// Backend used to resolve relative `url`s when no base is given.
pub const BACKEND_URL: &str = "https://course-js.javascript.ru";

/// Options accepted by [`SortableTable`](crate::SortableTable).
///
/// Decodes from JSON with camelCase keys:
///
/// ```json
/// { "url": "api/rest/products", "sorted": { "id": "title", "order": "asc" }, "isSortLocally": true }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableOptions {
    /// Path (or absolute URL) of the row collection, resolved against `base_url`.
    pub url: String,
    /// Rows shown before the first load, and the local baseline when `url` is empty.
    pub data: Vec<Row>,
    /// Initial sort. Defaults to the first sortable column, ascending.
    pub sorted: Option<SortState>,
    /// Sort in memory after one load instead of re-fetching per sort.
    pub is_sort_locally: bool,
    pub base_url: String,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            data: Vec::new(),
            sorted: None,
            is_sort_locally: false,
            base_url: BACKEND_URL.to_string(),
        }
    }
}

impl TableOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(json).map_err(|e| ConfigurationError::InvalidOptions(e.to_string()))
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn data(mut self, data: Vec<Row>) -> Self {
        self.data = data;
        self
    }

    pub fn sorted(mut self, column_id: impl Into<String>, direction: SortDirection) -> Self {
        self.sorted = Some(SortState::new(column_id, direction));
        self
    }

    pub fn sort_locally(mut self, is_sort_locally: bool) -> Self {
        self.is_sort_locally = is_sort_locally;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}
