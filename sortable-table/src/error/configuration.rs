//! Configuration error types

/// Errors caused by the column configuration or table options.
///
/// These are fatal to the operation that raised them but never touch what
/// is already rendered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// No column with this id is configured.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// The column has no sort type, or one this table does not recognize.
    #[error("Unknown sort type {sort_type:?} for column {column}")]
    UnknownSortType {
        /// Column the sort was requested for.
        column: String,
        /// Configured sort type name, if any.
        sort_type: Option<String>,
    },

    /// The column exists but is not marked sortable.
    #[error("Column is not sortable: {0}")]
    NotSortable(String),

    /// The fetch target could not be built from the base URL and path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Options could not be decoded.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// The string collator could not be created.
    #[error("Collation unavailable: {0}")]
    Collation(String),
}

impl ConfigurationError {
    /// Creates an unknown sort type error.
    pub fn unknown_sort_type(column: impl Into<String>, sort_type: Option<&str>) -> Self {
        Self::UnknownSortType {
            column: column.into(),
            sort_type: sort_type.map(str::to_string),
        }
    }
}
