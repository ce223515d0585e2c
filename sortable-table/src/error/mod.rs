//! Error types

mod configuration;
mod load;

pub use configuration::*;
pub use load::*;

/// Any failure surfaced by a table operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The column configuration or options cannot satisfy the request.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Loading rows from the fetch target failed.
    #[error(transparent)]
    Load(#[from] LoadError),
}

impl Error {
    /// Returns `true` if this is a configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns `true` if this is a load error.
    pub fn is_load(&self) -> bool {
        matches!(self, Self::Load(_))
    }
}
