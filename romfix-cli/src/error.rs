use thiserror::Error;

use romfix_dat::DatError;
use romfix_lib::InventoryError;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The catalog source could not be read or trusted
    #[error("Catalog error: {0}")]
    Dat(#[from] DatError),

    /// The ROM folder could not be scanned
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Catch-all for other errors
    #[error("{0}")]
    Other(String),
}

impl CliError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
