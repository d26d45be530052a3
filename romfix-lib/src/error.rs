use thiserror::Error;

/// Errors that can occur while building or querying the archive inventory.
///
/// A single unreadable archive is not an error at build time: it is recorded
/// on its [`Archive`](crate::Archive) and the build carries on.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// I/O error while scanning the directory or reading an entry
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No archive with this name was scanned
    #[error("Archive not in inventory: {0}")]
    ArchiveNotFound(String),

    /// The archive exists but holds no entry of this name
    #[error("Entry {entry} not found in archive {archive}")]
    EntryNotFound { archive: String, entry: String },

    /// The archive could not be opened when the inventory was built
    #[error("Archive {archive} is unreadable: {message}")]
    Unreadable { archive: String, message: String },
}

impl InventoryError {
    pub fn entry_not_found(archive: impl Into<String>, entry: impl Into<String>) -> Self {
        Self::EntryNotFound {
            archive: archive.into(),
            entry: entry.into(),
        }
    }

    pub fn unreadable(archive: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unreadable {
            archive: archive.into(),
            message: message.into(),
        }
    }
}
