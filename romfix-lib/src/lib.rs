//! Audit a MAME-style ROM collection against a reference catalog.
//!
//! The pipeline is: load a [`Catalog`](romfix_dat::Catalog), build an
//! [`Inventory`] of the archives on disk, then let a [`Reconciler`] compare
//! the two and produce diagnostics.

pub mod archive;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod inventory;
pub mod progress;
pub mod scanner;
pub mod settings;

pub use archive::{ArchiveReader, EntryListing, ZipReader};
pub use engine::{AuditSummary, ReconcileOptions, Reconciler};
pub use error::InventoryError;
pub use hasher::{ContentHashes, HashWriter, hash_reader};
pub use inventory::{Archive, ArchiveEntry, Inventory};
pub use progress::InventoryProgress;
pub use scanner::{DEFAULT_EXTENSIONS, extension_set};

pub use romfix_core::{Diagnostic, DiagnosticKind, Location, Relocation};
pub use romfix_dat::{Catalog, DatError};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
