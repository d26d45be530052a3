//! The archive inventory: what is actually on disk.
//!
//! Built once per run from a directory of archives. Only the container's own
//! listing is read up front (name, uncompressed size, stored CRC32); SHA1
//! digests are computed per entry on demand and cached.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use romfix_core::{Crc32, Sha1Digest};

use crate::archive::{ArchiveReader, EntryListing};
use crate::error::InventoryError;
use crate::hasher::HashWriter;
use crate::progress::InventoryProgress;
use crate::scanner::{archive_name, scan_archives};

/// An entry observed inside an archive.
#[derive(Debug)]
pub struct ArchiveEntry {
    pub name: String,
    pub size: u64,
    pub crc32: Crc32,
    sha1: OnceLock<Sha1Digest>,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, size: u64, crc32: Crc32) -> Self {
        Self {
            name: name.into(),
            size,
            crc32,
            sha1: OnceLock::new(),
        }
    }

    /// The SHA1 digest, if it has been computed already.
    pub fn cached_sha1(&self) -> Option<Sha1Digest> {
        self.sha1.get().copied()
    }
}

impl From<EntryListing> for ArchiveEntry {
    fn from(listing: EntryListing) -> Self {
        Self::new(listing.name, listing.size, listing.crc32)
    }
}

/// An archive file on disk.
#[derive(Debug)]
pub struct Archive {
    /// File name without extension
    pub name: String,
    pub path: PathBuf,
    pub entries: BTreeMap<String, ArchiveEntry>,
    /// Set when the archive could not be opened or listed
    pub open_error: Option<String>,
}

impl Archive {
    /// A readable archive. If the listing repeats a name, the first wins.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        entries: impl IntoIterator<Item = ArchiveEntry>,
    ) -> Self {
        let mut map = BTreeMap::new();
        for entry in entries {
            map.entry(entry.name.clone()).or_insert(entry);
        }
        Self {
            name: name.into(),
            path: path.into(),
            entries: map,
            open_error: None,
        }
    }

    /// An archive that could not be opened; it has no entries.
    pub fn unreadable(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            entries: BTreeMap::new(),
            open_error: Some(error.into()),
        }
    }

    pub fn entry(&self, name: &str) -> Option<&ArchiveEntry> {
        self.entries.get(name)
    }

    pub fn is_readable(&self) -> bool {
        self.open_error.is_none()
    }
}

/// Every archive in the collection, indexed by name and by content.
pub struct Inventory {
    archives: Vec<Archive>,
    by_name: HashMap<String, usize>,
    /// (size, CRC32) → (archive index, entry name), in archive then entry order
    by_content: HashMap<(u64, Crc32), Vec<(usize, String)>>,
    reader: Box<dyn ArchiveReader>,
}

impl std::fmt::Debug for Inventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inventory")
            .field("archives", &self.archives.len())
            .field("entries", &self.entry_count())
            .finish()
    }
}

impl Inventory {
    /// Scan `folder` for archives and list each one.
    ///
    /// An archive that cannot be opened is recorded with its error and an
    /// empty entry map; it never stops the build. Only a folder that cannot
    /// be listed at all is an error.
    pub fn build(
        folder: &Path,
        extensions: &HashSet<String>,
        reader: Box<dyn ArchiveReader>,
        progress: &dyn Fn(InventoryProgress),
    ) -> Result<Self, InventoryError> {
        let paths = scan_archives(folder, extensions)?;
        let total = paths.len();
        progress(InventoryProgress::Scanning {
            archive_count: total,
        });

        let mut archives = Vec::with_capacity(total);
        for (index, path) in paths.into_iter().enumerate() {
            let name = archive_name(&path);
            progress(InventoryProgress::Reading {
                name: name.clone(),
                index,
                total,
            });

            match reader.list_entries(&path) {
                Ok(listing) => {
                    let entries = listing.into_iter().map(ArchiveEntry::from);
                    archives.push(Archive::new(name, path, entries));
                }
                Err(e) => {
                    log::warn!("Could not read {}: {e}", path.display());
                    archives.push(Archive::unreadable(name, path, e.to_string()));
                }
            }
        }

        progress(InventoryProgress::Done);
        let inventory = Self::from_archives(archives, reader);
        log::info!(
            "Inventoried {} archives ({} entries, {} unreadable)",
            inventory.archives.len(),
            inventory.entry_count(),
            inventory.archives.iter().filter(|a| !a.is_readable()).count(),
        );
        Ok(inventory)
    }

    /// Build from archives that have already been listed.
    pub fn from_archives(archives: Vec<Archive>, reader: Box<dyn ArchiveReader>) -> Self {
        let mut by_name = HashMap::with_capacity(archives.len());
        let mut by_content: HashMap<(u64, Crc32), Vec<(usize, String)>> = HashMap::new();

        for (i, archive) in archives.iter().enumerate() {
            if by_name.contains_key(&archive.name) {
                log::warn!(
                    "Duplicate archive name {} ({}); the first one is used for lookups",
                    archive.name,
                    archive.path.display()
                );
            } else {
                by_name.insert(archive.name.clone(), i);
            }
            for entry in archive.entries.values() {
                by_content
                    .entry((entry.size, entry.crc32))
                    .or_default()
                    .push((i, entry.name.clone()));
            }
        }

        Self {
            archives,
            by_name,
            by_content,
            reader,
        }
    }

    /// Look up an archive by set name.
    pub fn archive(&self, name: &str) -> Option<&Archive> {
        self.by_name.get(name).map(|&i| &self.archives[i])
    }

    /// Look up an entry by archive and entry name.
    pub fn entry_by_name(&self, archive: &str, entry: &str) -> Option<&ArchiveEntry> {
        self.archive(archive)?.entry(entry)
    }

    /// All archives in scan order.
    pub fn archives(&self) -> &[Archive] {
        &self.archives
    }

    pub fn len(&self) -> usize {
        self.archives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }

    /// Total number of entries across all readable archives.
    pub fn entry_count(&self) -> usize {
        self.archives.iter().map(|a| a.entries.len()).sum()
    }

    /// Every entry anywhere in the collection with this size and CRC32.
    pub fn content_matches(
        &self,
        size: u64,
        crc32: Crc32,
    ) -> impl Iterator<Item = (&Archive, &ArchiveEntry)> {
        self.by_content
            .get(&(size, crc32))
            .into_iter()
            .flatten()
            .filter_map(|(i, name)| {
                let archive = &self.archives[*i];
                archive.entry(name).map(|entry| (archive, entry))
            })
    }

    /// Compute (or fetch the cached) SHA1 of an entry, by name.
    pub fn compute_digest(&self, archive: &str, entry: &str) -> Result<Sha1Digest, InventoryError> {
        let found = self
            .archive(archive)
            .ok_or_else(|| InventoryError::ArchiveNotFound(archive.to_string()))?;
        if let Some(ref message) = found.open_error {
            return Err(InventoryError::unreadable(archive, message.clone()));
        }
        let item = found
            .entry(entry)
            .ok_or_else(|| InventoryError::entry_not_found(archive, entry))?;
        self.digest_of(found, item)
    }

    /// Compute (or fetch the cached) SHA1 of an entry of `archive`.
    ///
    /// The entry's bytes are streamed through the hasher, never loaded whole.
    pub fn digest_of(
        &self,
        archive: &Archive,
        entry: &ArchiveEntry,
    ) -> Result<Sha1Digest, InventoryError> {
        if let Some(digest) = entry.cached_sha1() {
            return Ok(digest);
        }

        let mut writer = HashWriter::new();
        self.reader
            .copy_entry(&archive.path, &entry.name, &mut writer)?;
        let hashes = writer.finish();
        if hashes.crc32 != entry.crc32 {
            log::debug!(
                "{}/{}: stored CRC {} but content hashes to {}",
                archive.name,
                entry.name,
                entry.crc32,
                hashes.crc32
            );
        }

        Ok(*entry.sha1.get_or_init(|| hashes.sha1))
    }
}

#[cfg(test)]
#[path = "tests/inventory_tests.rs"]
mod tests;
