//! In-memory archive reader shared by the unit tests.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use romfix_core::Crc32;

use crate::archive::{ArchiveReader, EntryListing};
use crate::inventory::{Archive, ArchiveEntry, Inventory};

type Contents = BTreeMap<String, Vec<u8>>;

#[derive(Default)]
pub(crate) struct MemoryReader {
    files: HashMap<PathBuf, Result<Contents, String>>,
    order: Vec<PathBuf>,
    pub(crate) reads: Arc<AtomicUsize>,
}

impl MemoryReader {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn path_for(name: &str) -> PathBuf {
        PathBuf::from(format!("/roms/{name}.zip"))
    }

    pub(crate) fn add_archive(&mut self, name: &str, entries: &[(&str, &str)]) -> &mut Self {
        self.add_at(Self::path_for(name), entries)
    }

    pub(crate) fn add_at(&mut self, path: PathBuf, entries: &[(&str, &str)]) -> &mut Self {
        let contents = entries
            .iter()
            .map(|(n, data)| (n.to_string(), data.as_bytes().to_vec()))
            .collect();
        self.order.push(path.clone());
        self.files.insert(path, Ok(contents));
        self
    }

    pub(crate) fn add_broken(&mut self, name: &str, error: &str) -> &mut Self {
        self.add_broken_at(Self::path_for(name), error)
    }

    pub(crate) fn add_broken_at(&mut self, path: PathBuf, error: &str) -> &mut Self {
        self.order.push(path.clone());
        self.files.insert(path, Err(error.to_string()));
        self
    }

    /// List every registered archive, in registration order.
    pub(crate) fn archives(&self) -> Vec<Archive> {
        self.order
            .iter()
            .map(|path| {
                let name = crate::scanner::archive_name(path);
                match self.list_entries(path) {
                    Ok(listing) => {
                        Archive::new(name, path, listing.into_iter().map(ArchiveEntry::from))
                    }
                    Err(e) => Archive::unreadable(name, path, e.to_string()),
                }
            })
            .collect()
    }

    pub(crate) fn into_inventory(self) -> Inventory {
        let archives = self.archives();
        Inventory::from_archives(archives, Box::new(self))
    }
}

impl ArchiveReader for MemoryReader {
    fn list_entries(&self, path: &Path) -> io::Result<Vec<EntryListing>> {
        match self.files.get(path) {
            Some(Ok(contents)) => Ok(contents
                .iter()
                .map(|(name, data)| {
                    EntryListing::new(name, data.len() as u64, Crc32(crc32fast::hash(data)))
                })
                .collect()),
            Some(Err(message)) => Err(io::Error::new(io::ErrorKind::InvalidData, message.clone())),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no such archive")),
        }
    }

    fn copy_entry(&self, path: &Path, entry: &str, sink: &mut dyn Write) -> io::Result<u64> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let data = match self.files.get(path) {
            Some(Ok(contents)) => contents
                .get(entry)
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such entry"))?,
            Some(Err(message)) => {
                return Err(io::Error::new(io::ErrorKind::InvalidData, message.clone()));
            }
            None => return Err(io::Error::new(io::ErrorKind::NotFound, "no such archive")),
        };
        sink.write_all(data)?;
        Ok(data.len() as u64)
    }
}
