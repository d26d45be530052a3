//! Reading archive containers.
//!
//! The inventory only needs two things from a container format: a cheap
//! listing of entry names with their uncompressed size and stored CRC32,
//! and a way to stream one entry's bytes on demand. [`ArchiveReader`] is
//! that seam; [`ZipReader`] is the implementation used for `.zip` sets.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;

use zip::ZipArchive;
use zip::result::ZipError;

use romfix_core::Crc32;

use crate::hasher::copy_chunked;

/// One entry as listed by the container, without reading its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryListing {
    pub name: String,
    /// Uncompressed size in bytes
    pub size: u64,
    /// Checksum stored by the container
    pub crc32: Crc32,
}

impl EntryListing {
    pub fn new(name: impl Into<String>, size: u64, crc32: Crc32) -> Self {
        Self {
            name: name.into(),
            size,
            crc32,
        }
    }
}

/// Access to the contents of archive files.
pub trait ArchiveReader: Send + Sync {
    /// List the file entries of an archive. Directories are skipped.
    fn list_entries(&self, path: &Path) -> io::Result<Vec<EntryListing>>;

    /// Stream the uncompressed bytes of one entry into `sink`.
    ///
    /// Returns the number of bytes written.
    fn copy_entry(&self, path: &Path, entry: &str, sink: &mut dyn Write) -> io::Result<u64>;
}

/// Reads `.zip` archives with the `zip` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipReader;

impl ZipReader {
    fn open(path: &Path) -> io::Result<ZipArchive<BufReader<File>>> {
        let file = File::open(path)?;
        ZipArchive::new(BufReader::new(file)).map_err(zip_to_io)
    }
}

impl ArchiveReader for ZipReader {
    fn list_entries(&self, path: &Path) -> io::Result<Vec<EntryListing>> {
        let mut archive = Self::open(path)?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            // Raw access reads the central directory record only
            let file = archive.by_index_raw(i).map_err(zip_to_io)?;
            if file.is_dir() {
                continue;
            }
            entries.push(EntryListing::new(file.name(), file.size(), Crc32(file.crc32())));
        }

        Ok(entries)
    }

    fn copy_entry(&self, path: &Path, entry: &str, sink: &mut dyn Write) -> io::Result<u64> {
        let mut archive = Self::open(path)?;
        let mut file = archive.by_name(entry).map_err(zip_to_io)?;
        copy_chunked(&mut file, sink)
    }
}

fn zip_to_io(e: ZipError) -> io::Error {
    match e {
        ZipError::Io(e) => e,
        ZipError::FileNotFound => io::Error::new(io::ErrorKind::NotFound, "entry not found in zip"),
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}
