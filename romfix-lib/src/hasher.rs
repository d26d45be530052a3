use std::io::{self, Read, Write};

use sha1::Digest;

use romfix_core::{Crc32, Sha1Digest};

const CHUNK_SIZE: usize = 64 * 1024; // 64 KB

/// CRC32, SHA1 and length of a byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentHashes {
    pub crc32: Crc32,
    pub sha1: Sha1Digest,
    pub size: u64,
}

/// A sink that hashes everything written to it.
///
/// Archive readers stream entry bytes into this, so an entry is never held
/// in memory as a whole.
pub struct HashWriter {
    crc: crc32fast::Hasher,
    sha: sha1::Sha1,
    size: u64,
}

impl HashWriter {
    pub fn new() -> Self {
        Self {
            crc: crc32fast::Hasher::new(),
            sha: sha1::Sha1::new(),
            size: 0,
        }
    }

    pub fn finish(self) -> ContentHashes {
        let sha1: [u8; 20] = self.sha.finalize().into();
        ContentHashes {
            crc32: Crc32(self.crc.finalize()),
            sha1: Sha1Digest(sha1),
            size: self.size,
        }
    }
}

impl Default for HashWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for HashWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.crc.update(buf);
        self.sha.update(buf);
        self.size += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Copy a reader into a writer in 64KB chunks. Returns the byte count.
pub fn copy_chunked<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
) -> io::Result<u64> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total: u64 = 0;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }

    Ok(total)
}

/// Compute CRC32 and SHA1 of a stream, reading in 64KB chunks.
pub fn hash_reader<R: Read + ?Sized>(reader: &mut R) -> io::Result<ContentHashes> {
    let mut writer = HashWriter::new();
    copy_chunked(reader, &mut writer)?;
    Ok(writer.finish())
}

#[cfg(test)]
#[path = "tests/hasher_tests.rs"]
mod tests;
