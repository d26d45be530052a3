//! Shared value types for romfix: content digests and audit diagnostics.

pub mod checksum;
pub mod diagnostic;

pub use checksum::{Crc32, DigestParseError, SHA1_LEN, Sha1Digest};
pub use diagnostic::{Diagnostic, DiagnosticKind, Location, Relocation};
