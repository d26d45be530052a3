//! Audit findings.
//!
//! A [`Diagnostic`] is the unit of output for both catalog integrity checks
//! and per-set reconciliation. Silence means "verified": a sound entry
//! produces no diagnostic at all.

use serde::Serialize;

/// What kind of finding a diagnostic reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// No archive exists for the set, or it could not be opened.
    ArchiveMissing,
    /// The parent's archive is missing or unreadable.
    ParentArchiveMissing,
    /// The effective bios archive is missing or unreadable.
    BiosArchiveMissing,
    /// Not found in the own, parent or bios archive.
    EntryMissing,
    /// Found, but the uncompressed size differs from the catalog.
    SizeMismatch,
    /// Size matches but the CRC-32 differs.
    ChecksumMismatch,
    /// Size and CRC-32 match but the SHA-1 differs (deep verification only).
    DigestMismatch,
    /// Entry bytes could not be read while computing its digest.
    EntryUnreadable,
    /// An archive on disk that no catalog set names.
    UnknownArchive,
    /// `cloneof` names a set that does not exist.
    DanglingParent,
    /// `romof` names a set that does not exist.
    DanglingBios,
    /// The set sits on a parent/bios cycle.
    InheritanceCycle,
    /// A later set reused an existing set name and was dropped.
    DuplicateSet,
    /// A later entry reused a name within its set and was dropped.
    DuplicateEntry,
}

impl DiagnosticKind {
    /// Short human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::ArchiveMissing => "archive missing",
            Self::ParentArchiveMissing => "parent archive missing",
            Self::BiosArchiveMissing => "bios archive missing",
            Self::EntryMissing => "missing",
            Self::SizeMismatch => "wrong size",
            Self::ChecksumMismatch => "wrong crc",
            Self::DigestMismatch => "wrong sha1",
            Self::EntryUnreadable => "unreadable",
            Self::UnknownArchive => "not in catalog",
            Self::DanglingParent => "unknown parent",
            Self::DanglingBios => "unknown bios",
            Self::InheritanceCycle => "inheritance cycle",
            Self::DuplicateSet => "duplicate set",
            Self::DuplicateEntry => "duplicate entry",
        }
    }

    /// Findings about the catalog itself rather than the collection on disk.
    pub fn is_integrity(self) -> bool {
        matches!(
            self,
            Self::DanglingParent
                | Self::DanglingBios
                | Self::InheritanceCycle
                | Self::DuplicateSet
                | Self::DuplicateEntry
        )
    }

}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A place in the on-disk collection holding a content-identical entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Location {
    pub archive: String,
    pub entry: String,
}

impl Location {
    pub fn new(archive: impl Into<String>, entry: impl Into<String>) -> Self {
        Self {
            archive: archive.into(),
            entry: entry.into(),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.archive, self.entry)
    }
}

/// Outcome of the relocation search for a failed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Relocation {
    /// The bios set lists an entry of this name; its archive should supply it.
    ExpectedInBios(String),
    /// The parent set lists an entry of this name; its archive should supply it.
    ExpectedInParent(String),
    /// Every content-identical (size + CRC-32) entry found in the collection.
    Found(Vec<Location>),
    /// No candidate anywhere.
    NotFound,
}

impl std::fmt::Display for Relocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExpectedInBios(name) => write!(f, "expected in bios `{name}`"),
            Self::ExpectedInParent(name) => write!(f, "expected in parent `{name}`"),
            Self::Found(locations) => {
                write!(f, "found elsewhere: ")?;
                for (i, loc) in locations.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{loc}")?;
                }
                Ok(())
            }
            Self::NotFound => write!(f, "no relocation candidate"),
        }
    }
}

/// One audit finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub set_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_name: Option<String>,
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relocation: Option<Relocation>,
}

impl Diagnostic {
    pub fn new(set_name: impl Into<String>, kind: DiagnosticKind) -> Self {
        Self {
            set_name: set_name.into(),
            entry_name: None,
            kind,
            detail: None,
            relocation: None,
        }
    }

    pub fn with_entry(mut self, entry_name: impl Into<String>) -> Self {
        self.entry_name = Some(entry_name.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_relocation(mut self, relocation: Relocation) -> Self {
        self.relocation = Some(relocation);
        self
    }

    /// Relocation candidates, empty unless the search found some.
    pub fn relocation_candidates(&self) -> &[Location] {
        match &self.relocation {
            Some(Relocation::Found(locations)) => locations,
            _ => &[],
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.set_name, self.kind)?;
        if let Some(ref entry) = self.entry_name {
            write!(f, " {entry}")?;
        }
        if let Some(ref detail) = self.detail {
            write!(f, " ({detail})")?;
        }
        if let Some(ref relocation) = self.relocation {
            write!(f, "; {relocation}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/diagnostic_tests.rs"]
mod tests;
