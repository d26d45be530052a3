//! Reconciliation of the catalog against the inventory.
//!
//! Each set is checked on its own: its entries are resolved through the
//! set's own archive, then its parent's, then its effective bios archive.
//! Anything that does not resolve to a sound entry yields a [`Diagnostic`],
//! followed by a search for where the expected content actually lives.

use std::collections::BTreeMap;

use romfix_core::{Diagnostic, DiagnosticKind, Location, Relocation, Sha1Digest};
use romfix_dat::{Catalog, Entry, Set};
use serde::Serialize;

use crate::inventory::{Archive, ArchiveEntry, Inventory};

/// Options controlling how thoroughly entries are verified.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Confirm size+CRC matches by SHA1 when the catalog lists one.
    pub verify_digests: bool,
}

/// Where an archive named by the catalog stands on disk.
enum ArchiveState<'i> {
    Usable(&'i Archive),
    Unreadable(&'i str),
    Absent,
}

/// Counts gathered over an audit run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    pub sets_checked: usize,
    /// Sets that produced no diagnostic at all
    pub sets_clean: usize,
    pub by_kind: BTreeMap<DiagnosticKind, usize>,
    /// Archives on disk that no set names
    pub unknown_archives: usize,
}

impl AuditSummary {
    /// Account for the diagnostics of one set.
    pub fn record(&mut self, diagnostics: &[Diagnostic]) {
        self.sets_checked += 1;
        if diagnostics.is_empty() {
            self.sets_clean += 1;
        }
        for diagnostic in diagnostics {
            *self.by_kind.entry(diagnostic.kind).or_default() += 1;
        }
    }

    /// Account for a diagnostic that belongs to no set.
    pub fn record_unknown(&mut self, diagnostic: &Diagnostic) {
        self.unknown_archives += 1;
        *self.by_kind.entry(diagnostic.kind).or_default() += 1;
    }

    pub fn total(&self) -> usize {
        self.by_kind.values().sum()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }
}

/// Checks catalog sets against an inventory. Both are borrowed read-only,
/// so a reconciler can be run any number of times with identical results.
pub struct Reconciler<'a> {
    catalog: &'a Catalog,
    inventory: &'a Inventory,
    options: ReconcileOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(catalog: &'a Catalog, inventory: &'a Inventory, options: ReconcileOptions) -> Self {
        Self {
            catalog,
            inventory,
            options,
        }
    }

    /// Diagnostics for every set, lazily, in catalog order, followed by one
    /// [`DiagnosticKind::UnknownArchive`] per archive that no set names.
    ///
    /// The diagnostics of one set are always contiguous. Calling this again
    /// starts over from the first set.
    pub fn reconcile_all(&self) -> impl Iterator<Item = Diagnostic> + '_ {
        self.catalog
            .sets()
            .flat_map(move |set| self.reconcile_one(set))
            .chain(self.unknown_archives())
    }

    /// Archives in the inventory, in path order, whose name matches no set.
    pub fn unknown_archives(&self) -> impl Iterator<Item = Diagnostic> + '_ {
        self.inventory
            .archives()
            .iter()
            .filter(|archive| self.catalog.lookup(&archive.name).is_none())
            .map(|archive| {
                Diagnostic::new(&archive.name, DiagnosticKind::UnknownArchive)
                    .with_detail(archive.path.display().to_string())
            })
    }

    /// Reconcile `sets` one by one, handing every diagnostic to `sink`.
    pub fn audit<'s>(
        &self,
        sets: impl IntoIterator<Item = &'s Set>,
        mut sink: impl FnMut(&Diagnostic),
    ) -> AuditSummary {
        let mut summary = AuditSummary::default();
        for set in sets {
            let diagnostics = self.reconcile_one(set);
            diagnostics.iter().for_each(&mut sink);
            summary.record(&diagnostics);
        }
        log::debug!(
            "Checked {} sets, {} clean, {} diagnostics",
            summary.sets_checked,
            summary.sets_clean,
            summary.total()
        );
        summary
    }

    /// Diagnostics for a single set. An empty result means every expected
    /// entry was found intact.
    pub fn reconcile_one(&self, set: &Set) -> Vec<Diagnostic> {
        let own = match self.archive_state(&set.name) {
            ArchiveState::Usable(archive) => archive,
            ArchiveState::Unreadable(error) => {
                return vec![
                    Diagnostic::new(&set.name, DiagnosticKind::ArchiveMissing)
                        .with_detail(format!("archive could not be read: {error}")),
                ];
            }
            ArchiveState::Absent => {
                return vec![
                    Diagnostic::new(&set.name, DiagnosticKind::ArchiveMissing)
                        .with_detail("no archive for this set"),
                ];
            }
        };

        let mut diagnostics = Vec::new();
        let parent = self.inherited_archive(
            set,
            set.parent_name.as_deref(),
            DiagnosticKind::ParentArchiveMissing,
            &mut diagnostics,
        );
        let bios = self.inherited_archive(
            set,
            set.effective_bios_name.as_deref(),
            DiagnosticKind::BiosArchiveMissing,
            &mut diagnostics,
        );

        let sources: Vec<&Archive> = [Some(own), parent, bios].into_iter().flatten().collect();
        for expected in &set.entries {
            if let Some(diagnostic) = self.check_entry(set, expected, &sources) {
                diagnostics.push(diagnostic);
            }
        }
        diagnostics
    }

    fn archive_state(&self, name: &str) -> ArchiveState<'a> {
        match self.inventory.archive(name) {
            Some(archive) => match archive.open_error {
                Some(ref error) => ArchiveState::Unreadable(error),
                None => ArchiveState::Usable(archive),
            },
            None => ArchiveState::Absent,
        }
    }

    /// Locate the archive of a parent or bios; its absence is reported but
    /// the set is still checked with what is available.
    fn inherited_archive(
        &self,
        set: &Set,
        name: Option<&str>,
        kind: DiagnosticKind,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<&'a Archive> {
        let name = name?;
        let detail = match self.archive_state(name) {
            ArchiveState::Usable(archive) => return Some(archive),
            ArchiveState::Unreadable(error) => format!("`{name}` could not be read: {error}"),
            ArchiveState::Absent => format!("no archive for `{name}`"),
        };
        diagnostics.push(Diagnostic::new(&set.name, kind).with_detail(detail));
        None
    }

    fn check_entry(&self, set: &Set, expected: &Entry, sources: &[&'a Archive]) -> Option<Diagnostic> {
        let resolved = sources
            .iter()
            .find_map(|archive| archive.entry(&expected.name).map(|found| (*archive, found)));

        let Some((archive, found)) = resolved else {
            return Some(self.failure(set, expected, DiagnosticKind::EntryMissing, None));
        };
        let here = Location::new(&archive.name, &found.name);

        if found.size != expected.size {
            let detail = format!(
                "expected {} bytes, found {} in {here}",
                expected.size, found.size
            );
            return Some(self.failure(set, expected, DiagnosticKind::SizeMismatch, Some(detail)));
        }
        if found.crc32 != expected.crc32 {
            let detail = format!(
                "expected crc {}, found {} in {here}",
                expected.crc32, found.crc32
            );
            return Some(self.failure(set, expected, DiagnosticKind::ChecksumMismatch, Some(detail)));
        }

        if !self.options.verify_digests {
            return None;
        }
        let want = expected.sha1?;
        match self.inventory.digest_of(archive, found) {
            Ok(actual) if actual == want => None,
            Ok(actual) => {
                let detail = format!("expected sha1 {want}, found {actual} in {here}");
                Some(self.failure(set, expected, DiagnosticKind::DigestMismatch, Some(detail)))
            }
            Err(e) => {
                log::warn!("{here}: {e}");
                Some(
                    Diagnostic::new(&set.name, DiagnosticKind::EntryUnreadable)
                        .with_entry(&expected.name)
                        .with_detail(format!("{here}: {e}")),
                )
            }
        }
    }

    fn failure(
        &self,
        set: &Set,
        expected: &Entry,
        kind: DiagnosticKind,
        detail: Option<String>,
    ) -> Diagnostic {
        let mut diagnostic = Diagnostic::new(&set.name, kind)
            .with_entry(&expected.name)
            .with_relocation(self.relocate(set, expected));
        diagnostic.detail = detail;
        diagnostic
    }

    /// Where the content of a failed entry should come from, or where it
    /// can be found instead.
    fn relocate(&self, set: &Set, expected: &Entry) -> Relocation {
        if let Some(bios) = self.catalog.bios_of(set) {
            if bios.has_entry(&expected.name) {
                return Relocation::ExpectedInBios(bios.name.clone());
            }
        }
        if let Some(parent) = self.catalog.parent_of(set) {
            if parent.has_entry(&expected.name) {
                return Relocation::ExpectedInParent(parent.name.clone());
            }
        }

        let candidates: Vec<Location> = self
            .inventory
            .content_matches(expected.size, expected.crc32)
            .filter(|(archive, entry)| self.confirmed(expected.sha1, archive, entry))
            .map(|(archive, entry)| Location::new(&archive.name, &entry.name))
            .collect();

        if candidates.is_empty() {
            Relocation::NotFound
        } else {
            Relocation::Found(candidates)
        }
    }

    /// In deep mode, a candidate only counts if its SHA1 matches too.
    fn confirmed(&self, want: Option<Sha1Digest>, archive: &Archive, entry: &ArchiveEntry) -> bool {
        let Some(want) = want.filter(|_| self.options.verify_digests) else {
            return true;
        };
        match self.inventory.digest_of(archive, entry) {
            Ok(actual) => actual == want,
            Err(e) => {
                log::debug!("Dropping candidate {}/{}: {e}", archive.name, entry.name);
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;
