//! The reference catalog: every expected set and entry, with inheritance
//! flattened at load time.
//!
//! Building a catalog is a two-pass process. The first pass validates
//! digests, drops `nodump` entries and indexes sets by name. The second pass
//! checks parent/bios references, detects inheritance cycles and resolves
//! each set's effective bios so lookups never walk the chain again.

use std::collections::{HashMap, HashSet};

use romfix_core::{Crc32, Diagnostic, DiagnosticKind, Sha1Digest};

use crate::dat::{DatFile, DatRom, DatSet};
use crate::error::DatError;

/// Dump status of an expected entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DumpStatus {
    #[default]
    Good,
    BadDump,
    NoDump,
    Verified,
}

impl std::str::FromStr for DumpStatus {
    type Err = DatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "good" => Ok(Self::Good),
            "baddump" => Ok(Self::BadDump),
            "nodump" => Ok(Self::NoDump),
            "verified" => Ok(Self::Verified),
            other => Err(DatError::invalid_dat(format!("Unknown dump status: {other}"))),
        }
    }
}

/// An expected ROM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub size: u64,
    pub crc32: Crc32,
    /// Absent when the source lists no SHA1 for this entry.
    pub sha1: Option<Sha1Digest>,
    pub status: DumpStatus,
}

/// An expected archive ("game" / "machine").
#[derive(Debug, Clone)]
pub struct Set {
    pub name: String,
    pub description: String,
    /// The set this one is a clone of.
    pub parent_name: Option<String>,
    /// Directly declared bios.
    pub bios_name: Option<String>,
    /// Direct bios, or the nearest ancestor's, resolved once at load time.
    pub effective_bios_name: Option<String>,
    pub entries: Vec<Entry>,
    entry_index: HashMap<String, usize>,
}

impl Set {
    /// Whether the set lists an entry of this name.
    pub fn has_entry(&self, name: &str) -> bool {
        self.entry_index.contains_key(name)
    }

    pub fn is_clone(&self) -> bool {
        self.parent_name.is_some()
    }
}

/// Read-only mapping from set name to set, in source order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    sets: Vec<Set>,
    by_name: HashMap<String, usize>,
    integrity: Vec<Diagnostic>,
    dropped_nodump: usize,
}

/// Resolved inheritance edges of one set, as indices into `Catalog::sets`.
#[derive(Debug, Clone, Copy, Default)]
struct Links {
    parent: Option<usize>,
    bios: Option<usize>,
}

impl Catalog {
    /// Build a catalog from a parsed catalog source.
    pub fn from_dat(dat: DatFile) -> Result<Self, DatError> {
        Self::build(dat.sets)
    }

    /// Build a catalog from raw set records.
    ///
    /// Fails on the first malformed digest. Dangling references, duplicate
    /// names and inheritance cycles are recorded as integrity diagnostics
    /// and do not stop the build.
    pub fn build(records: impl IntoIterator<Item = DatSet>) -> Result<Self, DatError> {
        let mut catalog = Catalog::default();

        for record in records {
            let set = catalog.load_set(record)?;
            if catalog.by_name.contains_key(&set.name) {
                catalog.record(
                    Diagnostic::new(&set.name, DiagnosticKind::DuplicateSet)
                        .with_detail("a set with this name was already loaded"),
                );
                continue;
            }
            catalog.by_name.insert(set.name.clone(), catalog.sets.len());
            catalog.sets.push(set);
        }

        catalog.resolve_inheritance();

        log::info!(
            "Loaded {} sets ({} entries, {} nodump entries skipped, {} integrity issues)",
            catalog.sets.len(),
            catalog.entry_count(),
            catalog.dropped_nodump,
            catalog.integrity.len(),
        );

        Ok(catalog)
    }

    fn record(&mut self, diagnostic: Diagnostic) {
        log::debug!("Catalog: {diagnostic}");
        self.integrity.push(diagnostic);
    }

    fn load_set(&mut self, record: DatSet) -> Result<Set, DatError> {
        let mut entries = Vec::with_capacity(record.roms.len());
        let mut entry_index = HashMap::with_capacity(record.roms.len());

        for rom in record.roms {
            let Some(entry) = parse_entry(&record.name, rom)? else {
                self.dropped_nodump += 1;
                continue;
            };
            if entry_index.contains_key(&entry.name) {
                self.record(
                    Diagnostic::new(&record.name, DiagnosticKind::DuplicateEntry)
                        .with_entry(&entry.name),
                );
                continue;
            }
            entry_index.insert(entry.name.clone(), entries.len());
            entries.push(entry);
        }

        // MAME lists `romof` equal to `cloneof` for clones; that is the parent
        // relationship, not a bios.
        let bios_name = match (&record.cloneof, record.romof) {
            (Some(parent), Some(romof)) if *parent == romof => None,
            (_, romof) => romof,
        };

        Ok(Set {
            name: record.name,
            description: record.description,
            parent_name: record.cloneof,
            bios_name,
            effective_bios_name: None,
            entries,
            entry_index,
        })
    }

    /// Second pass: integrity checks, cycle detection and bios flattening.
    fn resolve_inheritance(&mut self) {
        let mut links = vec![Links::default(); self.sets.len()];
        let mut findings = Vec::new();

        for (i, set) in self.sets.iter().enumerate() {
            if let Some(ref parent) = set.parent_name {
                match self.by_name.get(parent) {
                    Some(&p) => links[i].parent = Some(p),
                    None => findings.push(
                        Diagnostic::new(&set.name, DiagnosticKind::DanglingParent)
                            .with_detail(format!("cloneof `{parent}` is not in the catalog")),
                    ),
                }
            }
            if let Some(ref bios) = set.bios_name {
                match self.by_name.get(bios) {
                    Some(&b) => links[i].bios = Some(b),
                    None => findings.push(
                        Diagnostic::new(&set.name, DiagnosticKind::DanglingBios)
                            .with_detail(format!("romof `{bios}` is not in the catalog")),
                    ),
                }
            }
        }

        let cyclic: Vec<bool> = (0..self.sets.len())
            .map(|i| reaches_itself(&links, i))
            .collect();
        for (i, set) in self.sets.iter().enumerate() {
            if cyclic[i] {
                findings.push(
                    Diagnostic::new(&set.name, DiagnosticKind::InheritanceCycle)
                        .with_detail("parent/bios chain loops back to this set; bios left unresolved"),
                );
            }
        }

        let mut memo: Vec<Option<Option<String>>> = vec![None; self.sets.len()];
        for i in 0..self.sets.len() {
            let effective = self.effective_bios(i, &links, &cyclic, &mut memo);
            self.sets[i].effective_bios_name = effective;
        }

        for finding in findings {
            self.record(finding);
        }
    }

    /// Walk the parent chain of `start` until a set with a direct bios is
    /// found, memoizing every set passed on the way.
    fn effective_bios(
        &self,
        start: usize,
        links: &[Links],
        cyclic: &[bool],
        memo: &mut [Option<Option<String>>],
    ) -> Option<String> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = start;

        let resolved = loop {
            if cyclic[current] {
                break None;
            }
            if let Some(ref known) = memo[current] {
                break known.clone();
            }
            if !visited.insert(current) {
                break None;
            }
            chain.push(current);
            let set = &self.sets[current];
            if set.bios_name.is_some() {
                break set.bios_name.clone();
            }
            match links[current].parent {
                Some(parent) => current = parent,
                None => break None,
            }
        };

        for i in chain {
            memo[i] = Some(resolved.clone());
        }
        resolved
    }

    /// Look up a set by name.
    pub fn lookup(&self, name: &str) -> Option<&Set> {
        self.by_name.get(name).map(|&i| &self.sets[i])
    }

    /// The catalog entry for a set's parent, if it resolves.
    pub fn parent_of(&self, set: &Set) -> Option<&Set> {
        set.parent_name.as_deref().and_then(|name| self.lookup(name))
    }

    /// The catalog entry for a set's effective bios, if it resolves.
    pub fn bios_of(&self, set: &Set) -> Option<&Set> {
        set.effective_bios_name
            .as_deref()
            .and_then(|name| self.lookup(name))
    }

    /// All sets in source order.
    pub fn sets(&self) -> impl Iterator<Item = &Set> {
        self.sets.iter()
    }

    /// Integrity findings recorded while building.
    pub fn integrity(&self) -> &[Diagnostic] {
        &self.integrity
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Total number of expected entries across all sets.
    pub fn entry_count(&self) -> usize {
        self.sets.iter().map(|s| s.entries.len()).sum()
    }

    /// Number of `nodump` entries dropped while loading.
    pub fn dropped_nodump(&self) -> usize {
        self.dropped_nodump
    }
}

/// Validate one raw ROM record. Returns `None` for `nodump` entries.
fn parse_entry(set_name: &str, rom: DatRom) -> Result<Option<Entry>, DatError> {
    let status: DumpStatus = rom.status.as_deref().unwrap_or_default().parse()?;
    if status == DumpStatus::NoDump {
        return Ok(None);
    }

    let crc = rom
        .crc
        .as_deref()
        .ok_or_else(|| DatError::malformed_digest(set_name, &rom.name, "missing CRC-32"))?;
    let crc32 = Crc32::from_hex(crc)
        .map_err(|e| DatError::malformed_digest(set_name, &rom.name, e.to_string()))?;
    let sha1 = rom
        .sha1
        .as_deref()
        .map(Sha1Digest::from_hex)
        .transpose()
        .map_err(|e| DatError::malformed_digest(set_name, &rom.name, e.to_string()))?;

    Ok(Some(Entry {
        name: rom.name,
        size: rom.size,
        crc32,
        sha1,
        status,
    }))
}

/// True if following parent/bios edges from `start` leads back to `start`.
fn reaches_itself(links: &[Links], start: usize) -> bool {
    let mut visited = HashSet::new();
    let mut frontier = vec![start];
    while let Some(node) = frontier.pop() {
        for next in [links[node].parent, links[node].bios].into_iter().flatten() {
            if next == start {
                return true;
            }
            if visited.insert(next) {
                frontier.push(next);
            }
        }
    }
    false
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
