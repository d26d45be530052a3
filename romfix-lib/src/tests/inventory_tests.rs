use super::*;
use std::cell::RefCell;
use std::sync::atomic::Ordering;

use romfix_core::Location;

use crate::scanner::{DEFAULT_EXTENSIONS, extension_set};
use crate::test_support::MemoryReader;

fn locations(inventory: &Inventory, size: u64, crc32: Crc32) -> Vec<Location> {
    inventory
        .content_matches(size, crc32)
        .map(|(archive, entry)| Location::new(&archive.name, &entry.name))
        .collect()
}

fn sample() -> Inventory {
    let mut reader = MemoryReader::new();
    reader
        .add_archive("pacman", &[("pacman.6e", "PACMAN6E"), ("pacman.6f", "PACMAN6F")])
        .add_archive("misc", &[("renamed.bin", "PACMAN6E")])
        .add_broken("broken", "invalid Zip archive: Could not find EOCD");
    reader.into_inventory()
}

#[test]
fn indexes_archives_and_entries_by_name() {
    let inventory = sample();
    assert_eq!(inventory.len(), 3);
    assert_eq!(inventory.entry_count(), 3);

    let entry = inventory.entry_by_name("pacman", "pacman.6f").unwrap();
    assert_eq!(entry.size, 8);
    assert_eq!(entry.crc32, Crc32(crc32fast::hash(b"PACMAN6F")));
    assert!(entry.cached_sha1().is_none());

    assert!(inventory.entry_by_name("pacman", "nope").is_none());
    assert!(inventory.entry_by_name("galaga", "pacman.6e").is_none());
}

#[test]
fn unreadable_archive_keeps_its_error() {
    let inventory = sample();
    let broken = inventory.archive("broken").unwrap();
    assert!(!broken.is_readable());
    assert!(broken.entries.is_empty());
    assert!(broken.open_error.as_deref().unwrap().contains("EOCD"));
}

#[test]
fn content_index_finds_every_copy() {
    let inventory = sample();
    let crc = Crc32(crc32fast::hash(b"PACMAN6E"));
    assert_eq!(
        locations(&inventory, 8, crc),
        vec![
            Location::new("pacman", "pacman.6e"),
            Location::new("misc", "renamed.bin"),
        ]
    );
    // Same CRC but different size is not a match
    assert!(locations(&inventory, 9, crc).is_empty());
}

#[test]
fn digest_is_computed_once_and_cached() {
    let mut reader = MemoryReader::new();
    reader.add_archive("pacman", &[("pacman.6e", "abc")]);
    let reads = reader.reads.clone();
    let inventory = reader.into_inventory();

    let first = inventory.compute_digest("pacman", "pacman.6e").unwrap();
    let second = inventory.compute_digest("pacman", "pacman.6e").unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_string(), "a9993e364706816aba3e25717850c26c9cd0d89d");
    assert_eq!(reads.load(Ordering::SeqCst), 1);
    assert_eq!(
        inventory
            .entry_by_name("pacman", "pacman.6e")
            .unwrap()
            .cached_sha1(),
        Some(first)
    );
}

#[test]
fn digest_errors_are_specific() {
    let inventory = sample();
    assert!(matches!(
        inventory.compute_digest("galaga", "x"),
        Err(InventoryError::ArchiveNotFound(_))
    ));
    assert!(matches!(
        inventory.compute_digest("pacman", "x"),
        Err(InventoryError::EntryNotFound { .. })
    ));
    assert!(matches!(
        inventory.compute_digest("broken", "x"),
        Err(InventoryError::Unreadable { .. })
    ));
}

#[test]
fn duplicate_archive_names_resolve_to_the_first() {
    let mut reader = MemoryReader::new();
    reader
        .add_at(PathBuf::from("/a/pacman.zip"), &[("one", "1")])
        .add_at(PathBuf::from("/b/pacman.zip"), &[("two", "2")]);
    let inventory = reader.into_inventory();
    assert_eq!(inventory.len(), 2);
    assert!(inventory.entry_by_name("pacman", "one").is_some());
    assert!(inventory.entry_by_name("pacman", "two").is_none());
    // Still visible to content search
    assert_eq!(locations(&inventory, 1, Crc32(crc32fast::hash(b"2"))).len(), 1);
}

#[test]
fn build_isolates_unreadable_archives() {
    let tmp = tempfile::TempDir::new().unwrap();
    let good = tmp.path().join("good.zip");
    let bad = tmp.path().join("bad.zip");
    std::fs::write(&good, b"").unwrap();
    std::fs::write(&bad, b"").unwrap();
    std::fs::write(tmp.path().join("notes.txt"), b"").unwrap();

    let mut reader = MemoryReader::new();
    reader
        .add_at(good.clone(), &[("a.bin", "aaaa")])
        .add_broken_at(bad.clone(), "truncated");

    let events = RefCell::new(Vec::new());
    let inventory = Inventory::build(
        tmp.path(),
        &extension_set(DEFAULT_EXTENSIONS),
        Box::new(reader),
        &|p: InventoryProgress| events.borrow_mut().push(p),
    )
    .unwrap();

    let names: Vec<&str> = inventory.archives().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["bad", "good"]);
    assert_eq!(
        inventory.archive("bad").unwrap().open_error.as_deref(),
        Some("truncated")
    );
    assert_eq!(inventory.entry_by_name("good", "a.bin").unwrap().size, 4);

    let events = events.into_inner();
    assert!(matches!(events[0], InventoryProgress::Scanning { archive_count: 2 }));
    assert!(matches!(events.last(), Some(InventoryProgress::Done)));
    assert_eq!(events.len(), 4);
}

#[test]
fn build_fails_only_when_folder_is_unreadable() {
    let tmp = tempfile::TempDir::new().unwrap();
    let result = Inventory::build(
        &tmp.path().join("missing"),
        &extension_set(DEFAULT_EXTENSIONS),
        Box::new(MemoryReader::new()),
        &|_: InventoryProgress| {},
    );
    assert!(matches!(result, Err(InventoryError::Io(_))));
}
