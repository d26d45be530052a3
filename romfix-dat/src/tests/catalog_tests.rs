use super::*;

const SHA_A: &str = "e87e059c5be45753f7e9f33dff851f16d6751181";

fn rom(name: &str, size: u64, crc: &str) -> DatRom {
    DatRom {
        name: name.into(),
        size,
        crc: Some(crc.into()),
        sha1: Some(SHA_A.into()),
        status: None,
    }
}

fn set(name: &str, cloneof: Option<&str>, romof: Option<&str>, roms: Vec<DatRom>) -> DatSet {
    DatSet {
        name: name.into(),
        description: String::new(),
        cloneof: cloneof.map(Into::into),
        romof: romof.map(Into::into),
        roms,
    }
}

fn entry<'s>(set: &'s Set, name: &str) -> &'s Entry {
    set.entries.iter().find(|e| e.name == name).unwrap()
}

fn kinds(catalog: &Catalog) -> Vec<(String, DiagnosticKind)> {
    catalog
        .integrity()
        .iter()
        .map(|d| (d.set_name.clone(), d.kind))
        .collect()
}

#[test]
fn parses_digests_and_indexes_sets() {
    let catalog = Catalog::build(vec![set(
        "pacman",
        None,
        None,
        vec![rom("pacman.6e", 4096, "C1E6AB10")],
    )])
    .unwrap();

    let pacman = catalog.lookup("pacman").unwrap();
    let entry = entry(pacman, "pacman.6e");
    assert_eq!(entry.crc32, Crc32(0xc1e6ab10));
    assert_eq!(entry.sha1.unwrap().to_string(), SHA_A);
    assert_eq!(entry.status, DumpStatus::Good);
    assert!(catalog.lookup("galaga").is_none());
    assert!(catalog.integrity().is_empty());
}

#[test]
fn nodump_entries_are_dropped_before_digest_parsing() {
    let nodump = DatRom {
        name: "pm1-2.7j".into(),
        size: 4096,
        crc: None,
        sha1: None,
        status: Some("nodump".into()),
    };
    let catalog = Catalog::build(vec![set(
        "puckman",
        None,
        None,
        vec![rom("pm1-1.7f", 4096, "f36e88ab"), nodump],
    )])
    .unwrap();

    let puckman = catalog.lookup("puckman").unwrap();
    assert_eq!(puckman.entries.len(), 1);
    assert!(!puckman.has_entry("pm1-2.7j"));
    assert_eq!(catalog.dropped_nodump(), 1);
    assert_eq!(catalog.entry_count(), 1);
}

#[test]
fn malformed_crc_is_fatal_and_names_the_entry() {
    let err = Catalog::build(vec![set(
        "pacman",
        None,
        None,
        vec![rom("pacman.6e", 4096, "not-hex")],
    )])
    .unwrap_err();

    match err {
        DatError::MalformedDigest { set, entry, .. } => {
            assert_eq!(set, "pacman");
            assert_eq!(entry, "pacman.6e");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_sha1_is_fatal() {
    let mut bad = rom("pacman.6e", 4096, "c1e6ab10");
    bad.sha1 = Some("abcd".into());
    let err = Catalog::build(vec![set("pacman", None, None, vec![bad])]).unwrap_err();
    assert!(matches!(err, DatError::MalformedDigest { .. }));
}

#[test]
fn missing_crc_on_dumped_entry_is_fatal() {
    let mut bad = rom("pacman.6e", 4096, "c1e6ab10");
    bad.crc = None;
    let err = Catalog::build(vec![set("pacman", None, None, vec![bad])]).unwrap_err();
    assert!(matches!(err, DatError::MalformedDigest { ref reason, .. } if reason.contains("missing")));
}

#[test]
fn unknown_status_is_rejected() {
    let mut odd = rom("a", 1, "00000001");
    odd.status = Some("mystery".into());
    assert!(Catalog::build(vec![set("x", None, None, vec![odd])]).is_err());
}

#[test]
fn romof_equal_to_cloneof_is_not_a_bios() {
    let catalog = Catalog::build(vec![
        set("neogeo", None, None, vec![rom("sfix.sfix", 131072, "c2ea0cfd")]),
        set("mslug", None, Some("neogeo"), vec![]),
        set("mslugx", Some("mslug"), Some("mslug"), vec![]),
    ])
    .unwrap();

    let mslugx = catalog.lookup("mslugx").unwrap();
    assert_eq!(mslugx.parent_name.as_deref(), Some("mslug"));
    assert_eq!(mslugx.bios_name, None);
    assert_eq!(mslugx.effective_bios_name.as_deref(), Some("neogeo"));
    assert_eq!(catalog.bios_of(mslugx).unwrap().name, "neogeo");
    assert_eq!(catalog.parent_of(mslugx).unwrap().name, "mslug");
}

#[test]
fn bios_is_inherited_down_long_clone_chains() {
    // Declared child-first so a single forward pass would not be enough
    let catalog = Catalog::build(vec![
        set("a", Some("b"), None, vec![]),
        set("b", Some("c"), None, vec![]),
        set("c", None, Some("d"), vec![]),
        set("d", None, None, vec![]),
    ])
    .unwrap();

    for name in ["a", "b", "c"] {
        assert_eq!(
            catalog.lookup(name).unwrap().effective_bios_name.as_deref(),
            Some("d"),
            "set {name}"
        );
    }
    assert_eq!(catalog.lookup("d").unwrap().effective_bios_name, None);
}

#[test]
fn direct_bios_shadows_inherited_bios() {
    let catalog = Catalog::build(vec![
        set("bios1", None, None, vec![]),
        set("bios2", None, None, vec![]),
        set("parent", None, Some("bios1"), vec![]),
        set("clone", Some("parent"), Some("bios2"), vec![]),
    ])
    .unwrap();
    assert_eq!(
        catalog.lookup("clone").unwrap().effective_bios_name.as_deref(),
        Some("bios2")
    );
}

#[test]
fn dangling_references_are_recorded_not_fatal() {
    let catalog = Catalog::build(vec![
        set("orphan", Some("ghost"), None, vec![]),
        set("lost", None, Some("nobios"), vec![]),
    ])
    .unwrap();

    assert_eq!(
        kinds(&catalog),
        vec![
            ("orphan".to_string(), DiagnosticKind::DanglingParent),
            ("lost".to_string(), DiagnosticKind::DanglingBios),
        ]
    );
    // The declared name is still the effective bios; only its catalog entry is missing
    let lost = catalog.lookup("lost").unwrap();
    assert_eq!(lost.effective_bios_name.as_deref(), Some("nobios"));
    assert!(catalog.bios_of(lost).is_none());
    assert!(catalog.parent_of(catalog.lookup("orphan").unwrap()).is_none());
}

#[test]
fn clone_cycle_terminates_and_is_reported() {
    let catalog = Catalog::build(vec![
        set("a", Some("b"), None, vec![]),
        set("b", Some("a"), Some("bios"), vec![]),
        set("c", Some("a"), None, vec![]),
        set("bios", None, None, vec![]),
        set("ok", None, Some("bios"), vec![]),
    ])
    .unwrap();

    let cycles: Vec<_> = catalog
        .integrity()
        .iter()
        .filter(|d| d.kind == DiagnosticKind::InheritanceCycle)
        .map(|d| d.set_name.as_str())
        .collect();
    assert_eq!(cycles, vec!["a", "b"]);

    assert_eq!(catalog.lookup("a").unwrap().effective_bios_name, None);
    assert_eq!(catalog.lookup("b").unwrap().effective_bios_name, None);
    // Hangs off the cycle without being part of it
    assert_eq!(catalog.lookup("c").unwrap().effective_bios_name, None);
    assert_eq!(
        catalog.lookup("ok").unwrap().effective_bios_name.as_deref(),
        Some("bios")
    );
}

#[test]
fn self_parent_is_a_cycle() {
    let catalog = Catalog::build(vec![set("loop", Some("loop"), None, vec![])]).unwrap();
    assert_eq!(
        kinds(&catalog),
        vec![("loop".to_string(), DiagnosticKind::InheritanceCycle)]
    );
}

#[test]
fn bios_cycle_is_reported() {
    let catalog = Catalog::build(vec![
        set("x", None, Some("y"), vec![]),
        set("y", None, Some("x"), vec![]),
    ])
    .unwrap();
    assert_eq!(catalog.integrity().len(), 2);
    assert!(
        catalog
            .integrity()
            .iter()
            .all(|d| d.kind == DiagnosticKind::InheritanceCycle)
    );
}

#[test]
fn duplicate_names_keep_the_first() {
    let catalog = Catalog::build(vec![
        set(
            "pacman",
            None,
            None,
            vec![rom("a.bin", 1, "00000001"), rom("a.bin", 2, "00000002")],
        ),
        set("pacman", None, None, vec![rom("b.bin", 3, "00000003")]),
    ])
    .unwrap();

    assert_eq!(catalog.len(), 1);
    let pacman = catalog.lookup("pacman").unwrap();
    assert_eq!(pacman.entries.len(), 1);
    assert_eq!(entry(pacman, "a.bin").size, 1);
    assert_eq!(
        kinds(&catalog),
        vec![
            ("pacman".to_string(), DiagnosticKind::DuplicateEntry),
            ("pacman".to_string(), DiagnosticKind::DuplicateSet),
        ]
    );
}

#[test]
fn from_parsed_listxml() {
    let xml = r#"<mame build="0.153">
    <machine name="neogeo"><rom name="sfix.sfix" size="131072" crc="c2ea0cfd" sha1="fd4a618cdcdbf849374f0a50dd8efe9dbab706c3"/></machine>
    <machine name="mslug" romof="neogeo"><rom name="201-p1.p1" size="2097152" crc="08d8daa5"/></machine>
</mame>"#;
    let dat = crate::dat::parse_dat(xml.as_bytes()).unwrap();
    let catalog = Catalog::from_dat(dat).unwrap();
    let names: Vec<_> = catalog.sets().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["neogeo", "mslug"]);
    assert_eq!(
        catalog.lookup("mslug").unwrap().effective_bios_name.as_deref(),
        Some("neogeo")
    );
}
