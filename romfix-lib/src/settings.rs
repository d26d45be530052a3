//! Saved default locations for the catalog source and the ROM folder.
//!
//! The settings file is `~/.config/romfix/settings.toml`:
//!
//! ```toml
//! [audit]
//! catalog = "/data/mame0153.xml"
//! roms = "/data/roms"
//! ```

use std::io;
use std::path::{Path, PathBuf};

/// A path stored under `[audit]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditKey {
    Catalog,
    Roms,
}

impl AuditKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Roms => "roms",
        }
    }
}

/// Canonical path to the settings file: `~/.config/romfix/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("romfix").join("settings.toml")
}

/// Resolve the catalog source: CLI argument first, then the saved setting.
/// There is no fallback; `None` means the user has to supply one.
pub fn resolve_catalog_path(cli_override: Option<PathBuf>) -> Option<PathBuf> {
    cli_override.or_else(|| load_audit_path(AuditKey::Catalog))
}

/// Resolve the ROM folder using a priority chain:
///
/// 1. CLI override (if `Some`)
/// 2. Saved `audit.roms` in `settings.toml`
/// 3. Current working directory
pub fn resolve_roms_path(cli_override: Option<PathBuf>) -> PathBuf {
    if let Some(p) = cli_override {
        return p;
    }
    if let Some(p) = load_audit_path(AuditKey::Roms) {
        return p;
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Read one `[audit]` path from `settings.toml`, if set.
pub fn load_audit_path(key: AuditKey) -> Option<PathBuf> {
    load_audit_path_from(&settings_path(), key)
}

pub fn load_audit_path_from(settings: &Path, key: AuditKey) -> Option<PathBuf> {
    let contents = std::fs::read_to_string(settings).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    let value = doc.get("audit")?.get(key.as_str())?.as_str()?;
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

/// Save (or clear) one `[audit]` path in `settings.toml`.
pub fn save_audit_path(key: AuditKey, path: Option<&Path>) -> io::Result<()> {
    save_audit_path_to(&settings_path(), key, path)
}

/// Save (or clear) one `[audit]` path in the given settings file.
///
/// Uses `toml::Value` for a surgical update so unrelated keys survive.
pub fn save_audit_path_to(settings: &Path, key: AuditKey, path: Option<&Path>) -> io::Result<()> {
    let mut doc: toml::Value = if let Ok(contents) = std::fs::read_to_string(settings) {
        contents
            .parse()
            .unwrap_or_else(|_| toml::Value::Table(Default::default()))
    } else {
        toml::Value::Table(Default::default())
    };

    // Ensure [audit] table exists
    let table = doc
        .as_table_mut()
        .ok_or_else(|| io::Error::other("settings.toml root is not a table"))?;
    let audit = table
        .entry("audit")
        .or_insert_with(|| toml::Value::Table(Default::default()));
    let audit_table = audit
        .as_table_mut()
        .ok_or_else(|| io::Error::other("[audit] is not a table"))?;

    match path {
        Some(p) => {
            audit_table.insert(
                key.as_str().to_string(),
                toml::Value::String(p.to_string_lossy().into_owned()),
            );
        }
        None => {
            audit_table.remove(key.as_str());
        }
    }

    // Write atomically
    if let Some(parent) = settings.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let serialized = toml::to_string_pretty(&doc).map_err(io::Error::other)?;
    let tmp = settings.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized)?;
    std::fs::rename(&tmp, settings)?;

    log::debug!("Updated audit.{} in {}", key.as_str(), settings.display());
    Ok(())
}

/// Load the full settings file as a pretty-printed TOML string for display.
pub fn load_settings_string() -> Option<String> {
    load_settings_string_from(&settings_path())
}

pub fn load_settings_string_from(settings: &Path) -> Option<String> {
    let contents = std::fs::read_to_string(settings).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    toml::to_string_pretty(&doc).ok()
}
