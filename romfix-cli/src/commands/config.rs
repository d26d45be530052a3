use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use romfix_lib::settings::{self, AuditKey};

use crate::CliError;

/// Show the saved settings.
pub(crate) fn run_config_show() -> Result<(), CliError> {
    let path = settings::settings_path();
    log::info!(
        "{}",
        "romfix settings".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    if !path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
        );
        return Ok(());
    }
    log::info!(
        "  Settings file: {} {}",
        path.display().if_supports_color(Stdout, |t| t.cyan()),
        "(exists)".if_supports_color(Stdout, |t| t.green()),
    );
    crate::log_blank();

    for key in [AuditKey::Catalog, AuditKey::Roms] {
        match settings::load_audit_path(key) {
            Some(value) => log::info!("  {:<8} {}", key.as_str(), value.display()),
            None => log::info!(
                "  {:<8} {}",
                key.as_str(),
                "(not set)".if_supports_color(Stdout, |t| t.dimmed()),
            ),
        }
    }

    if let Some(contents) = settings::load_settings_string() {
        crate::log_blank();
        for line in contents.lines() {
            log::info!("    {}", line.if_supports_color(Stdout, |t| t.dimmed()));
        }
    }
    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path() -> Result<(), CliError> {
    log::info!("{}", settings::settings_path().display());
    Ok(())
}

pub(crate) fn run_config_set_catalog(path: PathBuf) -> Result<(), CliError> {
    if !path.is_file() {
        return Err(CliError::config(format!(
            "catalog source not found: {}",
            path.display()
        )));
    }
    save(AuditKey::Catalog, path)
}

pub(crate) fn run_config_set_roms(path: PathBuf) -> Result<(), CliError> {
    if !path.is_dir() {
        return Err(CliError::config(format!(
            "ROM folder not found: {}",
            path.display()
        )));
    }
    save(AuditKey::Roms, path)
}

/// Forget both saved paths.
pub(crate) fn run_config_clear() -> Result<(), CliError> {
    settings::save_audit_path(AuditKey::Catalog, None)?;
    settings::save_audit_path(AuditKey::Roms, None)?;
    log::info!(
        "{} Cleared saved paths",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
    );
    Ok(())
}

fn save(key: AuditKey, path: PathBuf) -> Result<(), CliError> {
    // Saved paths must not depend on the directory romfix is run from
    let path = std::fs::canonicalize(&path).unwrap_or(path);
    settings::save_audit_path(key, Some(&path))?;
    log::info!(
        "{} Saved {} = {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        key.as_str(),
        path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}
