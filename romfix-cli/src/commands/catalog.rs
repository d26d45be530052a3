use std::collections::HashSet;
use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use romfix_dat::{Catalog, parse_dat_file};

use crate::CliError;
use crate::commands::audit::{log_diagnostic, require_catalog_path};

/// Parse and build the catalog behind a spinner.
pub(crate) fn load_catalog(path: &Path, quiet: bool) -> Result<Catalog, CliError> {
    let pb = crate::spinner::spinner(quiet, format!("Loading {}...", path.display()));
    let loaded = parse_dat_file(path).and_then(Catalog::from_dat);
    pb.finish_and_clear();
    Ok(loaded?)
}

/// Run the catalog command: load a source and report on it.
pub(crate) fn run_catalog(catalog: Option<PathBuf>, quiet: bool) -> Result<(), CliError> {
    let path = require_catalog_path(catalog)?;
    let catalog = load_catalog(&path, quiet)?;

    let clones = catalog.sets().filter(|s| s.is_clone()).count();
    let bioses: HashSet<&str> = catalog
        .sets()
        .filter_map(|s| s.effective_bios_name.as_deref())
        .collect();

    log::info!(
        "{}",
        path.display().if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Sets:            {}", catalog.len());
    log::info!("  Clones:          {}", clones);
    log::info!("  Bios sets used:  {}", bioses.len());
    log::info!("  Entries:         {}", catalog.entry_count());
    log::info!(
        "  Nodump skipped:  {}",
        catalog.dropped_nodump().if_supports_color(Stdout, |t| t.dimmed()),
    );
    crate::log_blank();

    if catalog.integrity().is_empty() {
        log::info!(
            "{} No integrity problems",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::warn!(
            "{} integrity problems:",
            catalog.integrity().len().if_supports_color(Stdout, |t| t.yellow()),
        );
        for diagnostic in catalog.integrity() {
            log_diagnostic(diagnostic);
        }
    }
    Ok(())
}
