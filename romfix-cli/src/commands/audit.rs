use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use romfix_core::{Diagnostic, DiagnosticKind, Relocation};
use romfix_dat::{Catalog, Set};
use romfix_lib::settings::{resolve_catalog_path, resolve_roms_path};
use romfix_lib::{
    AuditSummary, Inventory, InventoryProgress, ReconcileOptions, Reconciler, ZipReader,
    extension_set,
};

use crate::CliError;
use crate::cli_types::{AuditArgs, OutputFormat};
use crate::commands::catalog::load_catalog;

/// Run the audit command.
pub(crate) fn run_audit(args: AuditArgs, quiet: bool) -> Result<(), CliError> {
    let catalog_path = require_catalog_path(args.catalog)?;
    let roms_path = resolve_roms_path(args.roms);

    log::info!(
        "Catalog: {}",
        catalog_path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    log::info!(
        "ROMs:    {}",
        roms_path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    if args.verify_sha1 {
        log::info!(
            "{}",
            "SHA1 verification enabled: matching entries are read in full"
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    crate::log_blank();

    let hide_progress = quiet || args.format == OutputFormat::Json;
    let catalog = load_catalog(&catalog_path, hide_progress)?;
    for diagnostic in catalog.integrity() {
        emit(diagnostic, args.format);
    }

    let pb = crate::spinner::spinner(hide_progress, "Scanning archives...");
    let progress = |p: InventoryProgress| match p {
        InventoryProgress::Scanning { archive_count } => {
            pb.set_message(format!("Found {archive_count} archives"));
        }
        InventoryProgress::Reading { name, index, total } => {
            pb.set_message(format!("[{}/{}] {}", index + 1, total, name));
        }
        InventoryProgress::Done => pb.finish_and_clear(),
    };
    let inventory = Inventory::build(
        &roms_path,
        &extension_set(args.ext.as_slice()),
        Box::new(ZipReader),
        &progress,
    );
    pb.finish_and_clear();
    let inventory = inventory?;

    let sets = select_sets(&catalog, &args.sets)?;
    let options = ReconcileOptions {
        verify_digests: args.verify_sha1,
    };
    let reconciler = Reconciler::new(&catalog, &inventory, options);
    let mut summary = reconciler.audit(sets, |d| emit(d, args.format));

    // Stray archives only make sense against the whole catalog
    if args.sets.is_empty() {
        for diagnostic in reconciler.unknown_archives() {
            emit(&diagnostic, args.format);
            summary.record_unknown(&diagnostic);
        }
    }

    match args.format {
        OutputFormat::Text => print_summary(&summary),
        OutputFormat::Json => print_json(&serde_json::json!({ "summary": summary })),
    }
    Ok(())
}

pub(crate) fn require_catalog_path(cli_override: Option<PathBuf>) -> Result<PathBuf, CliError> {
    resolve_catalog_path(cli_override).ok_or_else(|| {
        CliError::config(
            "no catalog source given; pass --catalog or save one with `romfix config set-catalog`",
        )
    })
}

/// The sets named with `--set`, or the whole catalog when none were given.
fn select_sets<'c>(
    catalog: &'c Catalog,
    names: &[String],
) -> Result<Vec<&'c Set>, CliError> {
    if names.is_empty() {
        return Ok(catalog.sets().collect());
    }
    names
        .iter()
        .map(|name| {
            catalog
                .lookup(name)
                .ok_or_else(|| CliError::other(format!("Unknown set: {name}")))
        })
        .collect()
}

fn emit(diagnostic: &Diagnostic, format: OutputFormat) {
    match format {
        OutputFormat::Text => log_diagnostic(diagnostic),
        OutputFormat::Json => print_json(diagnostic),
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{line}"),
        Err(e) => log::error!("Could not serialize output: {e}"),
    }
}

/// Log one diagnostic as a colored line, with its relocation underneath.
///
/// Diagnostics are logged at warn level so `--quiet` still shows them.
pub(crate) fn log_diagnostic(d: &Diagnostic) {
    let mut line = if d.kind.is_integrity() || d.kind == DiagnosticKind::UnknownArchive {
        format!(
            "  {} {}: {}",
            "!".if_supports_color(Stdout, |t| t.yellow()),
            d.set_name.if_supports_color(Stdout, |t| t.bold()),
            d.kind.label().if_supports_color(Stdout, |t| t.yellow()),
        )
    } else {
        format!(
            "  {} {}: {}",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            d.set_name.if_supports_color(Stdout, |t| t.bold()),
            d.kind.label().if_supports_color(Stdout, |t| t.red()),
        )
    };
    if let Some(ref entry) = d.entry_name {
        line.push(' ');
        line.push_str(entry);
    }
    if let Some(ref detail) = d.detail {
        line.push_str(&format!(
            " {}",
            format!("({detail})").if_supports_color(Stdout, |t| t.dimmed())
        ));
    }
    log::warn!("{line}");

    match d.relocation {
        Some(Relocation::Found(ref locations)) => {
            log::warn!("      found elsewhere:");
            for location in locations {
                log::warn!(
                    "        {}",
                    location.if_supports_color(Stdout, |t| t.cyan())
                );
            }
        }
        Some(ref other) => {
            log::warn!("      {}", other.if_supports_color(Stdout, |t| t.dimmed()));
        }
        None => {}
    }
}

fn print_summary(summary: &AuditSummary) {
    crate::log_blank();
    if summary.total() == 0 {
        log::info!(
            "{} All {} sets verified",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            summary.sets_checked,
        );
        return;
    }

    log::info!(
        "{} sets checked, {} clean, {} with problems",
        summary.sets_checked,
        summary.sets_clean.if_supports_color(Stdout, |t| t.green()),
        (summary.sets_checked - summary.sets_clean).if_supports_color(Stdout, |t| t.red()),
    );
    if summary.unknown_archives > 0 {
        log::info!(
            "{} archives not in the catalog",
            summary.unknown_archives.if_supports_color(Stdout, |t| t.yellow()),
        );
    }
    for (kind, count) in &summary.by_kind {
        log::info!("  {:>7}  {}", count, kind);
    }
}
