//! romfix CLI
//!
//! Command-line interface for auditing MAME-style ROM sets.

mod cli_types;
mod commands;
mod error;
mod spinner;

use std::io::Write;

use clap::Parser;
use log::LevelFilter;

use cli_types::{Cli, Commands, ConfigAction, OutputFormat};
pub(crate) use error::CliError;

fn main() {
    let cli = Cli::parse();

    // Keep stdout clean for machine-readable output
    let machine_output = matches!(&cli.command, Commands::Audit(args) if args.format == OutputFormat::Json);
    init_logger(cli.quiet || machine_output, cli.verbose, machine_output);

    let result = match cli.command {
        Commands::Audit(args) => commands::audit::run_audit(args, cli.quiet),
        Commands::Catalog { catalog } => commands::catalog::run_catalog(catalog, cli.quiet),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(),
            ConfigAction::Path => commands::config::run_config_path(),
            ConfigAction::SetCatalog { path } => commands::config::run_config_set_catalog(path),
            ConfigAction::SetRoms { path } => commands::config::run_config_set_roms(path),
            ConfigAction::Clear => commands::config::run_config_clear(),
        },
    };

    if let Err(e) = result {
        log::error!("Error: {e}");
        std::process::exit(1);
    }
}

/// Route `log` output to the terminal.
///
/// Normal output is the bare message; `--verbose` switches to env_logger's
/// timestamped format. `RUST_LOG` still overrides the level.
fn init_logger(quiet: bool, verbose: bool, to_stderr: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();
    builder.target(if to_stderr {
        env_logger::Target::Stderr
    } else {
        env_logger::Target::Stdout
    });
    if verbose {
        builder.format_timestamp_secs();
    } else {
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    }
    builder.init();
}

/// Log an empty line at info level.
pub(crate) fn log_blank() {
    log::info!("");
}
