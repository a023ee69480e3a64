//! hashsync CLI Binary
//!
//! Command-line interface for one-way, fingerprint-based directory sync.

use clap::Parser;
use hashsync::cli::{Cli, RunContext};
use hashsync::config::ConfigLoader;
use hashsync::logging::{init_logging, log_file_path, LoggingConfig};
use std::path::Path;
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let working_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Failed to read current directory: {}", e);
            process::exit(1);
        }
    };

    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(&cli, &working_dir);

    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("hashsync starting");

    let context = match RunContext::new(working_dir, cli.config.clone()) {
        Ok(ctx) => {
            let ctx = ctx.with_overrides(
                cli.root.clone(),
                cli.destination.clone(),
                cli.manifest.clone(),
            );
            match log_file_path(&logging_config) {
                Some(log_file) => ctx.exclude(&log_file),
                None => ctx,
            }
        }
        Err(e) => {
            error!("Error loading configuration: {}", e);
            eprintln!("{}", hashsync::cli::map_error(&e));
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            info!("Command completed successfully");
            println!("{}", output);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", hashsync::cli::map_error(&e));
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli, working_dir: &Path) -> LoggingConfig {
    let mut config = if let Some(ref config_path) = cli.config {
        ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    } else {
        ConfigLoader::load(working_dir)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    };

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }

    config
}
