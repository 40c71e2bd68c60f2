//! vault-setup CLI - Obsidian vault provisioning
//!
//! Copies bundle assets into a vault and configures the Templater plugin.

use anyhow::Context;
use clap::Parser;
use console::style;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vault_setup::config::{CliArgs, SetupOptions};
use vault_setup::core::SetupOrchestrator;
use vault_setup::progress::ProgressReporter;

fn main() {
    // Parse CLI arguments
    let args = CliArgs::parse();

    init_logging(args.verbose);

    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {:#}", style("❌").red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Initialize logging; `RUST_LOG` wins over `--verbose`
fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        EnvFilter::new(level)
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &CliArgs) -> anyhow::Result<bool> {
    let options = SetupOptions::from_cli(args).context("Invalid arguments")?;
    tracing::debug!("Resolved options: {:?}", options);

    let reporter = Arc::new(if args.quiet {
        ProgressReporter::disabled()
    } else {
        ProgressReporter::new()
    });

    let report = SetupOrchestrator::new(options)
        .with_reporter(Arc::clone(&reporter))
        .run();

    if !args.quiet {
        println!();
        for line in reporter.summary().lines() {
            println!("  {}", style(line).dim());
        }
    }

    if let Some(error) = &report.error {
        tracing::debug!("Setup ended with: {:?}", error);
        if args.quiet {
            eprintln!("{} {}", style("❌").red().bold(), error);
        }
    }

    Ok(report.is_success())
}
