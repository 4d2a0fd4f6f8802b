// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! svimpass - a local master-password credential vault.
//!
//! This is the binary entry point. Every subcommand runs in its own process,
//! so the vault is unlocked for the duration of a single command only.

mod commands;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// svimpass - a local master-password credential vault.
#[derive(Parser, Debug)]
#[command(name = "svimpass", version, about, long_about = None)]
struct Cli {
    /// Application configuration file, replacing the layered lookup.
    #[arg(long, global = true, env = "SVIMPASS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show whether the vault is initialized and where its record lives.
    Status {
        /// Output structured JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Create the master password.
    Init,
    /// Check the master password.
    Unlock,
    /// Replace the master password.
    ChangePassword {
        /// File of hex-encoded envelopes (one per line) to re-encrypt in place.
        #[arg(long, value_name = "FILE")]
        reseal: Option<PathBuf>,
    },
    /// Erase the master password record. Data encrypted under it is lost.
    Reset {
        /// Confirm the destructive reset.
        #[arg(long)]
        yes: bool,
    },
    /// Encrypt a value read from stdin and print the hex envelope.
    Encrypt,
    /// Decrypt a hex envelope and print the value.
    Decrypt {
        /// Hex-encoded envelope produced by `encrypt`.
        envelope: String,
    },
    /// Generate a random password.
    Generate {
        /// Password length (defaults to `generator.length`).
        #[arg(long, short)]
        length: Option<usize>,
    },
}

fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => svimpass_config::load_and_validate_path(path),
        None => svimpass_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            svimpass_config::render_errors(&errors);
            std::process::exit(2);
        }
    };

    init_tracing(&config.log.level);

    if let Err(e) = commands::run(cli.command, &config) {
        if e.is_fatal() {
            tracing::error!(error = %e, "fatal vault error");
        }
        eprintln!("error: {e}");
        std::process::exit(if e.is_fatal() { 2 } else { 1 });
    }
}

/// Initializes the tracing subscriber on stderr with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("svimpass={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
