// SPDX-FileCopyrightText: 2026 Plugsite Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugsite - a self-hosted plugin update repository for JetBrains IDEs.
//!
//! This is the binary entry point. It is the only place the process exits
//! with a failure status.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod build;
mod serve;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgGroup, CommandFactory, Parser, ValueEnum};
use plugsite_config::{ConfigError, DEFAULT_CONFIG_FILE};
use plugsite_core::{ErrorKind, PlugsiteError};

/// Exit status of a build that skipped some plugins.
const EXIT_PARTIAL: u8 = 3;

/// Exit status after Ctrl-C.
const EXIT_CANCELLED: u8 = 130;

/// Plugsite - build and serve a plugin update repository.
#[derive(Parser, Debug)]
#[command(name = "plugsite", version, about, long_about = None)]
#[command(group(ArgGroup::new("mode").args(["build", "serve"])))]
struct Cli {
    /// Download plugins and write the repository into `dir`.
    #[arg(long)]
    build: bool,

    /// Serve `dir` over HTTP.
    #[arg(long)]
    serve: bool,

    /// Configuration file (YAML, or TOML by extension).
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Skip plugins that fail instead of aborting the build.
    #[arg(long)]
    keep_going: bool,

    /// How errors are printed to stderr.
    #[arg(long, value_enum, default_value_t = ErrorFormat::Human)]
    error_format: ErrorFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ErrorFormat {
    Human,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Build,
    Serve,
}

impl Cli {
    fn mode(&self) -> Option<Mode> {
        if self.build {
            Some(Mode::Build)
        } else if self.serve {
            Some(Mode::Serve)
        } else {
            None
        }
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Completed,
    Partial,
    Cancelled,
}

impl Outcome {
    fn status(self) -> u8 {
        match self {
            Outcome::Completed => 0,
            Outcome::Partial => EXIT_PARTIAL,
            Outcome::Cancelled => EXIT_CANCELLED,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(mode) = cli.mode() else {
        let _ = Cli::command().print_help();
        println!();
        return ExitCode::SUCCESS;
    };

    let mut config = match plugsite_config::load_and_validate(&cli.config) {
        Ok(config) => config,
        Err(errors) => {
            report_config_errors(&errors, cli.error_format);
            return ExitCode::from(ErrorKind::Config.exit_code());
        }
    };
    if cli.keep_going {
        config.build.keep_going = true;
    }

    init_tracing(&config.log_level);
    tracing::debug!(config = %cli.config.display(), ?mode, "configuration loaded");

    let result = match mode {
        Mode::Build => build::run(&config).await,
        Mode::Serve => serve::run(&config).await,
    };

    match result {
        Ok(outcome) => ExitCode::from(outcome.status()),
        Err(err) => {
            report_error(&err, cli.error_format);
            ExitCode::from(err.exit_code())
        }
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` takes precedence over
/// `logLevel`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("plugsite={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

fn error_json(kind: ErrorKind, message: &str) -> serde_json::Value {
    serde_json::json!({
        "error": kind.to_string(),
        "message": message,
        "exit_code": kind.exit_code(),
    })
}

fn report_error(err: &PlugsiteError, format: ErrorFormat) {
    match format {
        ErrorFormat::Human => eprintln!("plugsite: {err}"),
        ErrorFormat::Json => eprintln!("{}", error_json(err.kind(), &err.to_string())),
    }
}

fn report_config_errors(errors: &[ConfigError], format: ErrorFormat) {
    match format {
        ErrorFormat::Human => plugsite_config::render_errors(errors),
        ErrorFormat::Json => {
            let kind = errors
                .first()
                .map(ConfigError::kind)
                .unwrap_or(ErrorKind::Config);
            let message = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            eprintln!("{}", error_json(kind, &message));
        }
    }
}
