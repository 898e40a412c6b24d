//! agentdock CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or configuration
//! - 3: Entry point resolution failure
//! - 4: Invalid return type
//! - 5: Dependency manifest error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

use dock_deploy::DeployError;
use dock_module::ModuleError;
use dock_resolver::ResolveError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const RESOLUTION_FAILURE: u8 = 3;
    pub const INVALID_RETURN_TYPE: u8 = 4;
    pub const DEPENDENCY_MANIFEST: u8 = 5;
}

/// Crates whose logs are shown at the chosen level.
const LOG_TARGETS: [&str; 5] = [
    "agentdock",
    "dock_module",
    "dock_resolver",
    "dock_deploy",
    "dock_server",
];

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match cli.command {
        Commands::Inspect(args) => commands::inspect::execute(args).await,
        Commands::List(args) => commands::list::execute(args).await,
        Commands::Requirements(args) => commands::requirements::execute(args).await,
        Commands::Plan(args) => commands::plan::execute(args).await,
        Commands::Check(args) => commands::check::execute(args).await,
        Commands::Serve(args) => commands::serve::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Logs go to stderr so `--json` output stays parseable. `RUST_LOG` wins
/// over the flags when set.
fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        LOG_TARGETS
            .iter()
            .filter_map(|target| format!("{}={}", target, level).parse::<Directive>().ok())
            .fold(EnvFilter::new("warn"), EnvFilter::add_directive)
    });

    let registry = tracing_subscriber::registry().with(filter);
    let log_result = if cli.log_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if cause.downcast_ref::<ResolveError>().is_some() {
            return ExitCodes::RESOLUTION_FAILURE;
        }
        if let Some(err) = cause.downcast_ref::<DeployError>() {
            return match err {
                DeployError::Resolve(_) => ExitCodes::RESOLUTION_FAILURE,
                DeployError::InvalidReturnType { .. } | DeployError::InvalidApp { .. } => {
                    ExitCodes::INVALID_RETURN_TYPE
                }
                DeployError::RequirementsNotFound(_) | DeployError::NoDependencies(_) => {
                    ExitCodes::DEPENDENCY_MANIFEST
                }
                DeployError::Module(ModuleError::Invocation { .. }) => ExitCodes::GENERAL_ERROR,
                DeployError::Io(_) => ExitCodes::GENERAL_ERROR,
                _ => ExitCodes::INVALID_ARGS,
            };
        }
        if let Some(err) = cause.downcast_ref::<ModuleError>() {
            return match err {
                ModuleError::Invocation { .. } | ModuleError::Io(_) => ExitCodes::GENERAL_ERROR,
                _ => ExitCodes::INVALID_ARGS,
            };
        }
    }
    ExitCodes::GENERAL_ERROR
}
