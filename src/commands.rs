//! Command-line interface definition for mbackup.
//!
//! This module defines the `perform`, `check` and `list` commands and the
//! handlers that turn them into a process exit status.

use crate::archiver::Archiver;
use crate::config::{ConfigFile, LoadConfig, Paths};
use crate::constants::ROOT_PATH_ENV;
use crate::error::PrepareError;
use crate::logging::{self, LogOptions, Logging};
use crate::outcome::RunLog;
use crate::registry::ModelRegistry;
use crate::runner::Runner;
use crate::sysexits;
use crate::trigger::{self, split_patterns};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

/// Command-line interface definition for mbackup.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log level when RUST_LOG is not set (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub commands: Option<Commands>,
}

/// Supported mbackup commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Perform the models matching one or more triggers.
    Perform(PerformArgs),
    /// Load the configuration and report any errors or warnings.
    Check(LocationArgs),
    /// List declared models, optionally filtered by trigger.
    List {
        /// Comma-delimited triggers; `*` matches any run of characters.
        #[arg(short, long)]
        trigger: Option<String>,
        #[command(flatten)]
        locations: LocationArgs,
    },
}

/// Where to find the configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct LocationArgs {
    /// Root path; the configuration file and logs default to paths under it.
    #[arg(short, long, env = ROOT_PATH_ENV)]
    pub root_path: Option<PathBuf>,
    /// Path to the configuration file.
    #[arg(short, long)]
    pub config_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct PerformArgs {
    /// Comma-delimited triggers; `*` matches any run of characters.
    #[arg(short, long, required = true)]
    pub trigger: String,
    #[command(flatten)]
    pub locations: LocationArgs,
    /// Directory for the logfile. Defaults to `<root-path>/log`.
    #[arg(short, long)]
    pub log_path: Option<PathBuf>,
    /// Disable console output.
    #[arg(short, long)]
    pub quiet: bool,
    /// Disable the logfile.
    #[arg(long)]
    pub no_logfile: bool,
    /// Only check the configuration, as the `check` command does.
    #[arg(long)]
    pub check: bool,
}

/// Runs a command and returns the process exit status.
pub fn dispatch(commands: Commands, log_level: &str) -> i32 {
    match commands {
        Commands::Perform(args) if args.check => check(&args.locations, log_level),
        Commands::Perform(args) => perform(&args, log_level),
        Commands::Check(locations) => check(&locations, log_level),
        Commands::List { trigger, locations } => list(trigger.as_deref(), &locations, log_level),
    }
}

/// Performs every model matching `args.trigger`.
///
/// Returns 0, 1 or 2 from the aggregated outcome, or 3 when the run could not
/// be prepared.
pub fn perform(args: &PerformArgs, log_level: &str) -> i32 {
    let paths = match resolve_paths(&args.locations, args.log_path.clone()) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("{e:#}");
            return sysexits::EX_PREPARE;
        }
    };
    let mut logging = init_logging(&LogOptions {
        level: log_level.to_string(),
        quiet: args.quiet,
        logfile: !args.no_logfile,
        log_path: paths.log_path.clone(),
    });

    let patterns = split_patterns(&args.trigger);
    let mut runner = Runner::new(ConfigFile::new(&paths.config_file), Archiver);
    let prepared = match runner.prepare(&patterns) {
        Ok(prepared) => prepared,
        Err(e) => return abort(&e),
    };
    // The logfile only records runs that got past preparation.
    if let Some(logging) = logging.as_mut() {
        logging.start_logfile();
    }

    let report = runner.perform(&prepared);
    let status = report.status();
    info!(models = report.models.len(), code = status.code(), "Finished performing");
    status.code()
}

/// Loads the configuration without performing anything.
///
/// Fails with status 1 when loading raises or records any warning.
pub fn check(locations: &LocationArgs, log_level: &str) -> i32 {
    let _logging = init_logging(&LogOptions::console(log_level));
    let paths = match resolve_paths(locations, None) {
        Ok(paths) => paths,
        Err(e) => {
            error!("{e:#}");
            error!("Configuration Check Failed");
            return sysexits::EX_WARNINGS;
        }
    };

    let mut registry = ModelRegistry::new();
    let mut log = RunLog::new();
    let loaded = ConfigFile::new(&paths.config_file).load_config(&mut registry, &mut log);
    let failed = match loaded {
        Err(e) => {
            error!("{e:#}");
            true
        }
        Ok(()) => log.has_warnings() || log.has_errors(),
    };

    if failed {
        error!("Configuration Check Failed");
        sysexits::EX_WARNINGS
    } else {
        info!("Configuration Check Succeeded");
        sysexits::EX_OK
    }
}

/// Prints `trigger<TAB>label` for each selected model, in run order.
pub fn list(trigger: Option<&str>, locations: &LocationArgs, log_level: &str) -> i32 {
    let _logging = init_logging(&LogOptions::console(log_level));
    let paths = match resolve_paths(locations, None) {
        Ok(paths) => paths,
        Err(e) => return abort(&PrepareError::configuration(&e)),
    };

    let mut registry = ModelRegistry::new();
    if let Err(e) =
        ConfigFile::new(&paths.config_file).load_config(&mut registry, &mut RunLog::new())
    {
        return abort(&PrepareError::configuration(&e));
    }

    let ids = match trigger {
        Some(value) => match trigger::resolve(&split_patterns(value), &registry) {
            Ok(ids) => ids,
            Err(e) => return abort(&e),
        },
        None => registry.iter().map(|(id, _)| id).collect(),
    };
    for id in ids {
        let model = &registry[id];
        println!("{}\t{}", model.trigger, model.label);
    }
    sysexits::EX_OK
}

fn resolve_paths(locations: &LocationArgs, log_path: Option<PathBuf>) -> anyhow::Result<Paths> {
    Paths::resolve(
        locations.root_path.clone(),
        locations.config_file.clone(),
        log_path,
    )
}

fn init_logging(options: &LogOptions) -> Option<Logging> {
    match logging::init(options) {
        Ok(logging) => Some(logging),
        Err(e) => {
            eprintln!("{e:#}");
            None
        }
    }
}

/// Reports a preparation failure and returns its exit status.
fn abort(err: &PrepareError) -> i32 {
    error!("{err}");
    error!("Backup aborted");
    err.exit_code()
}
