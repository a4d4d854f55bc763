//! Command-line surface and the configuration derived from it.

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(
    name = "memwarden",
    version,
    about = "Trim this process's memory, list memory-heavy processes, optionally terminate them",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Diagnostics written to stderr
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// One-shot command; without one the interactive menu starts
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Trim the current process's working set and print before/after KB
    Trim,
    /// List processes using at least THRESHOLD_MB megabytes of resident memory
    List {
        threshold_mb: u64,
        /// Try to terminate every listed process (use with care)
        #[arg(long)]
        kill: bool,
    },
    /// Demonstration: trim once with explanatory messages
    Alt,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Runtime settings. Everything comes from the command line.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub log_level: LevelFilter,
}

impl From<&Cli> for Config {
    fn from(cli: &Cli) -> Self {
        Self {
            log_level: cli.log_level.into(),
        }
    }
}

/// Parse `args` (including the program name) without exiting on error.
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
