//! clubcheck CLI library
//!
//! Argument parsing, logging setup and console output for the `clubcheck`
//! binary.

#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod logging;
mod output;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, ListArgs, RunArgs, SelectArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::init_logging;
pub use output::Reporter;
