//! Factline CLI library.
//!
//! Configuration loading, service wiring, command execution and output
//! formatting for the `factline` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod runtime;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
pub use runtime::Runtime;
