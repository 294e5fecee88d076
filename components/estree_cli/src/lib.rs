//! ESTree printer CLI library.
//!
//! Provides argument parsing and the file-to-ESTree pipeline for the
//! `estree` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;

pub use cli::Cli;
pub use error::{CliError, CliResult};
