//! Command-line argument definitions and the parse pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser as ClapParser;
use core_types::{Location, ParseError};
use parser::{ParseMode, ParseOptions, Parser};

use crate::error::CliResult;

/// Parse ECMAScript files and print their ESTree JSON.
#[derive(ClapParser, Debug)]
#[command(name = "estree", version, about)]
pub struct Cli {
    /// Input files to parse as scripts
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Compute a file URI for the given path, falling back to the path text when
/// it cannot be made absolute.
pub fn file_uri(path: &Path) -> String {
    match path.canonicalize() {
        Ok(abs) => format!("file://{}", abs.display()),
        Err(_) => path.display().to_string(),
    }
}

/// Read and parse one file in script mode, returning the pretty-printed
/// ESTree JSON.
pub fn parse_file(path: &Path) -> CliResult<String> {
    let uri: Arc<str> = file_uri(path).into();

    let bytes = std::fs::read(path)?;
    let source = String::from_utf8(bytes).map_err(|e| {
        ParseError::encoding(e.to_string(), Location::start(Some(uri.clone())))
    })?;

    let program = Parser::with_uri(&source, uri).parse(ParseOptions {
        mode: ParseMode::Script,
    })?;

    let estree = program.estree();
    Ok(serde_json::to_string_pretty(&estree).map_err(std::io::Error::other)?)
}
