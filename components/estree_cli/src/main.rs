//! ESTree printer entry point.
//!
//! Parses each file argument as a script and prints the ESTree JSON,
//! separated by `---` lines when multiple files are given.

use clap::Parser as ClapParser;
use estree_cli::{cli, Cli};

fn main() {
    let args = Cli::parse();

    for (i, file) in args.files.iter().enumerate() {
        if i != 0 {
            println!("---");
        }

        match cli::parse_file(file) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
    }
}
