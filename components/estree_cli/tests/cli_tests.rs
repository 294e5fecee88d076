//! CLI argument parsing and pipeline tests.

use std::path::PathBuf;

use clap::Parser as ClapParser;
use estree_cli::{cli, Cli, CliError};

fn temp_source(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("estree_cli_{}_{}", std::process::id(), name));
    std::fs::write(&path, contents).expect("write temp source");
    path
}

#[test]
fn test_parse_args() {
    let cli = Cli::try_parse_from(["estree", "one.js", "two.js"]).unwrap();
    assert_eq!(cli.files.len(), 2);
    assert_eq!(cli.files[0], PathBuf::from("one.js"));
}

#[test]
fn test_no_files_is_an_error() {
    assert!(Cli::try_parse_from(["estree"]).is_err());
}

#[test]
fn test_parse_file_outputs_program() {
    let path = temp_source("ok.js", "var x = 1 + 2;\n");
    let json = cli::parse_file(&path).expect("parse_file");
    std::fs::remove_file(&path).ok();

    let v: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(v["type"], "Program");
    assert_eq!(v["sourceType"], "script");
    assert_eq!(v["body"][0]["type"], "VariableDeclaration");
}

#[test]
fn test_parse_file_syntax_error_carries_uri() {
    let path = temp_source("bad.js", "var = ;\n");
    let err = cli::parse_file(&path).unwrap_err();
    std::fs::remove_file(&path).ok();

    let CliError::Parse(parse_err) = err else {
        panic!("expected a parse error");
    };
    assert_eq!(parse_err.kind, core_types::ErrorKind::Syntax);
    let rendered = parse_err.to_string();
    assert!(rendered.contains("bad.js"), "error should name the file: {}", rendered);
    assert!(rendered.contains("syntax error"));
}

#[test]
fn test_parse_file_rejects_invalid_utf8() {
    let path = std::env::temp_dir().join(format!("estree_cli_{}_bin.js", std::process::id()));
    std::fs::write(&path, [0x76u8, 0x61, 0x72, 0xff, 0xfe]).expect("write temp source");
    let err = cli::parse_file(&path).unwrap_err();
    std::fs::remove_file(&path).ok();

    let CliError::Parse(parse_err) = err else {
        panic!("expected an encoding error");
    };
    assert_eq!(parse_err.kind, core_types::ErrorKind::Encoding);
}
