//! tempfile - create a temporary file in a safe manner.
//!
//! Prints the name of the created file on stdout.

use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};

use debutils::config::Environment;
use debutils::diag::Diag;
use debutils::mktemp::{self, Request, DEFAULT_MODE};

#[derive(Parser)]
#[command(name = "tempfile")]
#[command(version, about = "Create a temporary file in a safe manner.")]
#[command(disable_help_flag = true, disable_version_flag = true)]
#[command(args_override_self = true)]
struct Cli {
    /// Place temporary file in DIR
    #[arg(short, long, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Open with MODE instead of 0600
    #[arg(short, long, value_name = "MODE", allow_hyphen_values = true)]
    mode: Option<String>,

    /// Use FILE instead of a generated name
    #[arg(short, long, value_name = "FILE")]
    name: Option<PathBuf>,

    /// Set temporary file's prefix to STRING
    #[arg(short, long, value_name = "STRING")]
    prefix: Option<String>,

    /// Set temporary file's suffix to STRING
    #[arg(short, long, value_name = "STRING")]
    suffix: Option<String>,

    /// Display this help and exit
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Output version information and exit
    #[arg(long, action = ArgAction::Version)]
    version: Option<bool>,
}

fn print_path(path: &Path) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(path.as_os_str().as_bytes())
        .and_then(|()| stdout.write_all(b"\n"))
        .and_then(|()| stdout.flush())
        .context("write stdout")
}

fn main() -> ExitCode {
    let diag = Diag::from_argv0(std::env::args_os().next(), "tempfile");

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return diag.clap(err),
    };

    let mode = match cli.mode.as_deref().map(mktemp::parse_mode).transpose() {
        Ok(mode) => mode.unwrap_or(DEFAULT_MODE),
        Err(err) => return diag.usage(&err),
    };

    let request = Request {
        directory: cli.directory,
        prefix: cli.prefix,
        suffix: cli.suffix,
        name: cli.name,
        mode,
    };

    let env = Environment::load();
    match mktemp::create(&request, &env).and_then(|path| print_path(&path)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => diag.fatal(&err),
    }
}
