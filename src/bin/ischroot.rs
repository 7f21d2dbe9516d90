//! ischroot - detect if running in a chroot.
//!
//! Exit status: 0 when not in a chroot (or under fakechroot), 1 when in a
//! chroot, 2 when detection failed and no default was requested.

use std::process::ExitCode;

use clap::Parser;

use debutils::chroot::{self, Fallback};
use debutils::config::Environment;
use debutils::diag::Diag;

#[derive(Parser)]
#[command(name = "ischroot")]
#[command(version, about = "Detect if running in a chroot")]
#[command(args_override_self = true)]
struct Cli {
    /// Return false if detection fails
    #[arg(short = 'f', long)]
    default_false: bool,

    /// Return true if detection fails
    #[arg(short = 't', long)]
    default_true: bool,
}

fn main() -> ExitCode {
    let diag = Diag::from_argv0(std::env::args_os().next(), "ischroot");

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return diag.clap(err),
    };

    let fallback = match Fallback::from_flags(cli.default_false, cli.default_true) {
        Ok(fallback) => fallback,
        Err(err) => return diag.usage(&err),
    };

    let env = Environment::load();
    let probe = chroot::platform_probe();
    let detection = chroot::detect(&env, &*probe);

    ExitCode::from(detection.exit_code(fallback))
}
