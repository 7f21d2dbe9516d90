//! Diagnostics written to standard error.
//!
//! Every message is a single line prefixed by the program name. The name is
//! carried by a [`Diag`] value handed to whoever needs to report.

use std::ffi::OsString;
use std::path::Path;
use std::process::ExitCode;

/// Exit status for usage and fatal errors.
pub const EXIT_FAILURE: u8 = 1;

/// Reporter for a single program invocation.
#[derive(Debug, Clone)]
pub struct Diag {
    progname: String,
}

impl Diag {
    pub fn new(progname: impl Into<String>) -> Self {
        Self {
            progname: progname.into(),
        }
    }

    /// Derive the program name from `argv[0]`, falling back to `default`.
    pub fn from_argv0(argv0: Option<OsString>, default: &str) -> Self {
        let progname = argv0
            .as_deref()
            .and_then(|arg| Path::new(arg).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| default.to_string());
        Self::new(progname)
    }

    pub fn progname(&self) -> &str {
        &self.progname
    }

    /// The "see --help" line appended to usage errors.
    pub fn help_hint(&self) -> String {
        format!("Try `{} --help' for more information.", self.progname)
    }

    /// Report a usage error and return the failure status.
    pub fn usage(&self, err: &anyhow::Error) -> ExitCode {
        eprintln!("{}", err);
        eprintln!("{}", self.help_hint());
        ExitCode::from(EXIT_FAILURE)
    }

    /// Report a fatal runtime error and return the failure status.
    pub fn fatal(&self, err: &anyhow::Error) -> ExitCode {
        eprintln!("{}", self.format_fatal(err));
        ExitCode::from(EXIT_FAILURE)
    }

    /// Render a fatal error as `prog: context: cause`.
    pub fn format_fatal(&self, err: &anyhow::Error) -> String {
        format!("{}: {:#}", self.progname, err)
    }

    /// Handle a `clap` parse failure.
    ///
    /// Help and version requests are not failures: clap prints them to
    /// stdout and the program exits 0. Everything else is a usage error,
    /// printed with our own help hint, and exits 1.
    pub fn clap(&self, err: clap::Error) -> ExitCode {
        use clap::error::ErrorKind;

        match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = err.print();
                ExitCode::SUCCESS
            }
            _ => {
                eprintln!("{}", self.format_clap(&err));
                eprintln!("{}", self.help_hint());
                ExitCode::from(EXIT_FAILURE)
            }
        }
    }

    /// clap's error text without its own "try --help" tip.
    pub fn format_clap(&self, err: &clap::Error) -> String {
        err.render()
            .to_string()
            .lines()
            .filter(|line| !line.trim_start().starts_with("For more information, try"))
            .collect::<Vec<_>>()
            .join("\n")
            .trim_end()
            .to_string()
    }
}
