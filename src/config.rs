//! Configuration for the utilities.
//!
//! Both tools are configured only through the process environment. The
//! variables they consult are captured once at startup so the library code
//! can be driven by an explicit snapshot instead of reading globals.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// Set to "true" by the fakechroot wrapper.
pub const FAKECHROOT: &str = "FAKECHROOT";
/// Fake root directory used by fakechroot.
pub const FAKECHROOT_BASE: &str = "FAKECHROOT_BASE";
/// Dynamic loader preload list.
pub const LD_PRELOAD: &str = "LD_PRELOAD";
/// Preferred directory for temporary files.
pub const TMPDIR: &str = "TMPDIR";

/// Snapshot of the environment variables the tools care about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub fakechroot: Option<OsString>,
    pub fakechroot_base: Option<OsString>,
    pub ld_preload: Option<OsString>,
    pub tmpdir: Option<PathBuf>,
}

impl Environment {
    /// Capture the current process environment.
    pub fn load() -> Self {
        Self::from_vars(std::env::vars_os())
    }

    /// Build a snapshot from arbitrary `KEY=value` pairs.
    ///
    /// Later pairs win, matching how a shell would export duplicates.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<OsStr>,
        V: Into<OsString>,
    {
        let mut env = Self::default();
        for (key, value) in vars {
            let key = key.as_ref();
            if key == FAKECHROOT {
                env.fakechroot = Some(value.into());
            } else if key == FAKECHROOT_BASE {
                env.fakechroot_base = Some(value.into());
            } else if key == LD_PRELOAD {
                env.ld_preload = Some(value.into());
            } else if key == TMPDIR {
                env.tmpdir = Some(PathBuf::from(value.into()));
            }
        }
        env
    }
}
