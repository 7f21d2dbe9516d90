//! Chroot detection.
//!
//! Classifies the current process as running outside a chroot, inside one,
//! or undeterminable. A fakechroot environment is reported as outside since
//! fakechroot only intercepts library calls and never changes the kernel's
//! idea of the root directory.

mod probe;

use anyhow::{bail, Result};

use crate::config::Environment;

pub use probe::{
    platform_probe, IdentityPairProbe, IdentityProbe, Undeterminable, UnsupportedPlatform,
    WellKnownDeviceProbe,
};
#[cfg(target_os = "freebsd")]
pub use probe::JailDescriptorProbe;

/// Library that fakechroot preloads into every process.
const FAKECHROOT_LIBRARY: &str = "libfakechroot.so";

/// Exit status when detection failed and no fallback was requested.
pub const EXIT_UNDETERMINABLE: u8 = 2;

/// Outcome of a detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// Process root is the real system root.
    Outside,
    /// Process root differs from the real system root.
    Inside,
    /// The probe could not gather enough information.
    Undeterminable,
}

/// What to report when detection is impossible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fallback {
    /// Exit with [`EXIT_UNDETERMINABLE`].
    #[default]
    None,
    /// `--default-false`: behave as if not chrooted.
    False,
    /// `--default-true`: behave as if chrooted.
    True,
}

impl Fallback {
    /// Combine the two mutually exclusive command-line flags.
    pub fn from_flags(default_false: bool, default_true: bool) -> Result<Self> {
        match (default_false, default_true) {
            (true, true) => bail!("Can't default to both true and false!"),
            (true, false) => Ok(Self::False),
            (false, true) => Ok(Self::True),
            (false, false) => Ok(Self::None),
        }
    }
}

impl Detection {
    /// Exit status for this result.
    pub fn exit_code(self, fallback: Fallback) -> u8 {
        match (self, fallback) {
            (Self::Outside, _) => 0,
            (Self::Inside, _) => 1,
            (Self::Undeterminable, Fallback::False) => 0,
            (Self::Undeterminable, Fallback::True) => 1,
            (Self::Undeterminable, Fallback::None) => EXIT_UNDETERMINABLE,
        }
    }
}

/// True when the process runs under the fakechroot preload shim.
///
/// All three markers must be present: `FAKECHROOT=true`, `FAKECHROOT_BASE`
/// set to anything, and `libfakechroot.so` somewhere in `LD_PRELOAD`.
pub fn is_fakechroot(env: &Environment) -> bool {
    let enabled = env.fakechroot.as_deref().is_some_and(|v| v == "true");
    let preloaded = env
        .ld_preload
        .as_deref()
        .is_some_and(|v| v.to_string_lossy().contains(FAKECHROOT_LIBRARY));

    enabled && env.fakechroot_base.is_some() && preloaded
}

/// Classify the process, consulting `probe` only outside fakechroot.
pub fn detect(env: &Environment, probe: &dyn IdentityProbe) -> Detection {
    if is_fakechroot(env) {
        return Detection::Outside;
    }

    match probe.probe() {
        Ok(detection) => detection,
        Err(_) => Detection::Undeterminable,
    }
}
