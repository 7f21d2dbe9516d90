//! Platform strategies for telling a chroot apart from the real root.
//!
//! Each strategy implements [`IdentityProbe`]. The one matching the build
//! target is returned by [`platform_probe`].

use std::fmt;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use super::Detection;

/// Why a probe could not reach a verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Undeterminable {
    reason: String,
}

impl Undeterminable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn io(what: &str, path: &Path, err: io::Error) -> Self {
        Self::new(format!("{} {}: {}", what, path.display(), err))
    }
}

impl fmt::Display for Undeterminable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for Undeterminable {}

/// A read-only check of the process's filesystem root.
///
/// Failures are never retried: the filesystem is not expected to change
/// while the program runs.
pub trait IdentityProbe {
    fn probe(&self) -> Result<Detection, Undeterminable>;
}

/// Compares the (device, inode) pair of the process root with that of a
/// reference path that always points at the real system root.
#[derive(Debug, Clone)]
pub struct IdentityPairProbe {
    root: PathBuf,
    reference: PathBuf,
}

impl IdentityPairProbe {
    pub fn new(root: impl Into<PathBuf>, reference: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            reference: reference.into(),
        }
    }

    /// `/` against init's root, `/proc/1/root`.
    ///
    /// Stat'ing the reference needs privileges and a mounted /proc.
    pub fn system() -> Self {
        Self::new("/", "/proc/1/root")
    }
}

impl IdentityProbe for IdentityPairProbe {
    fn probe(&self) -> Result<Detection, Undeterminable> {
        let root = std::fs::metadata(&self.root)
            .map_err(|e| Undeterminable::io("stat", &self.root, e))?;
        let reference = std::fs::metadata(&self.reference)
            .map_err(|e| Undeterminable::io("stat", &self.reference, e))?;

        if (root.dev(), root.ino()) == (reference.dev(), reference.ino()) {
            Ok(Detection::Outside)
        } else {
            Ok(Detection::Inside)
        }
    }
}

/// Compares the device holding the process root with the device number the
/// primary filesystem always gets.
///
/// On GNU/Hurd the first mounted filesystem is device 3, and chroots have to
/// live on a different filesystem, so any other device means a chroot.
#[derive(Debug, Clone)]
pub struct WellKnownDeviceProbe {
    root: PathBuf,
    device: u64,
}

impl WellKnownDeviceProbe {
    /// Device number of the first filesystem mounted on GNU/Hurd.
    pub const HURD_ROOT_DEVICE: u64 = 3;

    pub fn new(root: impl Into<PathBuf>, device: u64) -> Self {
        Self {
            root: root.into(),
            device,
        }
    }

    pub fn system() -> Self {
        Self::new("/", Self::HURD_ROOT_DEVICE)
    }
}

impl IdentityProbe for WellKnownDeviceProbe {
    fn probe(&self) -> Result<Detection, Undeterminable> {
        let root = std::fs::metadata(&self.root)
            .map_err(|e| Undeterminable::io("stat", &self.root, e))?;

        if root.dev() == self.device {
            Ok(Detection::Outside)
        } else {
            Ok(Detection::Inside)
        }
    }
}

/// Fallback for targets without a known strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedPlatform;

impl IdentityProbe for UnsupportedPlatform {
    fn probe(&self) -> Result<Detection, Undeterminable> {
        Err(Undeterminable::new(
            "chroot detection is not supported on this platform",
        ))
    }
}

// FreeBSD `struct kinfo_file` starts with three ints:
// kf_structsize, kf_type, kf_fd.
#[cfg(any(target_os = "freebsd", test))]
const KF_STRUCTSIZE_OFFSET: usize = 0;
#[cfg(any(target_os = "freebsd", test))]
const KF_FD_OFFSET: usize = 8;
/// `KF_FD_TYPE_JAIL` from <sys/user.h>.
#[cfg(any(target_os = "freebsd", test))]
const KF_FD_TYPE_JAIL: i32 = -3;

#[cfg(any(target_os = "freebsd", test))]
fn read_i32(buf: &[u8], offset: usize) -> Option<i32> {
    let bytes = buf.get(offset..offset + 4)?;
    Some(i32::from_ne_bytes(bytes.try_into().ok()?))
}

/// Walk a packed `kinfo_file` table looking for the jail descriptor.
#[cfg(any(target_os = "freebsd", test))]
fn has_jail_descriptor(table: &[u8]) -> bool {
    let mut rest = table;
    while let Some(size) = read_i32(rest, KF_STRUCTSIZE_OFFSET) {
        if read_i32(rest, KF_FD_OFFSET) == Some(KF_FD_TYPE_JAIL) {
            return true;
        }
        let size = match usize::try_from(size) {
            Ok(size) if size > 0 && size <= rest.len() => size,
            _ => break,
        };
        rest = &rest[size..];
    }
    false
}

/// Looks for a jail marker in the process's descriptor table.
///
/// Needs no privileges; only allocation or sysctl failures make it
/// undeterminable.
#[cfg(target_os = "freebsd")]
#[derive(Debug, Clone, Copy)]
pub struct JailDescriptorProbe {
    pid: libc::pid_t,
}

#[cfg(target_os = "freebsd")]
impl JailDescriptorProbe {
    pub fn system() -> Self {
        Self {
            pid: std::process::id() as libc::pid_t,
        }
    }

    fn descriptor_table(&self) -> io::Result<Vec<u8>> {
        let mib = [
            libc::CTL_KERN,
            libc::KERN_PROC,
            libc::KERN_PROC_FILEDESC,
            self.pid,
        ];
        let mut len: libc::size_t = 0;

        // SAFETY: a null old-buffer asks the kernel for the required size only.
        let rc = unsafe {
            libc::sysctl(
                mib.as_ptr(),
                mib.len() as libc::c_uint,
                std::ptr::null_mut(),
                &mut len,
                std::ptr::null(),
                0,
            )
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }

        let mut buf = vec![0u8; len];
        // SAFETY: `buf` is valid for `len` bytes and the kernel writes at most `len`.
        let rc = unsafe {
            libc::sysctl(
                mib.as_ptr(),
                mib.len() as libc::c_uint,
                buf.as_mut_ptr().cast(),
                &mut len,
                std::ptr::null(),
                0,
            )
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        buf.truncate(len);
        Ok(buf)
    }
}

#[cfg(target_os = "freebsd")]
impl IdentityProbe for JailDescriptorProbe {
    fn probe(&self) -> Result<Detection, Undeterminable> {
        let table = self
            .descriptor_table()
            .map_err(|e| Undeterminable::new(format!("sysctl kern.proc.filedesc: {}", e)))?;

        if has_jail_descriptor(&table) {
            Ok(Detection::Inside)
        } else {
            Ok(Detection::Outside)
        }
    }
}

/// The strategy for the platform this binary was built for.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn platform_probe() -> Box<dyn IdentityProbe> {
    Box::new(IdentityPairProbe::system())
}

#[cfg(target_os = "freebsd")]
pub fn platform_probe() -> Box<dyn IdentityProbe> {
    Box::new(JailDescriptorProbe::system())
}

#[cfg(target_os = "hurd")]
pub fn platform_probe() -> Box<dyn IdentityProbe> {
    Box::new(WellKnownDeviceProbe::system())
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "hurd"
)))]
pub fn platform_probe() -> Box<dyn IdentityProbe> {
    Box::new(UnsupportedPlatform)
}
