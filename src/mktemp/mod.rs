//! Safe temporary file creation.
//!
//! A file is claimed with a single exclusive-create `open(2)`, so it can
//! never overwrite or truncate an existing file, and no other process can
//! slip in between an existence check and the open.

mod mode;
mod name;

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::IntoRawFd;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::Rng;

use crate::config::Environment;

pub use mode::{parse_mode, DEFAULT_MODE, MAX_MODE};
pub use name::{
    random_token, resolve_directory, NameTemplate, DEFAULT_PREFIX, FALLBACK_DIR, PREFIX_LEN,
    TOKEN_LEN,
};

/// What to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Directory for a generated name.
    pub directory: Option<PathBuf>,
    /// Prefix for a generated name.
    pub prefix: Option<String>,
    /// Suffix for a generated name.
    pub suffix: Option<String>,
    /// Exact path to create. Disables name generation.
    pub name: Option<PathBuf>,
    /// Permission bits, before the umask.
    pub mode: u32,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            directory: None,
            prefix: None,
            suffix: None,
            name: None,
            mode: DEFAULT_MODE,
        }
    }
}

/// Create the requested file and return its path. The file is closed but
/// left on disk.
pub fn create(request: &Request, env: &Environment) -> Result<PathBuf> {
    create_with(request, env, &mut rand::thread_rng())
}

/// [`create`] with a caller-supplied random source for generated names.
pub fn create_with<R: Rng + ?Sized>(
    request: &Request,
    env: &Environment,
    rng: &mut R,
) -> Result<PathBuf> {
    let path = match &request.name {
        Some(name) => {
            let file = open_exclusive(name, request.mode)
                .with_context(|| format!("open {}", name.display()))?;
            close(file, name)?;
            name.clone()
        }
        None => {
            let dir = resolve_directory(env, request.directory.as_deref());
            let template = NameTemplate::new(
                dir,
                request.prefix.as_deref(),
                request.suffix.as_deref(),
            );
            let (file, path) = claim_unique(&template, request.mode, rng)?;
            close(file, &path)?;
            path
        }
    };
    Ok(path)
}

/// Keep generating candidates until one is created.
///
/// Best effort: a name collision is retried indefinitely since repeated
/// collisions of a random token are vanishingly unlikely. Any other error
/// aborts at once.
pub fn claim_unique<R: Rng + ?Sized>(
    template: &NameTemplate,
    mode: u32,
    rng: &mut R,
) -> Result<(File, PathBuf)> {
    loop {
        let candidate = template.candidate(rng);
        match open_exclusive(&candidate, mode) {
            Ok(file) => return Ok((file, candidate)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(e).with_context(|| format!("open {}", candidate.display()));
            }
        }
    }
}

/// `open(path, O_RDWR | O_CREAT | O_EXCL, mode)`.
pub fn open_exclusive(path: &Path, mode: u32) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .mode(mode)
        .open(path)
}

/// Close explicitly so a failing `close(2)` is reported instead of ignored.
fn close(file: File, path: &Path) -> Result<()> {
    let fd = file.into_raw_fd();
    // SAFETY: `fd` was just released by `file`, nothing else owns or closes it.
    if unsafe { libc::close(fd) } != 0 {
        return Err(io::Error::last_os_error())
            .with_context(|| format!("close {}", path.display()));
    }
    Ok(())
}
