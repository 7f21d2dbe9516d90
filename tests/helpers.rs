//! Shared test utilities for debutils tests.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test environment with a scratch directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Directory temp files are created in
    pub dir: PathBuf,
}

impl TestEnv {
    /// Create a new test environment with a temporary directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path().to_path_buf();

        Self {
            _temp_dir: temp_dir,
            dir,
        }
    }

    /// Number of entries currently in the scratch directory.
    pub fn entry_count(&self) -> usize {
        fs::read_dir(&self.dir)
            .expect("Failed to read scratch dir")
            .count()
    }
}

/// `tempfile` command with TMPDIR cleared so `--directory` is honoured.
pub fn tempfile_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tempfile"));
    cmd.env_remove("TMPDIR");
    cmd
}

/// `ischroot` command with every fakechroot marker removed.
pub fn ischroot_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ischroot"));
    cmd.env_remove("FAKECHROOT")
        .env_remove("FAKECHROOT_BASE")
        .env_remove("LD_PRELOAD");
    cmd
}

/// Run a command, capturing all output.
pub fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("Failed to run binary")
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Current process umask.
pub fn current_umask() -> u32 {
    // SAFETY: umask cannot fail; the original value is put back immediately.
    unsafe {
        let mask = libc::umask(0o022);
        libc::umask(mask);
        mask as u32
    }
}

/// Assert a regular file exists.
pub fn assert_file_exists(path: &Path) {
    assert!(path.is_file(), "File should exist: {}", path.display());
}

/// Assert a file exists and is empty.
pub fn assert_file_empty(path: &Path) {
    assert_file_exists(path);
    let len = fs::metadata(path).expect("Failed to stat").len();
    assert_eq!(len, 0, "File should be empty: {}", path.display());
}

/// Assert the permission bits of a file.
pub fn assert_mode(path: &Path, expected: u32) {
    let mode = fs::metadata(path)
        .expect("Failed to stat")
        .permissions()
        .mode()
        & 0o7777;
    assert_eq!(
        mode,
        expected,
        "{} has mode {:o}, expected {:o}",
        path.display(),
        mode,
        expected
    );
}
