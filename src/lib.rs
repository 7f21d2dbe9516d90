//! debutils - small system-integration utilities.
//!
//! - `ischroot`: report whether the process runs inside a chroot
//! - `tempfile`: create a temporary file safely and print its name
//!
//! The binaries are thin wrappers; the logic lives here so it can be tested.

pub mod chroot;
pub mod config;
pub mod diag;
pub mod mktemp;
