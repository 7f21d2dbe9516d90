//! Candidate names for generated temporary files.

use std::path::{Path, PathBuf};

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::config::Environment;

/// Prefix used when none (or an empty one) is given.
pub const DEFAULT_PREFIX: &str = "file";
/// Only this many characters of the prefix are kept.
pub const PREFIX_LEN: usize = 5;
/// Length of the random part of the name.
pub const TOKEN_LEN: usize = 6;
/// Last-resort directory.
pub const FALLBACK_DIR: &str = "/tmp";

/// Pick the directory generated names go into.
///
/// The first existing directory wins, in order: `$TMPDIR`, the requested
/// directory, then [`FALLBACK_DIR`]. `$TMPDIR` takes precedence over
/// `--directory`, as it always has for this tool.
pub fn resolve_directory(env: &Environment, requested: Option<&Path>) -> PathBuf {
    env.tmpdir
        .as_deref()
        .filter(|dir| !dir.as_os_str().is_empty())
        .into_iter()
        .chain(requested)
        .find(|dir| dir.is_dir())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DIR))
}

/// Random alphanumeric token of `len` characters.
pub fn random_token<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| char::from(rng.sample(Alphanumeric))).collect()
}

/// `dir/` + prefix + token + suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    dir: PathBuf,
    prefix: String,
    suffix: String,
}

impl NameTemplate {
    pub fn new(dir: impl Into<PathBuf>, prefix: Option<&str>, suffix: Option<&str>) -> Self {
        let prefix = match prefix {
            Some(p) if !p.is_empty() => p.chars().take(PREFIX_LEN).collect(),
            _ => DEFAULT_PREFIX.to_string(),
        };

        Self {
            dir: dir.into(),
            prefix,
            suffix: suffix.unwrap_or_default().to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// A fresh candidate path. Uniqueness is only established by creating it.
    pub fn candidate<R: Rng + ?Sized>(&self, rng: &mut R) -> PathBuf {
        let name = format!(
            "{}{}{}",
            self.prefix,
            random_token(rng, TOKEN_LEN),
            self.suffix
        );
        self.dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prefix_truncated_to_five_chars() {
        let template = NameTemplate::new("/tmp", Some("abcdefgh"), None);
        assert_eq!(template.prefix(), "abcde");

        let template = NameTemplate::new("/tmp", Some("ééééééé"), None);
        assert_eq!(template.prefix(), "ééééé");
    }

    #[test]
    fn test_default_prefix() {
        assert_eq!(NameTemplate::new("/tmp", None, None).prefix(), DEFAULT_PREFIX);
        assert_eq!(NameTemplate::new("/tmp", Some(""), None).prefix(), DEFAULT_PREFIX);
    }

    #[test]
    fn test_candidate_shape() {
        let template = NameTemplate::new("/var/tmp", Some("foo"), Some(".txt"));
        let path = template.candidate(&mut rand::thread_rng());

        assert_eq!(path.parent(), Some(Path::new("/var/tmp")));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("foo"));
        assert!(name.ends_with(".txt"));
        assert_eq!(name.len(), "foo".len() + TOKEN_LEN + ".txt".len());

        let token = &name[3..3 + TOKEN_LEN];
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_candidates_vary() {
        let template = NameTemplate::new("/tmp", None, None);
        let mut rng = rand::thread_rng();
        let names: std::collections::HashSet<_> =
            (0..64).map(|_| template.candidate(&mut rng)).collect();
        assert!(names.len() > 1);
    }

    #[test]
    fn test_tmpdir_wins_over_requested() {
        let tmpdir = TempDir::new().unwrap();
        let requested = TempDir::new().unwrap();
        let env = Environment::from_vars([("TMPDIR", tmpdir.path())]);

        assert_eq!(
            resolve_directory(&env, Some(requested.path())),
            tmpdir.path()
        );
    }

    #[test]
    fn test_requested_used_when_tmpdir_missing() {
        let requested = TempDir::new().unwrap();
        let env = Environment::from_vars([("TMPDIR", "/nonexistent_dir_12345")]);

        assert_eq!(
            resolve_directory(&env, Some(requested.path())),
            requested.path()
        );
        assert_eq!(
            resolve_directory(&Environment::default(), Some(requested.path())),
            requested.path()
        );
    }

    #[test]
    fn test_fallback_dir() {
        let env = Environment::from_vars([("TMPDIR", "")]);
        assert_eq!(
            resolve_directory(&env, Some(Path::new("/nonexistent_dir_12345"))),
            PathBuf::from(FALLBACK_DIR)
        );
        assert_eq!(
            resolve_directory(&Environment::default(), None),
            PathBuf::from(FALLBACK_DIR)
        );
    }
}
