//! Filesystem layout derived from [`Settings`].
//!
//! Mailbox paths (`inbox`, `outbox`, `archive`) are pure derivations and are
//! never created here. The temp and log directories are created lazily the
//! first time they are requested.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::constants::{
    ARCHIVE_DIR_NAME, DATA_DIR_NAME, DIR_MODE, INBOX_DIR_NAME, LOG_DIR_NAME, OUTBOX_DIR_NAME,
    TEMP_DIR_NAME,
};
use crate::settings::Settings;

/// Resolves application directories from the install and temp roots.
#[derive(Debug, Clone)]
pub struct Paths {
    install_root: PathBuf,
    temp_root: PathBuf,
}

impl Paths {
    pub fn new(install_root: impl Into<PathBuf>, temp_root: impl Into<PathBuf>) -> Self {
        Self {
            install_root: install_root.into(),
            temp_root: temp_root.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.install_root, &settings.temp_root)
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    /// `<install-root>/data`, optionally joined with `subdir`.
    ///
    /// Does not check that the result exists.
    pub fn data_path(&self, subdir: Option<&str>) -> PathBuf {
        let base = self.install_root.join(DATA_DIR_NAME);
        match subdir {
            Some(sub) if !sub.is_empty() => base.join(sub),
            _ => base,
        }
    }

    pub fn inbox_path(&self) -> PathBuf {
        self.data_path(Some(INBOX_DIR_NAME))
    }

    pub fn outbox_path(&self) -> PathBuf {
        self.data_path(Some(OUTBOX_DIR_NAME))
    }

    pub fn archive_path(&self) -> PathBuf {
        self.data_path(Some(ARCHIVE_DIR_NAME))
    }

    /// `<temp-root>/edi_processing`, created on first access.
    pub fn temp_path(&self) -> io::Result<PathBuf> {
        let dir = self.temp_root.join(TEMP_DIR_NAME);
        ensure_dir(&dir)?;
        Ok(dir)
    }

    /// `<install-root>/logs`, created on first access.
    pub fn log_path(&self) -> io::Result<PathBuf> {
        let dir = self.install_root.join(LOG_DIR_NAME);
        ensure_dir(&dir)?;
        Ok(dir)
    }
}

/// Create `dir` and its parents if missing. A no-op when it already exists.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    #[cfg(not(unix))]
    let _ = DIR_MODE;

    builder.create(dir)?;
    tracing::debug!(path = %dir.display(), "Created directory");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_path_is_pure_and_stable() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let paths = Paths::new(dir.path(), dir.path());

        let first = paths.data_path(Some("inbox"));
        let second = paths.data_path(Some("inbox"));
        assert_eq!(first, second);
        assert_eq!(first, dir.path().join("data").join("inbox"));
        assert!(!first.exists(), "data_path must not create directories");
    }

    #[test]
    fn data_path_without_subdir_is_base() {
        let paths = Paths::new("/opt/edi", "/tmp");
        assert_eq!(paths.data_path(None), PathBuf::from("/opt/edi/data"));
        assert_eq!(paths.data_path(Some("")), PathBuf::from("/opt/edi/data"));
    }

    #[test]
    fn mailbox_paths() {
        let paths = Paths::new("/opt/edi", "/tmp");
        assert_eq!(paths.inbox_path(), PathBuf::from("/opt/edi/data/inbox"));
        assert_eq!(paths.outbox_path(), PathBuf::from("/opt/edi/data/outbox"));
        assert_eq!(paths.archive_path(), PathBuf::from("/opt/edi/data/archive"));
    }

    #[test]
    fn temp_path_is_created_idempotently() {
        let root = tempfile::tempdir().expect("create temp dir");
        let paths = Paths::new(root.path().join("install"), root.path().join("nested/tmp"));

        let first = paths.temp_path().expect("first call");
        assert!(first.is_dir());
        assert_eq!(first, root.path().join("nested/tmp/edi_processing"));

        let second = paths.temp_path().expect("second call");
        assert_eq!(first, second);
        assert!(second.is_dir());
    }

    #[test]
    fn log_path_is_created_under_install_root() {
        let root = tempfile::tempdir().expect("create temp dir");
        let paths = Paths::new(root.path(), root.path());

        let logs = paths.log_path().expect("log path");
        assert_eq!(logs, root.path().join("logs"));
        assert!(logs.is_dir());
        paths.log_path().expect("second call");
    }

    #[cfg(unix)]
    #[test]
    fn created_directories_use_fixed_mode() {
        use std::os::unix::fs::PermissionsExt;

        let root = tempfile::tempdir().expect("create temp dir");
        let paths = Paths::new(root.path(), root.path());
        let logs = paths.log_path().expect("log path");
        let mode = fs::metadata(&logs).expect("metadata").permissions().mode() & 0o777;
        // umask may only remove bits.
        assert_eq!(mode & !DIR_MODE, 0);
    }

    #[test]
    fn log_path_fails_when_blocked_by_file() {
        let root = tempfile::tempdir().expect("create temp dir");
        fs::write(root.path().join("logs"), b"not a dir").expect("write file");
        let paths = Paths::new(root.path(), root.path());
        assert!(paths.log_path().is_err());
    }
}
