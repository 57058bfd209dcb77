//! Location of the per-user configuration directory and the files in it.

use std::ffi::{OsStr, OsString};
use std::fs::DirBuilder;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the application directory below the base config directory.
pub const APP_NAME: &str = "scanmem";

/// File name of the command history log inside the config directory.
pub const HISTORY_FILE: &str = "history";

/// Mode for directories created below the base config directory, as mandated by
/// the XDG base directory specification.
pub const CONFIG_DIR_MODE: u32 = 0o700;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("could not determine the home directory")]
    NoHomeDir,
}

/// Environment inputs that decide where configuration lives.
///
/// Captured once at startup; empty values are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvInputs {
    pub xdg_config_home: Option<OsString>,
    pub home: Option<OsString>,
    /// Home directory from the user account database. Only looked up when
    /// neither variable above is usable.
    pub user_home: Option<PathBuf>,
}

impl EnvInputs {
    /// Read `XDG_CONFIG_HOME` and `HOME` from the process environment, falling
    /// back to the account database of the current user.
    pub fn from_process() -> Self {
        Self::capture(
            std::env::var_os("XDG_CONFIG_HOME"),
            std::env::var_os("HOME"),
            dirs::home_dir,
        )
    }

    /// Build the inputs from raw variable values; `user_home` is called only
    /// when both variables are unset or empty.
    pub fn capture<F>(xdg_config_home: Option<OsString>, home: Option<OsString>, user_home: F) -> Self
    where
        F: FnOnce() -> Option<PathBuf>,
    {
        let needs_lookup = non_empty(&xdg_config_home).is_none() && non_empty(&home).is_none();
        Self {
            user_home: if needs_lookup { user_home() } else { None },
            xdg_config_home,
            home,
        }
    }
}

fn non_empty(value: &Option<OsString>) -> Option<&OsStr> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Resolve the scanmem configuration directory.
///
/// In order of precedence:
/// - `$XDG_CONFIG_HOME/scanmem`
/// - `$HOME/.config/scanmem`
/// - `<home dir of the current user>/.config/scanmem`
pub fn config_dir(env: &EnvInputs) -> Result<PathBuf, PathError> {
    if let Some(base) = non_empty(&env.xdg_config_home) {
        return Ok(Path::new(base).join(APP_NAME));
    }
    let home = match non_empty(&env.home) {
        Some(home) => PathBuf::from(home),
        None => env
            .user_home
            .clone()
            .filter(|dir| !dir.as_os_str().is_empty())
            .ok_or(PathError::NoHomeDir)?,
    };
    Ok(home.join(".config").join(APP_NAME))
}

/// `<dir>/<name>`.
pub fn file_in(dir: &Path, name: &str) -> PathBuf {
    dir.join(name)
}

/// Create every missing ancestor directory of `file_path` with `mode`.
///
/// The path is walked left to right; each prefix ending at a separator is
/// created in turn. Existing directories are fine, any other failure stops the
/// walk. The final component is never created.
pub fn create_parent_dirs(file_path: &Path, mode: u32) -> io::Result<()> {
    let bytes = file_path.as_os_str().as_bytes();
    let mut builder = DirBuilder::new();
    builder.mode(mode);

    // Skip index 0 so an absolute path never tries to create "/".
    for (idx, _) in bytes.iter().enumerate().skip(1).filter(|(_, b)| **b == b'/') {
        let prefix = Path::new(OsStr::from_bytes(&bytes[..idx]));
        match builder.create(prefix) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn env(xdg: Option<&str>, home: Option<&str>, user_home: Option<&str>) -> EnvInputs {
        EnvInputs {
            xdg_config_home: xdg.map(OsString::from),
            home: home.map(OsString::from),
            user_home: user_home.map(PathBuf::from),
        }
    }

    #[test]
    fn test_override_takes_precedence() {
        let dir = config_dir(&env(Some("/x"), Some("/home/u"), Some("/pw"))).unwrap();
        assert_eq!(dir, PathBuf::from("/x/scanmem"));

        let dir = config_dir(&env(Some("/x"), None, None)).unwrap();
        assert_eq!(dir, PathBuf::from("/x/scanmem"));
    }

    #[test]
    fn test_trailing_separator_is_not_duplicated() {
        let dir = config_dir(&env(Some("/x/"), None, None)).unwrap();
        assert_eq!(dir.to_str(), Some("/x/scanmem"));
    }

    #[test]
    fn test_home_is_used_without_override() {
        let dir = config_dir(&env(None, Some("/home/u"), Some("/pw"))).unwrap();
        assert_eq!(dir, PathBuf::from("/home/u/.config/scanmem"));
    }

    #[test]
    fn test_empty_variables_count_as_unset() {
        let dir = config_dir(&env(Some(""), Some("/home/u"), None)).unwrap();
        assert_eq!(dir, PathBuf::from("/home/u/.config/scanmem"));

        let dir = config_dir(&env(Some(""), Some(""), Some("/pw"))).unwrap();
        assert_eq!(dir, PathBuf::from("/pw/.config/scanmem"));
    }

    #[test]
    fn test_user_database_fallback() {
        let dir = config_dir(&env(None, None, Some("/var/lib/u"))).unwrap();
        assert_eq!(dir, PathBuf::from("/var/lib/u/.config/scanmem"));
    }

    #[test]
    fn test_capture_looks_up_user_home_only_when_both_unset() {
        let called = std::cell::Cell::new(false);
        let lookup = || {
            called.set(true);
            Some(PathBuf::from("/pw"))
        };
        let inputs = EnvInputs::capture(None, Some("/home/u".into()), lookup);
        assert!(!called.get());
        assert_eq!(inputs.user_home, None);

        let inputs = EnvInputs::capture(Some("/x".into()), None, || panic!("not needed"));
        assert_eq!(inputs.user_home, None);

        let inputs = EnvInputs::capture(None, Some("".into()), || Some(PathBuf::from("/pw")));
        assert_eq!(inputs.user_home, Some(PathBuf::from("/pw")));
    }

    #[test]
    fn test_no_home_anywhere_is_an_error() {
        let err = config_dir(&env(None, None, None)).unwrap_err();
        assert!(matches!(err, PathError::NoHomeDir));

        let err = config_dir(&env(None, Some(""), Some(""))).unwrap_err();
        assert!(matches!(err, PathError::NoHomeDir));
    }

    #[test]
    fn test_history_file_in_config_dir() {
        let path = file_in(Path::new("/home/u/.config/scanmem"), HISTORY_FILE);
        assert_eq!(path, PathBuf::from("/home/u/.config/scanmem/history"));
    }

    #[test]
    fn test_create_parent_dirs_creates_ancestors_only() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("a").join("b").join("history");

        create_parent_dirs(&file, CONFIG_DIR_MODE).unwrap();

        let parent = tmp.path().join("a").join("b");
        assert!(parent.is_dir());
        assert!(!file.exists());
        let mode = std::fs::metadata(&parent).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn test_create_parent_dirs_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("cfg").join("scanmem").join("history");

        create_parent_dirs(&file, CONFIG_DIR_MODE).unwrap();
        create_parent_dirs(&file, CONFIG_DIR_MODE).unwrap();

        let entries: Vec<_> = std::fs::read_dir(tmp.path().join("cfg")).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert!(tmp.path().join("cfg").join("scanmem").is_dir());
    }

    #[test]
    fn test_create_parent_dirs_stops_on_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let file = blocker.join("sub").join("history");

        assert!(create_parent_dirs(&file, CONFIG_DIR_MODE).is_err());
        assert!(!blocker.join("sub").exists());
    }
}
