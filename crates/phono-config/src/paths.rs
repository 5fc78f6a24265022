//! Location of the persisted settings file.
//!
//! Settings live under a hidden state directory in the user's home:
//!
//! - `~/.state/phono/settings.toml`
//!
//! When the home directory cannot be determined the path is relative to the
//! current directory.
//!
//! # Example
//!
//! ```rust,no_run
//! use phono_config::paths;
//!
//! let path = paths::settings_path();
//! println!("Settings: {:?}", path);
//! ```

use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "phono";

/// Hidden per-user state directory under the home directory.
const STATE_SUBDIR: &str = ".state";

/// Settings file name.
const SETTINGS_FILE: &str = "settings.toml";

/// Returns the per-user state directory, `~/.state/phono/`.
pub fn state_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(STATE_SUBDIR)
        .join(APP_NAME)
}

/// Returns the default settings file, `~/.state/phono/settings.toml`.
pub fn settings_path() -> PathBuf {
    state_dir().join(SETTINGS_FILE)
}

/// Returns `explicit` when given, otherwise [`settings_path`].
pub fn resolve_settings_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(settings_path, Path::to_path_buf)
}

/// Ensure the parent directory of `path` exists.
///
/// Creates the directory and any parent directories if they don't exist.
pub fn ensure_parent_dir(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_path_layout() {
        let path = settings_path();
        assert!(path.ends_with(".state/phono/settings.toml"), "got {path:?}");
        assert_eq!(path.parent(), Some(state_dir().as_path()));
    }

    #[test]
    fn test_resolve_prefers_explicit() {
        let explicit = Path::new("/tmp/other.toml");
        assert_eq!(resolve_settings_path(Some(explicit)), explicit);
        assert_eq!(resolve_settings_path(None), settings_path());
    }

    #[test]
    fn test_ensure_parent_dir_creates_tree() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a").join("b").join("settings.toml");
        ensure_parent_dir(&path).unwrap();
        assert!(temp_dir.path().join("a").join("b").is_dir());

        // Idempotent once the directory exists.
        ensure_parent_dir(&path).unwrap();
    }

    #[test]
    fn test_ensure_parent_dir_bare_filename() {
        assert!(ensure_parent_dir(Path::new("settings.toml")).is_ok());
    }

    #[test]
    fn test_ensure_parent_dir_blocked_by_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let err = ensure_parent_dir(&blocker.join("sub").join("settings.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::CreateDir { .. }));
    }
}
