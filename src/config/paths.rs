//! Cross-platform directory path resolution
//!
//! Provides functions to resolve platform-appropriate paths for configuration
//! and data directories.
//! - Linux/macOS: XDG Base Directory specification (~/.config, ~/.local/share)
//! - Windows: Known Folder API (AppData\Roaming, AppData\Local)

use std::path::{Path, PathBuf};

const APP_NAME: &str = "entity-usage";

/// Get the configuration directory path
///
/// Checks ENTITY_USAGE_CONFIG_DIR environment variable first, then falls back to:
/// - Unix (Linux/macOS): XDG_CONFIG_HOME/entity-usage or ~/.config/entity-usage
/// - Windows: %APPDATA%\entity-usage\config
pub fn config_dir() -> PathBuf {
    std::env::var("ENTITY_USAGE_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            #[cfg(windows)]
            {
                use directories::ProjectDirs;
                ProjectDirs::from("", "", APP_NAME)
                    .map(|dirs| dirs.config_dir().to_path_buf())
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            }
            #[cfg(not(windows))]
            {
                use directories::BaseDirs;
                std::env::var("XDG_CONFIG_HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| {
                        BaseDirs::new()
                            .map(|dirs| dirs.home_dir().join(".config"))
                            .unwrap_or_else(|| PathBuf::from(".").join(".config"))
                    })
                    .join(APP_NAME)
            }
        })
}

/// Get the data directory path
///
/// Checks ENTITY_USAGE_DATA_DIR environment variable first, then falls back to:
/// - Unix (Linux/macOS): XDG_DATA_HOME/entity-usage or ~/.local/share/entity-usage
/// - Windows: %LOCALAPPDATA%\entity-usage\data
pub fn data_dir() -> PathBuf {
    std::env::var("ENTITY_USAGE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            #[cfg(windows)]
            {
                use directories::ProjectDirs;
                ProjectDirs::from("", "", APP_NAME)
                    .map(|dirs| dirs.data_dir().to_path_buf())
                    .unwrap_or_else(|| {
                        PathBuf::from(".")
                            .join(".local")
                            .join("share")
                            .join(APP_NAME)
                    })
            }
            #[cfg(not(windows))]
            {
                use directories::BaseDirs;
                std::env::var("XDG_DATA_HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| {
                        BaseDirs::new()
                            .map(|dirs| dirs.home_dir().join(".local").join("share"))
                            .unwrap_or_else(|| PathBuf::from(".").join(".local").join("share"))
                    })
                    .join(APP_NAME)
            }
        })
}

/// Get the root configuration file path
pub fn root_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Get the site-specific config file path
pub fn site_config_path(site: &str) -> PathBuf {
    data_dir().join("sites").join(site).join("config.yaml")
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir() {
        let dir = config_dir();
        assert!(dir.to_string_lossy().contains("entity-usage") || dir.is_absolute());
    }

    #[test]
    fn test_site_config_path() {
        let path = site_config_path("intranet");
        assert!(path.ends_with("sites/intranet/config.yaml"));
    }
}
