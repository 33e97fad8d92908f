// Linkshelf platform paths
// Config: settings.json lives here unless overridden.
// Data:   default location of the SQLite bookmark store.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "linkshelf";

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Returns the platform-specific configuration directory.
///
/// - **Linux**: `$XDG_CONFIG_HOME/linkshelf` or `~/.config/linkshelf`
/// - **macOS**: `~/Library/Application Support/linkshelf`
/// - **Windows**: `%APPDATA%/linkshelf`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        appdata_dir()
    }
    #[cfg(target_os = "macos")]
    {
        application_support_dir()
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        xdg_dir("XDG_CONFIG_HOME", &[".config"])
    }
}

/// Returns the platform-specific data directory.
///
/// - **Linux**: `$XDG_DATA_HOME/linkshelf` or `~/.local/share/linkshelf`
/// - **macOS**: `~/Library/Application Support/linkshelf`
/// - **Windows**: `%APPDATA%/linkshelf`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        appdata_dir()
    }
    #[cfg(target_os = "macos")]
    {
        application_support_dir()
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        xdg_dir("XDG_DATA_HOME", &[".local", "share"])
    }
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn xdg_dir(var: &str, fallback: &[&str]) -> PathBuf {
    match env::var(var) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir).join(APP_DIR),
        _ => fallback
            .iter()
            .fold(home_dir(), |path, part| path.join(part))
            .join(APP_DIR),
    }
}

#[cfg(target_os = "macos")]
fn application_support_dir() -> PathBuf {
    home_dir()
        .join("Library")
        .join("Application Support")
        .join(APP_DIR)
}

#[cfg(target_os = "windows")]
fn appdata_dir() -> PathBuf {
    let appdata = env::var("APPDATA").unwrap_or_else(|_| {
        home_dir()
            .join("AppData")
            .join("Roaming")
            .to_string_lossy()
            .to_string()
    });
    PathBuf::from(appdata).join(APP_DIR)
}
