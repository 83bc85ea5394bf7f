//! XDG-style configuration directory resolution.
//!
//! The XDG Base Directory convention is preferred over OS-specific locations
//! so the config file sits in the same place on every platform.

use std::path::PathBuf;

const APP_DIR_NAME: &str = "clip-translator";

/// Returns the configuration directory for clip-translator.
///
/// Resolution order:
/// 1. `$XDG_CONFIG_HOME/clip-translator` if `XDG_CONFIG_HOME` is set and non-empty
/// 2. `~/.config/clip-translator` otherwise
///
/// Returns `None` when no home directory can be determined.
pub fn config_dir() -> Option<PathBuf> {
    match std::env::var_os("XDG_CONFIG_HOME") {
        Some(xdg) if !xdg.is_empty() => Some(PathBuf::from(xdg).join(APP_DIR_NAME)),
        _ => dirs::home_dir().map(|home| home.join(".config").join(APP_DIR_NAME)),
    }
}
