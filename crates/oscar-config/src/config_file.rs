use std::{env, path::PathBuf};

pub const CONFIG_FILE: &str = ".oscar.toml";

/// Locate the config file, CWD first, then home directory
///
/// Searches for .oscar.toml in:
/// 1. Current working directory
/// 2. Home directory
///
/// Returns the path of the first existing file, None otherwise.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE);
    if local.is_file() {
        log::debug!("Found config at {}", local.display());
        return Some(local);
    }

    if let Some(home_config) = get_home_config_path() {
        if home_config.is_file() {
            log::debug!("Found config at {}", home_config.display());
            return Some(home_config);
        }
    }

    None
}

/// Get the path to the config file in the home directory
fn get_home_config_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(CONFIG_FILE))
}
