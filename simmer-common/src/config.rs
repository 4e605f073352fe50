//! Configuration loading and data folder resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Data folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_folder(cli_arg: Option<&str>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(data_folder) = config.get("data_folder").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(data_folder));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_data_folder())
}

/// Get default configuration file path for the platform
fn locate_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/simmer/config.toml first, then /etc/simmer/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("simmer").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/simmer/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("simmer").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// Get OS-dependent default data folder path
fn default_data_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/simmer (or /var/lib/simmer for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("simmer"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/simmer"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/simmer
        dirs::data_dir()
            .map(|d| d.join("simmer"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/simmer"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\simmer
        dirs::data_local_dir()
            .map(|d| d.join("simmer"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\simmer"))
    } else {
        PathBuf::from("./simmer_data")
    }
}
