//! Runtime settings for the spectator

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Spectator configuration, merged from `config/settings.json` over the
/// defaults. Unknown resolutions fail later, at profile lookup, with a
/// typed error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub resolution: String,
    pub server_ip: String,
    pub server_port: String,
    pub server_password: Option<String>,
    pub player_name: String,
    pub game_mod: String,
    /// Minimum mean view delta that counts as enough on-screen action.
    pub min_action_level: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resolution: "720p".to_string(),
            server_ip: "127.0.0.1".to_string(),
            server_port: "16567".to_string(),
            server_password: None,
            player_name: "spectator".to_string(),
            game_mod: "bf2".to_string(),
            min_action_level: 0.022,
        }
    }
}

/// Returns the folder where data files should be stored.
/// Prefers the executable's directory when it looks like a bundled install
/// (a config folder next to it), otherwise the working directory.
pub fn get_data_dir() -> PathBuf {
    if let Ok(exe_path) = env::current_exe() {
        if let Some(parent) = exe_path.parent() {
            if parent.join("config").exists() {
                return parent.to_path_buf();
            }
        }
    }

    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn get_settings_path() -> PathBuf {
    get_data_dir().join("config").join("settings.json")
}

/// Load settings, falling back to defaults for a missing or invalid file.
pub fn get_settings() -> Settings {
    let settings_file = get_settings_path();

    if settings_file.exists() {
        if let Ok(content) = fs::read_to_string(&settings_file) {
            match serde_json::from_str(&content) {
                Ok(settings) => return settings,
                Err(e) => tracing::warn!("[CONFIG] Ignoring invalid settings file: {}", e),
            }
        }
    }

    Settings::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.resolution, "720p");
        assert_eq!(settings.game_mod, "bf2");
        assert!(settings.server_password.is_none());
    }

    #[test]
    fn test_partial_settings_keep_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"resolution": "900p", "server_ip": "10.0.0.1"}"#).unwrap();
        assert_eq!(settings.resolution, "900p");
        assert_eq!(settings.server_ip, "10.0.0.1");
        assert_eq!(settings.server_port, "16567");
    }

    #[test]
    fn test_get_data_dir() {
        let dir = get_data_dir();
        assert!(dir.exists() || dir == PathBuf::from("."));
    }
}
