//! Session and rotation event logging

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::GameInstanceState;
use crate::utils::settings::get_data_dir;

/// Session entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub start: String,
    pub stop: Option<String>,
}

fn get_sessions_path() -> PathBuf {
    get_data_dir().join("logs").join("sessions.json")
}

/// Load sessions from file
pub fn load_sessions() -> Vec<Session> {
    let sessions_file = get_sessions_path();

    if sessions_file.exists() {
        if let Ok(content) = fs::read_to_string(&sessions_file) {
            if let Ok(sessions) = serde_json::from_str(&content) {
                return sessions;
            }
        }
    }

    Vec::new()
}

/// Save sessions to file
pub fn save_sessions(sessions: &[Session]) {
    let sessions_file = get_sessions_path();

    if let Some(parent) = sessions_file.parent() {
        let _ = fs::create_dir_all(parent);
    }

    if let Ok(content) = serde_json::to_string_pretty(sessions) {
        let _ = fs::write(&sessions_file, content);
    }
}

/// Log entry for a detected map rotation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationLogEntry {
    pub timestamp: String,
    pub map: Option<String>,
    pub size: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<u8>,
}

/// Log entry for a server connect attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectLogEntry {
    pub timestamp: String,
    pub server: String,
    pub connected: bool,
}

fn append_entry<T: Serialize + for<'de> Deserialize<'de>>(file_name: &str, entry: T) {
    let log_file = get_data_dir().join("logs").join(file_name);

    if let Some(parent) = log_file.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let mut data: Vec<T> = if log_file.exists() {
        fs::read_to_string(&log_file)
            .ok()
            .and_then(|c| serde_json::from_str(&c).ok())
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    data.push(entry);

    if let Ok(content) = serde_json::to_string_pretty(&data) {
        let _ = fs::write(&log_file, content);
    }
}

/// Record what the round-end screen revealed about the new rotation entry.
pub fn log_rotation(state: &GameInstanceState) {
    append_entry(
        "rotations.json",
        RotationLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            map: state.rotation_map_name().map(str::to_string),
            size: state.rotation_map_size(),
            team: state.round_team(),
        },
    );
}

/// Record the outcome of a connect attempt.
pub fn log_connect(server: &str, connected: bool) {
    append_entry(
        "connects.json",
        ConnectLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            server: server.to_string(),
            connected,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_entry_serializes_without_team() {
        let entry = RotationLogEntry {
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            map: Some("dalian-plant".to_string()),
            size: 32,
            team: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("dalian-plant"));
        assert!(!json.contains("team"));
    }
}
