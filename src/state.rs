//! Believed state of the active game instance
//!
//! A single mutable record of what the spectator currently thinks the game
//! is showing: the rotation's map, its size and the team assigned for the
//! round. Written exclusively by the interaction controller after successful
//! classifications, read by the spawn selector. One thread of control, so no
//! locking.

/// Sentinel used until the round-end map size has been read.
pub const MAP_SIZE_UNKNOWN: i32 = -1;

#[derive(Debug, Clone)]
pub struct GameInstanceState {
    rotation_map_name: Option<String>,
    rotation_map_size: i32,
    round_team: Option<u8>,
}

impl GameInstanceState {
    pub fn new() -> Self {
        Self {
            rotation_map_name: None,
            rotation_map_size: MAP_SIZE_UNKNOWN,
            round_team: None,
        }
    }

    pub fn rotation_map_name(&self) -> Option<&str> {
        self.rotation_map_name.as_deref()
    }

    pub fn set_rotation_map_name(&mut self, name: impl Into<String>) {
        self.rotation_map_name = Some(name.into());
    }

    pub fn rotation_map_size(&self) -> i32 {
        self.rotation_map_size
    }

    pub fn set_rotation_map_size(&mut self, size: i32) {
        self.rotation_map_size = size;
    }

    /// Round team, 0 or 1; `None` until detected.
    pub fn round_team(&self) -> Option<u8> {
        self.round_team
    }

    pub fn set_round_team(&mut self, team: u8) {
        self.round_team = Some(team);
    }

    pub fn clear_round_team(&mut self) {
        self.round_team = None;
    }

    /// Forget everything about the current rotation entry.
    /// Called when a new map rotation starts.
    pub fn reset_rotation(&mut self) {
        self.rotation_map_name = None;
        self.rotation_map_size = MAP_SIZE_UNKNOWN;
        self.round_team = None;
    }
}

impl Default for GameInstanceState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_unknown() {
        let state = GameInstanceState::new();
        assert!(state.rotation_map_name().is_none());
        assert_eq!(state.rotation_map_size(), MAP_SIZE_UNKNOWN);
        assert!(state.round_team().is_none());
    }

    #[test]
    fn test_reset_rotation_clears_all_fields() {
        let mut state = GameInstanceState::new();
        state.set_rotation_map_name("dalian-plant");
        state.set_rotation_map_size(32);
        state.set_round_team(1);

        state.reset_rotation();

        assert!(state.rotation_map_name().is_none());
        assert_eq!(state.rotation_map_size(), MAP_SIZE_UNKNOWN);
        assert!(state.round_team().is_none());
    }
}
