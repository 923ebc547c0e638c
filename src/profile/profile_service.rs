//! Loading and lookup of resolution profiles

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::base::ResolutionProfile;
use crate::error::{Error, Result};

/// Coordinate tables bundled with the binary.
const DEFAULT_COORDINATES: &str = include_str!("../../config/coordinates.json");

/// Validated per-resolution coordinate tables.
pub struct ProfileService {
    profiles: HashMap<String, ResolutionProfile>,
}

impl ProfileService {
    /// Load the bundled coordinate tables.
    pub fn load_default() -> Result<Self> {
        Self::from_json(DEFAULT_COORDINATES)
    }

    /// Load coordinate tables from an external file (overrides the bundled data).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {:?}: {}", path, e)))?;
        Self::from_json(&content)
    }

    fn from_json(content: &str) -> Result<Self> {
        let profiles: HashMap<String, ResolutionProfile> = serde_json::from_str(content)
            .map_err(|e| Error::Config(format!("invalid coordinate tables: {}", e)))?;

        if profiles.is_empty() {
            return Err(Error::Config("no resolution profiles defined".to_string()));
        }
        for (resolution, profile) in &profiles {
            profile.validate(resolution)?;
        }

        tracing::debug!("[PROFILE] Loaded {} resolution profiles", profiles.len());
        Ok(Self { profiles })
    }

    pub fn get(&self, resolution: &str) -> Result<&ResolutionProfile> {
        self.profiles
            .get(resolution)
            .ok_or_else(|| Error::UnknownResolution(resolution.to_string()))
    }

    pub fn resolutions(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_profiles_load() {
        let service = ProfileService::load_default().unwrap();
        let profile = service.get("720p").unwrap();
        assert_eq!(profile.size, (1280, 720));
        assert_eq!(service.get("900p").unwrap().size, (1600, 900));
    }

    #[test]
    fn test_bundled_profiles_have_core_regions() {
        let service = ProfileService::load_default().unwrap();
        for resolution in ["720p", "900p"] {
            let profile = service.get(resolution).unwrap();
            assert!(profile.click("connect-to-ip-ok-button").is_ok());
            assert!(profile.click("disconnect-prompt-yes-button").is_ok());
            assert!(profile.ocr_region("eor-map-name").is_ok());
            assert!(profile.ocr_region("spawn-selected-text").is_ok());
            assert!(profile.hist_region("teams", "left").is_ok());
            assert!(profile.hist_region("teams", "right").is_ok());
            assert!(profile.hist_region("menu", "multiplayer").is_ok());
            assert!(profile.hist_region("menu", "join-internet").is_ok());
        }
    }

    #[test]
    fn test_unknown_resolution() {
        let service = ProfileService::load_default().unwrap();
        assert!(matches!(
            service.get("1080p"),
            Err(Error::UnknownResolution(_))
        ));
    }
}
