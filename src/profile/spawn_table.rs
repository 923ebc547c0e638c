//! Spawn coordinate table
//!
//! Maps a map slug and size to an ordered list of spawn-point screen offsets.
//! Index 0 and 1 are the team 0 and team 1 primary spawns; indices 2 and up
//! are alternates, ordered by decreasing likelihood that team 0 controls the
//! point.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::base::Point;
use crate::error::{Error, Result};

/// Spawn offsets bundled with the binary.
const DEFAULT_SPAWNS: &str = include_str!("../../config/spawns.json");

pub struct SpawnTable {
    maps: HashMap<String, HashMap<String, Vec<Point>>>,
}

impl SpawnTable {
    /// Load the bundled spawn table.
    pub fn load_default() -> Result<Self> {
        Self::from_json(DEFAULT_SPAWNS)
    }

    /// Load a spawn table from an external file (overrides the bundled data).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {:?}: {}", path, e)))?;
        Self::from_json(&content)
    }

    fn from_json(content: &str) -> Result<Self> {
        let maps: HashMap<String, HashMap<String, Vec<Point>>> = serde_json::from_str(content)
            .map_err(|e| Error::Config(format!("invalid spawn table: {}", e)))?;

        // Every entry needs at least the two per-team primary spawns.
        for (map, sizes) in &maps {
            for (size, points) in sizes {
                if points.len() < 2 {
                    return Err(Error::Config(format!(
                        "spawn entry {}/{} has fewer than two points",
                        map, size
                    )));
                }
            }
        }

        tracing::debug!("[SPAWNS] Loaded spawn table for {} maps", maps.len());
        Ok(Self { maps })
    }

    /// Whether the table knows the given map slug at all.
    pub fn contains_map(&self, slug: &str) -> bool {
        self.maps.contains_key(slug)
    }

    /// Ordered spawn candidates for a map and size.
    /// An absent combination is an unsupported configuration and fails hard.
    pub fn candidates(&self, map: &str, size: i32) -> Result<&[Point]> {
        self.maps
            .get(map)
            .and_then(|sizes| sizes.get(&size.to_string()))
            .map(Vec::as_slice)
            .ok_or_else(|| Error::UnsupportedMapSize {
                map: map.to_string(),
                size,
            })
    }

    /// All (map, size, candidates) entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &[Point])> {
        self.maps.iter().flat_map(|(map, sizes)| {
            sizes
                .iter()
                .map(move |(size, points)| (map.as_str(), size.as_str(), points.as_slice()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_table_loads() {
        let table = SpawnTable::load_default().unwrap();
        assert!(table.contains_map("strike-at-karkand"));
        assert!(table.contains_map("daqing-oilfields"));
        assert!(!table.contains_map("daging-oilfields"));
    }

    #[test]
    fn test_candidates_lookup() {
        let table = SpawnTable::load_default().unwrap();
        let points = table.candidates("dalian-plant", 32).unwrap();
        assert_eq!(points[0], Point { x: 618, y: 218 });
        assert_eq!(points[1], Point { x: 292, y: 296 });
    }

    #[test]
    fn test_absent_combination_is_unsupported() {
        let table = SpawnTable::load_default().unwrap();
        assert!(matches!(
            table.candidates("dalian-plant", 8),
            Err(Error::UnsupportedMapSize { .. })
        ));
        assert!(matches!(
            table.candidates("no-such-map", 32),
            Err(Error::UnsupportedMapSize { .. })
        ));
    }

    #[test]
    fn test_short_entry_rejected_at_load() {
        let result = SpawnTable::from_json(r#"{"some-map": {"16": [[100, 100]]}}"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
