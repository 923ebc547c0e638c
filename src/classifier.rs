//! Screen classification from visual evidence
//!
//! Two techniques cover everything the spectator needs to know about the
//! screen: OCR substring checks over small labeled regions, and histogram
//! signature matching against precomputed baselines for elements that carry
//! no readable text. Both read noisy pixels, so callers treat a negative
//! answer as "not yet" and retry through bounded polls.

use std::thread;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::profile::{Rect, ResolutionProfile, SpawnTable};
use crate::screen_reader::{HistService, OcrService, ScreenService};
use crate::state::MAP_SIZE_UNKNOWN;
use crate::window::Window;

/// Maximum signature distance for a histogram region to count as a match.
pub const HIST_MATCH_MAX_DELTA: f64 = 0.2;

/// Tighter threshold for default-camera-view detection; the full-view signal
/// is noisier and needs stricter discrimination.
pub const CAMERA_VIEW_MAX_DELTA: f64 = 0.175;

/// Minimum mean frame-to-frame delta that counts as on-screen action.
pub const ACTION_MIN_DELTA: f64 = 0.022;

/// Captures taken by one action-level measurement.
pub const ACTION_SAMPLE_COUNT: u32 = 3;

/// Pause between action-level captures.
pub const ACTION_SAMPLE_INTERVAL: Duration = Duration::from_millis(550);

/// Baseline category holding one default-camera-view signature per map.
pub const CAMERA_VIEW_CATEGORY: &str = "default-camera-view";

/// Spawn-menu faction banners shown on the left side, in match priority order.
/// A below-threshold match against any of them means team 0.
pub const SPAWN_MENU_FACTIONS_LEFT: [&str; 7] = [
    "usmc",
    "eu",
    "navy-seal",
    "sas",
    "rebels-left",
    "spetsnaz-left",
    "peglegs",
];

/// Right-side counterparts; a match means team 1.
pub const SPAWN_MENU_FACTIONS_RIGHT: [&str; 7] = [
    "china",
    "mec",
    "mec-sf",
    "insurgent",
    "rebels-right",
    "spetsnaz-right",
    "undead",
];

// Full-view region insets; trims the HUD edges and the minimap from
// whole-window captures
const VIEW_INSET_LEFT: i32 = 168;
const VIEW_INSET_TOP: i32 = 31;
const VIEW_TRIM_WIDTH: i32 = 336;
const VIEW_TRIM_HEIGHT: i32 = 40;

static MAP_NAME_NVN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\W?v\W?(\d+)").expect("valid NvN regex"));
static MAP_NAME_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s_.]+").expect("valid separator regex"));

/// Classifies captured regions of the game window.
pub struct ClassifyService {
    screen: ScreenService,
    ocr: OcrService,
    hists: HistService,
    profile: ResolutionProfile,
    resolution: String,
}

impl ClassifyService {
    pub fn new(resolution: impl Into<String>, profile: ResolutionProfile, hists: HistService) -> Self {
        Self {
            screen: ScreenService::new(),
            ocr: OcrService::new(),
            hists,
            profile,
            resolution: resolution.into(),
        }
    }

    /// Whether `expected` occurs (case-insensitively) in the OCR output of a
    /// named region. Regions with several rectangle variants match if any one
    /// variant does.
    pub fn is_text_present(&self, window: &Window, region: &str, expected: &str) -> Result<bool> {
        let expected = expected.to_lowercase();
        for rect in self.profile.ocr_region(region)?.rects() {
            let img = self.screen.capture_window_region(window, *rect)?;
            let text = self.ocr.recognize(img, true)?;
            if text.contains(&expected) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Raw OCR output of a named region; the first variant that yields any
    /// text wins.
    pub fn read_region_text(&self, window: &Window, region: &str) -> Result<String> {
        let mut last = String::new();
        for rect in self.profile.ocr_region(region)?.rects() {
            let img = self.screen.capture_window_region(window, *rect)?;
            last = self.ocr.recognize(img, true)?;
            if !last.is_empty() {
                break;
            }
        }
        Ok(last)
    }

    /// Whether a histogram region currently matches its baseline for `label`.
    pub fn is_hist_active(&self, window: &Window, category: &str, label: &str) -> Result<bool> {
        let rect = self.profile.hist_region(category, label)?;
        let signature = self.region_signature(window, rect)?;
        let baseline = self.hists.baseline(&self.resolution, category, label)?;
        Ok(HistService::distance(&signature, &baseline)? < HIST_MATCH_MAX_DELTA)
    }

    /// Whether the view shows the map's untouched default camera.
    /// False when the map is unknown or has no recorded baseline.
    pub fn is_default_camera_view(&self, window: &Window, map: Option<&str>) -> Result<bool> {
        let map = match map {
            Some(map) if self.hists.has_baseline(&self.resolution, CAMERA_VIEW_CATEGORY, map) => {
                map
            }
            _ => return Ok(false),
        };

        let signature = self.region_signature(window, full_view_rect(window))?;
        let baseline = self
            .hists
            .baseline(&self.resolution, CAMERA_VIEW_CATEGORY, map)?;
        Ok(HistService::distance(&signature, &baseline)? < CAMERA_VIEW_MAX_DELTA)
    }

    /// Mean signature delta between consecutive full-view captures.
    /// Higher means more is changing on screen.
    pub fn action_level(&self, window: &Window, samples: u32, interval: Duration) -> Result<f64> {
        let rect = full_view_rect(window);

        let mut signatures = Vec::with_capacity(samples as usize);
        for i in 0..samples {
            signatures.push(self.region_signature(window, rect)?);
            if i + 1 < samples {
                thread::sleep(interval);
            }
        }

        let mut deltas = Vec::with_capacity(signatures.len().saturating_sub(1));
        for pair in signatures.windows(2) {
            deltas.push(HistService::distance(&pair[0], &pair[1])?);
        }

        let average = deltas.iter().sum::<f64>() / deltas.len().max(1) as f64;
        tracing::debug!("[CLASSIFY] Average view delta: {:.4}", average);
        Ok(average)
    }

    /// Liveness predicate over [`Self::action_level`].
    pub fn is_sufficient_action(&self, window: &Window, min_delta: f64) -> Result<bool> {
        let level = self.action_level(window, ACTION_SAMPLE_COUNT, ACTION_SAMPLE_INTERVAL)?;
        Ok(level > min_delta)
    }

    /// OCR the round-end map-name region and resolve it to a known map slug.
    pub fn classify_map_name(
        &self,
        window: &Window,
        known_maps: &SpawnTable,
    ) -> Result<Option<String>> {
        let raw = self.read_region_text(window, "eor-map-name")?;
        let normalized = normalize_map_name(&raw);

        if known_maps.contains_map(&normalized) {
            return Ok(Some(normalized));
        }

        // Tesseract regularly reads the UI font's q as g ("daging" for
        // "daqing"); retry validation with the first g swapped
        let corrected = replace_first_g_with_q(&normalized);
        if corrected != normalized && known_maps.contains_map(&corrected) {
            tracing::debug!(
                "[CLASSIFY] Corrected misread map name '{}' to '{}'",
                normalized,
                corrected
            );
            return Ok(Some(corrected));
        }

        tracing::debug!("[CLASSIFY] Unrecognized map name '{}'", normalized);
        Ok(None)
    }

    /// OCR the round-end map-size region; anything but pure digits is the
    /// unknown sentinel.
    pub fn classify_map_size(&self, window: &Window) -> Result<i32> {
        let raw = self.read_region_text(window, "eor-map-size")?;
        let trimmed = raw.trim();

        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            Ok(trimmed.parse().unwrap_or(MAP_SIZE_UNKNOWN))
        } else {
            Ok(MAP_SIZE_UNKNOWN)
        }
    }

    /// Which team the spawn menu currently shows, if either side's faction
    /// banner matches a baseline.
    pub fn classify_team(&self, window: &Window) -> Result<Option<u8>> {
        let left = self.region_signature(window, self.profile.hist_region("teams", "left")?)?;
        let right = self.region_signature(window, self.profile.hist_region("teams", "right")?)?;

        for faction in SPAWN_MENU_FACTIONS_LEFT {
            if !self.hists.has_baseline(&self.resolution, "teams", faction) {
                continue;
            }
            let baseline = self.hists.baseline(&self.resolution, "teams", faction)?;
            if HistService::distance(&left, &baseline)? < HIST_MATCH_MAX_DELTA {
                tracing::debug!("[CLASSIFY] Left faction banner matches '{}'", faction);
                return Ok(Some(0));
            }
        }

        for faction in SPAWN_MENU_FACTIONS_RIGHT {
            if !self.hists.has_baseline(&self.resolution, "teams", faction) {
                continue;
            }
            let baseline = self.hists.baseline(&self.resolution, "teams", faction)?;
            if HistService::distance(&right, &baseline)? < HIST_MATCH_MAX_DELTA {
                tracing::debug!("[CLASSIFY] Right faction banner matches '{}'", faction);
                return Ok(Some(1));
            }
        }

        Ok(None)
    }

    fn region_signature(&self, window: &Window, rect: Rect) -> Result<opencv::core::Mat> {
        let img = self.screen.capture_window_region(window, rect)?;
        HistService::signature(&img.to_luma8())
    }
}

/// Full-view capture rectangle for a window, HUD edges trimmed.
fn full_view_rect(window: &Window) -> Rect {
    let (width, height) = window.size();
    Rect {
        x: VIEW_INSET_LEFT,
        y: VIEW_INSET_TOP,
        width: width - VIEW_TRIM_WIDTH,
        height: height - VIEW_TRIM_HEIGHT,
    }
}

/// Normalize an OCR'd map name into slug form: canonical `NvN` tokens,
/// separator runs collapsed to single dashes, lowercase.
pub fn normalize_map_name(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let nvn = MAP_NAME_NVN.replace_all(&lowered, "${1}v${2}");
    MAP_NAME_SEPARATORS.replace_all(&nvn, "-").into_owned()
}

/// Swap the first lowercase g for q.
fn replace_first_g_with_q(name: &str) -> String {
    match name.find('g') {
        Some(i) => format!("{}q{}", &name[..i], &name[i + 1..]),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plain_map_name() {
        assert_eq!(normalize_map_name("Strike At Karkand"), "strike-at-karkand");
        assert_eq!(normalize_map_name("daqing_oilfields"), "daqing-oilfields");
        assert_eq!(normalize_map_name("wake.island.2007"), "wake-island-2007");
    }

    #[test]
    fn test_normalize_collapses_separator_runs() {
        assert_eq!(normalize_map_name("gulf  of   oman"), "gulf-of-oman");
    }

    #[test]
    fn test_normalize_nvn_tokens() {
        assert_eq!(normalize_map_name("3 v 4"), "3v4");
        assert_eq!(normalize_map_name("dalian 2v2"), "dalian-2v2");
        assert_eq!(normalize_map_name("sharqi 2.v.2"), "sharqi-2v2");
    }

    #[test]
    fn test_first_g_becomes_q() {
        assert_eq!(replace_first_g_with_q("daging-oilfields"), "daqing-oilfields");
        assert_eq!(replace_first_g_with_q("no-letter-here"), "no-letter-here");
        // Only the first g is touched
        assert_eq!(replace_first_g_with_q("gg"), "qg");
    }

    #[test]
    fn test_full_view_rect_insets() {
        let window = Window {
            handle: 0,
            pid: 0,
            rect: (0, 0, 1280, 720),
        };
        let rect = full_view_rect(&window);
        assert_eq!(rect.x, 168);
        assert_eq!(rect.y, 31);
        assert_eq!(rect.width, 1280 - 336);
        assert_eq!(rect.height, 720 - 40);
    }

    #[test]
    fn test_faction_lists_are_disjoint() {
        for faction in SPAWN_MENU_FACTIONS_LEFT {
            assert!(!SPAWN_MENU_FACTIONS_RIGHT.contains(&faction));
        }
    }
}
