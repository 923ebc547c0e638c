//! Base types for resolution profile data

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Error, Result};

/// A click target, window-relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "[i32; 2]")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl From<[i32; 2]> for Point {
    fn from(v: [i32; 2]) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

/// A capture rectangle, window-relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "[i32; 4]")]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl From<[i32; 4]> for Rect {
    fn from(v: [i32; 4]) -> Self {
        Self {
            x: v[0],
            y: v[1],
            width: v[2],
            height: v[3],
        }
    }
}

/// An OCR region: one rectangle, or several rectangle variants covering
/// skin/scale differences. A text check over a multi-variant region is a
/// logical OR across all variants.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OcrRegion {
    Single(Rect),
    Variants(Vec<Rect>),
}

impl OcrRegion {
    pub fn rects(&self) -> &[Rect] {
        match self {
            OcrRegion::Single(rect) => std::slice::from_ref(rect),
            OcrRegion::Variants(rects) => rects,
        }
    }
}

/// All named coordinates for one supported window resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolutionProfile {
    /// Reference window size this profile was authored against.
    pub size: (i32, i32),
    clicks: HashMap<String, Point>,
    ocr: HashMap<String, OcrRegion>,
    hists: HashMap<String, HashMap<String, Rect>>,
}

impl ResolutionProfile {
    pub fn click(&self, name: &str) -> Result<Point> {
        self.clicks.get(name).copied().ok_or_else(|| Error::UnknownRegion {
            kind: "click",
            name: name.to_string(),
        })
    }

    pub fn ocr_region(&self, name: &str) -> Result<&OcrRegion> {
        self.ocr.get(name).ok_or_else(|| Error::UnknownRegion {
            kind: "ocr",
            name: name.to_string(),
        })
    }

    pub fn hist_region(&self, category: &str, label: &str) -> Result<Rect> {
        self.hists
            .get(category)
            .and_then(|labels| labels.get(label))
            .copied()
            .ok_or_else(|| Error::UnknownRegion {
                kind: "histogram",
                name: format!("{}/{}", category, label),
            })
    }

    /// Whether an observed window size matches the profile's reference size.
    pub fn matches_window_size(&self, size: (i32, i32)) -> bool {
        self.size == size
    }

    pub(crate) fn validate(&self, resolution: &str) -> Result<()> {
        if self.size.0 <= 0 || self.size.1 <= 0 {
            return Err(Error::Config(format!(
                "profile '{}' has a non-positive reference size",
                resolution
            )));
        }
        for (name, region) in &self.ocr {
            if region.rects().is_empty() {
                return Err(Error::Config(format!(
                    "ocr region '{}' in profile '{}' has no rectangles",
                    name, resolution
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_and_rect_from_arrays() {
        let point: Point = serde_json::from_str("[618, 218]").unwrap();
        assert_eq!(point, Point { x: 618, y: 218 });

        let rect: Rect = serde_json::from_str("[72, 82, 740, 20]").unwrap();
        assert_eq!(rect.width, 740);
        assert_eq!(rect.height, 20);
    }

    #[test]
    fn test_ocr_region_variants() {
        let single: OcrRegion = serde_json::from_str("[1160, 42, 45, 20]").unwrap();
        assert_eq!(single.rects().len(), 1);

        let variants: OcrRegion =
            serde_json::from_str("[[1160, 42, 45, 20], [1158, 40, 49, 24]]").unwrap();
        assert_eq!(variants.rects().len(), 2);
        assert_eq!(variants.rects()[1].x, 1158);
    }

    #[test]
    fn test_unknown_lookup_is_typed_error() {
        let profile: ResolutionProfile = serde_json::from_str(
            r#"{"size": [1280, 720], "clicks": {}, "ocr": {}, "hists": {}}"#,
        )
        .unwrap();

        assert!(matches!(
            profile.click("quit-menu-item"),
            Err(Error::UnknownRegion { kind: "click", .. })
        ));
        assert!(matches!(
            profile.hist_region("menu", "multiplayer"),
            Err(Error::UnknownRegion { kind: "histogram", .. })
        ));
    }
}
