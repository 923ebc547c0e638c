//! Screen capture service

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result as CaptureResult};
use image::DynamicImage;
use screenshots::Screen;

use crate::error::{Error, Result};
use crate::profile::Rect;
use crate::window::Window;

/// Region for screenshot capture, in screen coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Translate a window-relative rectangle into screen coordinates.
    pub fn from_window_rect(window: &Window, rect: Rect) -> Self {
        let (left, top, _, _) = window.rect;
        Self {
            left: left + rect.x,
            top: top + rect.y,
            width: rect.width.max(0) as u32,
            height: rect.height.max(0) as u32,
        }
    }
}

/// Service for capturing regions of the game window.
pub struct ScreenService;

impl ScreenService {
    pub fn new() -> Self {
        Self
    }

    /// Capture a window-relative rectangle.
    /// Transient capture failures are retried a few times before giving up.
    pub fn capture_window_region(&self, window: &Window, rect: Rect) -> Result<DynamicImage> {
        let region = Region::from_window_rect(window, rect);
        self.safe_screenshot(region, 3, Duration::from_millis(100))
            .ok_or_else(|| {
                Error::Capture(format!(
                    "region {}x{} at ({}, {}) could not be captured",
                    region.width, region.height, region.left, region.top
                ))
            })
    }

    /// Take a screenshot with retries.
    fn safe_screenshot(
        &self,
        region: Region,
        retries: u32,
        delay: Duration,
    ) -> Option<DynamicImage> {
        for i in 0..retries {
            match self.capture(region) {
                Ok(img) => return Some(img),
                Err(e) => {
                    tracing::warn!("Screenshot failed: {}. Retrying ({}/{})", e, i + 1, retries);
                    thread::sleep(delay);
                }
            }
        }
        None
    }

    fn capture(&self, region: Region) -> CaptureResult<DynamicImage> {
        let screens = Screen::all().context("Failed to get screens")?;

        if screens.is_empty() {
            anyhow::bail!("No screens found");
        }

        // Primary screen; the game window is expected on it
        let screen = &screens[0];

        let image = screen
            .capture_area(region.left, region.top, region.width, region.height)
            .context("Failed to capture area")?;

        let rgba_image = image::RgbaImage::from_raw(image.width(), image.height(), image.to_vec())
            .context("Failed to create image from raw data")?;

        Ok(DynamicImage::ImageRgba8(rgba_image))
    }
}

impl Default for ScreenService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_from_window_rect() {
        let window = Window {
            handle: 0,
            pid: 0,
            rect: (100, 200, 1380, 920),
        };
        let rect = Rect {
            x: 72,
            y: 82,
            width: 740,
            height: 20,
        };

        let region = Region::from_window_rect(&window, rect);
        assert_eq!(region.left, 172);
        assert_eq!(region.top, 282);
        assert_eq!(region.width, 740);
        assert_eq!(region.height, 20);
    }
}
