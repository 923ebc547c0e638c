//! Text recognition over captured regions

use std::collections::HashMap;

use image::DynamicImage;
use rusty_tesseract::{Args, Image as TessImage};

use crate::error::{Error, Result};

/// Service for running OCR over small UI regions.
pub struct OcrService;

impl OcrService {
    pub fn new() -> Self {
        Self
    }

    /// Recognize text in a captured region, returning trimmed lowercase output.
    ///
    /// The target UI renders its text light-on-dark, so callers pass
    /// `invert = true` for menu/button regions to hand Tesseract dark-on-light
    /// input instead.
    pub fn recognize(&self, img: DynamicImage, invert: bool) -> Result<String> {
        let mut img = img;
        if invert {
            img.invert();
        }

        let tess_image =
            TessImage::from_dynamic_image(&img).map_err(|e| Error::Ocr(e.to_string()))?;

        // Single-line mode; every region covers exactly one label or button
        let args = Args {
            lang: "eng".to_string(),
            config_variables: HashMap::new(),
            dpi: Some(150),
            psm: Some(7),
            oem: Some(3),
        };

        let text = rusty_tesseract::image_to_string(&tess_image, &args)
            .map_err(|e| Error::Ocr(e.to_string()))?;

        Ok(text.trim().to_lowercase())
    }
}

impl Default for OcrService {
    fn default() -> Self {
        Self::new()
    }
}
