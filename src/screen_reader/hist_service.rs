//! Grayscale histogram signatures and baseline comparison
//!
//! Screens that carry no reliable text (active menu tabs, team banners, the
//! default camera view) are classified by comparing a histogram signature of
//! the captured region against precomputed baselines. The comparison uses
//! the Bhattacharyya distance: symmetric, and zero for identical captures.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use image::GrayImage;
use opencv::{
    core::{no_array, Mat, NORM_L1, CV_8UC1},
    imgproc,
    prelude::*,
};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Number of bins in a signature; one per 8-bit gray level.
pub const HIST_BINS: i32 = 256;

/// Baseline signatures keyed resolution -> category -> label.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
struct BaselineStore {
    resolutions: HashMap<String, HashMap<String, HashMap<String, Vec<f32>>>>,
}

/// Service for computing signatures and matching them against baselines.
pub struct HistService {
    baselines: BaselineStore,
}

impl HistService {
    /// Create a service with no baselines (every match check reports a miss).
    pub fn empty() -> Self {
        Self {
            baselines: BaselineStore::default(),
        }
    }

    /// Load the baseline store from a JSON asset. Done once, before
    /// orchestration begins.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {:?}: {}", path, e)))?;
        let baselines: BaselineStore = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid baseline store: {}", e)))?;

        tracing::debug!(
            "[HIST] Loaded baselines for {} resolutions",
            baselines.resolutions.len()
        );
        Ok(Self { baselines })
    }

    /// Load baselines, falling back to an empty store with a warning.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load_from_file(path) {
            Ok(service) => service,
            Err(e) => {
                tracing::warn!("[HIST] No usable baseline store: {}", e);
                Self::empty()
            }
        }
    }

    pub fn has_baseline(&self, resolution: &str, category: &str, label: &str) -> bool {
        self.bins(resolution, category, label).is_some()
    }

    fn bins(&self, resolution: &str, category: &str, label: &str) -> Option<&Vec<f32>> {
        self.baselines
            .resolutions
            .get(resolution)?
            .get(category)?
            .get(label)
    }

    /// Baseline signature as a comparison-ready Mat.
    pub fn baseline(&self, resolution: &str, category: &str, label: &str) -> Result<Mat> {
        let bins = self
            .bins(resolution, category, label)
            .ok_or_else(|| Error::MissingBaseline {
                resolution: resolution.to_string(),
                category: category.to_string(),
                label: label.to_string(),
            })?;
        Self::signature_from_bins(bins)
    }

    /// Compute the normalized signature of a captured grayscale region.
    pub fn signature(img: &GrayImage) -> Result<Mat> {
        let mat = gray_image_to_mat(img)?;

        let images = opencv::core::Vector::<Mat>::from_iter([mat]);
        let channels = opencv::core::Vector::<i32>::from_iter([0]);
        let hist_size = opencv::core::Vector::<i32>::from_iter([HIST_BINS]);
        let ranges = opencv::core::Vector::<f32>::from_iter([0.0, 256.0]);

        let mut hist = Mat::default();
        imgproc::calc_hist(
            &images,
            &channels,
            &no_array(),
            &mut hist,
            &hist_size,
            &ranges,
            false,
        )?;

        let mut normalized = Mat::default();
        opencv::core::normalize(&hist, &mut normalized, 1.0, 0.0, NORM_L1, -1, &no_array())?;
        Ok(normalized)
    }

    /// Rebuild a stored baseline vector into the same shape `signature` produces.
    pub fn signature_from_bins(bins: &[f32]) -> Result<Mat> {
        let row = Mat::from_slice(bins)?;
        let column = row.reshape(1, bins.len() as i32)?;
        Ok(column.try_clone()?)
    }

    /// Symmetric distance between two signatures; 0.0 for identical input.
    pub fn distance(a: &Mat, b: &Mat) -> Result<f64> {
        Ok(imgproc::compare_hist(a, b, imgproc::HISTCMP_BHATTACHARYYA)?)
    }
}

/// Convert an image::GrayImage to an owned OpenCV Mat.
fn gray_image_to_mat(img: &GrayImage) -> Result<Mat> {
    let (width, height) = (img.width() as i32, img.height() as i32);
    let data = img.as_raw();

    // Step is width * 1 byte per pixel for single-channel grayscale
    let step = width as usize;
    let mat = unsafe {
        Mat::new_rows_cols_with_data_unsafe(
            height,
            width,
            CV_8UC1,
            data.as_ptr() as *mut std::ffi::c_void,
            step,
        )?
    };

    // Clone so the Mat owns its pixels instead of borrowing from the GrayImage
    Ok(mat.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn test_image(seed: u32) -> GrayImage {
        let mut img = GrayImage::new(32, 32);
        for y in 0..32 {
            for x in 0..32 {
                img.put_pixel(x, y, Luma([((x * 7 + y * 13 + seed) % 256) as u8]));
            }
        }
        img
    }

    #[test]
    fn test_distance_zero_for_identical_captures() {
        let img = test_image(0);
        let a = HistService::signature(&img).unwrap();
        let b = HistService::signature(&img).unwrap();
        assert!(HistService::distance(&a, &b).unwrap() < 1e-6);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = HistService::signature(&test_image(0)).unwrap();
        let b = HistService::signature(&test_image(101)).unwrap();

        let ab = HistService::distance(&a, &b).unwrap();
        let ba = HistService::distance(&b, &a).unwrap();
        assert!((ab - ba).abs() < 1e-9);
        assert!(ab > 0.0);
    }

    #[test]
    fn test_baseline_roundtrip_matches_signature() {
        let img = test_image(3);
        let sig = HistService::signature(&img).unwrap();

        // Flatten the signature into a plain vector, as the asset store keeps it
        let mut bins = vec![0f32; HIST_BINS as usize];
        for (i, bin) in bins.iter_mut().enumerate() {
            *bin = *sig.at::<f32>(i as i32).unwrap();
        }

        let rebuilt = HistService::signature_from_bins(&bins).unwrap();
        assert!(HistService::distance(&sig, &rebuilt).unwrap() < 1e-6);
    }

    #[test]
    fn test_missing_baseline_is_typed_error() {
        let service = HistService::empty();
        assert!(!service.has_baseline("720p", "teams", "usmc"));
        assert!(matches!(
            service.baseline("720p", "teams", "usmc"),
            Err(Error::MissingBaseline { .. })
        ));
    }
}
