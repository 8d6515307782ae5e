//! Windowed structural similarity (SSIM) over RGBA bitmaps.
//!
//! Each pixel is reduced to Rec. 709 luma, the image is tiled into 8x8
//! windows (edge windows are truncated, not padded), SSIM is evaluated per
//! window and the mean over all windows is returned. The score lies in
//! [-1, 1] and is exactly 1.0 for identical bitmaps.

use crate::decode::PixelBitmap;
use crate::error::{Error, Result};
use crate::metrics::check_dimensions;

/// Window edge length in pixels.
pub const WINDOW_SIZE: usize = 8;

const K1: f64 = 0.01;
const K2: f64 = 0.03;
const DYNAMIC_RANGE: f64 = 255.0;

/// Compute the mean SSIM between two bitmaps of equal dimensions.
pub fn ssim(reference: &PixelBitmap, test: &PixelBitmap) -> Result<f64> {
    check_dimensions(reference, test)?;

    let (width, height) = (reference.width(), reference.height());
    if width == 0 || height == 0 {
        return Err(Error::MetricCalculation {
            metric: "SSIM".to_string(),
            reason: "empty image".to_string(),
        });
    }

    let ref_luma = luma_plane(reference);
    let test_luma = luma_plane(test);

    let mut total = 0.0;
    let mut windows = 0usize;

    for y in (0..height).step_by(WINDOW_SIZE) {
        let window_height = WINDOW_SIZE.min(height - y);
        for x in (0..width).step_by(WINDOW_SIZE) {
            let window_width = WINDOW_SIZE.min(width - x);
            let window = Window {
                x,
                y,
                width: window_width,
                height: window_height,
                stride: width,
            };
            total += window_ssim(&ref_luma, &test_luma, &window);
            windows += 1;
        }
    }

    Ok(total / windows as f64)
}

struct Window {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    stride: usize,
}

impl Window {
    fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        (self.y..self.y + self.height)
            .flat_map(move |row| (self.x..self.x + self.width).map(move |col| row * self.stride + col))
    }
}

fn window_ssim(reference: &[f64], test: &[f64], window: &Window) -> f64 {
    let c1 = (K1 * DYNAMIC_RANGE).powi(2);
    let c2 = (K2 * DYNAMIC_RANGE).powi(2);
    let n = (window.width * window.height) as f64;

    let (mut sum_ref, mut sum_test) = (0.0, 0.0);
    for i in window.indices() {
        sum_ref += reference[i];
        sum_test += test[i];
    }
    let mean_ref = sum_ref / n;
    let mean_test = sum_test / n;

    let (mut var_ref, mut var_test, mut covar) = (0.0, 0.0, 0.0);
    for i in window.indices() {
        let dr = reference[i] - mean_ref;
        let dt = test[i] - mean_test;
        var_ref += dr * dr;
        var_test += dt * dt;
        covar += dr * dt;
    }
    var_ref /= n;
    var_test /= n;
    covar /= n;

    let numerator = (2.0 * mean_ref * mean_test + c1) * (2.0 * covar + c2);
    let denominator = (mean_ref * mean_ref + mean_test * mean_test + c1) * (var_ref + var_test + c2);

    numerator / denominator
}

fn luma_plane(bitmap: &PixelBitmap) -> Vec<f64> {
    bitmap
        .data()
        .chunks_exact(PixelBitmap::CHANNELS)
        .map(|p| 0.2126 * f64::from(p[0]) + 0.7152 * f64::from(p[1]) + 0.0722 * f64::from(p[2]))
        .collect()
}
