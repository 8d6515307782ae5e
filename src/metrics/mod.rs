//! Quality metrics for comparing an original and an optimized image.
//!
//! The structural similarity score ([`ssim`]) is always computed. Extra
//! metrics are opt-in through [`MetricConfig`]:
//!
//! - **DSSIM**: Structural dissimilarity metric (lower is better, 0 = identical)
//! - **PSNR**: Peak Signal-to-Noise Ratio (higher is better)
//!
//! ## Perception Thresholds
//!
//! Based on empirical data from imageflow:
//!
//! | Level | DSSIM | Description |
//! |-------|-------|-------------|
//! | Imperceptible | < 0.0003 | Visually identical |
//! | Marginal | < 0.0007 | Only A/B comparison reveals |
//! | Subtle | < 0.0015 | Barely noticeable |
//! | Noticeable | < 0.003 | Visible on inspection |
//! | Degraded | >= 0.003 | Clearly visible artifacts |

pub mod dssim;
pub mod ssim;

use serde::{Deserialize, Serialize};

use crate::decode::PixelBitmap;
use crate::error::{Error, Result};

/// Configuration for which optional metrics to calculate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricConfig {
    /// Calculate DSSIM (structural dissimilarity).
    pub dssim: bool,
    /// Calculate PSNR (peak signal-to-noise ratio).
    pub psnr: bool,
}

impl MetricConfig {
    /// Calculate all available metrics.
    #[must_use]
    pub fn all() -> Self {
        Self {
            dssim: true,
            psnr: true,
        }
    }
}

/// Scores comparing a decoded reference with a decoded test image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricScores {
    /// Structural similarity, 1.0 = identical.
    pub ssim: f64,
    /// DSSIM value (lower is better, 0 = identical).
    pub dssim: Option<f64>,
    /// PSNR value in dB (higher is better).
    pub psnr: Option<f64>,
}

impl MetricScores {
    /// Get the perception level based on DSSIM value.
    #[must_use]
    pub fn perception_level(&self) -> Option<PerceptionLevel> {
        self.dssim.map(PerceptionLevel::from_dssim)
    }
}

/// Compute SSIM plus whatever `config` asks for.
pub fn measure(
    reference: &PixelBitmap,
    test: &PixelBitmap,
    config: &MetricConfig,
) -> Result<MetricScores> {
    check_dimensions(reference, test)?;

    let ssim = ssim::ssim(reference, test)?;

    let dssim = if config.dssim {
        let ref_img = dssim::rgba8_to_dssim_image(reference.data(), reference.width(), reference.height());
        let test_img = dssim::rgba8_to_dssim_image(test.data(), test.width(), test.height());
        Some(dssim::calculate_dssim(&ref_img, &test_img)?)
    } else {
        None
    };

    let psnr = if config.psnr {
        Some(calculate_psnr(reference, test)?)
    } else {
        None
    };

    Ok(MetricScores { ssim, dssim, psnr })
}

pub(crate) fn check_dimensions(reference: &PixelBitmap, test: &PixelBitmap) -> Result<()> {
    if reference.width() != test.width() || reference.height() != test.height() {
        return Err(Error::DimensionMismatch {
            expected: (reference.width(), reference.height()),
            actual: (test.width(), test.height()),
        });
    }
    Ok(())
}

/// Perceptual quality level based on metric thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerceptionLevel {
    /// DSSIM < 0.0003 - Visually identical.
    Imperceptible,
    /// DSSIM < 0.0007 - Only A/B comparison reveals difference.
    Marginal,
    /// DSSIM < 0.0015 - Barely noticeable.
    Subtle,
    /// DSSIM < 0.003 - Visible on inspection.
    Noticeable,
    /// DSSIM >= 0.003 - Clearly visible artifacts.
    Degraded,
}

impl PerceptionLevel {
    /// Determine perception level from DSSIM value.
    #[must_use]
    pub fn from_dssim(dssim: f64) -> Self {
        if dssim < 0.0003 {
            Self::Imperceptible
        } else if dssim < 0.0007 {
            Self::Marginal
        } else if dssim < 0.0015 {
            Self::Subtle
        } else if dssim < 0.003 {
            Self::Noticeable
        } else {
            Self::Degraded
        }
    }

    /// Get a short code for this level.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Imperceptible => "IMP",
            Self::Marginal => "MAR",
            Self::Subtle => "SUB",
            Self::Noticeable => "NOT",
            Self::Degraded => "DEG",
        }
    }
}

impl std::fmt::Display for PerceptionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Imperceptible => write!(f, "Imperceptible"),
            Self::Marginal => write!(f, "Marginal"),
            Self::Subtle => write!(f, "Subtle"),
            Self::Noticeable => write!(f, "Noticeable"),
            Self::Degraded => write!(f, "Degraded"),
        }
    }
}

/// Calculate PSNR between two bitmaps over the RGB channels.
///
/// Returns `f64::INFINITY` if the images are identical.
pub fn calculate_psnr(reference: &PixelBitmap, test: &PixelBitmap) -> Result<f64> {
    check_dimensions(reference, test)?;

    let mut mse_sum: f64 = 0.0;
    let sample_count = (reference.width() * reference.height() * 3) as f64;
    if sample_count == 0.0 {
        return Err(Error::MetricCalculation {
            metric: "PSNR".to_string(),
            reason: "empty image".to_string(),
        });
    }

    for (r, t) in reference
        .data()
        .chunks_exact(4)
        .zip(test.data().chunks_exact(4))
    {
        for c in 0..3 {
            let diff = f64::from(r[c]) - f64::from(t[c]);
            mse_sum += diff * diff;
        }
    }

    let mse = mse_sum / sample_count;

    if mse == 0.0 {
        Ok(f64::INFINITY)
    } else {
        Ok(10.0 * (255.0_f64 * 255.0 / mse).log10())
    }
}
