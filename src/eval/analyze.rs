//! Size and similarity analysis of an original/optimized buffer pair.

use serde::{Deserialize, Serialize};

use crate::buffer::ImageBuffer;
use crate::decode::decode;
use crate::error::Result;
use crate::metrics::{MetricConfig, PerceptionLevel, measure};

/// Size deltas and similarity scores for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Original size in bytes.
    pub original_size: u64,
    /// Size of the kept buffer in bytes.
    pub optimized_size: u64,
    /// `original_size - optimized_size`.
    pub saved: i64,
    /// Saved bytes as a percentage of the original size.
    pub percent: f64,
    /// Structural similarity between the decoded images, 1.0 = identical.
    pub ssim: f64,
    /// DSSIM, when enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dssim: Option<f64>,
    /// PSNR in dB, when enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psnr: Option<f64>,
    /// Perception level derived from DSSIM.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perception: Option<PerceptionLevel>,
}

/// Decode both buffers and compare them.
///
/// Each buffer is decoded according to its own sniffed format, so the two
/// may be in different containers.
pub fn analyze(
    original: &ImageBuffer,
    optimized: &ImageBuffer,
    config: &MetricConfig,
) -> Result<Analysis> {
    let (reference, test) = rayon::join(|| decode(original), || decode(optimized));
    let (reference, test) = (reference?, test?);

    let scores = measure(&reference, &test, config)?;

    let original_size = original.len() as u64;
    let optimized_size = optimized.len() as u64;
    let saved = original_size as i64 - optimized_size as i64;
    let percent = if original_size > 0 {
        saved as f64 / original_size as f64 * 100.0
    } else {
        0.0
    };

    Ok(Analysis {
        original_size,
        optimized_size,
        saved,
        percent,
        ssim: scores.ssim,
        dssim: scores.dssim,
        psnr: scores.psnr,
        perception: scores.perception_level(),
    })
}
