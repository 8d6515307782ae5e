//! Batch-wide totals for one strategy.

use serde::{Deserialize, Serialize};

use crate::eval::report::AnalyzeResult;
use crate::stats::mean;

/// Batch-wide totals for one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    /// Sum of original sizes in bytes.
    pub total_original_size: u64,
    /// Sum of kept sizes in bytes.
    pub total_optimized_size: u64,
    /// Sum of per-file savings.
    pub total_saved: i64,
    /// `total_saved / total_original_size * 100`, or 0 for an all-empty batch.
    pub average_percent_saved: f64,
    /// Mean SSIM over all files.
    pub average_similarity: f64,
    /// Number of files.
    #[serde(default)]
    pub file_count: usize,
    /// Files where the pipeline output was kept.
    #[serde(default)]
    pub optimized_count: usize,
    /// Mean DSSIM over files that carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_dssim: Option<f64>,
}

impl AggregateStats {
    /// Reduce per-file results. Returns `None` for an empty batch.
    #[must_use]
    pub fn from_results(results: &[AnalyzeResult]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }

        let mut total_original_size = 0u64;
        let mut total_optimized_size = 0u64;
        let mut total_saved = 0i64;
        let mut optimized_count = 0;
        let mut similarities = Vec::with_capacity(results.len());
        let mut dssims = Vec::new();

        for result in results {
            let a = &result.analysis;
            total_original_size += a.original_size;
            total_optimized_size += a.optimized_size;
            total_saved += a.saved;
            similarities.push(a.ssim);
            if let Some(dssim) = a.dssim {
                dssims.push(dssim);
            }
            if result.optimized {
                optimized_count += 1;
            }
        }

        let average_percent_saved = if total_original_size > 0 {
            total_saved as f64 / total_original_size as f64 * 100.0
        } else {
            0.0
        };

        Some(Self {
            total_original_size,
            total_optimized_size,
            total_saved,
            average_percent_saved,
            average_similarity: mean(&similarities),
            file_count: results.len(),
            optimized_count,
            average_dssim: (!dssims.is_empty()).then(|| mean(&dssims)),
        })
    }
}
