//! Report types for benchmark results.
//!
//! A run produces one [`BenchReport`], serialized to JSON (full detail) and
//! CSV (one row per file and strategy).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::buffer::ImageFormat;
use crate::error::{Error, Result};
use crate::eval::analyze::Analysis;
use crate::eval::processor::write_output;
use crate::stats::{AggregateStats, StrategyComparison, compare};

/// Outcome of processing one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    /// Input file.
    pub source: PathBuf,
    /// Where the kept buffer was written.
    pub dest: PathBuf,
    /// Sniffed format of the kept buffer.
    pub format: ImageFormat,
    /// `true` when the pipeline output was kept, `false` when the original was.
    pub optimized: bool,
    /// Sizes and similarity.
    #[serde(flatten)]
    pub analysis: Analysis,
}

impl AnalyzeResult {
    /// Destination file name for display.
    #[must_use]
    pub fn dest_name(&self) -> String {
        self.dest
            .file_name()
            .map_or_else(|| self.dest.display().to_string(), |n| n.to_string_lossy().into_owned())
    }
}

/// Results of one run over every configured strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchReport {
    /// When the run finished.
    #[serde(with = "chrono_serde")]
    pub timestamp: chrono::DateTime<chrono::Utc>,

    /// Strategy names in configuration order. The first is the baseline.
    pub strategies: Vec<String>,

    /// Aggregate per strategy; `null` when the strategy processed no files.
    pub total: BTreeMap<String, Option<AggregateStats>>,

    /// Per-file results per strategy, in discovery order.
    pub images: BTreeMap<String, Vec<AnalyzeResult>>,
}

impl BenchReport {
    /// Build a report from per-strategy results, given in configuration order.
    #[must_use]
    pub fn from_results(results: Vec<(String, Vec<AnalyzeResult>)>) -> Self {
        let mut strategies = Vec::with_capacity(results.len());
        let mut total = BTreeMap::new();
        let mut images = BTreeMap::new();

        for (name, files) in results {
            total.insert(name.clone(), AggregateStats::from_results(&files));
            images.insert(name.clone(), files);
            strategies.push(name);
        }

        Self {
            timestamp: chrono::Utc::now(),
            strategies,
            total,
            images,
        }
    }

    /// Name of the baseline strategy.
    #[must_use]
    pub fn baseline(&self) -> Option<&str> {
        self.strategies.first().map(String::as_str)
    }

    /// Aggregate for `strategy`, `None` when it processed no files.
    pub fn aggregate(&self, strategy: &str) -> Result<Option<&AggregateStats>> {
        self.total
            .get(strategy)
            .map(Option::as_ref)
            .ok_or_else(|| Error::Configuration(format!("unknown strategy `{strategy}`")))
    }

    /// Per-file results for `strategy`.
    pub fn results(&self, strategy: &str) -> Result<&[AnalyzeResult]> {
        self.images
            .get(strategy)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::Configuration(format!("unknown strategy `{strategy}`")))
    }

    /// Compare two strategies. Ties favor `baseline`.
    ///
    /// Returns `None` when either strategy has no aggregate.
    pub fn compare(&self, baseline: &str, candidate: &str) -> Result<Option<StrategyComparison>> {
        let (Some(a), Some(b)) = (self.aggregate(baseline)?, self.aggregate(candidate)?) else {
            return Ok(None);
        };
        Ok(Some(compare((baseline, a), (candidate, b))))
    }

    /// Every other strategy compared against the baseline, in order.
    pub fn comparisons(&self) -> Result<Vec<StrategyComparison>> {
        let Some(baseline) = self.baseline() else {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        for candidate in self.strategies.iter().skip(1) {
            if let Some(comparison) = self.compare(baseline, candidate)? {
                out.push(comparison);
            }
        }
        Ok(out)
    }

    /// Load a report written by [`BenchReport::write`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write `<dir>/<name>.json` and `<dir>/<name>.csv`.
    ///
    /// Returns the JSON path.
    pub fn write(&self, dir: &Path, name: &str) -> Result<PathBuf> {
        let json_path = dir.join(format!("{name}.json"));
        let json = serde_json::to_string_pretty(self)?;
        write_output(&json_path, json.as_bytes())?;

        let csv_path = dir.join(format!("{name}.csv"));
        write_output(&csv_path, &self.to_csv()?)?;

        Ok(json_path)
    }

    /// CSV with one row per strategy and file.
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut wtr = csv::Writer::from_writer(Vec::new());

        wtr.write_record([
            "strategy",
            "source",
            "dest",
            "format",
            "optimized",
            "original_size",
            "optimized_size",
            "saved",
            "percent",
            "ssim",
            "dssim",
            "psnr",
            "perception",
        ])?;

        for strategy in &self.strategies {
            let Some(results) = self.images.get(strategy) else {
                continue;
            };
            for result in results {
                let a = &result.analysis;
                wtr.write_record([
                    strategy.as_str(),
                    &result.source.display().to_string(),
                    &result.dest.display().to_string(),
                    &result.format.to_string(),
                    &result.optimized.to_string(),
                    &a.original_size.to_string(),
                    &a.optimized_size.to_string(),
                    &a.saved.to_string(),
                    &format!("{:.2}", a.percent),
                    &format!("{:.6}", a.ssim),
                    &a.dssim.map_or(String::new(), |d| format!("{d:.6}")),
                    &a.psnr.map_or(String::new(), |p| format!("{p:.2}")),
                    &a.perception.map_or(String::new(), |p| p.code().to_string()),
                ])?;
            }
        }

        wtr.into_inner()
            .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))
    }
}

mod chrono_serde {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        dt.to_rfc3339().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
