//! Run configuration files and strategy definitions.
//!
//! A run file is JSON:
//!
//! ```json
//! {
//!   "input": ["images/*.jpg"],
//!   "output": "out",
//!   "threads": 8,
//!   "metrics": { "dssim": true },
//!   "strategies": [
//!     { "name": "jpeg", "stages": ["jpeg:84"] },
//!     { "name": "webp", "stages": [{ "codec": "webp", "quality": 80 }] }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::eval::session::{BenchConfig, BenchSession};
use crate::metrics::MetricConfig;
use crate::pipeline::{Pipeline, StageSpec};

/// A named, ordered list of stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategySpec {
    /// Strategy name; also the output subdirectory.
    pub name: String,
    /// Stages applied in order. Empty means identity.
    #[serde(deserialize_with = "deserialize_stages")]
    pub stages: Vec<StageSpec>,
}

impl StrategySpec {
    /// Parse `name=stage+stage`, e.g. `small=jpeg:60` or `lossless=webp-lossless`.
    ///
    /// `name=` with nothing after it is the identity strategy.
    pub fn parse(s: &str) -> Result<Self> {
        let (name, stages) = s.split_once('=').ok_or_else(|| {
            Error::Configuration(format!("strategy `{s}` must look like name=stage+stage"))
        })?;

        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Configuration(format!("strategy `{s}` has no name")));
        }

        let stages = stages
            .split('+')
            .map(str::trim)
            .filter(|stage| !stage.is_empty())
            .map(str::parse::<StageSpec>)
            .collect::<Result<Vec<StageSpec>>>()?;

        Ok(Self {
            name: name.to_string(),
            stages,
        })
    }

    /// Build the pipeline for this strategy.
    pub fn pipeline(&self) -> Result<Pipeline> {
        Pipeline::from_specs(&self.stages)
    }
}

impl std::str::FromStr for StrategySpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Strategies used when none are configured: JPEG q84 as the baseline
/// against lossy WebP q80.
#[must_use]
pub fn default_strategies() -> Vec<StrategySpec> {
    vec![
        StrategySpec {
            name: "jpeg".to_string(),
            stages: vec![StageSpec::Jpeg { quality: 84 }],
        },
        StrategySpec {
            name: "webp".to_string(),
            stages: vec![StageSpec::Webp { quality: 80 }],
        },
    ]
}

/// Contents of a run configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Input glob patterns.
    #[serde(default)]
    pub input: Vec<String>,
    /// Output directory.
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Worker threads.
    #[serde(default)]
    pub threads: Option<usize>,
    /// Optional metrics.
    #[serde(default)]
    pub metrics: Option<MetricConfig>,
    /// Strategies; the first is the baseline.
    #[serde(default)]
    pub strategies: Vec<StrategySpec>,
}

impl RunConfig {
    /// Load a run file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Configuration(format!("{}: {e}", path.display())))
    }

    /// Parse run configuration JSON.
    ///
    /// Shape errors (e.g. `input` not being an array) are configuration
    /// errors.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Configuration(e.to_string()))
    }

    /// Configured strategies, or [`default_strategies`] when there are none.
    #[must_use]
    pub fn strategies_or_default(&self) -> Vec<StrategySpec> {
        if self.strategies.is_empty() {
            default_strategies()
        } else {
            self.strategies.clone()
        }
    }

    /// Session configuration from this file.
    pub fn bench_config(&self) -> Result<BenchConfig> {
        let output = self
            .output
            .clone()
            .ok_or_else(|| Error::Configuration("no output directory configured".to_string()))?;

        let mut builder = BenchConfig::builder()
            .output_dir(output)
            .metrics(self.metrics.unwrap_or_default());
        if let Some(threads) = self.threads {
            builder = builder.threads(threads);
        }
        builder.build()
    }

    /// Session with every strategy registered, validated.
    pub fn session(&self) -> Result<BenchSession> {
        let mut session = BenchSession::new(self.bench_config()?);
        for strategy in self.strategies_or_default() {
            session.add_strategy(strategy.name.clone(), strategy.pipeline()?);
        }
        session.validate()?;
        Ok(session)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StageEntry {
    Text(String),
    Spec(StageSpec),
}

fn deserialize_stages<'de, D>(deserializer: D) -> std::result::Result<Vec<StageSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<StageEntry>::deserialize(deserializer)?
        .into_iter()
        .map(|entry| match entry {
            StageEntry::Text(text) => text.parse().map_err(serde::de::Error::custom),
            StageEntry::Spec(spec) => Ok(spec),
        })
        .collect()
}
