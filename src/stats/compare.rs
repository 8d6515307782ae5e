//! Size and quality verdicts between two strategies.

use serde::{Deserialize, Serialize};

use crate::stats::AggregateStats;

/// Which strategy produced smaller output, and by how much.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeAdvantage {
    /// Strategy with the larger total saving.
    pub winner: String,
    /// The other strategy.
    pub runner_up: String,
    /// `runner_up.total_optimized_size - winner.total_optimized_size`.
    pub bytes: i64,
    /// Winner's output relative to the runner-up's, as percent smaller.
    pub percent: f64,
}

/// Which strategy kept more similarity, and by how much.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAdvantage {
    /// Strategy with the higher average similarity.
    pub winner: String,
    /// The other strategy.
    pub runner_up: String,
    /// Difference in average similarity.
    pub similarity: f64,
    /// Runner-up's similarity relative to the winner's, as percent lower.
    pub percent: f64,
}

/// Both verdicts for one pair of strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyComparison {
    /// Best by size.
    pub size: SizeAdvantage,
    /// Best by quality.
    pub quality: QualityAdvantage,
}

/// Compare two named aggregates.
///
/// Ties on either axis go to `baseline`.
#[must_use]
pub fn compare(
    baseline: (&str, &AggregateStats),
    candidate: (&str, &AggregateStats),
) -> StrategyComparison {
    let (size_winner, size_runner_up) = if baseline.1.total_saved >= candidate.1.total_saved {
        (baseline, candidate)
    } else {
        (candidate, baseline)
    };

    let (quality_winner, quality_runner_up) =
        if baseline.1.average_similarity >= candidate.1.average_similarity {
            (baseline, candidate)
        } else {
            (candidate, baseline)
        };

    StrategyComparison {
        size: size_advantage(size_winner, size_runner_up),
        quality: quality_advantage(quality_winner, quality_runner_up),
    }
}

fn size_advantage(
    (winner, best): (&str, &AggregateStats),
    (runner_up, worst): (&str, &AggregateStats),
) -> SizeAdvantage {
    let bytes = worst.total_optimized_size as i64 - best.total_optimized_size as i64;
    let percent = if worst.total_optimized_size > 0 {
        (1.0 - best.total_optimized_size as f64 / worst.total_optimized_size as f64) * 100.0
    } else {
        0.0
    };

    SizeAdvantage {
        winner: winner.to_string(),
        runner_up: runner_up.to_string(),
        bytes,
        percent,
    }
}

fn quality_advantage(
    (winner, best): (&str, &AggregateStats),
    (runner_up, worst): (&str, &AggregateStats),
) -> QualityAdvantage {
    let percent = if best.average_similarity != 0.0 {
        (1.0 - worst.average_similarity / best.average_similarity) * 100.0
    } else {
        0.0
    };

    QualityAdvantage {
        winner: winner.to_string(),
        runner_up: runner_up.to_string(),
        similarity: best.average_similarity - worst.average_similarity,
        percent,
    }
}
