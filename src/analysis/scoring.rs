//! Future-risk and performance scores
//!
//! Scores supplied by the generation service win when present. Otherwise a
//! weighted heuristic over the structural metrics fills in, using the
//! `[scoring]` weights.

use serde::{Deserialize, Serialize};

use super::access::AccessReport;
use super::evolution::EvolutionReport;
use crate::config::ScoringConfig;
use crate::error::Result;
use crate::schema::Schema;
use crate::tree::StructuralMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    Supplied,
    Heuristic,
}

/// A score on a 0..=100 scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub value: f64,
    pub source: ScoreSource,
}

impl Score {
    fn pick(supplied: Option<f64>, heuristic: impl FnOnce() -> f64) -> Self {
        match supplied.filter(|v| v.is_finite()) {
            Some(value) => Score {
                value: value.clamp(0.0, 100.0),
                source: ScoreSource::Supplied,
            },
            None => Score {
                value: heuristic().clamp(0.0, 100.0),
                source: ScoreSource::Heuristic,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Higher means riskier
    pub future_risk: Score,
    /// Higher means faster
    pub performance_index: Score,
    pub warnings: usize,
    pub unbounded_arrays: usize,
}

/// Risk grows with depth, width, warnings and arrays that keep growing
pub fn future_risk_score(
    metrics: &StructuralMetrics,
    warnings: usize,
    unbounded_arrays: usize,
    supplied: Option<f64>,
    config: &ScoringConfig,
) -> Score {
    Score::pick(supplied, || {
        metrics.max_depth as f64 * config.depth_weight
            + metrics.fields as f64 / config.field_divisor
            + warnings as f64 * config.warning_weight
            + unbounded_arrays as f64 * config.unbounded_weight
    })
}

/// 100 minus penalties for depth, references, arrays and warnings
pub fn performance_index(
    metrics: &StructuralMetrics,
    warnings: usize,
    supplied: Option<f64>,
    config: &ScoringConfig,
) -> Score {
    Score::pick(supplied, || {
        100.0
            - (metrics.max_depth as f64 * config.depth_cost
                + metrics.references as f64 * config.reference_cost
                + metrics.arrays as f64 * config.array_cost
                + warnings as f64 * config.warning_cost)
    })
}

/// Score a schema from its analyses, preferring supplied values
pub fn score(
    schema: &Schema,
    access: &AccessReport,
    evolution: &EvolutionReport,
    supplied_risk: Option<f64>,
    supplied_performance: Option<f64>,
    config: &ScoringConfig,
) -> Result<ScoreReport> {
    config.validate()?;

    let metrics = schema.metrics();
    let warnings = access.warning_count() + evolution.issues.len();
    let unbounded_arrays = evolution.unbounded_arrays();

    Ok(ScoreReport {
        future_risk: future_risk_score(&metrics, warnings, unbounded_arrays, supplied_risk, config),
        performance_index: performance_index(&metrics, warnings, supplied_performance, config),
        warnings,
        unbounded_arrays,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> StructuralMetrics {
        StructuralMetrics { collections: 2, fields: 20, max_depth: 3, references: 2, arrays: 1 }
    }

    #[test]
    fn test_heuristic_scores() {
        let config = ScoringConfig::default();
        let risk = future_risk_score(&metrics(), 1, 1, None, &config);
        // 3×8 + 20/10 + 1×6 + 1×12
        assert_eq!(risk.value, 44.0);
        assert_eq!(risk.source, ScoreSource::Heuristic);

        let performance = performance_index(&metrics(), 1, None, &config);
        // 100 − (15 + 6 + 2 + 4)
        assert_eq!(performance.value, 73.0);
    }

    #[test]
    fn test_supplied_scores_win_and_clamp() {
        let config = ScoringConfig::default();
        assert_eq!(future_risk_score(&metrics(), 0, 0, Some(12.5), &config).value, 12.5);
        assert_eq!(future_risk_score(&metrics(), 0, 0, Some(180.0), &config).value, 100.0);
        let nan = performance_index(&metrics(), 0, Some(f64::NAN), &config);
        assert_eq!(nan.source, ScoreSource::Heuristic);
    }

    #[test]
    fn test_scores_stay_in_range() {
        let config = ScoringConfig::default();
        let huge = StructuralMetrics {
            collections: 10,
            fields: 2000,
            max_depth: 30,
            references: 40,
            arrays: 40,
        };
        assert_eq!(future_risk_score(&huge, 50, 10, None, &config).value, 100.0);
        assert_eq!(performance_index(&huge, 50, None, &config).value, 0.0);
    }
}
