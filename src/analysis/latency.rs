//! Query latency model
//!
//! Latency grows with load (sub-linearly), nesting depth, `$lookup` fan-out and
//! array scans. Every factor is at least 1, so latency never drops when load or
//! depth rise.

use serde::{Deserialize, Serialize};

use super::access::AccessReport;
use super::Status;
use crate::config::{ensure_non_negative, LatencyConfig};
use crate::error::Result;
use crate::schema::Schema;
use crate::tree::StructuralMetrics;
use crate::workload::Workload;

/// Query shapes the model knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryShape {
    FindEmbedded,
    FindEmbeddedIndexed,
    Lookup,
    LookupIndexed,
    ArrayQuery,
    ArrayQueryIndexed,
    Aggregation,
}

impl QueryShape {
    pub const ALL: [QueryShape; 7] = [
        QueryShape::FindEmbedded,
        QueryShape::FindEmbeddedIndexed,
        QueryShape::Lookup,
        QueryShape::LookupIndexed,
        QueryShape::ArrayQuery,
        QueryShape::ArrayQueryIndexed,
        QueryShape::Aggregation,
    ];

    /// Latency at baseline load on a flat schema
    pub fn base_ms(self) -> f64 {
        match self {
            QueryShape::FindEmbedded => 5.0,
            QueryShape::FindEmbeddedIndexed => 2.0,
            QueryShape::Lookup => 8.0,
            QueryShape::LookupIndexed => 3.0,
            QueryShape::ArrayQuery => 12.0,
            QueryShape::ArrayQueryIndexed => 4.0,
            QueryShape::Aggregation => 15.0,
        }
    }

    pub fn uses_index(self) -> bool {
        matches!(
            self,
            QueryShape::FindEmbeddedIndexed
                | QueryShape::LookupIndexed
                | QueryShape::ArrayQueryIndexed
                | QueryShape::Aggregation
        )
    }

    pub fn description(self) -> &'static str {
        match self {
            QueryShape::FindEmbedded => "Find on an embedded field without an index",
            QueryShape::FindEmbeddedIndexed => "Find on an indexed embedded field",
            QueryShape::Lookup => "$lookup on an unindexed foreign key",
            QueryShape::LookupIndexed => "$lookup on an indexed foreign key",
            QueryShape::ArrayQuery => "Array element match without a multikey index",
            QueryShape::ArrayQueryIndexed => "Array element match on a multikey index",
            QueryShape::Aggregation => "Multi-stage aggregation pipeline",
        }
    }
}

/// Structural inputs of the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyMetrics {
    pub depth: usize,
    pub references: usize,
    pub arrays: usize,
    pub indexes: usize,
}

impl LatencyMetrics {
    /// Assume one primary key index per collection plus `secondary_indexes`
    pub fn from_metrics(metrics: &StructuralMetrics, secondary_indexes: usize) -> Self {
        Self {
            depth: metrics.max_depth,
            references: metrics.references,
            arrays: metrics.arrays,
            indexes: metrics.collections + secondary_indexes,
        }
    }

    /// Metrics of `schema` with the index set the access analysis settled on
    pub fn from_analysis(schema: &Schema, access: &AccessReport) -> Self {
        let secondary = access.indexes.iter().filter(|i| !i.is_primary()).count();
        Self::from_metrics(&schema.metrics(), secondary)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatencyStatus {
    Excellent,
    Acceptable,
    Slow,
}

impl LatencyStatus {
    pub fn classify(latency_ms: f64, config: &LatencyConfig) -> Self {
        if latency_ms < config.excellent_below_ms {
            LatencyStatus::Excellent
        } else if latency_ms <= config.slow_above_ms {
            LatencyStatus::Acceptable
        } else {
            LatencyStatus::Slow
        }
    }
}

/// Estimated latency of `shape` at `load_multiplier` × baseline load
pub fn estimate_latency(
    shape: QueryShape,
    load_multiplier: f64,
    metrics: &LatencyMetrics,
    config: &LatencyConfig,
) -> f64 {
    let load = load_multiplier.max(0.0).powf(config.load_exponent).max(1.0);
    let depth = (1.0 + (metrics.depth as f64 - 1.0) * config.depth_penalty).max(1.0);
    let references = 1.0 + metrics.references as f64 * config.reference_penalty;
    let arrays = 1.0 + metrics.arrays as f64 * config.array_penalty;
    let index = if shape.uses_index() && metrics.indexes > 0 {
        1.0
    } else {
        config.unindexed_multiplier
    };

    shape.base_ms() * load * depth * references * arrays * index
}

// =============================================================================
// Report Types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyPoint {
    pub load_multiplier: f64,
    pub concurrent_users: u64,
    pub latency_ms: f64,
    pub status: LatencyStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySimulation {
    pub shape: QueryShape,
    pub description: String,
    pub indexed: bool,
    pub points: Vec<LatencyPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyRecommendation {
    pub issue: String,
    pub severity: Status,
    pub suggestion: String,
    pub impact: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleStatus {
    Healthy,
    Monitoring,
    Warning,
    Critical,
}

/// Read and write latency once traffic reaches the target user count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleProjection {
    pub target_users: u64,
    pub scale_factor: f64,
    pub reads_per_sec: f64,
    pub writes_per_sec: f64,
    pub read_latency_ms: f64,
    pub write_latency_ms: f64,
    pub needs_sharding: bool,
    pub status: ScaleStatus,
}

/// Result of the latency simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyReport {
    pub metrics: LatencyMetrics,
    pub baseline_load: u64,
    pub simulations: Vec<QuerySimulation>,
    pub recommendations: Vec<LatencyRecommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_scale: Option<ScaleProjection>,
}

impl LatencyReport {
    /// Slowest simulated latency across every shape and load
    pub fn worst_latency_ms(&self) -> f64 {
        self.simulations
            .iter()
            .flat_map(|s| s.points.iter())
            .map(|p| p.latency_ms)
            .fold(0.0, f64::max)
    }
}

// =============================================================================
// Simulation
// =============================================================================

/// Simulate every query shape at each configured load multiplier
pub fn simulate_latency(
    metrics: &LatencyMetrics,
    workload: Option<&Workload>,
    config: &LatencyConfig,
) -> Result<LatencyReport> {
    config.validate()?;
    tracing::debug!(
        depth = metrics.depth,
        references = metrics.references,
        arrays = metrics.arrays,
        indexes = metrics.indexes,
        "simulating latency"
    );

    let simulations = QueryShape::ALL
        .iter()
        .map(|&shape| QuerySimulation {
            shape,
            description: shape.description().to_string(),
            indexed: shape.uses_index() && metrics.indexes > 0,
            points: config
                .load_multipliers
                .iter()
                .map(|&multiplier| {
                    let latency_ms = estimate_latency(shape, multiplier, metrics, config);
                    LatencyPoint {
                        load_multiplier: multiplier,
                        concurrent_users: (config.baseline_load as f64 * multiplier).round() as u64,
                        latency_ms,
                        status: LatencyStatus::classify(latency_ms, config),
                    }
                })
                .collect(),
        })
        .collect();

    let at_scale = match workload {
        Some(w) => Some(project_at_scale(
            w.total_reads_per_sec(),
            w.total_writes_per_sec(),
            metrics.indexes,
            config,
        )?),
        None => None,
    };

    Ok(LatencyReport {
        metrics: *metrics,
        baseline_load: config.baseline_load,
        simulations,
        recommendations: recommendations(metrics),
        at_scale,
    })
}

fn recommendations(metrics: &LatencyMetrics) -> Vec<LatencyRecommendation> {
    let mut out = Vec::new();

    if metrics.depth > 5 {
        out.push(LatencyRecommendation {
            issue: format!("Nesting depth of {} levels", metrics.depth),
            severity: Status::Warning,
            suggestion: "Flatten deeply nested sub-documents or move them to their own collection"
                .to_string(),
            impact: "Shallower documents cut query and update latency".to_string(),
        });
    }
    if metrics.references > 3 {
        out.push(LatencyRecommendation {
            issue: format!("{} references resolved through $lookup", metrics.references),
            severity: Status::Warning,
            suggestion: "Denormalize the most frequently joined fields".to_string(),
            impact: "Fewer $lookup stages per read".to_string(),
        });
    }
    if metrics.arrays > 2 {
        out.push(LatencyRecommendation {
            issue: format!("{} embedded arrays", metrics.arrays),
            severity: Status::Warning,
            suggestion: "Add multikey indexes on queried array fields or bucket large arrays"
                .to_string(),
            impact: "Array matches avoid full element scans".to_string(),
        });
    }
    if metrics.indexes < 3 {
        out.push(LatencyRecommendation {
            issue: format!("Only {} indexes", metrics.indexes),
            severity: Status::Critical,
            suggestion: "Index the fields used in filters, sorts and joins".to_string(),
            impact: "Indexed queries avoid collection scans".to_string(),
        });
    }
    if out.is_empty() {
        out.push(LatencyRecommendation {
            issue: "No structural latency risks".to_string(),
            severity: Status::Healthy,
            suggestion: "Keep monitoring slow query logs as traffic grows".to_string(),
            impact: "None".to_string(),
        });
    }

    out
}

/// Project read/write latency when traffic scales to `scale_target_users`
pub fn project_at_scale(
    reads_per_sec: f64,
    writes_per_sec: f64,
    indexes: usize,
    config: &LatencyConfig,
) -> Result<ScaleProjection> {
    ensure_non_negative("reads_per_sec", reads_per_sec)?;
    ensure_non_negative("writes_per_sec", writes_per_sec)?;

    let scale_factor = config.scale_target_users as f64 / config.baseline_load as f64;
    let magnitude = scale_factor.max(1.0).log10();

    let read_latency_ms = config.base_read_ms * (2.0 + magnitude * 0.5);
    let write_latency_ms = config.base_write_ms * (magnitude + 1.0) * (1.0 + 0.15 * indexes as f64);
    let reads = reads_per_sec * scale_factor;
    let writes = writes_per_sec * scale_factor;

    let status = if read_latency_ms > 150.0 || write_latency_ms > 100.0 {
        ScaleStatus::Critical
    } else if read_latency_ms > 100.0 || write_latency_ms > 60.0 {
        ScaleStatus::Warning
    } else if read_latency_ms > 50.0 || write_latency_ms > 40.0 {
        ScaleStatus::Monitoring
    } else {
        ScaleStatus::Healthy
    };

    Ok(ScaleProjection {
        target_users: config.scale_target_users,
        scale_factor,
        reads_per_sec: reads,
        writes_per_sec: writes,
        read_latency_ms,
        write_latency_ms,
        needs_sharding: writes > 500.0 || reads > 2000.0,
        status,
    })
}
