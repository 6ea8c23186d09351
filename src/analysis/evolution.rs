//! Growth projection
//!
//! Compounds today's load forward month by month, tracks how large embedded
//! arrays make their documents, and reports each threshold the month it is
//! first crossed.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::access::AccessReport;
use crate::config::{ensure_growth_rate, EvolutionConfig};
use crate::error::Result;
use crate::schema::Schema;
use crate::workload::Workload;

pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// `value × (1 + rate)^month`
pub fn compound(value: f64, rate: f64, month: u32) -> f64 {
    value * (1.0 + rate).powf(f64::from(month))
}

/// Values for months `0..=horizon`
pub fn project(value: f64, rate: f64, horizon: u32) -> Result<Vec<f64>> {
    ensure_growth_rate("growth rate", rate)?;
    Ok((0..=horizon).map(|month| compound(value, rate, month)).collect())
}

/// Monthly growth assumed for schemas without a configured rate; wider schemas grow faster
pub fn estimated_growth_rate(field_count: usize) -> f64 {
    match field_count {
        n if n > 50 => 0.15,
        n if n > 30 => 0.10,
        n if n > 15 => 0.07,
        _ => 0.05,
    }
}

// =============================================================================
// Report Types
// =============================================================================

/// Projected load for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadPoint {
    pub month: u32,
    /// Document plus index storage
    pub storage_gb: f64,
    pub doc_storage_gb: f64,
    pub index_storage_gb: f64,
    /// Effective write IOPS (raw writes × amplification)
    pub write_iops: f64,
    pub read_ops: f64,
    pub documents: f64,
}

/// Size band of an embedded array's contribution to its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Safe,
    Danger,
    Breach,
}

impl RiskTier {
    pub fn classify(contribution_mb: f64, config: &EvolutionConfig) -> Self {
        if contribution_mb >= config.ceiling_mb {
            RiskTier::Breach
        } else if contribution_mb >= config.danger_mb {
            RiskTier::Danger
        } else {
            RiskTier::Safe
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayPoint {
    pub month: u32,
    pub elements: f64,
    pub contribution_mb: f64,
    pub risk: RiskTier,
}

/// Growth of one embedded array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayProjection {
    pub path: String,
    pub element_size_bytes: f64,
    pub monthly_growth_rate: f64,
    pub points: Vec<ArrayPoint>,
}

impl ArrayProjection {
    /// First month at or above `tier`
    pub fn first_month_at(&self, tier: RiskTier) -> Option<u32> {
        self.points.iter().find(|p| p.risk >= tier).map(|p| p.month)
    }

    pub fn worst_risk(&self) -> RiskTier {
        self.points.iter().map(|p| p.risk).max().unwrap_or(RiskTier::Safe)
    }
}

/// Remedy attached to a projected issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fix {
    SplitCollection,
    AddCompoundIndex,
    Shard,
    ConvertToReference,
    Archive,
}

impl fmt::Display for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Fix::SplitCollection => "split collection",
            Fix::AddCompoundIndex => "add compound index",
            Fix::Shard => "shard",
            Fix::ConvertToReference => "convert embed to reference",
            Fix::Archive => "archive",
        };
        write!(f, "{}", name)
    }
}

/// A threshold crossed during the projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionIssue {
    pub month: u32,
    pub fix: Fix,
    /// Field path, collection or `cluster`
    pub subject: String,
    pub issue: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Result of the growth projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionReport {
    pub horizon_months: u32,
    pub size_growth_rate: f64,
    pub write_growth_rate: f64,
    pub write_amplification: f64,
    /// Months `0..=horizon_months`
    pub load: Vec<LoadPoint>,
    pub arrays: Vec<ArrayProjection>,
    /// Ordered by month, then by detection order within the month
    pub issues: Vec<EvolutionIssue>,
    pub risk_level: RiskLevel,
}

impl EvolutionReport {
    pub fn load_at(&self, month: u32) -> Option<&LoadPoint> {
        self.load.iter().find(|p| p.month == month)
    }

    pub fn issues_in(&self, month: u32) -> impl Iterator<Item = &EvolutionIssue> {
        self.issues.iter().filter(move |i| i.month == month)
    }

    /// Arrays that reach the danger band within the horizon
    pub fn unbounded_arrays(&self) -> usize {
        self.arrays.iter().filter(|a| a.worst_risk() >= RiskTier::Danger).count()
    }
}

// =============================================================================
// Projection
// =============================================================================

/// Project `schema` under `workload` over the configured horizon
pub fn project_evolution(
    schema: &Schema,
    workload: &Workload,
    access: &AccessReport,
    config: &EvolutionConfig,
) -> Result<EvolutionReport> {
    config.validate()?;
    workload.validate()?;

    let size_rate = config
        .size_growth_rate
        .unwrap_or_else(|| estimated_growth_rate(schema.field_count()));
    let write_rate = config.write_growth_rate.unwrap_or(size_rate);
    let horizon = config.horizon_months;

    tracing::debug!(horizon, size_rate, write_rate, "projecting schema evolution");

    let load = load_curve(schema, workload, access, config, size_rate, write_rate);
    let arrays = array_projections(schema, workload, config)?;

    let mut issues = Vec::new();
    let mut emitted: HashSet<(Fix, String)> = HashSet::new();
    let mut shard_streak = 0;

    let mut emit = |issues: &mut Vec<EvolutionIssue>,
                    month: u32,
                    fix: Fix,
                    subject: String,
                    issue: String,
                    suggestion: String| {
        if emitted.insert((fix, subject.clone())) {
            issues.push(EvolutionIssue { month, fix, subject, issue, suggestion });
        }
    };

    let range_collections: Vec<(&str, Vec<&str>)> = schema
        .collections
        .keys()
        .filter_map(|name| {
            let fields: Vec<&str> = access
                .frequent_range_fields()
                .filter(|f| &f.collection == name)
                .map(|f| f.field.as_str())
                .collect();
            (!fields.is_empty()).then_some((name.as_str(), fields))
        })
        .collect();

    let baseline_storage = load.first().map_or(0.0, |p| p.storage_gb);

    for point in &load {
        let month = point.month;

        for array in &arrays {
            let Some(current) = array.points.iter().find(|p| p.month == month) else {
                continue;
            };
            if current.risk >= RiskTier::Danger {
                emit(
                    &mut issues,
                    month,
                    Fix::ConvertToReference,
                    array.path.clone(),
                    format!(
                        "{} contributes {:.1} MB per document, inside the {} MB danger band",
                        array.path, current.contribution_mb, config.danger_mb
                    ),
                    format!(
                        "Move {} elements into their own collection and reference them by id",
                        array.path
                    ),
                );
            }
            if current.risk == RiskTier::Breach {
                emit(
                    &mut issues,
                    month,
                    Fix::SplitCollection,
                    array.path.clone(),
                    format!(
                        "{} contributes {:.1} MB per document, past the {} MB document ceiling",
                        array.path, current.contribution_mb, config.ceiling_mb
                    ),
                    format!("Split {} out of its parent collection", array.path),
                );
            }
        }

        for (collection, fields) in &range_collections {
            let documents = compound(workload.documents(collection, 0.0), size_rate, month);
            if documents >= config.compound_index_documents {
                emit(
                    &mut issues,
                    month,
                    Fix::AddCompoundIndex,
                    collection.to_string(),
                    format!(
                        "{} reaches {:.0} documents with frequent range filters on {}",
                        collection,
                        documents,
                        fields.join(", ")
                    ),
                    format!(
                        "Add a compound index on {} ending with {}",
                        collection,
                        fields.join(", ")
                    ),
                );
            }
        }

        if point.write_iops > config.shard_iops_threshold {
            shard_streak += 1;
        } else {
            shard_streak = 0;
        }
        if shard_streak >= config.shard_sustain_months {
            emit(
                &mut issues,
                month,
                Fix::Shard,
                "cluster".to_string(),
                format!(
                    "Effective writes stay above {} IOPS for {} consecutive months",
                    config.shard_iops_threshold, config.shard_sustain_months
                ),
                "Shard the highest-write collections".to_string(),
            );
        }

        if !access.archival_candidates.is_empty()
            && point.storage_gb >= baseline_storage * config.archive_growth_factor
        {
            let paths: Vec<&str> =
                access.archival_candidates.iter().map(|a| a.path.as_str()).collect();
            emit(
                &mut issues,
                month,
                Fix::Archive,
                "cold data".to_string(),
                format!(
                    "Storage reaches {:.2} GB ({:.1}x today) \
                     while rarely read data keeps accumulating",
                    point.storage_gb,
                    if baseline_storage > 0.0 { point.storage_gb / baseline_storage } else { 1.0 }
                ),
                format!("Archive cold fields: {}", paths.join(", ")),
            );
        }
    }

    let risk_level = if issues.iter().any(|i| matches!(i.fix, Fix::SplitCollection | Fix::Shard)) {
        RiskLevel::High
    } else if !issues.is_empty() {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    Ok(EvolutionReport {
        horizon_months: horizon,
        size_growth_rate: size_rate,
        write_growth_rate: write_rate,
        write_amplification: access.write_amplification.factor,
        load,
        arrays,
        issues,
        risk_level,
    })
}

fn load_curve(
    schema: &Schema,
    workload: &Workload,
    access: &AccessReport,
    config: &EvolutionConfig,
    size_rate: f64,
    write_rate: f64,
) -> Vec<LoadPoint> {
    let mut doc_storage_gb = 0.0;
    let mut documents = 0.0;
    for name in schema.collections.keys() {
        let fields = schema.fields().filter(|f| f.collection == name.as_str()).count();
        let docs = workload.documents(name, 0.0);
        doc_storage_gb += fields as f64 * config.bytes_per_field * docs / BYTES_PER_GB;
        documents += docs;
    }

    // primary key index per collection plus every secondary index
    let secondary = access.indexes.iter().filter(|i| !i.is_primary()).count();
    let index_count = (schema.collection_count() + secondary) as f64;
    let index_storage_gb = (doc_storage_gb * config.index_storage_ratio * index_count / 5.0)
        .max(config.min_index_storage_gb);

    let write_iops = access.write_amplification.effective_writes_per_sec;
    let read_ops = workload.total_reads_per_sec();

    (0..=config.horizon_months)
        .map(|month| {
            let doc = compound(doc_storage_gb, size_rate, month);
            let index = compound(index_storage_gb, size_rate, month);
            LoadPoint {
                month,
                storage_gb: doc + index,
                doc_storage_gb: doc,
                index_storage_gb: index,
                write_iops: compound(write_iops, write_rate, month),
                read_ops: compound(read_ops, write_rate, month),
                documents: compound(documents, size_rate, month),
            }
        })
        .collect()
}

fn array_projections(
    schema: &Schema,
    workload: &Workload,
    config: &EvolutionConfig,
) -> Result<Vec<ArrayProjection>> {
    let mut projections = Vec::new();

    for field in schema.fields().filter(|f| f.is_array()) {
        let Some(declared) = workload.arrays.get(&field.path) else {
            tracing::debug!(path = %field.path, "no cardinality for array, skipping projection");
            continue;
        };

        let rate = declared.monthly_growth_rate.unwrap_or(config.array_growth_rate);
        ensure_growth_rate(&format!("workload.arrays.{}.monthly_growth_rate", field.path), rate)?;
        let element_size_bytes = declared
            .element_size_bytes
            .unwrap_or_else(|| field.node.innermost().estimated_size_bytes());

        let points = (0..=config.horizon_months)
            .map(|month| {
                let elements = compound(declared.elements, rate, month);
                let contribution_mb = elements * element_size_bytes / BYTES_PER_MB;
                ArrayPoint {
                    month,
                    elements,
                    contribution_mb,
                    risk: RiskTier::classify(contribution_mb, config),
                }
            })
            .collect();

        projections.push(ArrayProjection {
            path: field.path.clone(),
            element_size_bytes,
            monthly_growth_rate: rate,
            points,
        });
    }

    Ok(projections)
}
