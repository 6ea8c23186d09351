//! Access Pattern Analysis
//!
//! Classifies queried fields, settles the index set (declared, or recommended
//! when none is declared) and measures how well that set serves the workload:
//! selectivity, coverage of high-frequency fields and write amplification.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::Status;
use crate::config::AccessConfig;
use crate::error::Result;
use crate::naming::{self, NameHint};
use crate::schema::{Schema, TypeTag};
use crate::tree::FieldRef;
use crate::workload::{IndexSpec, Workload};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

// =============================================================================
// Field Classification
// =============================================================================

/// How a field is predominantly queried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryPattern {
    /// Equality match on a (mostly) unique value
    PointLookup,
    /// Bounded scans over ordered values
    Range,
    /// Ordering of result sets
    Sort,
    /// Join key feeding `$lookup` stages
    AggregationDriver,
}

/// Classification of a single queried field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAccess {
    /// Full dot path, collection first
    pub path: String,
    pub collection: String,
    /// Path relative to the collection
    pub field: String,
    pub pattern: QueryPattern,
    pub queries_per_day: f64,
    pub high_frequency: bool,
    /// Collection joined through this field, for aggregation drivers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joins: Option<String>,
}

fn relative_path(field: &FieldRef<'_>) -> String {
    field
        .path
        .strip_prefix(field.collection)
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(&field.path)
        .to_string()
}

/// Collection a field points at, when it is a foreign key
fn join_target(schema: &Schema, field: &FieldRef<'_>) -> Option<Option<String>> {
    if field.name == "_id" || field.name == "id" {
        return None;
    }
    if let Some(TypeTag::Reference(target)) = field.type_tag() {
        return Some(Some(target.clone()));
    }

    let inferred = naming::referenced_collection(field.name)
        .filter(|name| schema.collections.contains_key(name));

    if field.is_reference() {
        Some(inferred)
    } else if naming::has_hint(field.name, NameHint::Identifier) && inferred.is_some() {
        Some(inferred)
    } else {
        None
    }
}

fn classify(schema: &Schema, field: &FieldRef<'_>) -> (QueryPattern, Option<String>) {
    if let Some(joins) = join_target(schema, field) {
        return (QueryPattern::AggregationDriver, joins);
    }

    let name = field.name;
    if name == "_id"
        || naming::has_hint(name, NameHint::Identifier)
        || naming::has_hint(name, NameHint::Contact)
    {
        return (QueryPattern::PointLookup, None);
    }

    if !field.is_array() {
        let ordered = field.type_tag().is_some_and(TypeTag::is_ordered);
        if ordered || naming::has_hint(name, NameHint::Temporal) {
            return (QueryPattern::Range, None);
        }
        if naming::has_hint(name, NameHint::Ordering) {
            return (QueryPattern::Sort, None);
        }
    }

    (QueryPattern::PointLookup, None)
}

fn is_temporal(field: &FieldRef<'_>) -> bool {
    naming::has_hint(field.name, NameHint::Temporal) || field.type_tag() == Some(&TypeTag::Date)
}

/// Embedded sub-document (not an array of them)
fn is_container(field: &FieldRef<'_>) -> bool {
    !field.is_array() && field.node.as_mapping().is_some()
}

// =============================================================================
// Index Recommendations
// =============================================================================

/// Where the analyzed index set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexSource {
    Declared,
    Recommended,
}

/// A recommended index with estimated query latency before and after
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecommendation {
    pub index: IndexSpec,
    pub reason: String,
    /// Shell command creating the index
    pub command: String,
    pub before_ms: f64,
    pub after_ms: f64,
    pub improvement_pct: f64,
}

impl IndexRecommendation {
    fn new(
        index: IndexSpec,
        descending: &[&str],
        reason: String,
        before_ms: f64,
        floor_ms: f64,
        ratio: f64,
    ) -> Self {
        let after_ms = (before_ms * ratio).max(floor_ms);
        let keys: Vec<String> = index
            .fields
            .iter()
            .map(|f| {
                let direction = if descending.contains(&f.as_str()) { -1 } else { 1 };
                format!("{}: {}", f, direction)
            })
            .collect();

        Self {
            command: format!("db.{}.createIndex({{ {} }})", index.collection, keys.join(", ")),
            index,
            reason,
            before_ms,
            after_ms,
            improvement_pct: (1.0 - after_ms / before_ms) * 100.0,
        }
    }
}

fn recommend_indexes(
    schema: &Schema,
    accesses: &[FieldAccess],
    config: &AccessConfig,
) -> Vec<IndexRecommendation> {
    let mut recommendations = Vec::new();

    for name in schema.collections.keys() {
        let top_level: Vec<_> = schema
            .fields()
            .filter(|f| f.collection == name.as_str() && f.depth == 1 && !f.is_array())
            .collect();
        let access_of = |field: &FieldRef<'_>| accesses.iter().find(|a| a.path == field.path);

        let mut foreign_keys: Vec<&FieldAccess> = top_level
            .iter()
            .filter_map(|f| access_of(f))
            .filter(|a| {
                a.pattern == QueryPattern::AggregationDriver
                    && a.queries_per_day > config.index_candidate_threshold
            })
            .collect();
        foreign_keys.sort_by(|a, b| b.queries_per_day.total_cmp(&a.queries_per_day));
        foreign_keys.truncate(2);

        let date_field = top_level.iter().find(|f| is_temporal(f)).map(|f| f.name);

        for fk in &foreign_keys {
            let recommendation = match date_field {
                Some(date) => IndexRecommendation::new(
                    IndexSpec::new(name.as_str(), &[fk.field.as_str(), date]),
                    &[date],
                    format!("Filter by {} and sort by {}", fk.field, date),
                    450.0 + fk.queries_per_day / 10.0,
                    30.0,
                    0.10,
                ),
                None => IndexRecommendation::new(
                    IndexSpec::new(name.as_str(), &[fk.field.as_str()]),
                    &[],
                    format!("Lookups by {}", fk.field),
                    380.0 + fk.queries_per_day / 12.0,
                    25.0,
                    0.12,
                ),
            };
            recommendations.push(recommendation);
        }

        let mut others: Vec<(&FieldRef<'_>, &FieldAccess)> = top_level
            .iter()
            .filter(|f| f.name != "_id" && !is_temporal(f))
            .filter_map(|f| access_of(f).map(|a| (f, a)))
            .filter(|(_, a)| {
                a.pattern != QueryPattern::AggregationDriver
                    && a.queries_per_day >= config.high_frequency_threshold
            })
            .collect();
        others.sort_by(|a, b| b.1.queries_per_day.total_cmp(&a.1.queries_per_day));

        if let Some((field, access)) = others.first() {
            let low_selectivity = naming::has_hint(field.name, NameHint::Category);
            match (low_selectivity, foreign_keys.first()) {
                (true, Some(fk)) => recommendations.push(IndexRecommendation::new(
                    IndexSpec::new(name.as_str(), &[fk.field.as_str(), field.name]),
                    &[],
                    format!(
                        "Compound with {} instead of a low-selectivity index on {}",
                        fk.field, field.name
                    ),
                    380.0 + access.queries_per_day / 12.0,
                    25.0,
                    0.12,
                )),
                (true, None) => {}
                (false, _) => recommendations.push(IndexRecommendation::new(
                    IndexSpec::new(name.as_str(), &[field.name]),
                    &[],
                    format!(
                        "Frequently filtered field ({:.0} queries/day)",
                        access.queries_per_day
                    ),
                    320.0 + access.queries_per_day / 15.0,
                    20.0,
                    0.15,
                )),
            }
        }
    }

    recommendations
}

/// Single-field indexes that lead a compound index on the same collection
fn redundant_indexes(indexes: &[IndexSpec]) -> Vec<IndexSpec> {
    indexes
        .iter()
        .filter(|single| {
            !single.is_compound() && indexes.iter().any(|other| single.is_prefix_of(other))
        })
        .cloned()
        .collect()
}

// =============================================================================
// Report Types
// =============================================================================

/// Selectivity of one indexed field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSelectivity {
    pub path: String,
    pub unique_values: f64,
    pub documents: f64,
    /// Unique values over documents, in percent
    pub selectivity_pct: f64,
    pub weak: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    Excellent,
    Good,
    Healthy,
    NeedsImprovement,
}

impl CoverageStatus {
    fn from_ratio(ratio: f64) -> Self {
        if ratio >= 0.76 {
            Self::Excellent
        } else if ratio >= 0.66 {
            Self::Good
        } else if ratio >= 0.50 {
            Self::Healthy
        } else {
            Self::NeedsImprovement
        }
    }
}

/// Share of high-frequency fields served by an index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexCoverage {
    pub high_frequency_fields: usize,
    pub covered: usize,
    /// 1.0 when there are no high-frequency fields
    pub ratio: f64,
    pub status: CoverageStatus,
    pub uncovered: Vec<String>,
}

/// Write amplification of one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionAmplification {
    pub collection: String,
    /// Indexes other than the primary key
    pub secondary_indexes: usize,
    pub factor: f64,
    pub writes_per_sec: f64,
    pub effective_writes_per_sec: f64,
    pub status: Status,
}

/// Storage writes per logical write, overall and per collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteAmplification {
    /// Write-weighted factor across collections
    pub factor: f64,
    pub status: Status,
    pub raw_writes_per_sec: f64,
    pub effective_writes_per_sec: f64,
    pub collections: Vec<CollectionAmplification>,
}

/// Read/write mix of one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionMix {
    pub collection: String,
    pub reads_per_sec: f64,
    pub writes_per_sec: f64,
    pub write_pct: f64,
    pub write_heavy: bool,
}

/// Rarely read data that could move to cold storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivalCandidate {
    pub path: String,
    pub queries_per_day: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShardStrategy {
    Hashed,
    Ranged,
}

/// Shard key for a high-write collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardKeyRecommendation {
    pub collection: String,
    pub key: String,
    pub strategy: ShardStrategy,
    pub writes_per_sec: f64,
    pub priority_score: f64,
    pub command: String,
}

/// Data versus index storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStorageEstimate {
    pub data_gb: f64,
    pub index_gb: f64,
    pub ratio_pct: f64,
    pub status: Status,
}

/// Result of the access-pattern analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessReport {
    pub fields: Vec<FieldAccess>,
    pub index_source: IndexSource,
    /// The index set everything below was computed against
    pub indexes: Vec<IndexSpec>,
    pub recommendations: Vec<IndexRecommendation>,
    pub redundant_indexes: Vec<IndexSpec>,
    pub selectivity: Vec<FieldSelectivity>,
    pub coverage: IndexCoverage,
    pub write_amplification: WriteAmplification,
    pub collection_mix: Vec<CollectionMix>,
    pub archival_candidates: Vec<ArchivalCandidate>,
    pub shard_keys: Vec<ShardKeyRecommendation>,
    pub index_storage: IndexStorageEstimate,
}

impl AccessReport {
    pub fn field(&self, path: &str) -> Option<&FieldAccess> {
        self.fields.iter().find(|f| f.path == path)
    }

    /// High-frequency fields filtered by range
    pub fn frequent_range_fields(&self) -> impl Iterator<Item = &FieldAccess> {
        self.fields
            .iter()
            .filter(|f| f.high_frequency && f.pattern == QueryPattern::Range)
    }

    /// Number of conditions worth surfacing as warnings
    pub fn warning_count(&self) -> usize {
        let weak = self.selectivity.iter().filter(|s| s.weak).count();
        let amplification = usize::from(self.write_amplification.status != Status::Healthy);
        let coverage = usize::from(self.coverage.status == CoverageStatus::NeedsImprovement);
        weak + amplification + coverage + self.redundant_indexes.len()
    }
}

// =============================================================================
// Analysis
// =============================================================================

/// Analyze access patterns of `schema` under `workload`
pub fn analyze_access(
    schema: &Schema,
    workload: &Workload,
    config: &AccessConfig,
) -> Result<AccessReport> {
    config.validate()?;
    workload.validate()?;

    tracing::debug!(
        collections = schema.collection_count(),
        declared_indexes = workload.indexes.len(),
        "analyzing access patterns"
    );

    for path in workload.fields.keys() {
        if schema.field(path).is_none() {
            tracing::warn!(path = %path, "workload references a field missing from the schema");
        }
    }

    let fields = classify_fields(schema, workload, config);

    let (index_source, indexes, recommendations, redundant) = if workload.indexes.is_empty() {
        let mut recommendations = recommend_indexes(schema, &fields, config);
        let specs: Vec<IndexSpec> = recommendations.iter().map(|r| r.index.clone()).collect();
        let redundant = redundant_indexes(&specs);
        recommendations.retain(|r| !redundant.contains(&r.index));
        recommendations.truncate(config.max_recommended_indexes);
        let indexes: Vec<IndexSpec> = recommendations.iter().map(|r| r.index.clone()).collect();
        (IndexSource::Recommended, indexes, recommendations, redundant)
    } else {
        let redundant = redundant_indexes(&workload.indexes);
        (IndexSource::Declared, workload.indexes.clone(), Vec::new(), redundant)
    };

    let selectivity = selectivity(schema, workload, &indexes, config);
    let coverage = coverage(&fields, &indexes);
    let write_amplification = write_amplification(schema, workload, &indexes, config);
    let collection_mix = collection_mix(schema, workload, config);
    let archival_candidates = archival_candidates(schema, workload, config);
    let shard_keys = shard_keys(&collection_mix, &fields, schema, config);
    let index_storage = index_storage(schema, workload, &indexes, config);

    Ok(AccessReport {
        fields,
        index_source,
        indexes,
        recommendations,
        redundant_indexes: redundant,
        selectivity,
        coverage,
        write_amplification,
        collection_mix,
        archival_candidates,
        shard_keys,
        index_storage,
    })
}

fn classify_fields(
    schema: &Schema,
    workload: &Workload,
    config: &AccessConfig,
) -> Vec<FieldAccess> {
    schema
        .fields()
        .filter(|field| field.node.as_mapping().is_none())
        .filter_map(|field| {
            let queries_per_day = workload.queries_per_day(&field.path);
            if queries_per_day <= 0.0 {
                return None;
            }
            let (pattern, joins) = classify(schema, &field);
            Some(FieldAccess {
                collection: field.collection.to_string(),
                field: relative_path(&field),
                high_frequency: queries_per_day >= config.high_frequency_threshold
                    && field.name != "_id",
                path: field.path,
                pattern,
                queries_per_day,
                joins,
            })
        })
        .collect()
}

fn estimated_unique_values(field: &FieldRef<'_>, documents: f64) -> f64 {
    let name = field.name;
    if name == "_id" {
        documents
    } else if field.is_reference() || naming::has_hint(name, NameHint::Identifier) {
        documents * 0.85
    } else if naming::has_hint(name, NameHint::Contact) {
        documents * 0.90
    } else if naming::has_hint(name, NameHint::Category) {
        5.0
    } else if is_temporal(field) {
        documents * 0.60
    } else if field.type_tag() == Some(&TypeTag::Number) {
        documents * 0.40
    } else {
        documents * 0.50
    }
}

fn selectivity(
    schema: &Schema,
    workload: &Workload,
    indexes: &[IndexSpec],
    config: &AccessConfig,
) -> Vec<FieldSelectivity> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for index in indexes {
        for field in &index.fields {
            let path = format!("{}.{}", index.collection, field);
            if !seen.insert(path.clone()) {
                continue;
            }
            let Some(field_ref) = schema.fields().find(|f| f.path == path) else {
                continue;
            };

            let documents = workload.documents(&index.collection, 0.0);
            let unique_values = workload
                .fields
                .get(&path)
                .and_then(|f| f.estimated_unique_values)
                .unwrap_or_else(|| estimated_unique_values(&field_ref, documents));

            let selectivity_pct = if documents > 0.0 {
                unique_values.min(documents) / documents * 100.0
            } else {
                100.0
            };

            out.push(FieldSelectivity {
                path,
                unique_values,
                documents,
                selectivity_pct,
                weak: selectivity_pct < config.weak_selectivity_pct,
            });
        }
    }

    out
}

fn coverage(fields: &[FieldAccess], indexes: &[IndexSpec]) -> IndexCoverage {
    let high: Vec<&FieldAccess> = fields.iter().filter(|f| f.high_frequency).collect();
    let uncovered: Vec<String> = high
        .iter()
        .filter(|f| {
            !indexes
                .iter()
                .any(|i| i.collection == f.collection && i.contains(&f.field))
        })
        .map(|f| f.path.clone())
        .collect();

    let covered = high.len() - uncovered.len();
    let ratio = if high.is_empty() {
        1.0
    } else {
        covered as f64 / high.len() as f64
    };

    IndexCoverage {
        high_frequency_fields: high.len(),
        covered,
        ratio,
        status: CoverageStatus::from_ratio(ratio),
        uncovered,
    }
}

fn amplification_status(factor: f64, config: &AccessConfig) -> Status {
    if factor > config.amplification_critical {
        Status::Critical
    } else if factor > config.amplification_warning {
        Status::Warning
    } else {
        Status::Healthy
    }
}

fn write_amplification(
    schema: &Schema,
    workload: &Workload,
    indexes: &[IndexSpec],
    config: &AccessConfig,
) -> WriteAmplification {
    let collections: Vec<CollectionAmplification> = schema
        .collections
        .keys()
        .map(|name| {
            let secondary_indexes = indexes
                .iter()
                .filter(|i| &i.collection == name && !i.is_primary())
                .count();
            let factor = 1.0 + secondary_indexes as f64;
            let writes_per_sec = workload.collections.get(name).map_or(0.0, |c| c.writes_per_sec);
            CollectionAmplification {
                collection: name.clone(),
                secondary_indexes,
                factor,
                writes_per_sec,
                effective_writes_per_sec: writes_per_sec * factor,
                status: amplification_status(factor, config),
            }
        })
        .collect();

    let raw: f64 = collections.iter().map(|c| c.writes_per_sec).sum();
    let effective: f64 = collections.iter().map(|c| c.effective_writes_per_sec).sum();
    let factor = if raw > 0.0 {
        effective / raw
    } else {
        collections.iter().map(|c| c.factor).fold(1.0, f64::max)
    };

    WriteAmplification {
        factor,
        status: amplification_status(factor, config),
        raw_writes_per_sec: raw,
        effective_writes_per_sec: effective,
        collections,
    }
}

fn collection_mix(
    schema: &Schema,
    workload: &Workload,
    config: &AccessConfig,
) -> Vec<CollectionMix> {
    schema
        .collections
        .keys()
        .filter_map(|name| {
            let c = workload.collections.get(name)?;
            let total = c.reads_per_sec + c.writes_per_sec;
            let write_pct = if total > 0.0 { c.writes_per_sec / total * 100.0 } else { 0.0 };
            Some(CollectionMix {
                collection: name.clone(),
                reads_per_sec: c.reads_per_sec,
                writes_per_sec: c.writes_per_sec,
                write_pct,
                write_heavy: write_pct > config.write_heavy_pct,
            })
        })
        .collect()
}

fn archival_candidates(
    schema: &Schema,
    workload: &Workload,
    config: &AccessConfig,
) -> Vec<ArchivalCandidate> {
    schema
        .fields()
        .filter(|f| naming::has_hint(f.name, NameHint::Cold) || is_container(f))
        .filter_map(|f| {
            let queries_per_day = workload.queries_per_day(&f.path);
            if queries_per_day >= config.rare_query_threshold {
                return None;
            }
            let reason = if queries_per_day < 40.0 {
                "Archive to cold storage"
            } else {
                "Consider archival for historical data"
            };
            Some(ArchivalCandidate {
                path: f.path,
                queries_per_day,
                reason: reason.to_string(),
            })
        })
        .collect()
}

fn shard_keys(
    mix: &[CollectionMix],
    fields: &[FieldAccess],
    schema: &Schema,
    config: &AccessConfig,
) -> Vec<ShardKeyRecommendation> {
    let mut candidates: Vec<(&CollectionMix, f64)> = mix
        .iter()
        .filter(|m| m.writes_per_sec > config.shard_write_ops_threshold)
        .map(|m| {
            let priority = m.write_pct / 100.0 * m.writes_per_sec
                + (m.reads_per_sec + m.writes_per_sec) * 0.1;
            (m, priority)
        })
        .collect();
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
    candidates.truncate(3);

    candidates
        .into_iter()
        .map(|(m, priority_score)| {
            let in_collection =
                |f: &&FieldAccess| f.collection == m.collection && !f.field.contains('.');
            let foreign_key = fields
                .iter()
                .filter(in_collection)
                .find(|f| f.pattern == QueryPattern::AggregationDriver);
            let contact = fields
                .iter()
                .filter(in_collection)
                .find(|f| naming::has_hint(&f.field, NameHint::Contact));
            let temporal = schema
                .fields()
                .find(|f| f.collection == m.collection && f.depth == 1 && is_temporal(f))
                .map(|f| f.name.to_string());

            let (key, strategy) = match (foreign_key.or(contact), temporal) {
                (Some(f), _) => (f.field.clone(), ShardStrategy::Hashed),
                (None, Some(t)) => (t, ShardStrategy::Ranged),
                (None, None) => ("_id".to_string(), ShardStrategy::Hashed),
            };
            let value = match strategy {
                ShardStrategy::Hashed => "\"hashed\"".to_string(),
                ShardStrategy::Ranged => "1".to_string(),
            };

            ShardKeyRecommendation {
                command: format!(
                    "sh.shardCollection(\"db.{}\", {{ {}: {} }})",
                    m.collection, key, value
                ),
                collection: m.collection.clone(),
                key,
                strategy,
                writes_per_sec: m.writes_per_sec,
                priority_score,
            }
        })
        .collect()
}

fn index_storage(
    schema: &Schema,
    workload: &Workload,
    indexes: &[IndexSpec],
    config: &AccessConfig,
) -> IndexStorageEstimate {
    let data_of = |collection: &str| {
        workload.documents(collection, 0.0) * config.document_size_bytes / BYTES_PER_GB
    };

    let data_gb: f64 = schema.collections.keys().map(|name| data_of(name.as_str())).sum();

    let mut index_gb = 0.0;
    for name in schema.collections.keys() {
        let data = data_of(name.as_str());
        // implicit primary key index
        index_gb += data * 0.06;
        for index in indexes.iter().filter(|i| &i.collection == name && !i.is_primary()) {
            index_gb += data * if index.is_compound() { 0.12 } else { 0.08 };
        }
    }

    let ratio_pct = if data_gb > 0.0 { index_gb / data_gb * 100.0 } else { 0.0 };
    let status = if ratio_pct < 40.0 {
        Status::Healthy
    } else if ratio_pct < 60.0 {
        Status::Warning
    } else {
        Status::Critical
    };

    IndexStorageEstimate {
        data_gb,
        index_gb,
        ratio_pct,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkloadConfig;
    use crate::workload::{CollectionWorkload, FieldWorkload};
    use serde_json::json;

    fn shop() -> Schema {
        Schema::from_json(&json!({
            "users": {"_id": "ObjectId", "email": "string", "status": "string", "bio": "string"},
            "orders": {
                "_id": "ObjectId",
                "userId": "ObjectId",
                "status": "string",
                "createdAt": "date",
                "total": "number",
                "items": [{"productId": "ObjectId", "qty": "number"}],
                "shipping": {"city": "string"}
            }
        }))
        .unwrap()
    }

    fn synthesized() -> AccessReport {
        let schema = shop();
        let workload = Workload::synthesize(&schema, &WorkloadConfig::default());
        analyze_access(&schema, &workload, &AccessConfig::default()).unwrap()
    }

    #[test]
    fn test_classification() {
        let report = synthesized();
        let pattern = |p: &str| report.field(p).map(|f| f.pattern);

        assert_eq!(pattern("orders.userId"), Some(QueryPattern::AggregationDriver));
        assert_eq!(report.field("orders.userId").unwrap().joins.as_deref(), Some("users"));
        assert_eq!(pattern("users._id"), Some(QueryPattern::PointLookup));
        assert_eq!(pattern("users.email"), Some(QueryPattern::PointLookup));
        assert_eq!(pattern("orders.createdAt"), Some(QueryPattern::Range));
        assert_eq!(pattern("orders.total"), Some(QueryPattern::Range));
        assert_eq!(pattern("orders.status"), Some(QueryPattern::Sort));
    }

    #[test]
    fn test_zero_frequency_fields_are_excluded() {
        let schema = shop();
        let mut workload = Workload::default();
        workload.fields.insert(
            "orders.userId".to_string(),
            FieldWorkload { queries_per_day: 0.0, estimated_unique_values: None },
        );
        let report = analyze_access(&schema, &workload, &AccessConfig::default()).unwrap();
        assert!(report.fields.is_empty());
        assert_eq!(report.coverage.high_frequency_fields, 0);
        assert_eq!(report.coverage.ratio, 1.0);
    }

    #[test]
    fn test_recommended_indexes() {
        let report = synthesized();
        assert_eq!(report.index_source, IndexSource::Recommended);

        let orders: Vec<&IndexSpec> =
            report.indexes.iter().filter(|i| i.collection == "orders").collect();
        assert_eq!(orders[0].fields, vec!["userId", "createdAt"]);
        assert_eq!(orders[1].fields, vec!["userId", "status"]);

        let first = &report.recommendations[0];
        assert_eq!(first.command, "db.orders.createIndex({ userId: 1, createdAt: -1 })");
        assert!((first.before_ms - 542.5).abs() < 1e-9);
        assert!((first.after_ms - 54.25).abs() < 1e-9);

        // users has no foreign key, so its status field gets no standalone index
        assert!(report.indexes.iter().all(|i| i.collection != "users"));
    }

    #[test]
    fn test_redundant_declared_index_reported() {
        let schema = shop();
        let mut workload = Workload::synthesize(&schema, &WorkloadConfig::default());
        workload.indexes = vec![
            IndexSpec::new("orders", &["userId"]),
            IndexSpec::new("orders", &["userId", "createdAt"]),
        ];
        let report = analyze_access(&schema, &workload, &AccessConfig::default()).unwrap();
        assert_eq!(report.index_source, IndexSource::Declared);
        assert_eq!(report.redundant_indexes, vec![IndexSpec::new("orders", &["userId"])]);
    }

    #[test]
    fn test_selectivity() {
        let schema = shop();
        let mut workload = Workload::synthesize(&schema, &WorkloadConfig::default());
        workload.indexes = vec![IndexSpec::new("orders", &["status"])];
        workload.fields.get_mut("orders.status").unwrap().estimated_unique_values = Some(20_000.0);

        let report = analyze_access(&schema, &workload, &AccessConfig::default()).unwrap();
        let s = &report.selectivity[0];
        assert_eq!(s.path, "orders.status");
        assert!((s.selectivity_pct - 40.0).abs() < 1e-9);
        assert!(!s.weak);

        workload.fields.get_mut("orders.status").unwrap().estimated_unique_values = None;
        let report = analyze_access(&schema, &workload, &AccessConfig::default()).unwrap();
        assert!(report.selectivity[0].weak);
    }

    #[test]
    fn test_write_amplification_thresholds() {
        let events: serde_json::Map<String, serde_json::Value> = ["a", "b", "c", "d", "e", "f", "g"]
            .iter()
            .map(|f| (f.to_string(), json!("string")))
            .collect();
        let schema = Schema::from_json(&json!({ "events": events })).unwrap();
        let mut workload = Workload::default();
        workload.collections.insert(
            "events".to_string(),
            CollectionWorkload { reads_per_sec: 10.0, writes_per_sec: 10.0, documents: 100.0 },
        );
        let config = AccessConfig::default();

        workload.indexes = ["_id", "a", "b", "c", "d", "e"]
            .iter()
            .map(|f| IndexSpec::new("events", &[*f]))
            .collect();
        let report = analyze_access(&schema, &workload, &config).unwrap();
        assert_eq!(report.write_amplification.factor, 6.0);
        assert_eq!(report.write_amplification.status, Status::Warning);

        workload.indexes.push(IndexSpec::new("events", &["f"]));
        workload.indexes.push(IndexSpec::new("events", &["g"]));
        let report = analyze_access(&schema, &workload, &config).unwrap();
        assert_eq!(report.write_amplification.factor, 8.0);
        assert_eq!(report.write_amplification.status, Status::Critical);
    }

    #[test]
    fn test_coverage_counts_uncovered_fields() {
        let schema = shop();
        let mut workload = Workload::synthesize(&schema, &WorkloadConfig::default());
        workload.indexes = vec![IndexSpec::new("orders", &["userId"])];
        let report = analyze_access(&schema, &workload, &AccessConfig::default()).unwrap();

        // high-frequency: orders.userId, orders.status, users.status, orders.items.productId
        assert_eq!(report.coverage.high_frequency_fields, 4);
        assert_eq!(report.coverage.covered, 1);
        assert_eq!(report.coverage.status, CoverageStatus::NeedsImprovement);
        assert!(report.coverage.uncovered.contains(&"users.status".to_string()));
    }

    #[test]
    fn test_archival_and_mix() {
        let report = synthesized();
        let paths: Vec<&str> = report.archival_candidates.iter().map(|a| a.path.as_str()).collect();
        assert!(paths.contains(&"users.bio"));
        assert!(paths.contains(&"orders.shipping"));

        let orders = report.collection_mix.iter().find(|m| m.collection == "orders").unwrap();
        assert!(orders.write_heavy);
        assert!(report.shard_keys.is_empty());
    }

    #[test]
    fn test_negative_workload_rejected() {
        let schema = shop();
        let mut workload = Workload::default();
        workload.fields.insert(
            "orders.userId".to_string(),
            FieldWorkload { queries_per_day: -5.0, estimated_unique_values: None },
        );
        assert!(analyze_access(&schema, &workload, &AccessConfig::default()).is_err());
    }
}
