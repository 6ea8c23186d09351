//! Modeling Pattern Detection
//!
//! Suggests MongoDB modeling patterns from collection names and the shape of
//! each collection's top-level fields. Detection is purely lexical: it needs no
//! workload and never looks below the first level of a collection.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::PatternsConfig;
use crate::error::Result;
use crate::schema::{Collection, Schema, SchemaNode, TypeTag};

// =============================================================================
// Pattern Catalogue
// =============================================================================

/// A modeling pattern the detector can suggest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelingPattern {
    TimeSeries,
    Capped,
    Ttl,
    Bucketing,
    Outlier,
    Subset,
    ExtendedReference,
    Polymorphic,
}

impl ModelingPattern {
    pub const ALL: [ModelingPattern; 8] = [
        ModelingPattern::TimeSeries,
        ModelingPattern::Capped,
        ModelingPattern::Ttl,
        ModelingPattern::Bucketing,
        ModelingPattern::Outlier,
        ModelingPattern::Subset,
        ModelingPattern::ExtendedReference,
        ModelingPattern::Polymorphic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ModelingPattern::TimeSeries => "Time-Series Collection",
            ModelingPattern::Capped => "Capped Collection",
            ModelingPattern::Ttl => "TTL Index",
            ModelingPattern::Bucketing => "Bucketing Pattern",
            ModelingPattern::Outlier => "Outlier Pattern",
            ModelingPattern::Subset => "Subset Pattern",
            ModelingPattern::ExtendedReference => "Extended Reference Pattern",
            ModelingPattern::Polymorphic => "Polymorphic Pattern",
        }
    }

    pub fn priority(&self) -> Priority {
        match self {
            ModelingPattern::TimeSeries
            | ModelingPattern::Ttl
            | ModelingPattern::Bucketing
            | ModelingPattern::ExtendedReference => Priority::High,
            ModelingPattern::Capped | ModelingPattern::Outlier | ModelingPattern::Subset => {
                Priority::Medium
            }
            ModelingPattern::Polymorphic => Priority::Low,
        }
    }

    fn description(&self) -> &'static str {
        match self {
            ModelingPattern::TimeSeries => {
                "Use a native time-series collection for compact storage and fast range queries"
            }
            ModelingPattern::Capped => {
                "Fixed-size collection that drops its oldest documents automatically"
            }
            ModelingPattern::Ttl => "Expire documents automatically from a date field",
            ModelingPattern::Bucketing => {
                "Group many measurements into one document per time bucket"
            }
            ModelingPattern::Outlier => {
                "Move the overflow of unusually large arrays into separate documents"
            }
            ModelingPattern::Subset => "Split frequently and rarely read fields",
            ModelingPattern::ExtendedReference => {
                "Copy the most-read fields of referenced documents next to the reference"
            }
            ModelingPattern::Polymorphic => {
                "Keep related but differently shaped documents together"
            }
        }
    }

    fn benefits(&self) -> &'static [&'static str] {
        match self {
            ModelingPattern::TimeSeries => &[
                "Up to 90% storage reduction",
                "Faster time-range queries",
                "Automatic data expiration",
            ],
            ModelingPattern::Capped => &[
                "Bounded storage usage",
                "High write throughput",
                "No index overhead for insertion order",
            ],
            ModelingPattern::Ttl => &[
                "Automatic data cleanup",
                "No manual deletion needed",
                "Maintains optimal collection size",
            ],
            ModelingPattern::Bucketing => &[
                "100-1000x fewer documents",
                "Better index efficiency",
                "Improved query performance",
            ],
            ModelingPattern::Outlier => &[
                "Prevents document bloat",
                "Maintains query performance",
                "Handles edge cases gracefully",
            ],
            ModelingPattern::Subset => &[
                "Smaller working set",
                "Faster common queries",
                "Better memory utilization",
            ],
            ModelingPattern::ExtendedReference => &[
                "Eliminates lookup queries",
                "Single collection read",
                "Better read performance",
            ],
            ModelingPattern::Polymorphic => &[
                "Flexible schema per type",
                "Single collection queries",
                "Easier to add new types",
            ],
        }
    }
}

impl fmt::Display for ModelingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Ordering of recommendations; `High` sorts first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
}

// =============================================================================
// Report Types
// =============================================================================

/// One suggested pattern for one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecommendation {
    pub pattern: ModelingPattern,
    pub collection: String,
    pub priority: Priority,
    pub confidence: Confidence,
    pub description: String,
    pub reasons: Vec<String>,
    /// Shell commands or steps to apply the pattern
    pub implementation: Vec<String>,
    pub benefits: Vec<String>,
    /// Field the pattern is keyed on, when it has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternSummary {
    pub total_patterns: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
    pub low_priority: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    pub collection_count: usize,
    /// Sorted by priority, then pattern name
    pub recommendations: Vec<PatternRecommendation>,
    pub summary: PatternSummary,
}

impl PatternReport {
    pub fn for_collection<'a>(
        &'a self,
        collection: &'a str,
    ) -> impl Iterator<Item = &'a PatternRecommendation> + 'a {
        self.recommendations.iter().filter(move |r| r.collection == collection)
    }

    pub fn find(
        &self,
        pattern: ModelingPattern,
        collection: &str,
    ) -> Option<&PatternRecommendation> {
        self.recommendations
            .iter()
            .find(|r| r.pattern == pattern && r.collection == collection)
    }
}

// =============================================================================
// Name Heuristics
// =============================================================================

const MEASUREMENT_NAMES: &[&str] =
    &["sensor", "telemetry", "measurement", "metric", "log", "event"];
const VALUE_FIELDS: &[&str] = &["value", "reading", "temperature", "pressure"];
const LOG_NAMES: &[&str] = &["log", "audit", "activity", "history", "event", "notification"];
const TEMPORARY_NAMES: &[&str] =
    &["session", "token", "cache", "temp", "verification", "otp", "code"];
const EXPIRY_FIELDS: &[&str] = &["expir", "ttl", "valid_until", "expires_at"];
const HIGH_FREQUENCY_NAMES: &[&str] =
    &["sensor", "metric", "measurement", "reading", "sample", "tick", "event"];
const SOURCE_FIELDS: &[&str] = &["device", "sensor", "source", "station", "node"];
const LIST_FIELDS: &[&str] = &["items", "tags", "comments", "reviews", "ratings"];
const SOCIAL_NAMES: &[&str] = &["user", "post", "product", "article", "video"];
const SUBSET_NAMES: &[&str] = &["product", "user", "profile", "customer", "item"];
const DETAIL_FIELDS: &[&str] =
    &["description", "details", "specifications", "metadata", "extended", "full"];
const TRANSACTION_NAMES: &[&str] =
    &["order", "cart", "transaction", "booking", "reservation", "invoice"];
const DISCRIMINATOR_FIELDS: &[&str] = &["type", "category", "kind", "variant", "status"];
const VARIANT_NAMES: &[&str] =
    &["notification", "event", "payment", "attachment", "content", "message"];

fn mentions(name: &str, words: &[&str]) -> bool {
    let lower = name.to_ascii_lowercase();
    words.iter().any(|w| lower.contains(w))
}

fn is_date(node: &SchemaNode) -> bool {
    node.type_tag() == Some(&TypeTag::Date)
}

fn is_timestamp(name: &str, node: &SchemaNode) -> bool {
    is_date(node) || mentions(name, &["time"])
}

fn is_reference_field(name: &str, node: &SchemaNode) -> bool {
    name != "_id" && (node.type_tag().is_some_and(TypeTag::is_reference) || name.ends_with("Id"))
}

fn first_field<'a>(
    fields: &'a Collection,
    pred: impl Fn(&str, &SchemaNode) -> bool,
) -> Option<&'a str> {
    fields
        .iter()
        .find(|(name, node)| pred(name, node))
        .map(|(name, _)| name.as_str())
}

fn has_field(fields: &Collection, pred: impl Fn(&str, &SchemaNode) -> bool) -> bool {
    first_field(fields, pred).is_some()
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

/// Keep only the reasons whose condition held
fn reasons(candidates: &[(bool, &str)]) -> Vec<String> {
    candidates
        .iter()
        .filter(|(held, _)| *held)
        .map(|(_, reason)| reason.to_string())
        .collect()
}

// =============================================================================
// Detectors
// =============================================================================

struct Detection {
    confidence: Confidence,
    reasons: Vec<String>,
    implementation: Vec<String>,
    field: Option<String>,
}

fn time_series(name: &str, fields: &Collection) -> Option<Detection> {
    let time_field = first_field(fields, is_timestamp)?;
    let measurements = mentions(name, MEASUREMENT_NAMES);
    let values = has_field(fields, |f, _| mentions(f, VALUE_FIELDS));
    if !(measurements || values) {
        return None;
    }

    let meta_field = first_field(fields, |f, _| mentions(f, SOURCE_FIELDS)).unwrap_or("deviceId");
    Some(Detection {
        confidence: Confidence::High,
        reasons: reasons(&[
            (true, "Timestamp field detected"),
            (measurements, "Measurement pattern in name"),
            (values, "Value/reading fields present"),
        ]),
        implementation: vec![
            format!(
                "db.createCollection('{}', {{ timeseries: \
                 {{ timeField: '{}', metaField: '{}', granularity: 'seconds' }} }})",
                name, time_field, meta_field
            ),
            "Automatic data bucketing and compression".to_string(),
            "Optimized for time-range queries".to_string(),
        ],
        field: Some(time_field.to_string()),
    })
}

fn capped(name: &str, fields: &Collection, config: &PatternsConfig) -> Option<Detection> {
    if !mentions(name, LOG_NAMES) || !has_field(fields, is_timestamp) {
        return None;
    }
    Some(Detection {
        confidence: Confidence::Medium,
        reasons: lines(&[
            "Log/audit pattern detected",
            "Natural insertion order with timestamps",
            "Likely append-only workload",
        ]),
        implementation: vec![
            format!(
                "db.createCollection('{}', {{ capped: true, size: {}, max: {} }})",
                name, config.capped_size_bytes, config.capped_max_documents
            ),
            "Natural insertion order guaranteed".to_string(),
            "Automatic FIFO cleanup".to_string(),
        ],
        field: None,
    })
}

fn ttl(name: &str, fields: &Collection, config: &PatternsConfig) -> Option<Detection> {
    let temporary = mentions(name, TEMPORARY_NAMES);
    let expiry = has_field(fields, |f, _| mentions(f, EXPIRY_FIELDS));
    let created = has_field(fields, |f, n| mentions(f, &["created"]) && is_date(n));
    if !(expiry || (temporary && created)) {
        return None;
    }

    let field =
        first_field(fields, |f, _| mentions(f, &["expir", "created"])).unwrap_or("createdAt");
    Some(Detection {
        confidence: if expiry { Confidence::High } else { Confidence::Medium },
        reasons: reasons(&[
            (temporary, "Temporary data pattern"),
            (expiry, "Explicit expiry field found"),
            (created, "Time-bound data lifecycle"),
        ]),
        implementation: vec![
            format!(
                "db.{}.createIndex({{ {}: 1 }}, {{ expireAfterSeconds: {} }})",
                name, field, config.ttl_expire_after_seconds
            ),
            "Background thread removes expired documents".to_string(),
            "Set expiration time in seconds".to_string(),
        ],
        field: Some(field.to_string()),
    })
}

fn bucketing(name: &str, fields: &Collection) -> Option<Detection> {
    if !mentions(name, HIGH_FREQUENCY_NAMES) || !has_field(fields, is_timestamp) {
        return None;
    }
    let source = first_field(fields, |f, _| mentions(f, SOURCE_FIELDS))?;
    Some(Detection {
        confidence: Confidence::High,
        reasons: lines(&[
            "High-frequency data pattern",
            "Timestamp-based data",
            "Multiple sources/devices",
            "Reduces document count by 100-1000x",
        ]),
        implementation: lines(&[
            "Store arrays of measurements in buckets",
            "Bucket by time period (hour/day)",
            "Reduce document count dramatically",
        ]),
        field: Some(source.to_string()),
    })
}

fn outlier(name: &str, fields: &Collection) -> Option<Detection> {
    if !mentions(name, SOCIAL_NAMES) {
        return None;
    }
    let list = first_field(fields, |f, n| n.is_array() || LIST_FIELDS.contains(&f))?;
    Some(Detection {
        confidence: Confidence::Medium,
        reasons: lines(&[
            "Potential unbounded array growth",
            "Social/activity pattern detected",
            "Separate overflow documents for outliers",
            "Keep main document size bounded",
        ]),
        implementation: lines(&[
            "Keep most items in main document array",
            "Create overflow document when threshold reached",
            "Link with _id reference",
        ]),
        field: Some(list.to_string()),
    })
}

fn subset(name: &str, fields: &Collection, config: &PatternsConfig) -> Option<Detection> {
    let count = fields.len();
    if count <= config.subset_field_threshold {
        return None;
    }
    if !mentions(name, SUBSET_NAMES) && !has_field(fields, |f, _| DETAIL_FIELDS.contains(&f)) {
        return None;
    }
    Some(Detection {
        confidence: Confidence::Medium,
        reasons: vec![
            format!("Large number of fields ({})", count),
            "Some fields rarely accessed".to_string(),
            "Keep frequently-used fields in main document".to_string(),
            "Move rarely-used to separate collection".to_string(),
        ],
        implementation: lines(&[
            "Main collection: frequently accessed fields only",
            "Details collection: rarely used fields",
            "Link with same _id",
        ]),
        field: None,
    })
}

fn extended_reference(name: &str, fields: &Collection) -> Option<Detection> {
    if !mentions(name, TRANSACTION_NAMES) {
        return None;
    }
    let references: Vec<&str> = fields
        .iter()
        .filter(|(f, n)| is_reference_field(f, n))
        .map(|(f, _)| f.as_str())
        .collect();
    let first = *references.first()?;

    let stem = first.strip_suffix("Id").unwrap_or(first);
    Some(Detection {
        confidence: Confidence::High,
        reasons: vec![
            format!("{} reference field(s): {}", references.len(), references.join(", ")),
            "Frequent joins likely".to_string(),
            "Denormalize key fields to avoid lookups".to_string(),
        ],
        implementation: vec![
            "Store reference ID + key fields".to_string(),
            format!("Example: {{ {}: ObjectId, {}Name: '...' }}", first, stem),
            "Avoid joins for common queries".to_string(),
        ],
        field: Some(first.to_string()),
    })
}

fn polymorphic(name: &str, fields: &Collection) -> Option<Detection> {
    if !mentions(name, VARIANT_NAMES) {
        return None;
    }
    let discriminator = first_field(fields, |f, _| DISCRIMINATOR_FIELDS.contains(&f))?;
    Some(Detection {
        confidence: Confidence::Medium,
        reasons: lines(&[
            "Type discriminator field detected",
            "Multiple variants in single collection",
            "Schema varies by type",
            "More flexible than separate collections",
        ]),
        implementation: lines(&[
            "Add type discriminator field",
            "Vary fields based on type",
            "Use schema validation per type",
        ]),
        field: Some(discriminator.to_string()),
    })
}

fn detect(
    pattern: ModelingPattern,
    name: &str,
    fields: &Collection,
    config: &PatternsConfig,
) -> Option<Detection> {
    match pattern {
        ModelingPattern::TimeSeries => time_series(name, fields),
        ModelingPattern::Capped => capped(name, fields, config),
        ModelingPattern::Ttl => ttl(name, fields, config),
        ModelingPattern::Bucketing => bucketing(name, fields),
        ModelingPattern::Outlier => outlier(name, fields),
        ModelingPattern::Subset => subset(name, fields, config),
        ModelingPattern::ExtendedReference => extended_reference(name, fields),
        ModelingPattern::Polymorphic => polymorphic(name, fields),
    }
}

// =============================================================================
// Entry Point
// =============================================================================

/// Suggest modeling patterns for every collection of `schema`
pub fn detect_patterns(schema: &Schema, config: &PatternsConfig) -> Result<PatternReport> {
    config.validate()?;
    tracing::debug!(collections = schema.collection_count(), "detecting modeling patterns");

    let mut recommendations = Vec::new();
    for pattern in ModelingPattern::ALL {
        for (name, fields) in &schema.collections {
            let Some(found) = detect(pattern, name, fields, config) else {
                continue;
            };
            recommendations.push(PatternRecommendation {
                pattern,
                collection: name.clone(),
                priority: pattern.priority(),
                confidence: found.confidence,
                description: pattern.description().to_string(),
                reasons: found.reasons,
                implementation: found.implementation,
                benefits: pattern.benefits().iter().map(|b| b.to_string()).collect(),
                field: found.field,
            });
        }
    }

    // stable: collections keep schema order within one pattern
    recommendations.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.pattern.name().cmp(b.pattern.name()))
    });

    let count = |priority: Priority| {
        recommendations.iter().filter(|r| r.priority == priority).count()
    };
    let summary = PatternSummary {
        total_patterns: recommendations.len(),
        high_priority: count(Priority::High),
        medium_priority: count(Priority::Medium),
        low_priority: count(Priority::Low),
    };

    Ok(PatternReport {
        collection_count: schema.collection_count(),
        recommendations,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: serde_json::Value) -> Schema {
        Schema::from_json(&value).unwrap()
    }

    fn detect_in(value: serde_json::Value) -> PatternReport {
        detect_patterns(&schema(value), &PatternsConfig::default()).unwrap()
    }

    #[test]
    fn test_time_series() {
        let report = detect_in(json!({
            "sensor_readings": {"deviceId": "ObjectId", "recordedAt": "date", "value": "number"}
        }));
        let found = report.find(ModelingPattern::TimeSeries, "sensor_readings").unwrap();
        assert_eq!(found.confidence, Confidence::High);
        assert_eq!(found.field.as_deref(), Some("recordedAt"));
        assert_eq!(found.reasons.len(), 3);
        assert!(found.implementation[0].contains("timeField: 'recordedAt', metaField: 'deviceId'"));

        // a timestamp alone is not enough
        let plain = detect_in(json!({"users": {"name": "string", "createdAt": "date"}}));
        assert!(plain.find(ModelingPattern::TimeSeries, "users").is_none());
    }

    #[test]
    fn test_capped_collection() {
        let report = detect_in(json!({
            "audit_logs": {"action": "string", "timestamp": "date"},
            "audit_notes": {"text": "string"}
        }));
        let found = report.find(ModelingPattern::Capped, "audit_logs").unwrap();
        assert!(found.implementation[0].contains("capped: true, size: 5242880, max: 5000"));
        assert!(report.find(ModelingPattern::Capped, "audit_notes").is_none());
    }

    #[test]
    fn test_ttl_index() {
        let report = detect_in(json!({
            "sessions": {"userId": "ObjectId", "createdAt": "date"},
            "invites": {"email": "string", "expiresAt": "date"},
            "users": {"name": "string", "createdAt": "date"}
        }));

        let session = report.find(ModelingPattern::Ttl, "sessions").unwrap();
        assert_eq!(session.confidence, Confidence::Medium);
        assert_eq!(session.field.as_deref(), Some("createdAt"));
        assert_eq!(
            session.reasons,
            vec!["Temporary data pattern", "Time-bound data lifecycle"]
        );

        let invite = report.find(ModelingPattern::Ttl, "invites").unwrap();
        assert_eq!(invite.confidence, Confidence::High);
        let command = &invite.implementation[0];
        assert!(command.contains("{ expiresAt: 1 }, { expireAfterSeconds: 3600 }"));

        assert!(report.find(ModelingPattern::Ttl, "users").is_none());
    }

    #[test]
    fn test_bucketing_needs_a_source() {
        let report = detect_in(json!({
            "metrics": {"stationId": "ObjectId", "time": "date", "value": "number"},
            "events": {"time": "date", "name": "string"}
        }));
        let found = report.find(ModelingPattern::Bucketing, "metrics").unwrap();
        assert_eq!(found.field.as_deref(), Some("stationId"));
        assert!(report.find(ModelingPattern::Bucketing, "events").is_none());
    }

    #[test]
    fn test_outlier() {
        let report = detect_in(json!({
            "posts": {"title": "string", "likes": ["ObjectId"]},
            "products": {"name": "string", "reviews": "string"},
            "categories": {"children": ["ObjectId"]}
        }));
        let posts = report.find(ModelingPattern::Outlier, "posts").unwrap();
        assert_eq!(posts.field.as_deref(), Some("likes"));
        assert!(report.find(ModelingPattern::Outlier, "products").is_some());
        assert!(report.find(ModelingPattern::Outlier, "categories").is_none());
    }

    fn wide(fields: usize) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> =
            (0..fields).map(|i| (format!("field{}", i), json!("string"))).collect();
        serde_json::Value::Object(map)
    }

    #[test]
    fn test_subset_threshold() {
        let report = detect_in(json!({"products": wide(16), "ledgers": wide(16)}));
        let found = report.find(ModelingPattern::Subset, "products").unwrap();
        assert_eq!(found.reasons[0], "Large number of fields (16)");
        assert!(report.find(ModelingPattern::Subset, "ledgers").is_none());

        let config = PatternsConfig { subset_field_threshold: 16, ..PatternsConfig::default() };
        let strict = detect_patterns(&schema(json!({"products": wide(16)})), &config).unwrap();
        assert!(strict.find(ModelingPattern::Subset, "products").is_none());
    }

    #[test]
    fn test_extended_reference() {
        let report = detect_in(json!({
            "orders": {
                "_id": "ObjectId",
                "customerId": "ObjectId",
                "productId": "ObjectId",
                "total": "number"
            },
            "carts": {"_id": "ObjectId", "total": "number"}
        }));
        let found = report.find(ModelingPattern::ExtendedReference, "orders").unwrap();
        assert_eq!(found.reasons[0], "2 reference field(s): customerId, productId");
        assert!(found.implementation[1].contains("customerName"));
        // the primary key is not a reference
        assert!(report.find(ModelingPattern::ExtendedReference, "carts").is_none());
    }

    #[test]
    fn test_polymorphic() {
        let report = detect_in(json!({
            "notifications": {"type": "string", "payload": "mixed"},
            "messages": {"body": "string"}
        }));
        let found = report.find(ModelingPattern::Polymorphic, "notifications").unwrap();
        assert_eq!(found.priority, Priority::Low);
        assert_eq!(found.field.as_deref(), Some("type"));
        assert!(report.find(ModelingPattern::Polymorphic, "messages").is_none());
    }

    #[test]
    fn test_ordering_and_summary() {
        let report = detect_in(json!({
            "notifications": {"type": "string", "sentAt": "date"},
            "orders": {"userId": "ObjectId"}
        }));
        let found: Vec<(ModelingPattern, &str)> = report
            .recommendations
            .iter()
            .map(|r| (r.pattern, r.collection.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                (ModelingPattern::ExtendedReference, "orders"),
                (ModelingPattern::Capped, "notifications"),
                (ModelingPattern::Polymorphic, "notifications"),
            ]
        );
        assert_eq!(
            report.summary,
            PatternSummary {
                total_patterns: 3,
                high_priority: 1,
                medium_priority: 1,
                low_priority: 1,
            }
        );
        assert_eq!(report.for_collection("notifications").count(), 2);
    }

    #[test]
    fn test_plain_schema_has_no_patterns() {
        let report = detect_in(json!({"accounts": {"name": "string", "balance": "number"}}));
        assert_eq!(report.collection_count, 1);
        assert!(report.recommendations.is_empty());
        assert_eq!(report.summary, PatternSummary::default());
    }
}
