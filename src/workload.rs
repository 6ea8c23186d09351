//! Declared or synthesized workloads: query frequencies, read/write rates,
//! collection sizes, declared indexes and array cardinalities.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::{ensure_growth_rate, ensure_non_negative, WorkloadConfig};
use crate::error::Result;
use crate::naming::{self, CollectionHint, NameHint};
use crate::schema::{Schema, TypeTag};
use crate::tree::FieldRef;

/// Query traffic on one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldWorkload {
    pub queries_per_day: f64,
    /// Distinct values; estimated from the field's shape when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_unique_values: Option<f64>,
}

/// Traffic and size of one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionWorkload {
    pub reads_per_sec: f64,
    pub writes_per_sec: f64,
    pub documents: f64,
}

/// Current cardinality of an embedded array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayWorkload {
    /// Elements per document today
    pub elements: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_growth_rate: Option<f64>,
    /// Bytes per element; estimated from the element shape when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_size_bytes: Option<f64>,
}

/// An index on a collection; field names are relative to the collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexSpec {
    pub collection: String,
    pub fields: Vec<String>,
}

impl IndexSpec {
    pub fn new(collection: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            collection: collection.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn is_primary(&self) -> bool {
        self.fields.len() == 1 && self.fields[0] == "_id"
    }

    pub fn is_compound(&self) -> bool {
        self.fields.len() > 1
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Whether this single-field index is the leading key of `other`
    pub fn is_prefix_of(&self, other: &IndexSpec) -> bool {
        self.collection == other.collection
            && self.fields.len() < other.fields.len()
            && other.fields.starts_with(&self.fields)
    }
}

/// Everything the analyzers need to know about traffic.
///
/// Field and array keys are full dot paths (`orders.items`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workload {
    #[serde(default)]
    pub fields: BTreeMap<String, FieldWorkload>,
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionWorkload>,
    #[serde(default)]
    pub indexes: Vec<IndexSpec>,
    #[serde(default)]
    pub arrays: BTreeMap<String, ArrayWorkload>,
}

impl Workload {
    /// Deterministic workload derived from field and collection names.
    ///
    /// Indexes are left empty so the access analysis recommends them.
    pub fn synthesize(schema: &Schema, config: &WorkloadConfig) -> Self {
        let mut workload = Workload::default();

        for field in schema.fields() {
            workload.fields.insert(
                field.path.clone(),
                FieldWorkload {
                    queries_per_day: estimated_queries_per_day(&field),
                    estimated_unique_values: None,
                },
            );

            if field.is_array() {
                workload.arrays.insert(
                    field.path.clone(),
                    ArrayWorkload {
                        elements: config.default_array_elements,
                        monthly_growth_rate: None,
                        element_size_bytes: None,
                    },
                );
            }
        }

        for name in schema.collections.keys() {
            let (writes, reads) = match naming::collection_hint(name) {
                CollectionHint::Transactional => (30.0, 65.0),
                CollectionHint::Social => (16.0, 100.0),
                CollectionHint::Profile => (6.0, 140.0),
                CollectionHint::General => (12.0, 80.0),
            };
            workload.collections.insert(
                name.clone(),
                CollectionWorkload {
                    reads_per_sec: reads,
                    writes_per_sec: writes,
                    documents: config.default_documents,
                },
            );
        }

        tracing::debug!(
            fields = workload.fields.len(),
            collections = workload.collections.len(),
            "synthesized workload"
        );
        workload
    }

    /// Skew read/write rates by a workload type hint. Only "write-heavy" and
    /// "read-heavy" (any case, with `-`, `_` or a space between the words)
    /// change the rates; "balanced" and anything else leave them alone.
    pub fn apply_hint(&mut self, hint: &str) {
        let token: String = hint
            .trim()
            .chars()
            .map(|c| if c == '_' || c == ' ' { '-' } else { c.to_ascii_lowercase() })
            .collect();
        let (read_factor, write_factor) = match token.as_str() {
            "write-heavy" => (1.0, 2.0),
            "read-heavy" => (2.0, 1.0),
            _ => return,
        };

        for collection in self.collections.values_mut() {
            collection.reads_per_sec *= read_factor;
            collection.writes_per_sec *= write_factor;
        }
    }

    /// Reject negative or non-finite numbers
    pub fn validate(&self) -> Result<()> {
        for (path, field) in &self.fields {
            let key = |name: &str| format!("workload.fields.{}.{}", path, name);
            ensure_non_negative(&key("queries_per_day"), field.queries_per_day)?;
            if let Some(unique) = field.estimated_unique_values {
                ensure_non_negative(&key("estimated_unique_values"), unique)?;
            }
        }
        for (name, collection) in &self.collections {
            let key = |field: &str| format!("workload.collections.{}.{}", name, field);
            ensure_non_negative(&key("reads_per_sec"), collection.reads_per_sec)?;
            ensure_non_negative(&key("writes_per_sec"), collection.writes_per_sec)?;
            ensure_non_negative(&key("documents"), collection.documents)?;
        }
        for (path, array) in &self.arrays {
            ensure_non_negative(&format!("workload.arrays.{}.elements", path), array.elements)?;
            if let Some(rate) = array.monthly_growth_rate {
                ensure_growth_rate(&format!("workload.arrays.{}.monthly_growth_rate", path), rate)?;
            }
            if let Some(size) = array.element_size_bytes {
                ensure_non_negative(&format!("workload.arrays.{}.element_size_bytes", path), size)?;
            }
        }
        Ok(())
    }

    /// Declared queries/day for a field path, zero when undeclared
    pub fn queries_per_day(&self, path: &str) -> f64 {
        self.fields.get(path).map_or(0.0, |f| f.queries_per_day)
    }

    pub fn total_writes_per_sec(&self) -> f64 {
        self.collections.values().map(|c| c.writes_per_sec).sum()
    }

    pub fn total_reads_per_sec(&self) -> f64 {
        self.collections.values().map(|c| c.reads_per_sec).sum()
    }

    /// Documents in a collection, or `fallback` when undeclared
    pub fn documents(&self, collection: &str, fallback: f64) -> f64 {
        self.collections.get(collection).map_or(fallback, |c| c.documents)
    }
}

fn estimated_queries_per_day(field: &FieldRef<'_>) -> f64 {
    let name = field.name;
    let tag = field.type_tag();

    if field.node.as_mapping().is_some() && !field.is_array() {
        return 60.0;
    }
    if field.is_reference() || name == "_id" || naming::has_hint(name, NameHint::Identifier) {
        return 925.0;
    }
    if naming::has_hint(name, NameHint::Category) {
        return 725.0;
    }
    if naming::has_hint(name, NameHint::Temporal) || tag == Some(&TypeTag::Date) {
        return 550.0;
    }
    if naming::has_hint(name, NameHint::Contact) {
        return 450.0;
    }
    if naming::has_hint(name, NameHint::Cold) {
        return 60.0;
    }
    match tag {
        Some(TypeTag::String) => 250.0,
        Some(TypeTag::Number) => 175.0,
        _ => 105.0,
    }
}
