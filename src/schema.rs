//! Schema tree and schema document types

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::checksum::Checksum;
use crate::error::{AdvisorError, Result};

/// Default nesting limit applied when materializing a tree from JSON.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Normalized scalar type of a field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeTag {
    String,
    Number,
    Boolean,
    Date,
    ObjectId,
    /// Reference to another collection (`ref:<collection>`)
    Reference(String),
    /// Unknown or heterogeneous value
    Mixed,
    /// Any type name not covered above, kept verbatim
    Other(String),
}

impl TypeTag {
    /// Parse a free-form type name as produced by schema generation
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();

        for prefix in ["ref:", "reference:"] {
            if lower.starts_with(prefix) {
                return TypeTag::Reference(trimmed[prefix.len()..].trim().to_string());
            }
        }

        match lower.as_str() {
            "string" | "str" | "text" => TypeTag::String,
            "number" | "int" | "integer" | "float" | "double" | "decimal" | "long" => {
                TypeTag::Number
            }
            "bool" | "boolean" => TypeTag::Boolean,
            "date" | "datetime" | "timestamp" => TypeTag::Date,
            "objectid" | "object id" | "oid" => TypeTag::ObjectId,
            "" | "mixed" | "any" | "null" => TypeTag::Mixed,
            _ => TypeTag::Other(trimmed.to_string()),
        }
    }

    /// Whether values of this type point at another document
    pub fn is_reference(&self) -> bool {
        matches!(self, TypeTag::ObjectId | TypeTag::Reference(_))
    }

    /// Whether range predicates are meaningful on this type
    pub fn is_ordered(&self) -> bool {
        matches!(self, TypeTag::Number | TypeTag::Date)
    }

    /// Approximate encoded size of one value, in bytes
    pub fn value_size_bytes(&self) -> f64 {
        match self {
            TypeTag::String => 32.0,
            TypeTag::Number | TypeTag::Date => 8.0,
            TypeTag::Boolean => 1.0,
            TypeTag::ObjectId | TypeTag::Reference(_) => 12.0,
            TypeTag::Mixed | TypeTag::Other(_) => 16.0,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::String => write!(f, "string"),
            TypeTag::Number => write!(f, "number"),
            TypeTag::Boolean => write!(f, "boolean"),
            TypeTag::Date => write!(f, "date"),
            TypeTag::ObjectId => write!(f, "ObjectId"),
            TypeTag::Reference(target) => write!(f, "ref:{}", target),
            TypeTag::Mixed => write!(f, "mixed"),
            TypeTag::Other(raw) => write!(f, "{}", raw),
        }
    }
}

impl From<String> for TypeTag {
    fn from(s: String) -> Self {
        TypeTag::parse(&s)
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        tag.to_string()
    }
}

/// A node of a schema tree
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Scalar(TypeTag),
    /// Array of a single element shape
    Array(Box<SchemaNode>),
    /// Embedded sub-document
    Object(IndexMap<String, SchemaNode>),
}

impl SchemaNode {
    fn from_value(value: &Value, path: &str, depth: usize, limit: usize) -> Result<Self> {
        if depth > limit {
            return Err(AdvisorError::shape(
                path,
                format!("nesting exceeds {} levels", limit),
            ));
        }

        match value {
            Value::String(s) => Ok(SchemaNode::Scalar(TypeTag::parse(s))),
            Value::Number(_) => Ok(SchemaNode::Scalar(TypeTag::Number)),
            Value::Bool(_) => Ok(SchemaNode::Scalar(TypeTag::Boolean)),
            Value::Null => Ok(SchemaNode::Scalar(TypeTag::Mixed)),
            Value::Array(items) => {
                let element = match items.first() {
                    Some(first) => SchemaNode::from_value(first, path, depth, limit)?,
                    None => SchemaNode::Scalar(TypeTag::Mixed),
                };
                Ok(SchemaNode::Array(Box::new(element)))
            }
            Value::Object(map) => {
                let mut fields = IndexMap::with_capacity(map.len());
                for (key, child) in map {
                    let child_path = format!("{}.{}", path, key);
                    fields.insert(
                        key.clone(),
                        SchemaNode::from_value(child, &child_path, depth + 1, limit)?,
                    );
                }
                Ok(SchemaNode::Object(fields))
            }
        }
    }

    /// Convert back to the plain JSON shape
    pub fn to_value(&self) -> Value {
        match self {
            SchemaNode::Scalar(tag) => Value::String(tag.to_string()),
            SchemaNode::Array(element) => Value::Array(vec![element.to_value()]),
            SchemaNode::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
        }
    }

    /// The element shape once all array layers are peeled off
    pub fn innermost(&self) -> &SchemaNode {
        match self {
            SchemaNode::Array(element) => element.innermost(),
            other => other,
        }
    }

    /// Scalar type of this node or of its array elements
    pub fn type_tag(&self) -> Option<&TypeTag> {
        match self.innermost() {
            SchemaNode::Scalar(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, SchemaNode::Array(_))
    }

    /// Nested mapping reachable through this node, if any
    pub fn as_mapping(&self) -> Option<&IndexMap<String, SchemaNode>> {
        match self.innermost() {
            SchemaNode::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Approximate encoded size of one value of this shape, in bytes
    pub fn estimated_size_bytes(&self) -> f64 {
        match self {
            SchemaNode::Scalar(tag) => tag.value_size_bytes(),
            SchemaNode::Array(element) => 5.0 + element.estimated_size_bytes(),
            SchemaNode::Object(fields) => {
                5.0 + fields
                    .iter()
                    .map(|(name, node)| 2.0 + name.len() as f64 + node.estimated_size_bytes())
                    .sum::<f64>()
            }
        }
    }
}

/// Collection name to field mapping
pub type Collection = IndexMap<String, SchemaNode>;

/// A complete schema tree: collection name to field mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Schema {
    pub collections: IndexMap<String, Collection>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Materialize a schema from JSON with the default nesting limit
    pub fn from_json(value: &Value) -> Result<Self> {
        Self::from_json_with_limit(value, DEFAULT_MAX_DEPTH)
    }

    /// Materialize a schema from JSON, failing when nesting exceeds `limit`
    pub fn from_json_with_limit(value: &Value, limit: usize) -> Result<Self> {
        let root = value
            .as_object()
            .ok_or_else(|| AdvisorError::shape("<root>", "expected a mapping of collections"))?;

        let mut collections = IndexMap::with_capacity(root.len());
        for (name, fields) in root {
            let map = fields.as_object().ok_or_else(|| {
                AdvisorError::shape(name.as_str(), "collection must map field names to types")
            })?;

            let mut collection = Collection::with_capacity(map.len());
            for (field, node) in map {
                let path = format!("{}.{}", name, field);
                collection.insert(field.clone(), SchemaNode::from_value(node, &path, 1, limit)?);
            }
            collections.insert(name.clone(), collection);
        }

        Ok(Self { collections })
    }

    /// Builder-style helper to add a collection
    pub fn with_collection(mut self, name: impl Into<String>, fields: Collection) -> Self {
        self.collections.insert(name.into(), fields);
        self
    }

    /// Plain JSON representation
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.collections
                .iter()
                .map(|(name, fields)| {
                    let map = fields
                        .iter()
                        .map(|(k, v)| (k.clone(), v.to_value()))
                        .collect();
                    (name.clone(), Value::Object(map))
                })
                .collect(),
        )
    }

    /// Canonical checksum of the tree, independent of key order
    pub fn checksum(&self) -> Checksum {
        Checksum::from_json(&self.to_value())
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

impl TryFrom<Value> for Schema {
    type Error = AdvisorError;

    fn try_from(value: Value) -> Result<Self> {
        Schema::from_json(&value)
    }
}

impl From<Schema> for Value {
    fn from(schema: Schema) -> Self {
        schema.to_value()
    }
}

/// Opaque identifier of a schema document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaId(String);

impl SchemaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SchemaId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SchemaId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A generated schema together with its lineage metadata.
///
/// Documents are immutable once created; a refinement produces a new document
/// one version above its parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    pub id: SchemaId,
    /// First document of the lineage (defaults to `id` when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_id: Option<SchemaId>,
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<SchemaId>,
    /// The free-form request the schema was generated from
    #[serde(default)]
    pub input_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refinement_text: Option<String>,
    /// Workload hint supplied with the request (e.g. "read-heavy")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workload_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub schema: Schema,
}

impl SchemaDocument {
    /// Create the first version of a lineage
    pub fn initial(id: impl Into<SchemaId>, input_text: impl Into<String>, schema: Schema) -> Self {
        Self {
            id: id.into(),
            root_id: None,
            version: 1,
            parent_id: None,
            input_text: input_text.into(),
            refinement_text: None,
            workload_type: None,
            created_at: Utc::now(),
            schema,
        }
    }

    /// Derive the next version from this document
    pub fn refine(
        &self,
        id: impl Into<SchemaId>,
        refinement_text: impl Into<String>,
        schema: Schema,
    ) -> Self {
        let refinement_text = refinement_text.into();
        Self {
            id: id.into(),
            root_id: Some(self.root().clone()),
            version: self.version + 1,
            parent_id: Some(self.id.clone()),
            input_text: format!("{}\nRefinement: {}", self.input_text, refinement_text),
            refinement_text: Some(refinement_text),
            workload_type: self.workload_type.clone(),
            created_at: Utc::now(),
            schema,
        }
    }

    pub fn with_workload_type(mut self, workload_type: impl Into<String>) -> Self {
        self.workload_type = Some(workload_type.into());
        self
    }

    /// Root of the lineage this document belongs to
    pub fn root(&self) -> &SchemaId {
        self.root_id.as_ref().unwrap_or(&self.id)
    }

    /// Check the version/parent invariant
    pub fn validate(&self) -> Result<()> {
        let broken = |reason: &str| AdvisorError::LineageBroken {
            id: self.id.to_string(),
            reason: reason.to_string(),
        };

        match (self.version, &self.parent_id) {
            (0, _) => Err(broken("version must be a positive integer")),
            (1, Some(_)) => Err(broken("version 1 cannot have a parent")),
            (1, None) => Ok(()),
            (_, None) => Err(broken("versions above 1 require a parent")),
            (_, Some(parent)) if parent == &self.id => Err(broken("document is its own parent")),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_normalization() {
        assert_eq!(TypeTag::parse("Text"), TypeTag::String);
        assert_eq!(TypeTag::parse("int"), TypeTag::Number);
        assert_eq!(TypeTag::parse("datetime"), TypeTag::Date);
        assert_eq!(TypeTag::parse("ObjectId"), TypeTag::ObjectId);
        assert_eq!(TypeTag::parse("ref:users"), TypeTag::Reference("users".to_string()));
        assert_eq!(TypeTag::parse("Decimal128"), TypeTag::Other("Decimal128".to_string()));
    }

    #[test]
    fn test_from_json_shapes() {
        let schema = Schema::from_json(&json!({
            "orders": {
                "userId": "ObjectId",
                "items": [{"productId": "ObjectId", "qty": "number"}],
                "tags": [],
                "note": null
            }
        }))
        .unwrap();

        let orders = &schema.collections["orders"];
        assert_eq!(orders["userId"], SchemaNode::Scalar(TypeTag::ObjectId));
        assert!(orders["items"].as_mapping().is_some());
        assert_eq!(orders["tags"], SchemaNode::Array(Box::new(SchemaNode::Scalar(TypeTag::Mixed))));
        assert_eq!(orders["note"], SchemaNode::Scalar(TypeTag::Mixed));
    }

    #[test]
    fn test_from_json_keeps_document_order() {
        let text = r#"{
            "users": {"name": "string", "email": "string"},
            "orders": {"total": "number"}
        }"#;
        let value: Value = serde_json::from_str(text).unwrap();
        let schema = Schema::from_json(&value).unwrap();

        let collections: Vec<&str> = schema.collections.keys().map(String::as_str).collect();
        assert_eq!(collections, vec!["users", "orders"]);
        let fields: Vec<&str> = schema.collections["users"].keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["name", "email"]);

        let value = schema.to_value();
        let round_trip: Vec<&str> =
            value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(round_trip, vec!["users", "orders"]);
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(matches!(
            Schema::from_json(&json!(["users"])),
            Err(AdvisorError::InvalidSchemaShape { .. })
        ));
        assert!(matches!(
            Schema::from_json(&json!({"users": "string"})),
            Err(AdvisorError::InvalidSchemaShape { .. })
        ));

        let deep = json!({"c": {"a": {"b": {"c": {"d": "string"}}}}});
        let err = Schema::from_json_with_limit(&deep, 3).unwrap_err();
        match err {
            AdvisorError::InvalidSchemaShape { path, .. } => assert_eq!(path, "c.a.b.c.d"),
            other => panic!("Expected InvalidSchemaShape, got {:?}", other),
        }
    }

    #[test]
    fn test_checksum_ignores_key_order() {
        let a = Schema::from_json(&json!({"u": {"a": "string", "b": "number"}})).unwrap();
        let b = Schema::from_json(&json!({"u": {"b": "number", "a": "string"}})).unwrap();
        assert_eq!(a.checksum(), b.checksum());
    }

    #[test]
    fn test_refine_creates_next_version() {
        let v1 = SchemaDocument::initial("s1", "a blog", Schema::new());
        let v2 = v1.refine("s2", "add tags", Schema::new());

        assert_eq!(v2.version, 2);
        assert_eq!(v2.parent_id, Some(SchemaId::from("s1")));
        assert_eq!(v2.root(), &SchemaId::from("s1"));
        assert_eq!(v2.input_text, "a blog\nRefinement: add tags");
        assert!(v1.validate().is_ok());
        assert!(v2.validate().is_ok());
        assert_eq!(v1.version, 1);
    }

    #[test]
    fn test_version_parent_invariant() {
        let mut doc = SchemaDocument::initial("s1", "x", Schema::new());
        doc.parent_id = Some(SchemaId::from("s0"));
        assert!(doc.validate().is_err());

        let mut orphan = SchemaDocument::initial("s3", "x", Schema::new());
        orphan.version = 3;
        assert!(orphan.validate().is_err());
    }

    #[test]
    fn test_document_serde_camel_case() {
        let json = json!({
            "id": "b",
            "rootId": "a",
            "version": 2,
            "parentId": "a",
            "inputText": "shop",
            "createdAt": "2026-01-01T00:00:00Z",
            "schema": {"users": {"name": "string"}}
        });
        let doc: SchemaDocument = serde_json::from_value(json).unwrap();
        assert_eq!(doc.parent_id, Some(SchemaId::from("a")));
        assert_eq!(doc.schema.collections["users"]["name"], SchemaNode::Scalar(TypeTag::String));
    }
}
