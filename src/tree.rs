//! Structural metrics and field traversal over schema trees
//!
//! Depth rules: an empty schema has depth 0, a collection of scalar fields has
//! depth 1, and every embedded mapping (including the object element of an
//! array) adds one level. Arrays themselves do not add depth.

use serde::{Deserialize, Serialize};

use crate::schema::{Collection, Schema, SchemaNode, TypeTag};

/// One field of a schema, reached by traversal
#[derive(Debug, Clone)]
pub struct FieldRef<'a> {
    pub collection: &'a str,
    /// Dot-joined path including the collection name (e.g. `orders.items.qty`)
    pub path: String,
    /// Key of the field in its parent mapping
    pub name: &'a str,
    pub node: &'a SchemaNode,
    /// 1 for top-level fields of a collection
    pub depth: usize,
    /// Whether the field lives inside an array element
    pub in_array: bool,
}

impl FieldRef<'_> {
    pub fn type_tag(&self) -> Option<&TypeTag> {
        self.node.type_tag()
    }

    /// Whether the field references another document (excluding the primary key)
    pub fn is_reference(&self) -> bool {
        self.name != "_id" && self.type_tag().is_some_and(TypeTag::is_reference)
    }

    pub fn is_array(&self) -> bool {
        self.node.is_array()
    }
}

/// Bundle of the structural metrics used by the analyzers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralMetrics {
    pub collections: usize,
    pub fields: usize,
    pub max_depth: usize,
    pub references: usize,
    pub arrays: usize,
}

impl Schema {
    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }

    /// Every key inside every collection mapping, at any nesting level.
    /// Collection names themselves are not counted.
    pub fn field_count(&self) -> usize {
        self.collections.values().map(count_fields).sum()
    }

    pub fn max_depth(&self) -> usize {
        self.collections
            .values()
            .map(mapping_depth)
            .max()
            .unwrap_or(0)
    }

    /// Fields holding an ObjectId or collection reference, `_id` excluded
    pub fn reference_count(&self) -> usize {
        self.fields().filter(FieldRef::is_reference).count()
    }

    pub fn array_count(&self) -> usize {
        self.fields().filter(FieldRef::is_array).count()
    }

    pub fn metrics(&self) -> StructuralMetrics {
        StructuralMetrics {
            collections: self.collection_count(),
            fields: self.field_count(),
            max_depth: self.max_depth(),
            references: self.reference_count(),
            arrays: self.array_count(),
        }
    }

    /// Depth-first traversal of every field in declaration order
    pub fn fields(&self) -> impl Iterator<Item = FieldRef<'_>> + '_ {
        let mut out = Vec::with_capacity(self.field_count());
        for (name, collection) in &self.collections {
            collect_fields(name, name, collection, 1, false, &mut out);
        }
        out.into_iter()
    }

    /// Look up a field by its dot path (collection name first)
    pub fn field(&self, path: &str) -> Option<&SchemaNode> {
        let mut parts = path.split('.');
        let collection = self.collections.get(parts.next()?)?;
        let mut node = collection.get(parts.next()?)?;
        for part in parts {
            node = node.as_mapping()?.get(part)?;
        }
        Some(node)
    }
}

fn count_fields(mapping: &Collection) -> usize {
    mapping
        .values()
        .map(|node| 1 + node.as_mapping().map(count_fields).unwrap_or(0))
        .sum()
}

fn mapping_depth(mapping: &Collection) -> usize {
    1 + mapping
        .values()
        .filter_map(SchemaNode::as_mapping)
        .map(mapping_depth)
        .max()
        .unwrap_or(0)
}

fn collect_fields<'a>(
    collection: &'a str,
    prefix: &str,
    mapping: &'a Collection,
    depth: usize,
    in_array: bool,
    out: &mut Vec<FieldRef<'a>>,
) {
    for (name, node) in mapping {
        let path = format!("{}.{}", prefix, name);
        if let Some(children) = node.as_mapping() {
            let nested_in_array = in_array || node.is_array();
            out.push(FieldRef {
                collection,
                path: path.clone(),
                name,
                node,
                depth,
                in_array,
            });
            collect_fields(collection, &path, children, depth + 1, nested_in_array, out);
        } else {
            out.push(FieldRef {
                collection,
                path,
                name,
                node,
                depth,
                in_array,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shop() -> Schema {
        Schema::from_json(&json!({
            "users": {"_id": "ObjectId", "name": "string", "email": "string"},
            "orders": {
                "userId": "ObjectId",
                "items": [{"productId": "ref:products", "qty": "number"}],
                "shipping": {"address": {"city": "string", "zip": "string"}},
                "tags": ["string"]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_empty_schema() {
        let schema = Schema::new();
        assert_eq!(schema.field_count(), 0);
        assert_eq!(schema.max_depth(), 0);
        assert_eq!(schema.collection_count(), 0);
    }

    #[test]
    fn test_scalar_only_depth_is_one() {
        let schema = Schema::from_json(&json!({"users": {"name": "string", "age": 3}})).unwrap();
        assert_eq!(schema.max_depth(), 1);
        assert_eq!(schema.field_count(), 2);
    }

    #[test]
    fn test_metrics() {
        let m = shop().metrics();
        assert_eq!(m.collections, 2);
        // users: 3, orders: userId, items, productId, qty, shipping, address, city, zip, tags
        assert_eq!(m.fields, 12);
        assert_eq!(m.max_depth, 3);
        assert_eq!(m.references, 2);
        assert_eq!(m.arrays, 2);
    }

    #[test]
    fn test_field_paths() {
        let schema = shop();
        let paths: Vec<String> = schema.fields().map(|f| f.path).collect();
        assert!(paths.contains(&"orders.items.qty".to_string()));
        assert!(paths.contains(&"orders.shipping.address.zip".to_string()));

        let qty = schema.fields().find(|f| f.path == "orders.items.qty").unwrap();
        assert!(qty.in_array);
        assert_eq!(qty.depth, 2);

        assert!(schema.field("orders.items.productId").is_some());
        assert!(schema.field("orders.missing").is_none());
    }
}
