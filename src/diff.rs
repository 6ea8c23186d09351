//! Structural diffing between schema trees
//!
//! Keys are visited in lexicographic order at every level, starting with the
//! collection names, so the same pair of trees always yields the same entries
//! regardless of insertion order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::schema::{Schema, SchemaNode};

/// Kind of change at a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl ChangeKind {
    pub fn reversed(self) -> Self {
        match self {
            ChangeKind::Added => ChangeKind::Removed,
            ChangeKind::Removed => ChangeKind::Added,
            ChangeKind::Modified => ChangeKind::Modified,
        }
    }
}

/// A single difference between two trees
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiffEntry {
    /// Dot-separated path (collection first)
    pub path: String,
    pub kind: ChangeKind,
}

impl DiffEntry {
    /// The same change seen from the other side (added and removed swapped)
    pub fn reversed(&self) -> Self {
        Self {
            path: self.path.clone(),
            kind: self.kind.reversed(),
        }
    }
}

/// Counts per change kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

impl DiffSummary {
    pub fn of(entries: &[DiffEntry]) -> Self {
        let mut summary = Self::default();
        for entry in entries {
            match entry.kind {
                ChangeKind::Added => summary.added += 1,
                ChangeKind::Removed => summary.removed += 1,
                ChangeKind::Modified => summary.modified += 1,
            }
        }
        summary
    }

    pub fn is_empty(&self) -> bool {
        self.added + self.removed + self.modified == 0
    }
}

/// Compute the ordered list of differences from `before` to `after`
///
/// Leaves are compared as parsed [`TypeTag`](crate::schema::TypeTag)s, so
/// type aliases are already normalised: `"text"` and `"string"` are the same
/// type and a rename between them is not a modification.
pub fn diff(before: &Schema, after: &Schema) -> Vec<DiffEntry> {
    let mut entries = Vec::new();
    let keys = sorted_union(&before.collections, &after.collections);

    for name in keys {
        match (before.collections.get(name), after.collections.get(name)) {
            (Some(a), Some(b)) => diff_mappings(name, a, b, &mut entries),
            (None, Some(_)) => entries.push(entry(name, ChangeKind::Added)),
            (Some(_), None) => entries.push(entry(name, ChangeKind::Removed)),
            (None, None) => {}
        }
    }

    entries
}

fn diff_mappings(
    prefix: &str,
    before: &IndexMap<String, SchemaNode>,
    after: &IndexMap<String, SchemaNode>,
    entries: &mut Vec<DiffEntry>,
) {
    for key in sorted_union(before, after) {
        let path = format!("{}.{}", prefix, key);
        match (before.get(key), after.get(key)) {
            (Some(SchemaNode::Object(a)), Some(SchemaNode::Object(b))) => {
                diff_mappings(&path, a, b, entries)
            }
            (Some(a), Some(b)) if a != b => entries.push(entry(&path, ChangeKind::Modified)),
            (Some(_), Some(_)) => {}
            (None, Some(_)) => entries.push(entry(&path, ChangeKind::Added)),
            (Some(_), None) => entries.push(entry(&path, ChangeKind::Removed)),
            (None, None) => {}
        }
    }
}

fn sorted_union<'a, V>(
    a: &'a IndexMap<String, V>,
    b: &'a IndexMap<String, V>,
) -> BTreeSet<&'a str> {
    a.keys().chain(b.keys()).map(String::as_str).collect()
}

fn owned(set: BTreeSet<&str>) -> Vec<String> {
    set.into_iter().map(str::to_string).collect()
}

fn entry(path: &str, kind: ChangeKind) -> DiffEntry {
    DiffEntry {
        path: path.to_string(),
        kind,
    }
}

// =============================================================================
// Collection-level comparison
// =============================================================================

/// Field differences of a collection present in both schemas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionFieldDiff {
    pub collection: String,
    pub only_in_first: Vec<String>,
    pub only_in_second: Vec<String>,
    pub common: Vec<String>,
}

/// Side-by-side comparison of two schemas at collection granularity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionComparison {
    pub only_in_first: Vec<String>,
    pub only_in_second: Vec<String>,
    pub common: Vec<String>,
    /// Jaccard similarity of the collection name sets, in percent
    pub similarity_pct: f64,
    pub field_differences: Vec<CollectionFieldDiff>,
}

/// Compare the collection sets of two schemas and the top-level fields of
/// every collection they share
pub fn compare_collections(first: &Schema, second: &Schema) -> CollectionComparison {
    let a: BTreeSet<&str> = first.collections.keys().map(String::as_str).collect();
    let b: BTreeSet<&str> = second.collections.keys().map(String::as_str).collect();

    let common: BTreeSet<&str> = a.intersection(&b).copied().collect();
    let union = a.union(&b).count();

    let similarity_pct = if union == 0 {
        100.0
    } else {
        common.len() as f64 / union as f64 * 100.0
    };

    let mut field_differences = Vec::new();
    for name in &common {
        let fa: BTreeSet<&str> = first.collections[*name].keys().map(String::as_str).collect();
        let fb: BTreeSet<&str> = second.collections[*name].keys().map(String::as_str).collect();
        let diff = CollectionFieldDiff {
            collection: name.to_string(),
            only_in_first: owned(fa.difference(&fb).copied().collect()),
            only_in_second: owned(fb.difference(&fa).copied().collect()),
            common: owned(fa.intersection(&fb).copied().collect()),
        };
        if !diff.only_in_first.is_empty() || !diff.only_in_second.is_empty() {
            field_differences.push(diff);
        }
    }

    CollectionComparison {
        only_in_first: owned(a.difference(&b).copied().collect()),
        only_in_second: owned(b.difference(&a).copied().collect()),
        common: owned(common),
        similarity_pct,
        field_differences,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: serde_json::Value) -> Schema {
        Schema::from_json(&value).unwrap()
    }

    #[test]
    fn test_diff_identity_is_empty() {
        let s = schema(json!({"users": {"name": "string", "profile": {"bio": "string"}}}));
        assert!(diff(&s, &s).is_empty());
    }

    #[test]
    fn test_diff_ordering_is_lexicographic() {
        let before = schema(json!({"b": {"z": "string"}, "a": {"y": "string"}}));
        let after = schema(json!({"a": {"x": "string"}, "b": {"z": "number"}}));

        let entries = diff(&before, &after);
        let paths: Vec<(&str, ChangeKind)> =
            entries.iter().map(|e| (e.path.as_str(), e.kind)).collect();
        assert_eq!(
            paths,
            vec![
                ("a.x", ChangeKind::Added),
                ("a.y", ChangeKind::Removed),
                ("b.z", ChangeKind::Modified),
            ]
        );
    }

    #[test]
    fn test_type_aliases_are_not_modifications() {
        let before = schema(json!({"users": {"bio": "text", "age": "int", "zip": "string"}}));
        let after = schema(json!({"users": {"bio": "string", "age": "long", "zip": "number"}}));
        assert_eq!(
            diff(&before, &after),
            vec![DiffEntry { path: "users.zip".to_string(), kind: ChangeKind::Modified }]
        );
    }

    #[test]
    fn test_nested_objects_recurse() {
        let before = schema(json!({"u": {"p": {"a": "string", "b": "string"}}}));
        let after = schema(json!({"u": {"p": {"a": "string", "c": "string"}}}));
        let entries = diff(&before, &after);
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.path.starts_with("u.p.")));
    }

    #[test]
    fn test_array_contents_compare_deeply() {
        let before = schema(json!({"o": {"items": [{"qty": "number"}]}}));
        let after = schema(json!({"o": {"items": [{"qty": "string"}]}}));
        assert_eq!(
            diff(&before, &after),
            vec![DiffEntry { path: "o.items".to_string(), kind: ChangeKind::Modified }]
        );
    }

    #[test]
    fn test_object_to_scalar_is_modified() {
        let before = schema(json!({"o": {"addr": {"city": "string"}}}));
        let after = schema(json!({"o": {"addr": "string"}}));
        assert_eq!(diff(&before, &after)[0].kind, ChangeKind::Modified);
    }

    #[test]
    fn test_collection_comparison() {
        let a = schema(json!({"users": {"name": "string"}, "posts": {"title": "string"}}));
        let b = schema(json!({
            "users": {"name": "string", "email": "string"},
            "tags": {"label": "string"}
        }));
        let cmp = compare_collections(&a, &b);

        assert_eq!(cmp.only_in_first, vec!["posts"]);
        assert_eq!(cmp.only_in_second, vec!["tags"]);
        assert_eq!(cmp.common, vec!["users"]);
        assert!((cmp.similarity_pct - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(cmp.field_differences[0].only_in_second, vec!["email"]);
    }
}
