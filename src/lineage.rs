//! Version lineage resolution
//!
//! Documents only know their parent's id. Chains are resolved through a
//! [`SchemaStore`] lookup supplied by the caller; nothing here owns documents.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use walkdir::WalkDir;

use crate::diff::{diff, DiffEntry};
use crate::error::{AdvisorError, Result};
use crate::schema::{SchemaDocument, SchemaId};

/// Read-only lookup of schema documents by id
pub trait SchemaStore {
    fn get(&self, id: &SchemaId) -> Option<&SchemaDocument>;
}

impl SchemaStore for HashMap<SchemaId, SchemaDocument> {
    fn get(&self, id: &SchemaId) -> Option<&SchemaDocument> {
        HashMap::get(self, id)
    }
}

/// In-memory store, keyed by document id
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: BTreeMap<SchemaId, SchemaDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document, rejecting ones that break the version/parent invariant
    pub fn insert(&mut self, document: SchemaDocument) -> Result<()> {
        document.validate()?;
        self.documents.insert(document.id.clone(), document);
        Ok(())
    }

    /// Load every `*.json` schema document below `dir`
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut store = Self::new();

        for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().map_or(true, |e| e != "json") {
                continue;
            }

            let content = std::fs::read_to_string(path)?;
            let document: SchemaDocument = serde_json::from_str(&content)?;
            tracing::debug!(id = %document.id, file = %path.display(), "loaded schema document");
            store.insert(document)?;
        }

        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> impl Iterator<Item = &SchemaDocument> {
        self.documents.values()
    }
}

impl SchemaStore for MemoryStore {
    fn get(&self, id: &SchemaId) -> Option<&SchemaDocument> {
        self.documents.get(id)
    }
}

/// Walk the parent chain from `id`, newest first.
///
/// Fails when a document or parent is missing, when an id repeats, or when a
/// parent's version is not exactly one below its child's.
pub fn ancestry<'s, S: SchemaStore>(
    store: &'s S,
    id: &SchemaId,
) -> Result<Vec<&'s SchemaDocument>> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();

    let mut current = store
        .get(id)
        .ok_or_else(|| AdvisorError::NotFound { id: id.to_string() })?;

    loop {
        if !seen.insert(current.id.clone()) {
            return Err(AdvisorError::LineageBroken {
                id: current.id.to_string(),
                reason: "parent chain loops back on itself".to_string(),
            });
        }
        current.validate()?;
        chain.push(current);

        let Some(parent_id) = &current.parent_id else {
            break;
        };

        let parent = store.get(parent_id).ok_or_else(|| AdvisorError::LineageBroken {
            id: current.id.to_string(),
            reason: format!("parent {} is missing", parent_id),
        })?;

        if parent.version + 1 != current.version {
            return Err(AdvisorError::LineageBroken {
                id: current.id.to_string(),
                reason: format!(
                    "version {} follows parent version {}",
                    current.version, parent.version
                ),
            });
        }

        current = parent;
    }

    Ok(chain)
}

/// Diff a document against its parent; the first version diffs against nothing
pub fn diff_with_parent<S: SchemaStore>(store: &S, id: &SchemaId) -> Result<Vec<DiffEntry>> {
    let chain = ancestry(store, id)?;
    let current = chain[0];

    match chain.get(1) {
        Some(parent) => Ok(diff(&parent.schema, &current.schema)),
        None => Ok(diff(&Default::default(), &current.schema)),
    }
}

/// Diff two stored documents (`before` → `after`)
pub fn diff_versions<S: SchemaStore>(
    store: &S,
    before: &SchemaId,
    after: &SchemaId,
) -> Result<Vec<DiffEntry>> {
    let a = store
        .get(before)
        .ok_or_else(|| AdvisorError::NotFound { id: before.to_string() })?;
    let b = store
        .get(after)
        .ok_or_else(|| AdvisorError::NotFound { id: after.to_string() })?;
    Ok(diff(&a.schema, &b.schema))
}

/// Newest document of every lineage, ordered by root id
pub fn latest_per_lineage<'a>(
    documents: impl IntoIterator<Item = &'a SchemaDocument>,
) -> Vec<&'a SchemaDocument> {
    let mut latest: BTreeMap<&SchemaId, &SchemaDocument> = BTreeMap::new();

    for doc in documents {
        latest
            .entry(doc.root())
            .and_modify(|held| {
                if doc.version > held.version {
                    *held = doc;
                }
            })
            .or_insert(doc);
    }

    latest.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::ChangeKind;
    use crate::schema::Schema;
    use serde_json::json;

    fn schema(value: serde_json::Value) -> Schema {
        Schema::from_json(&value).unwrap()
    }

    fn lineage() -> MemoryStore {
        let v1 =
            SchemaDocument::initial("a1", "shop", schema(json!({"users": {"name": "string"}})));
        let with_email = schema(json!({"users": {"name": "string", "email": "string"}}));
        let v2 = v1.refine("a2", "add email", with_email);
        let v3 = v2.refine("a3", "drop name", schema(json!({"users": {"email": "string"}})));
        let other = SchemaDocument::initial("b1", "blog", Schema::new());

        let mut store = MemoryStore::new();
        for doc in [v1, v2, v3, other] {
            store.insert(doc).unwrap();
        }
        store
    }

    #[test]
    fn test_ancestry_newest_first() {
        let store = lineage();
        let chain = ancestry(&store, &SchemaId::from("a3")).unwrap();
        let versions: Vec<u32> = chain.iter().map(|d| d.version).collect();
        assert_eq!(versions, vec![3, 2, 1]);
    }

    #[test]
    fn test_diff_with_parent() {
        let store = lineage();
        let entries = diff_with_parent(&store, &SchemaId::from("a2")).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "users.email");
        assert_eq!(entries[0].kind, ChangeKind::Added);

        let first = diff_with_parent(&store, &SchemaId::from("a1")).unwrap();
        assert_eq!(first[0].kind, ChangeKind::Added);
    }

    #[test]
    fn test_missing_parent_is_reported() {
        let mut store = HashMap::new();
        let v1 = SchemaDocument::initial("x1", "x", Schema::new());
        let v2 = v1.refine("x2", "y", Schema::new());
        store.insert(v2.id.clone(), v2);

        assert!(matches!(
            ancestry(&store, &SchemaId::from("x2")),
            Err(AdvisorError::LineageBroken { .. })
        ));
        assert!(matches!(
            ancestry(&store, &SchemaId::from("nope")),
            Err(AdvisorError::NotFound { .. })
        ));
    }

    #[test]
    fn test_version_gap_is_reported() {
        let v1 = SchemaDocument::initial("g1", "x", Schema::new());
        let mut v3 = v1.refine("g3", "y", Schema::new());
        v3.version = 3;

        let mut store = HashMap::new();
        store.insert(v1.id.clone(), v1);
        store.insert(v3.id.clone(), v3);
        assert!(ancestry(&store, &SchemaId::from("g3")).is_err());
    }

    #[test]
    fn test_latest_per_lineage() {
        let store = lineage();
        let latest = latest_per_lineage(store.documents());
        let ids: Vec<&str> = latest.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a3", "b1"]);
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        let doc = SchemaDocument::initial("d1", "x", schema(json!({"users": {"name": "string"}})));
        std::fs::write(dir.path().join("d1.json"), serde_json::to_string(&doc).unwrap()).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let store = MemoryStore::load_dir(dir.path()).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get(&SchemaId::from("d1")).is_some());
    }
}
