// src/mapping/lookup.rs
//! Source to destination ID lookups owned by the host.

use crate::error::AppError;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Resolves a source page ID to the ID it was imported as.
///
/// `migration_key` names the migration that did the import.
pub trait DestinationLookup {
    fn lookup(&self, migration_key: &str, source_id: &str) -> Option<String>;
}

/// An in-process ID map, filled by whoever imported the records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdMap {
    entries: HashMap<String, HashMap<String, String>>,
}

impl InMemoryIdMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        migration_key: impl Into<String>,
        source_id: impl Into<String>,
        destination_id: impl Into<String>,
    ) {
        self.entries
            .entry(migration_key.into())
            .or_default()
            .insert(source_id.into(), destination_id.into());
    }

    /// Reads an exported ID map: `{"<migration>": {"<source id>": <destination id>}}`.
    /// Destination IDs may be strings or numbers; other values are ignored.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)?;
        let raw: HashMap<String, HashMap<String, Value>> = serde_json::from_str(&content)
            .map_err(|source| AppError::JsonParseError {
                path: path.to_path_buf(),
                source,
            })?;

        let mut map = Self::new();
        for (migration, ids) in raw {
            for (source_id, destination) in ids {
                match destination {
                    Value::String(id) => map.insert(migration.as_str(), source_id, id),
                    Value::Number(id) => map.insert(migration.as_str(), source_id, id.to_string()),
                    other => log::warn!(
                        "Ignoring destination {} for {} in {}",
                        other,
                        source_id,
                        migration
                    ),
                }
            }
        }
        Ok(map)
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DestinationLookup for InMemoryIdMap {
    fn lookup(&self, migration_key: &str, source_id: &str) -> Option<String> {
        self.entries.get(migration_key)?.get(source_id).cloned()
    }
}

/// Memoises hits of a slower lookup. Misses are asked again every time,
/// since the record may have been imported in the meantime.
pub struct CachedLookup<L> {
    inner: L,
    hits: Mutex<HashMap<(String, String), String>>,
}

impl<L: DestinationLookup> CachedLookup<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            hits: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<L: DestinationLookup> DestinationLookup for CachedLookup<L> {
    fn lookup(&self, migration_key: &str, source_id: &str) -> Option<String> {
        let key = (migration_key.to_string(), source_id.to_string());
        if let Some(hit) = self.hits.lock().get(&key) {
            return Some(hit.clone());
        }
        let found = self.inner.lookup(migration_key, source_id)?;
        self.hits.lock().insert(key, found.clone());
        Some(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counting {
        map: InMemoryIdMap,
        calls: Cell<usize>,
    }

    impl DestinationLookup for Counting {
        fn lookup(&self, migration_key: &str, source_id: &str) -> Option<String> {
            self.calls.set(self.calls.get() + 1);
            self.map.lookup(migration_key, source_id)
        }
    }

    #[test]
    fn in_memory_map_is_scoped_by_migration() {
        let mut map = InMemoryIdMap::new();
        map.insert("site_article", "5", "42");
        assert_eq!(map.lookup("site_article", "5").as_deref(), Some("42"));
        assert_eq!(map.lookup("site_page", "5"), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn loads_exported_maps_with_numeric_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.json");
        std::fs::write(
            &path,
            r#"{"site_article": {"5": 42, "6": "43", "7": null}, "site_menu": {"5": "301"}}"#,
        )
        .unwrap();

        let map = InMemoryIdMap::load(&path).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.lookup("site_article", "5").as_deref(), Some("42"));
        assert_eq!(map.lookup("site_article", "7"), None);
        assert_eq!(map.lookup("site_menu", "5").as_deref(), Some("301"));
    }

    #[test]
    fn cached_lookup_remembers_hits_only() {
        let mut map = InMemoryIdMap::new();
        map.insert("m", "1", "100");
        let cached = CachedLookup::new(Counting {
            map,
            calls: Cell::new(0),
        });

        assert_eq!(cached.lookup("m", "1").as_deref(), Some("100"));
        assert_eq!(cached.lookup("m", "1").as_deref(), Some("100"));
        assert_eq!(cached.inner().calls.get(), 1);

        assert_eq!(cached.lookup("m", "2"), None);
        assert_eq!(cached.lookup("m", "2"), None);
        assert_eq!(cached.inner().calls.get(), 3);
    }
}
