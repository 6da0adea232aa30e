use crate::schema::NormalizeReport;
use crate::types::MovieRecord;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Identity of a byte source: the hex SHA-256 of its contents. Two paths
/// with identical bytes share one key; an edited file gets a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceKey(String);

impl SourceKey {
    pub fn of(bytes: &[u8]) -> Self {
        SourceKey(hex::encode(Sha256::digest(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct CachedLoad {
    pub records: Vec<MovieRecord>,
    pub report: NormalizeReport,
}

/// Caller-owned read-through cache over the load+normalize+enrich stages.
/// There is no process-wide instance and no invalidation beyond the key
/// itself changing; the owner decides its lifetime. Purely an
/// optimization: the pipeline works identically without one.
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: HashMap<SourceKey, CachedLoad>,
}

impl LoadCache {
    pub fn new() -> Self {
        LoadCache::default()
    }

    pub fn get(&self, key: &SourceKey) -> Option<&CachedLoad> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: SourceKey, load: CachedLoad) {
        self.entries.insert(key, load);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_tracks_content_identity() {
        let a = SourceKey::of(b"title,studio\n");
        let b = SourceKey::of(b"title,studio\n");
        let c = SourceKey::of(b"title,studio\nJoker,DC\n");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn insert_then_get_roundtrips() {
        let mut cache = LoadCache::new();
        let key = SourceKey::of(b"abc");
        assert!(cache.get(&key).is_none());
        cache.insert(
            key.clone(),
            CachedLoad {
                records: vec![],
                report: NormalizeReport {
                    total_rows: 0,
                    kept_rows: 0,
                    dropped_empty_title: 0,
                },
            },
        );
        assert!(cache.get(&key).is_some());
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
