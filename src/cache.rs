use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::persist::store::write_atomic;

/// On-disk cache of raw Skinport payloads, one JSON file per key.
/// Entries older than `ttl` are treated as absent and deleted on read.
pub struct PayloadCache {
    dir: PathBuf,
    ttl: Duration,
}

impl PayloadCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self { dir: dir.into(), ttl }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }

    /// Returns the cached payload if present, parseable and younger than the TTL.
    pub fn load(&self, key: &str) -> Option<Vec<Value>> {
        let path = self.path_for(key);
        let age = age_of(&path)?;
        if age > self.ttl {
            debug!(key, age_secs = age.as_secs(), "cache entry expired");
            remove_quietly(&path);
            return None;
        }

        let text = match std::fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) => {
                warn!("Cache read failed for {}: {e}", path.display());
                return None;
            }
        };
        match serde_json::from_str::<Vec<Value>>(&text) {
            Ok(payload) => {
                debug!(key, entries = payload.len(), "cache hit");
                Some(payload)
            }
            Err(e) => {
                warn!("Cache entry {} is corrupt, deleting: {e}", path.display());
                remove_quietly(&path);
                None
            }
        }
    }

    pub fn store(&self, key: &str, payload: &[Value]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let bytes = serde_json::to_vec(payload)?;
        write_atomic(&self.path_for(key), &bytes)
    }

    /// Deletes every expired entry. Returns how many files were removed.
    pub fn purge_expired(&self) -> usize {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return 0;
        };
        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if age_of(&path).is_some_and(|age| age > self.ttl) {
                remove_quietly(&path);
                removed += 1;
            }
        }
        removed
    }
}

fn age_of(path: &Path) -> Option<Duration> {
    let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(SystemTime::now().duration_since(modified).unwrap_or_default())
}

fn remove_quietly(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        debug!("Could not remove {}: {e}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stored_payload_is_loaded_back() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PayloadCache::new(dir.path(), Duration::from_secs(60));
        let payload = vec![json!({"market_hash_name": "AK-47 | Redline", "min_price": 12.5})];

        cache.store("items/730/USD", &payload).unwrap();
        assert_eq!(cache.load("items/730/USD"), Some(payload));
    }

    #[test]
    fn missing_key_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PayloadCache::new(dir.path(), Duration::from_secs(60));
        assert!(cache.load("sales_history").is_none());
    }

    #[test]
    fn zero_ttl_expires_and_deletes_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PayloadCache::new(dir.path(), Duration::ZERO);
        cache.store("items", &[json!({})]).unwrap();
        std::thread::sleep(Duration::from_millis(20));

        assert!(cache.load("items").is_none());
        assert!(!cache.path_for("items").exists());
    }

    #[test]
    fn corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PayloadCache::new(dir.path(), Duration::from_secs(60));
        std::fs::write(cache.path_for("items"), b"{not json").unwrap();

        assert!(cache.load("items").is_none());
        assert!(!cache.path_for("items").exists());
    }

    #[test]
    fn purge_removes_only_expired_json() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PayloadCache::new(dir.path(), Duration::ZERO);
        cache.store("a", &[json!(1)]).unwrap();
        cache.store("b", &[json!(2)]).unwrap();
        std::fs::write(dir.path().join("keep.txt"), b"x").unwrap();
        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(cache.purge_expired(), 2);
        assert!(dir.path().join("keep.txt").exists());
    }
}
