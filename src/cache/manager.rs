//! Cache manager for persisting API responses to disk
//!
//! Provides a `CacheManager` that stores serializable data to JSON files,
//! each stamped with its write time. Staleness is decided at read time
//! against a caller-supplied maximum age, so a missing entry and a stale
//! entry look the same to the caller. Writes are best-effort: cache I/O
//! failures are logged and swallowed rather than aborting the caller.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// When the data was cached (ISO-8601)
    timestamp: DateTime<Utc>,
    /// The cached data
    data: T,
}

/// Manages reading and writing cached data to disk
///
/// The cache manager stores data as JSON files in an XDG-compliant cache
/// directory (`~/.cache/gigscout/` on Linux). Filenames are derived from the
/// cache key with path separators replaced, so keys containing URLs stay
/// flat on disk.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a new CacheManager using an XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no
    /// home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "gigscout")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheManager with a custom cache directory
    ///
    /// Useful for testing or when a specific cache location is configured.
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Returns the path to the cache file for the given key
    ///
    /// Path separators in the key are replaced so URL-derived keys cannot
    /// escape the cache directory.
    fn entry_path(&self, key: &str) -> PathBuf {
        let safe_key = key.replace(['/', '\\'], "_");
        self.cache_dir.join(format!("{}.json", safe_key))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Reads data from the cache if present and no older than `max_age`
    ///
    /// # Arguments
    /// * `key` - The cache key to read
    /// * `max_age` - Maximum acceptable age of the entry; zero disables the
    ///   staleness check entirely
    ///
    /// # Returns
    /// * `Some(T)` if a fresh entry exists and parses
    /// * `None` for a missing, unparseable, or stale entry
    pub fn get<T: DeserializeOwned>(&self, key: &str, max_age: Duration) -> Option<T> {
        let path = self.entry_path(key);
        let content = fs::read_to_string(path).ok()?;
        let entry: CacheEntry<T> = serde_json::from_str(&content).ok()?;

        if max_age > Duration::zero() && Utc::now() - entry.timestamp > max_age {
            return None;
        }

        Some(entry.data)
    }

    /// Stores data in the cache, stamping it with the current time
    ///
    /// Unconditionally overwrites any existing entry for `key`. Failures are
    /// logged and swallowed: the cache degrades to "always miss" rather than
    /// aborting the caller's primary operation.
    pub fn set<T: Serialize>(&self, key: &str, data: &T) {
        if let Err(e) = self.try_set(key, data) {
            warn!(key, error = %e, "cache write failed");
        }
    }

    fn try_set<T: Serialize>(&self, key: &str, data: &T) -> std::io::Result<()> {
        self.ensure_dir()?;

        let entry = CacheEntry {
            timestamp: Utc::now(),
            data,
        };
        let json = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(self.entry_path(key), json)
    }

    /// Removes one entry if present; no-op if absent
    pub fn invalidate(&self, key: &str) {
        let path = self.entry_path(key);
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(key, error = %e, "cache invalidation failed");
            }
        }
    }

    /// Removes all entries from the cache directory
    pub fn clear(&self) {
        let entries = match fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(error = %e, "cache clear failed");
                }
                return;
            }
        };

        for entry in entries.flatten() {
            if let Err(e) = fs::remove_file(entry.path()) {
                warn!(path = %entry.path().display(), error = %e, "cache clear failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::{json, Value};
    use std::thread;
    use std::time::Duration as StdDuration;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn create_test_cache() -> (CacheManager, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheManager::with_dir(temp_dir.path().to_path_buf());
        (cache, temp_dir)
    }

    #[test]
    fn test_set_creates_file_in_cache_directory() {
        let (cache, temp_dir) = create_test_cache();
        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };

        cache.set("test_key", &data);

        let expected_path = temp_dir.path().join("test_key.json");
        assert!(expected_path.exists(), "Cache file should exist");

        // File shape is { "timestamp": ..., "data": ... }
        let content = fs::read_to_string(&expected_path).expect("Should read file");
        let parsed: Value = serde_json::from_str(&content).expect("Should be valid JSON");
        assert!(parsed.get("timestamp").is_some());
        assert_eq!(parsed["data"]["name"], "test");
        assert_eq!(parsed["data"]["value"], 42);
    }

    #[test]
    fn test_get_returns_none_for_missing_key() {
        let (cache, _temp_dir) = create_test_cache();

        let result: Option<TestData> = cache.get("nonexistent_key", Duration::hours(1));

        assert!(result.is_none(), "Should return None for missing key");
    }

    #[test]
    fn test_set_then_get_returns_data_while_fresh() {
        let (cache, _temp_dir) = create_test_cache();
        let data = TestData {
            name: "fresh".to_string(),
            value: 100,
        };

        cache.set("fresh_key", &data);

        let result: Option<TestData> = cache.get("fresh_key", Duration::hours(1));
        assert_eq!(result, Some(data));
    }

    #[test]
    fn test_get_with_zero_max_age_immediately_after_set_hits() {
        let (cache, _temp_dir) = create_test_cache();
        let data = json!({"title": "X"});

        cache.set("zero_age", &data);

        // max_age = 0 still admits an entry written "now"
        let result: Option<Value> = cache.get("zero_age", Duration::zero());
        assert_eq!(result, Some(data));
    }

    #[test]
    fn test_zero_max_age_disables_staleness_check() {
        let (cache, _temp_dir) = create_test_cache();
        let data = json!({"title": "old but wanted"});

        cache.set("ageless", &data);
        thread::sleep(StdDuration::from_millis(30));

        // A zero max_age means "no staleness check", not "nothing is fresh"
        let result: Option<Value> = cache.get("ageless", Duration::zero());
        assert_eq!(result, Some(data));
    }

    #[test]
    fn test_get_misses_once_entry_is_older_than_max_age() {
        let (cache, _temp_dir) = create_test_cache();
        let data = TestData {
            name: "stale".to_string(),
            value: 0,
        };

        cache.set("stale_key", &data);
        thread::sleep(StdDuration::from_millis(30));

        let result: Option<TestData> = cache.get("stale_key", Duration::milliseconds(10));
        assert!(result.is_none(), "Stale entry should be a miss");
    }

    #[test]
    fn test_stale_and_missing_are_indistinguishable() {
        let (cache, _temp_dir) = create_test_cache();
        cache.set("was_set", &json!(1));
        thread::sleep(StdDuration::from_millis(30));

        let stale: Option<Value> = cache.get("was_set", Duration::milliseconds(10));
        let missing: Option<Value> = cache.get("never_set", Duration::milliseconds(10));

        assert_eq!(stale, missing);
    }

    #[test]
    fn test_set_overwrites_existing_entry() {
        let (cache, _temp_dir) = create_test_cache();
        let data1 = TestData {
            name: "first".to_string(),
            value: 1,
        };
        let data2 = TestData {
            name: "second".to_string(),
            value: 2,
        };

        cache.set("overwrite_key", &data1);
        cache.set("overwrite_key", &data2);

        let result: Option<TestData> = cache.get("overwrite_key", Duration::hours(1));
        assert_eq!(result, Some(data2), "Cache should contain latest data");
    }

    #[test]
    fn test_invalidate_removes_entry() {
        let (cache, _temp_dir) = create_test_cache();
        cache.set("doomed", &json!({"a": 1}));

        cache.invalidate("doomed");

        let result: Option<Value> = cache.get("doomed", Duration::hours(1));
        assert!(result.is_none());
    }

    #[test]
    fn test_invalidate_absent_key_is_noop() {
        let (cache, _temp_dir) = create_test_cache();
        // Must not panic or create anything
        cache.invalidate("never_existed");
    }

    #[test]
    fn test_clear_removes_all_entries() {
        let (cache, _temp_dir) = create_test_cache();
        cache.set("one", &json!(1));
        cache.set("two", &json!(2));

        cache.clear();

        assert!(cache.get::<Value>("one", Duration::hours(1)).is_none());
        assert!(cache.get::<Value>("two", Duration::hours(1)).is_none());
    }

    #[test]
    fn test_clear_on_missing_directory_is_noop() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheManager::with_dir(temp_dir.path().join("never_created"));
        cache.clear();
    }

    #[test]
    fn test_url_derived_keys_stay_flat_on_disk() {
        let (cache, temp_dir) = create_test_cache();
        let key = "page_data_https://example.com/gigs/logo";

        cache.set(key, &json!({"html": "<html/>"}));

        // Exactly one file, directly under the cache dir
        let entries: Vec<_> = fs::read_dir(temp_dir.path())
            .expect("Should read cache dir")
            .flatten()
            .collect();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].path().is_file());

        let result: Option<Value> = cache.get(key, Duration::hours(1));
        assert!(result.is_some(), "Sanitized key should round-trip");
    }

    #[test]
    fn test_set_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("cache").join("dir");
        let cache = CacheManager::with_dir(nested_path.clone());

        cache.set("nested_key", &json!({"ok": true}));

        assert!(nested_path.exists(), "Nested directory should be created");
        assert!(nested_path.join("nested_key.json").exists());
    }

    #[test]
    fn test_unparseable_entry_is_a_miss() {
        let (cache, temp_dir) = create_test_cache();
        fs::create_dir_all(temp_dir.path()).expect("Should create dir");
        fs::write(temp_dir.path().join("garbage.json"), "not json").expect("Should write");

        let result: Option<Value> = cache.get("garbage", Duration::hours(1));
        assert!(result.is_none());
    }

    #[test]
    fn test_arbitrary_json_payloads_round_trip() {
        let (cache, _temp_dir) = create_test_cache();
        let payloads = [
            json!(null),
            json!(3.25),
            json!("plain string"),
            json!([1, 2, 3]),
            json!({"nested": {"deep": [true, false]}}),
        ];

        for (i, payload) in payloads.iter().enumerate() {
            let key = format!("payload_{}", i);
            cache.set(&key, payload);
            let result: Option<Value> = cache.get(&key, Duration::hours(1));
            assert_eq!(result.as_ref(), Some(payload));
        }
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(cache) = CacheManager::new() {
            let path_str = cache.cache_dir.to_string_lossy();
            assert!(
                path_str.contains("gigscout"),
                "Cache path should contain project name"
            );
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }
}
