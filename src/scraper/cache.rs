//! File-based page cache with per-vertical TTLs.
//!
//! Crawls are frequently re-run while tuning selectors; caching the fetched
//! documents keeps re-runs off the portal entirely.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Serialize, Deserialize)]
struct CacheEntry<T> {
    data: T,
    fetched_at: DateTime<Utc>,
}

/// Cache buckets, one per vertical. Search result pages churn faster than
/// shopping listings, so TTLs differ.
#[derive(Debug, Clone, Copy)]
pub enum CacheCategory {
    Search,
    Shopping,
    News,
}

impl CacheCategory {
    pub fn ttl(&self) -> Duration {
        match self {
            CacheCategory::Search => Duration::hours(6),
            CacheCategory::Shopping => Duration::hours(12),
            CacheCategory::News => Duration::hours(1),
        }
    }

    pub fn dir_name(&self) -> &str {
        match self {
            CacheCategory::Search => "search",
            CacheCategory::Shopping => "shopping",
            CacheCategory::News => "news",
        }
    }
}

/// File cache rooted at a base directory.
pub struct PageCache {
    base_dir: PathBuf,
}

impl PageCache {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn entry_path(&self, category: CacheCategory, key: &str) -> PathBuf {
        self.base_dir
            .join(category.dir_name())
            .join(format!("{}.json", sanitize_key(key)))
    }

    /// Read a cached value if present and not expired. Expired entries are
    /// removed on the way out.
    pub fn get<T: DeserializeOwned>(&self, category: CacheCategory, key: &str) -> Option<T> {
        let path = self.entry_path(category, key);
        let content = std::fs::read_to_string(&path).ok()?;
        let entry: CacheEntry<T> = serde_json::from_str(&content).ok()?;

        if Utc::now() - entry.fetched_at > category.ttl() {
            let _ = std::fs::remove_file(&path);
            return None;
        }

        Some(entry.data)
    }

    /// Write a value under `key`.
    pub fn set<T: Serialize>(&self, category: CacheCategory, key: &str, data: &T) -> Result<()> {
        let path = self.entry_path(category, key);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let entry = CacheEntry {
            data,
            fetched_at: Utc::now(),
        };
        std::fs::write(&path, serde_json::to_string(&entry)?)?;

        Ok(())
    }

    /// Drop every entry in a category.
    #[allow(dead_code)]
    pub fn clear(&self, category: CacheCategory) -> Result<()> {
        let dir = self.base_dir.join(category.dir_name());
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }
}

/// Make a query/page identifier filesystem-safe. Hangul is kept as-is;
/// separators and punctuation collapse to underscores.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_roundtrip() {
        let dir = TempDir::new().unwrap();
        let cache = PageCache::new(dir.path().to_path_buf());

        cache
            .set(CacheCategory::Search, "노트북_p1", &"<html>body</html>".to_string())
            .unwrap();
        let got: Option<String> = cache.get(CacheCategory::Search, "노트북_p1");
        assert_eq!(got.as_deref(), Some("<html>body</html>"));
    }

    #[test]
    fn test_miss_on_absent_key() {
        let dir = TempDir::new().unwrap();
        let cache = PageCache::new(dir.path().to_path_buf());

        let got: Option<String> = cache.get(CacheCategory::News, "missing");
        assert!(got.is_none());
    }

    #[test]
    fn test_categories_are_isolated() {
        let dir = TempDir::new().unwrap();
        let cache = PageCache::new(dir.path().to_path_buf());

        cache.set(CacheCategory::Search, "k", &1u32).unwrap();
        let other: Option<u32> = cache.get(CacheCategory::Shopping, "k");
        assert!(other.is_none());
    }

    #[test]
    fn test_clear_category() {
        let dir = TempDir::new().unwrap();
        let cache = PageCache::new(dir.path().to_path_buf());

        cache.set(CacheCategory::News, "k", &"v".to_string()).unwrap();
        cache.clear(CacheCategory::News).unwrap();
        let got: Option<String> = cache.get(CacheCategory::News, "k");
        assert!(got.is_none());
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("무선 이어폰/p.1"), "무선_이어폰_p_1");
        assert_eq!(sanitize_key("plain-key_ok"), "plain-key_ok");
    }
}
