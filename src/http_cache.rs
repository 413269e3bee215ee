use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct HttpCacheFile {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    body: String,
    fetched_at: u64,
}

/// TTL cache of response bodies keyed by an arbitrary string.
///
/// With a path the cache survives the process: it is loaded once on
/// construction and rewritten (temp file + rename) after every change.
#[derive(Debug)]
pub struct ResponseCache {
    path: Option<PathBuf>,
    ttl: Duration,
    file: HttpCacheFile,
}

impl ResponseCache {
    pub fn in_memory(ttl: Duration) -> Self {
        Self {
            path: None,
            ttl,
            file: HttpCacheFile {
                version: CACHE_VERSION,
                entries: HashMap::new(),
            },
        }
    }

    pub fn persistent(path: PathBuf, ttl: Duration) -> Self {
        let file = load_cache_file(&path);
        debug!(path = %path.display(), entries = file.entries.len(), "loaded http cache");
        Self {
            path: Some(path),
            ttl,
            file,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_at(key, SystemTime::now())
    }

    pub fn get_at(&self, key: &str, now: SystemTime) -> Option<&str> {
        let entry = self.file.entries.get(key)?;
        let now = system_time_to_secs(now)?;
        let age = now.saturating_sub(entry.fetched_at);
        if age >= self.ttl.as_secs() {
            return None;
        }
        Some(entry.body.as_str())
    }

    pub fn put(&mut self, key: &str, body: String) {
        self.put_at(key, body, SystemTime::now());
    }

    pub fn put_at(&mut self, key: &str, body: String, now: SystemTime) {
        let entry = CacheEntry {
            body,
            fetched_at: system_time_to_secs(now).unwrap_or_default(),
        };
        self.file.version = CACHE_VERSION;
        self.file.entries.insert(key.to_string(), entry);
        self.persist();
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.file.entries.remove(key).is_some();
        if removed {
            self.persist();
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.file.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file.entries.is_empty()
    }

    fn persist(&self) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        if let Err(err) = save_cache_file(path, &self.file) {
            warn!(path = %path.display(), error = %err, "failed to write http cache");
        }
    }
}

fn load_cache_file(path: &Path) -> HttpCacheFile {
    let Ok(raw) = fs::read_to_string(path) else {
        return HttpCacheFile::default();
    };
    let cache = serde_json::from_str::<HttpCacheFile>(&raw).unwrap_or_default();
    if cache.version != CACHE_VERSION {
        return HttpCacheFile::default();
    }
    cache
}

fn save_cache_file(path: &Path, cache: &HttpCacheFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok();
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(cache).context("serialize http cache")?;
    fs::write(&tmp, json).context("write http cache")?;
    fs::rename(&tmp, path).context("swap http cache")?;
    Ok(())
}

fn system_time_to_secs(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}
