//! Runtime settings.
//!
//! Loaded from the process environment after `.env.local` and `.env` have
//! been merged in.

use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::DEFAULT_SEASON;

pub const APP_DIR: &str = "standings_sync";
pub const DEFAULT_BASE_URL: &str =
    "https://raw.githubusercontent.com/openfootball/football.json/master";

#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub db_path: Option<PathBuf>,
    pub cache_ttl: Duration,
    pub persist_http_cache: bool,
    pub http_timeout: Duration,
    pub default_season: String,

    pub log_level: String,
    pub log_json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            db_path: default_db_path(),
            cache_ttl: Duration::from_secs(3600),
            persist_http_cache: true,
            http_timeout: Duration::from_secs(30),
            default_season: DEFAULT_SEASON.to_string(),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup; unset keys keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            base_url: env_str(&lookup, "FOOTBALL_JSON_BASE_URL", &defaults.base_url)
                .trim_end_matches('/')
                .to_string(),
            db_path: env_path(&lookup, "STANDINGS_DB").or(defaults.db_path),
            cache_ttl: Duration::from_secs(env_u64(&lookup, "CACHE_TTL_SECS", 3600)),
            persist_http_cache: env_bool(&lookup, "PERSIST_HTTP_CACHE", defaults.persist_http_cache),
            http_timeout: Duration::from_secs(env_u64(&lookup, "HTTP_TIMEOUT_SECS", 30).max(1)),
            default_season: env_str(&lookup, "DEFAULT_SEASON", &defaults.default_season),
            log_level: env_str(&lookup, "LOG_LEVEL", &defaults.log_level),
            log_json: env_bool(&lookup, "LOG_JSON", defaults.log_json),
        }
    }

    pub fn http_cache_path(&self) -> Option<PathBuf> {
        if !self.persist_http_cache {
            return None;
        }
        app_cache_dir().map(|dir| dir.join("http_cache.json"))
    }
}

/// `$XDG_CACHE_HOME/standings_sync`, falling back to `~/.cache/standings_sync`.
pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(APP_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join("standings.sqlite"))
}

fn env_str(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    lookup(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

fn env_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_path(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<PathBuf> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn unset_keys_keep_defaults() {
        let s = settings(&[]);
        assert_eq!(s.base_url, DEFAULT_BASE_URL);
        assert_eq!(s.cache_ttl, Duration::from_secs(3600));
        assert_eq!(s.http_timeout, Duration::from_secs(30));
        assert_eq!(s.default_season, DEFAULT_SEASON);
        assert!(s.persist_http_cache);
        assert!(!s.log_json);
    }

    #[test]
    fn persist_flag_zero_disables_disk_cache() {
        let s = settings(&[("PERSIST_HTTP_CACHE", "0")]);
        assert!(!s.persist_http_cache);
        assert_eq!(s.http_cache_path(), None);

        let s = settings(&[("PERSIST_HTTP_CACHE", " Yes ")]);
        assert!(s.persist_http_cache);
    }

    #[test]
    fn numbers_fall_back_when_unparseable() {
        let s = settings(&[("CACHE_TTL_SECS", "soon"), ("HTTP_TIMEOUT_SECS", "0")]);
        assert_eq!(s.cache_ttl, Duration::from_secs(3600));
        assert_eq!(s.http_timeout, Duration::from_secs(1));

        let s = settings(&[("CACHE_TTL_SECS", " 60 ")]);
        assert_eq!(s.cache_ttl, Duration::from_secs(60));
    }

    #[test]
    fn strings_and_paths_are_trimmed() {
        let s = settings(&[
            ("FOOTBALL_JSON_BASE_URL", "https://mirror.test/json/"),
            ("STANDINGS_DB", " /tmp/standings.sqlite "),
            ("DEFAULT_SEASON", "   "),
            ("LOG_JSON", "true"),
        ]);
        assert_eq!(s.base_url, "https://mirror.test/json");
        assert_eq!(s.db_path, Some(PathBuf::from("/tmp/standings.sqlite")));
        assert_eq!(s.default_season, DEFAULT_SEASON);
        assert!(s.log_json);
    }
}
