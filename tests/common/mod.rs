#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow};

use standings_sync::football_json::FootballJson;
use standings_sync::http_cache::ResponseCache;
use standings_sync::http_client::HttpFetch;

pub const BASE_URL: &str = "https://football.test/json";

pub fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

/// Serves canned bodies by URL and records every request.
#[derive(Default)]
pub struct FakeFetch {
    bodies: HashMap<String, String>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeFetch {
    pub fn with_season(mut self, league: &str, season: &str, body: String) -> Self {
        self.bodies
            .insert(format!("{BASE_URL}/{season}/{league}.json"), body);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl HttpFetch for FakeFetch {
    fn get_text(&self, url: &str) -> Result<String> {
        self.calls.borrow_mut().push(url.to_string());
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("http 404 Not Found"))
    }
}

pub fn source(fetch: &FakeFetch) -> FootballJson<&FakeFetch> {
    FootballJson::new(
        fetch,
        BASE_URL,
        ResponseCache::in_memory(Duration::from_secs(3600)),
    )
}

pub fn premier_league() -> FakeFetch {
    FakeFetch::default().with_season("en.1", "2024-25", read_fixture("en.1.json"))
}
