use std::collections::BTreeSet;

use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::{LEAGUES, SEASONS};
use crate::http_cache::ResponseCache;
use crate::http_client::HttpFetch;
use crate::identity::fixture_external_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

/// One fixture as published upstream. Unplayed fixtures have no score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub home: String,
    pub away: String,
    pub date: String,
    pub time: Option<String>,
    pub score: Option<Score>,
    pub round: Option<String>,
}

impl Match {
    /// "Matchday 12" -> 12.
    pub fn round_number(&self) -> Option<u32> {
        let label = self.round.as_deref()?;
        label
            .split(|ch: char| !ch.is_ascii_digit())
            .find(|s| !s.is_empty())
            .and_then(|s| s.parse::<u32>().ok())
    }

    pub fn kickoff(&self) -> String {
        format!("{} {}", self.date, self.time.as_deref().unwrap_or("00:00"))
    }

    pub fn status(&self) -> &'static str {
        if self.score.is_some() { "FT" } else { "NS" }
    }

    pub fn external_id(&self) -> i64 {
        fixture_external_id(&self.date, &self.home, &self.away)
    }
}

/// Client for the openfootball `football.json` repository.
///
/// Season payloads are cached per (league, season). Failures are logged
/// and surface as `None`/empty, never as errors.
pub struct FootballJson<F> {
    fetcher: F,
    base_url: String,
    cache: ResponseCache,
}

impl<F: HttpFetch> FootballJson<F> {
    pub fn new(fetcher: F, base_url: impl Into<String>, cache: ResponseCache) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache,
        }
    }

    pub fn season_url(&self, league: &str, season: &str) -> String {
        format!("{}/{season}/{league}.json", self.base_url)
    }

    pub fn league_data(&mut self, league: &str, season: &str) -> Option<Value> {
        let key = cache_key(league, season);
        if let Some(value) = self
            .cache
            .get(&key)
            .and_then(|body| serde_json::from_str::<Value>(body).ok())
        {
            debug!(league, season, "football.json cache hit");
            return Some(value);
        }

        let url = self.season_url(league, season);
        let body = match self.fetcher.get_text(&url) {
            Ok(body) => body,
            Err(err) => {
                warn!(%url, error = %format!("{err:#}"), "failed to fetch football.json data");
                return None;
            }
        };
        let value = match serde_json::from_str::<Value>(body.trim()) {
            Ok(value) => value,
            Err(err) => {
                warn!(league, season, error = %err, "invalid football.json payload");
                return None;
            }
        };
        self.cache.put(&key, body);
        Some(value)
    }

    pub fn matches(&mut self, league: &str, season: &str) -> Vec<Match> {
        self.league_data(league, season)
            .map(|v| parse_matches(&v))
            .unwrap_or_default()
    }

    /// Every team appearing on either side, sorted.
    pub fn teams(&mut self, league: &str, season: &str) -> Vec<String> {
        team_names(&self.matches(league, season))
    }

    pub fn clear_cache(&mut self, league: &str, season: &str) -> bool {
        self.cache.remove(&cache_key(league, season))
    }

    pub fn clear_all_cache(&mut self) -> usize {
        let mut removed = 0;
        for league in LEAGUES {
            for season in SEASONS {
                if self.clear_cache(league.code, season) {
                    removed += 1;
                }
            }
        }
        removed
    }
}

pub fn cache_key(league: &str, season: &str) -> String {
    format!("football_json_{league}_{season}")
}

pub fn team_names(matches: &[Match]) -> Vec<String> {
    let names: BTreeSet<&str> = matches
        .iter()
        .flat_map(|m| [m.home.as_str(), m.away.as_str()])
        .collect();
    names.into_iter().map(str::to_string).collect()
}

pub fn parse_matches_json(raw: &str) -> anyhow::Result<Vec<Match>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let v: Value = serde_json::from_str(trimmed)?;
    Ok(parse_matches(&v))
}

pub fn parse_matches(v: &Value) -> Vec<Match> {
    let Some(arr) = v.get("matches").and_then(|x| x.as_array()) else {
        return Vec::new();
    };
    arr.iter().filter_map(parse_match).collect()
}

fn parse_match(v: &Value) -> Option<Match> {
    let home = non_empty_str(v.get("team1"))?;
    let away = non_empty_str(v.get("team2"))?;
    let date = v
        .get("date")
        .and_then(|x| x.as_str())
        .unwrap_or_default()
        .to_string();
    let time = non_empty_str(v.get("time"));
    let round = non_empty_str(v.get("round"));
    let score = v.get("score").and_then(|s| s.get("ft")).and_then(parse_score);

    Some(Match {
        home,
        away,
        date,
        time,
        score,
        round,
    })
}

/// Goal counts beyond `u16` are treated as corrupt and leave the match unscored.
fn parse_score(ft: &Value) -> Option<Score> {
    let arr = ft.as_array()?;
    let home = u16::try_from(arr.first()?.as_u64()?).ok()?;
    let away = u16::try_from(arr.get(1)?.as_u64()?).ok()?;
    Some(Score {
        home: home.into(),
        away: away.into(),
    })
}

fn non_empty_str(v: Option<&Value>) -> Option<String> {
    let s = v?.as_str()?.trim();
    if s.is_empty() {
        return None;
    }
    Some(s.to_string())
}
