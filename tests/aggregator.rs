mod common;

use std::time::Duration;

use common::{BASE_URL, FakeFetch, premier_league, read_fixture, source};
use standings_sync::football_json::{FootballJson, cache_key, parse_matches_json};
use standings_sync::http_cache::ResponseCache;

#[test]
fn repeated_calls_hit_the_network_once() {
    let fetch = premier_league();
    let mut football = source(&fetch);

    let first = football.matches("en.1", "2024-25");
    let second = football.matches("en.1", "2024-25");

    assert_eq!(first.len(), 6);
    assert_eq!(first, second);
    assert_eq!(fetch.call_count(), 1);
    assert_eq!(
        fetch.calls.borrow()[0],
        format!("{BASE_URL}/2024-25/en.1.json")
    );
}

#[test]
fn cache_is_keyed_by_league_and_season() {
    let fetch = premier_league().with_season("en.1", "2023-24", read_fixture("en.1.json"));
    let mut football = source(&fetch);

    football.matches("en.1", "2024-25");
    football.matches("en.1", "2023-24");
    football.matches("en.1", "2024-25");
    assert_eq!(fetch.call_count(), 2);
}

#[test]
fn fetch_failure_is_empty_and_not_cached() {
    let fetch = FakeFetch::default();
    let mut football = source(&fetch);

    assert!(football.league_data("es.1", "2024-25").is_none());
    assert!(football.matches("es.1", "2024-25").is_empty());
    assert!(football.teams("es.1", "2024-25").is_empty());
    assert_eq!(fetch.call_count(), 3);
}

#[test]
fn undecodable_body_is_no_data() {
    let fetch = FakeFetch::default().with_season("fr.1", "2024-25", "<html>oops</html>".to_string());
    let mut football = source(&fetch);
    assert!(football.matches("fr.1", "2024-25").is_empty());
}

#[test]
fn teams_are_distinct_and_sorted() {
    let fetch = premier_league();
    let mut football = source(&fetch);
    let teams = football.teams("en.1", "2024-25");
    assert_eq!(
        teams,
        ["Arsenal FC", "Chelsea FC", "Everton FC", "Liverpool FC"]
    );
}

#[test]
fn clearing_the_cache_forces_a_refetch() {
    let fetch = premier_league();
    let mut football = source(&fetch);

    football.matches("en.1", "2024-25");
    assert!(football.clear_cache("en.1", "2024-25"));
    assert!(!football.clear_cache("en.1", "2024-25"));
    football.matches("en.1", "2024-25");
    assert_eq!(fetch.call_count(), 2);

    assert_eq!(football.clear_all_cache(), 1);
}

#[test]
fn expired_entries_are_refetched() {
    let fetch = premier_league();
    let mut football = FootballJson::new(&fetch, BASE_URL, ResponseCache::in_memory(Duration::ZERO));
    football.matches("en.1", "2024-25");
    football.matches("en.1", "2024-25");
    assert_eq!(fetch.call_count(), 2);
}

#[test]
fn persistent_cache_is_shared_between_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("http_cache.json");
    let fetch = premier_league();

    {
        let cache = ResponseCache::persistent(path.clone(), Duration::from_secs(3600));
        let mut football = FootballJson::new(&fetch, BASE_URL, cache);
        football.matches("en.1", "2024-25");
    }
    let cache = ResponseCache::persistent(path, Duration::from_secs(3600));
    assert!(cache.get(&cache_key("en.1", "2024-25")).is_some());
    let mut football = FootballJson::new(&fetch, BASE_URL, cache);
    assert_eq!(football.matches("en.1", "2024-25").len(), 6);
    assert_eq!(fetch.call_count(), 1);
}

#[test]
fn fixture_parses_scores_and_rounds() {
    let rows = parse_matches_json(&read_fixture("en.1.json")).expect("fixture should parse");
    assert_eq!(rows.len(), 6);
    assert_eq!(rows.iter().filter(|m| m.score.is_some()).count(), 4);
    assert_eq!(rows[0].kickoff(), "2024-08-17 15:00");
    assert_eq!(rows[1].kickoff(), "2024-08-17 00:00");
    assert_eq!(rows[4].round_number(), Some(38));
    assert_eq!(rows[5].status(), "NS");
}
