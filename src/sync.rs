//! Per-league sync steps writing upstream data into the store.
//!
//! Steps take a league argument that is either a catalogue code (`en.1`) or
//! the numeric row id of an already-synced league.

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::catalog::{self, LEAGUES, LeagueInfo, SEASONS};
use crate::error::SyncError;
use crate::football_json::FootballJson;
use crate::http_client::HttpFetch;
use crate::identity::external_id;
use crate::standings::{compute_standings, qualification_zone};
use crate::store::{self, FixtureRecord, LeagueRow, StandingRecord, StoredStanding, TeamRecord};

/// Items written and items skipped for missing teams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub written: usize,
    pub skipped: usize,
}

/// A league argument resolved against the catalogue and the store.
#[derive(Debug, Clone)]
pub struct ResolvedLeague {
    pub info: &'static LeagueInfo,
    pub row: Option<LeagueRow>,
}

pub struct Syncer<F> {
    conn: Connection,
    source: FootballJson<F>,
}

impl<F: HttpFetch> Syncer<F> {
    pub fn new(conn: Connection, source: FootballJson<F>) -> Self {
        Self { conn, source }
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn resolve_league(&self, arg: &str) -> Result<ResolvedLeague> {
        let arg = arg.trim();
        if let Ok(id) = arg.parse::<i64>() {
            let row = store::find_league(&self.conn, id)?.ok_or(SyncError::UnknownLeagueId(id))?;
            let info = LEAGUES
                .iter()
                .find(|l| external_id(l.code) == row.external_id)
                .ok_or(SyncError::UnmappedLeague(id))?;
            return Ok(ResolvedLeague { info, row: Some(row) });
        }

        let info = catalog::league_by_code(arg).ok_or_else(|| SyncError::unknown_league(arg))?;
        let row = store::find_league_by_external_id(&self.conn, external_id(info.code))?;
        Ok(ResolvedLeague { info, row })
    }

    /// Upsert every catalogue league, optionally restricted to one country.
    pub fn sync_leagues(&mut self, country: Option<&str>) -> Result<usize> {
        let mut count = 0;
        for info in LEAGUES {
            if let Some(filter) = country {
                if !info.country.eq_ignore_ascii_case(filter.trim()) {
                    continue;
                }
            }
            self.write_league(info)?;
            info!(league = info.code, name = info.name, country = info.country, "league synced");
            count += 1;
        }
        info!(count, "leagues synced");
        Ok(count)
    }

    /// Upsert one league, its country and its catalogue seasons.
    pub fn sync_league(&mut self, code: &str) -> Result<i64> {
        let info = catalog::league_by_code(code).ok_or_else(|| SyncError::unknown_league(code))?;
        self.write_league(info)
    }

    fn write_league(&mut self, info: &LeagueInfo) -> Result<i64> {
        let tx = self.conn.transaction().context("begin league transaction")?;
        let country_id = store::upsert_country(&tx, info.country, &country_code(info.country))?;
        let league_id = store::upsert_league(&tx, external_id(info.code), info.name, Some(country_id))?;
        for season in SEASONS {
            let year = catalog::season_to_year(season)?;
            let Some((start, end)) = catalog::season_bounds(year) else {
                continue;
            };
            store::upsert_season(&tx, league_id, year, start, end, catalog::is_current_season(season))?;
        }
        tx.commit().context("commit league transaction")?;
        Ok(league_id)
    }

    /// Upsert the teams seen in a season. No upstream data is not an error.
    pub fn sync_teams(&mut self, league: &str, season: &str) -> Result<StepReport> {
        let resolved = self.resolve_league(league)?;
        let code = resolved.info.code;
        info!(league = code, season, "Syncing teams...");

        let teams = self.source.teams(code, season);
        if teams.is_empty() {
            warn!(league = code, season, "No teams found for this league/season.");
            return Ok(StepReport::default());
        }

        let country_id = resolved.row.as_ref().and_then(|r| r.country_id);
        let tx = self.conn.transaction().context("begin teams transaction")?;
        for name in &teams {
            let short = team_code(name);
            store::upsert_team(
                &tx,
                &TeamRecord {
                    external_id: external_id(name),
                    name,
                    code: &short,
                    country_id,
                },
            )?;
        }
        tx.commit().context("commit teams transaction")?;

        info!(league = code, season, "Synced {} teams.", teams.len());
        Ok(StepReport {
            written: teams.len(),
            skipped: 0,
        })
    }

    pub fn sync_fixtures(&mut self, league: &str, season: &str) -> Result<StepReport> {
        let (resolved, league_id, season_id) = self.require_league_season(league, season)?;
        let code = resolved.info.code;
        info!(league = code, season, "Syncing fixtures for {}...", resolved.info.name);

        let matches = self.source.matches(code, season);
        if matches.is_empty() {
            warn!(league = code, season, "No matches found.");
            return Ok(StepReport::default());
        }

        let mut report = StepReport::default();
        let tx = self.conn.transaction().context("begin fixtures transaction")?;
        for m in &matches {
            let home = store::find_team_id(&tx, external_id(&m.home))?;
            let away = store::find_team_id(&tx, external_id(&m.away))?;
            let (Some(home_team_id), Some(away_team_id)) = (home, away) else {
                debug!(home = %m.home, away = %m.away, "skipping fixture with unknown team");
                report.skipped += 1;
                continue;
            };

            let kickoff = m.kickoff();
            store::upsert_fixture(
                &tx,
                &FixtureRecord {
                    external_id: m.external_id(),
                    league_id,
                    season_id,
                    home_team_id,
                    away_team_id,
                    date: &kickoff,
                    status: m.status(),
                    home_score: m.score.map(|s| s.home),
                    away_score: m.score.map(|s| s.away),
                    round: m.round_number(),
                },
            )?;
            report.written += 1;
        }
        tx.commit().context("commit fixtures transaction")?;

        info!(
            league = code,
            season,
            "Synced {} fixtures. Skipped {} (missing teams).",
            report.written,
            report.skipped
        );
        Ok(report)
    }

    pub fn sync_standings(&mut self, league: &str, season: &str) -> Result<StepReport> {
        let (resolved, league_id, season_id) = self.require_league_season(league, season)?;
        let code = resolved.info.code;
        info!(league = code, season, "Calculating standings for {}...", resolved.info.name);

        let table = compute_standings(&self.source.matches(code, season));
        if table.is_empty() {
            warn!(league = code, season, "No standings data available.");
            return Ok(StepReport::default());
        }

        let mut report = StepReport::default();
        let tx = self.conn.transaction().context("begin standings transaction")?;
        for row in &table {
            let Some(team_id) = store::find_team_id(&tx, external_id(&row.team))? else {
                debug!(team = %row.team, "skipping standing for unknown team");
                report.skipped += 1;
                continue;
            };
            let zone = qualification_zone(row.rank, table.len());
            store::upsert_standing(
                &tx,
                &StandingRecord {
                    league_id,
                    season_id,
                    team_id,
                    rank: row.rank,
                    points: row.points,
                    played: row.played,
                    won: row.won,
                    drawn: row.drawn,
                    lost: row.lost,
                    goals_for: row.goals_for,
                    goals_against: row.goals_against,
                    goal_diff: row.goal_diff,
                    description: zone.map(|z| z.label()),
                },
            )?;
            report.written += 1;
        }
        tx.commit().context("commit standings transaction")?;

        info!(league = code, season, "Synced {} standings.", report.written);
        Ok(report)
    }

    /// Stored table for a league/season, ordered by rank.
    pub fn table(&self, league: &str, season: &str) -> Result<(ResolvedLeague, Vec<StoredStanding>)> {
        let (resolved, league_id, season_id) = self.require_league_season(league, season)?;
        let rows = store::load_standings(&self.conn, league_id, season_id)?;
        Ok((resolved, rows))
    }

    fn require_league_season(&self, league: &str, season: &str) -> Result<(ResolvedLeague, i64, i64)> {
        let resolved = self.resolve_league(league)?;
        let Some(league_id) = resolved.row.as_ref().map(|r| r.id) else {
            return Err(SyncError::LeagueNotSynced(resolved.info.code.to_string()).into());
        };
        let year = catalog::season_to_year(season)?;
        let season_id = store::find_season_id(&self.conn, league_id, year)?.ok_or_else(|| {
            SyncError::SeasonNotFound {
                code: resolved.info.code.to_string(),
                year,
            }
        })?;
        Ok((resolved, league_id, season_id))
    }
}

/// "England" -> "EN".
pub fn country_code(country: &str) -> String {
    country.chars().take(2).collect::<String>().to_uppercase()
}

/// First three ASCII letters of the name, uppercased.
pub fn team_code(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(3)
        .collect::<String>()
        .to_ascii_uppercase()
}
