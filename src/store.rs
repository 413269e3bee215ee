use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueRow {
    pub id: i64,
    pub external_id: i64,
    pub name: String,
    pub country_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct TeamRecord<'a> {
    pub external_id: i64,
    pub name: &'a str,
    pub code: &'a str,
    pub country_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct FixtureRecord<'a> {
    pub external_id: i64,
    pub league_id: i64,
    pub season_id: i64,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub date: &'a str,
    pub status: &'a str,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub round: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct StandingRecord<'a> {
    pub league_id: i64,
    pub season_id: i64,
    pub team_id: i64,
    pub rank: u32,
    pub points: u32,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_diff: i32,
    pub description: Option<&'a str>,
}

/// A standings row joined with its team name, as read back for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredStanding {
    pub rank: u32,
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_diff: i32,
    pub points: u32,
    pub description: Option<String>,
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode = WAL;")
        .context("enable wal")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;
        CREATE TABLE IF NOT EXISTS countries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            code TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS leagues (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            external_id INTEGER NOT NULL UNIQUE,
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            country_id INTEGER NULL REFERENCES countries(id) ON DELETE SET NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS seasons (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            league_id INTEGER NOT NULL REFERENCES leagues(id) ON DELETE CASCADE,
            year INTEGER NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            is_current INTEGER NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (league_id, year)
        );

        CREATE TABLE IF NOT EXISTS teams (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            external_id INTEGER NOT NULL UNIQUE,
            name TEXT NOT NULL,
            code TEXT NULL,
            country_id INTEGER NULL REFERENCES countries(id) ON DELETE SET NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS fixtures (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            external_id INTEGER NOT NULL UNIQUE,
            league_id INTEGER NOT NULL REFERENCES leagues(id) ON DELETE CASCADE,
            season_id INTEGER NOT NULL REFERENCES seasons(id) ON DELETE CASCADE,
            home_team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
            away_team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
            date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'NS',
            home_score INTEGER NULL,
            away_score INTEGER NULL,
            round INTEGER NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_fixtures_league_season_date
            ON fixtures(league_id, season_id, date);

        CREATE TABLE IF NOT EXISTS standings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            league_id INTEGER NOT NULL REFERENCES leagues(id) ON DELETE CASCADE,
            season_id INTEGER NOT NULL REFERENCES seasons(id) ON DELETE CASCADE,
            team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
            rank INTEGER NOT NULL,
            points INTEGER NOT NULL DEFAULT 0,
            played INTEGER NOT NULL DEFAULT 0,
            won INTEGER NOT NULL DEFAULT 0,
            drawn INTEGER NOT NULL DEFAULT 0,
            lost INTEGER NOT NULL DEFAULT 0,
            goals_for INTEGER NOT NULL DEFAULT 0,
            goals_against INTEGER NOT NULL DEFAULT 0,
            goal_diff INTEGER NOT NULL DEFAULT 0,
            description TEXT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (league_id, season_id, team_id)
        );
        CREATE INDEX IF NOT EXISTS idx_standings_rank
            ON standings(league_id, season_id, rank);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Get-or-create by name; an existing country keeps its code.
pub fn upsert_country(conn: &Connection, name: &str, code: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO countries (name, code, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(name) DO NOTHING",
        params![name, code, now()],
    )
    .context("insert country")?;
    conn.query_row(
        "SELECT id FROM countries WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )
    .context("query country id")
}

pub fn upsert_league(
    conn: &Connection,
    external_id: i64,
    name: &str,
    country_id: Option<i64>,
) -> Result<i64> {
    conn.query_row(
        r#"
        INSERT INTO leagues (external_id, name, type, country_id, updated_at)
        VALUES (?1, ?2, 'league', ?3, ?4)
        ON CONFLICT(external_id) DO UPDATE SET
            name = excluded.name,
            type = excluded.type,
            country_id = excluded.country_id,
            updated_at = excluded.updated_at
        RETURNING id
        "#,
        params![external_id, name, country_id, now()],
        |row| row.get(0),
    )
    .context("upsert league")
}

pub fn upsert_season(
    conn: &Connection,
    league_id: i64,
    year: i32,
    start: NaiveDate,
    end: NaiveDate,
    current: bool,
) -> Result<i64> {
    conn.query_row(
        r#"
        INSERT INTO seasons (league_id, year, start_date, end_date, is_current, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(league_id, year) DO UPDATE SET
            start_date = excluded.start_date,
            end_date = excluded.end_date,
            is_current = excluded.is_current,
            updated_at = excluded.updated_at
        RETURNING id
        "#,
        params![
            league_id,
            year,
            start.to_string(),
            end.to_string(),
            bool_to_i64(current),
            now()
        ],
        |row| row.get(0),
    )
    .context("upsert season")
}

pub fn upsert_team(conn: &Connection, team: &TeamRecord<'_>) -> Result<i64> {
    conn.query_row(
        r#"
        INSERT INTO teams (external_id, name, code, country_id, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(external_id) DO UPDATE SET
            name = excluded.name,
            code = excluded.code,
            country_id = excluded.country_id,
            updated_at = excluded.updated_at
        RETURNING id
        "#,
        params![team.external_id, team.name, team.code, team.country_id, now()],
        |row| row.get(0),
    )
    .context("upsert team")
}

pub fn upsert_fixture(conn: &Connection, f: &FixtureRecord<'_>) -> Result<i64> {
    conn.query_row(
        r#"
        INSERT INTO fixtures (
            external_id, league_id, season_id, home_team_id, away_team_id,
            date, status, home_score, away_score, round, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ON CONFLICT(external_id) DO UPDATE SET
            league_id = excluded.league_id,
            season_id = excluded.season_id,
            home_team_id = excluded.home_team_id,
            away_team_id = excluded.away_team_id,
            date = excluded.date,
            status = excluded.status,
            home_score = excluded.home_score,
            away_score = excluded.away_score,
            round = excluded.round,
            updated_at = excluded.updated_at
        RETURNING id
        "#,
        params![
            f.external_id,
            f.league_id,
            f.season_id,
            f.home_team_id,
            f.away_team_id,
            f.date,
            f.status,
            f.home_score,
            f.away_score,
            f.round,
            now(),
        ],
        |row| row.get(0),
    )
    .context("upsert fixture")
}

pub fn upsert_standing(conn: &Connection, s: &StandingRecord<'_>) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO standings (
            league_id, season_id, team_id, rank, points, played, won, drawn, lost,
            goals_for, goals_against, goal_diff, description, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        ON CONFLICT(league_id, season_id, team_id) DO UPDATE SET
            rank = excluded.rank,
            points = excluded.points,
            played = excluded.played,
            won = excluded.won,
            drawn = excluded.drawn,
            lost = excluded.lost,
            goals_for = excluded.goals_for,
            goals_against = excluded.goals_against,
            goal_diff = excluded.goal_diff,
            description = excluded.description,
            updated_at = excluded.updated_at
        "#,
        params![
            s.league_id,
            s.season_id,
            s.team_id,
            s.rank,
            s.points,
            s.played,
            s.won,
            s.drawn,
            s.lost,
            s.goals_for,
            s.goals_against,
            s.goal_diff,
            s.description,
            now(),
        ],
    )
    .context("upsert standing")?;
    Ok(())
}

pub fn find_league(conn: &Connection, id: i64) -> Result<Option<LeagueRow>> {
    conn.query_row(
        "SELECT id, external_id, name, country_id FROM leagues WHERE id = ?1",
        params![id],
        league_from_row,
    )
    .optional()
    .context("query league by id")
}

pub fn find_league_by_external_id(conn: &Connection, external_id: i64) -> Result<Option<LeagueRow>> {
    conn.query_row(
        "SELECT id, external_id, name, country_id FROM leagues WHERE external_id = ?1",
        params![external_id],
        league_from_row,
    )
    .optional()
    .context("query league by external id")
}

pub fn find_season_id(conn: &Connection, league_id: i64, year: i32) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM seasons WHERE league_id = ?1 AND year = ?2",
        params![league_id, year],
        |row| row.get(0),
    )
    .optional()
    .context("query season")
}

pub fn find_team_id(conn: &Connection, external_id: i64) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM teams WHERE external_id = ?1",
        params![external_id],
        |row| row.get(0),
    )
    .optional()
    .context("query team")
}

pub fn load_standings(conn: &Connection, league_id: i64, season_id: i64) -> Result<Vec<StoredStanding>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT
                s.rank, t.name, s.played, s.won, s.drawn, s.lost,
                s.goals_for, s.goals_against, s.goal_diff, s.points, s.description
            FROM standings s
            JOIN teams t ON t.id = s.team_id
            WHERE s.league_id = ?1 AND s.season_id = ?2
            ORDER BY s.rank ASC
            "#,
        )
        .context("prepare load standings query")?;

    let rows = stmt
        .query_map(params![league_id, season_id], |row| {
            Ok(StoredStanding {
                rank: row.get(0)?,
                team: row.get(1)?,
                played: row.get(2)?,
                won: row.get(3)?,
                drawn: row.get(4)?,
                lost: row.get(5)?,
                goals_for: row.get(6)?,
                goals_against: row.get(7)?,
                goal_diff: row.get(8)?,
                points: row.get(9)?,
                description: row.get(10)?,
            })
        })
        .context("query load standings")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode standing row")?);
    }
    Ok(out)
}

fn league_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LeagueRow> {
    Ok(LeagueRow {
        id: row.get(0)?,
        external_id: row.get(1)?,
        name: row.get(2)?,
        country_id: row.get(3)?,
    })
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn bool_to_i64(v: bool) -> i64 {
    if v { 1 } else { 0 }
}
