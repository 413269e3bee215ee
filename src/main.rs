use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::error;

use standings_sync::catalog;
use standings_sync::config::Settings;
use standings_sync::error::SyncError;
use standings_sync::football_json::FootballJson;
use standings_sync::http_cache::ResponseCache;
use standings_sync::http_client::{HttpFetch, http_client};
use standings_sync::orchestrator::{self, RunSummary};
use standings_sync::store::{self, StoredStanding};
use standings_sync::sync::Syncer;

#[derive(Parser, Debug)]
#[command(name = "standings_sync", version, about = "Sync football leagues, fixtures and standings from football.json")]
struct Cli {
    /// SQLite database path (defaults to STANDINGS_DB or the user cache dir)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sync leagues, teams, fixtures and standings in one run
    All {
        #[arg(long)]
        season: Option<String>,
        /// Restrict the run to one league code (e.g. es.1)
        #[arg(long)]
        league: Option<String>,
    },
    /// Sync the league catalogue and its seasons
    Leagues {
        #[arg(long)]
        country: Option<String>,
    },
    /// Sync teams for one league
    Teams(StepArgs),
    /// Sync fixtures for one league
    Fixtures(StepArgs),
    /// Calculate and store standings for one league
    Standings(StepArgs),
    /// Print the stored standings table
    Table(StepArgs),
    /// Drop cached football.json responses
    ClearCache {
        league: Option<String>,
        #[arg(long)]
        season: Option<String>,
    },
}

#[derive(Args, Debug)]
struct StepArgs {
    /// League id or code (e.g. es.1)
    league: String,
    #[arg(long)]
    season: Option<String>,
}

fn main() -> ExitCode {
    let settings = Settings::from_env();
    init_logging(&settings);

    let cli = Cli::parse();
    match run(cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %format!("{err:#}"), "command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, settings: &Settings) -> Result<()> {
    let season_or_default =
        |season: Option<String>| season.unwrap_or_else(|| settings.default_season.clone());

    match cli.command {
        Command::ClearCache { league, season } => {
            let mut source = football_source(settings)?;
            let season = season_or_default(season);
            clear_cache(&mut source, league.as_deref(), &season)
        }
        Command::All { season, league } => {
            let (mut syncer, db_path) = open_syncer(cli.db, settings)?;
            let season = season_or_default(season);
            let summary = orchestrator::run_all(&mut syncer, &season, league.as_deref())?;
            print_summary(&summary, &db_path);
            Ok(())
        }
        Command::Leagues { country } => {
            let (mut syncer, _) = open_syncer(cli.db, settings)?;
            let count = syncer.sync_leagues(country.as_deref())?;
            println!("Synced {count} leagues.");
            Ok(())
        }
        Command::Teams(args) => {
            let (mut syncer, _) = open_syncer(cli.db, settings)?;
            syncer.sync_teams(&args.league, &season_or_default(args.season))?;
            Ok(())
        }
        Command::Fixtures(args) => {
            let (mut syncer, _) = open_syncer(cli.db, settings)?;
            syncer.sync_fixtures(&args.league, &season_or_default(args.season))?;
            Ok(())
        }
        Command::Standings(args) => {
            let (mut syncer, _) = open_syncer(cli.db, settings)?;
            syncer.sync_standings(&args.league, &season_or_default(args.season))?;
            Ok(())
        }
        Command::Table(args) => {
            let (syncer, _) = open_syncer(cli.db, settings)?;
            let season = season_or_default(args.season);
            let (league, rows) = syncer.table(&args.league, &season)?;
            print_table(league.info.name, &season, &rows);
            Ok(())
        }
    }
}

type SharedClient = &'static reqwest::blocking::Client;

fn open_syncer(db: Option<PathBuf>, settings: &Settings) -> Result<(Syncer<SharedClient>, PathBuf)> {
    let db_path = db
        .or_else(|| settings.db_path.clone())
        .context("unable to resolve sqlite path")?;
    let conn = store::open_db(&db_path)?;
    Ok((Syncer::new(conn, football_source(settings)?), db_path))
}

fn print_table(league: &str, season: &str, rows: &[StoredStanding]) {
    println!("{league} ({season})");
    println!(
        "{:>3} {:<28} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4}",
        "#", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"
    );
    println!("{}", "-".repeat(80));
    for row in rows {
        println!(
            "{:>3} {:<28} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>+4} {:>4}  {}",
            row.rank,
            row.team,
            row.played,
            row.won,
            row.drawn,
            row.lost,
            row.goals_for,
            row.goals_against,
            row.goal_diff,
            row.points,
            row.description.as_deref().unwrap_or("")
        );
    }
    if rows.is_empty() {
        println!("No standings stored yet.");
    }
}

fn football_source(settings: &Settings) -> Result<FootballJson<SharedClient>> {
    let client = http_client(settings.http_timeout)?;
    let cache = match settings.http_cache_path() {
        Some(path) => ResponseCache::persistent(path, settings.cache_ttl),
        None => ResponseCache::in_memory(settings.cache_ttl),
    };
    Ok(FootballJson::new(client, settings.base_url.clone(), cache))
}

fn clear_cache<F: HttpFetch>(
    source: &mut FootballJson<F>,
    league: Option<&str>,
    season: &str,
) -> Result<()> {
    let Some(league) = league else {
        let removed = source.clear_all_cache();
        println!("Cleared {removed} cached responses.");
        return Ok(());
    };
    let info = catalog::league_by_code(league).ok_or_else(|| SyncError::unknown_league(league))?;
    if source.clear_cache(info.code, season) {
        println!("Cleared cache for {} ({season}).", info.code);
    } else {
        println!("Nothing cached for {} ({season}).", info.code);
    }
    Ok(())
}

fn print_summary(summary: &RunSummary, db_path: &std::path::Path) {
    println!();
    println!("Sync complete");
    println!("DB: {}", db_path.display());
    println!("Season: {}", summary.season);
    println!("Leagues: {}", summary.leagues.len());
    for stage in &summary.stages {
        println!(
            "{:<10} synced {}/{} leagues (written={} skipped={} missed={})",
            stage.stage.label(),
            stage.succeeded,
            summary.leagues.len(),
            stage.written,
            stage.skipped,
            stage.missed
        );
    }
    println!("Time elapsed: {:.2}s", summary.elapsed.as_secs_f64());
}

fn init_logging(settings: &Settings) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    if settings.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}
