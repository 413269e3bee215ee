//! Full sync run: LEAGUES -> TEAMS -> FIXTURES -> STANDINGS.
//!
//! Each stage walks the selected leagues in catalogue order. A failing
//! league is logged and counted as a miss; it never stops the stage or the
//! run. Only an invalid league filter or season code fails the run, and it
//! does so before any stage starts.

use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::catalog::{self, LEAGUES, LeagueInfo};
use crate::error::SyncError;
use crate::http_client::HttpFetch;
use crate::sync::{StepReport, Syncer};

/// The four per-league operations a run sequences.
pub trait SyncSteps {
    fn sync_league(&mut self, code: &str) -> Result<()>;
    fn sync_teams(&mut self, code: &str, season: &str) -> Result<StepReport>;
    fn sync_fixtures(&mut self, code: &str, season: &str) -> Result<StepReport>;
    fn sync_standings(&mut self, code: &str, season: &str) -> Result<StepReport>;
}

impl<F: HttpFetch> SyncSteps for Syncer<F> {
    fn sync_league(&mut self, code: &str) -> Result<()> {
        Syncer::sync_league(self, code).map(|_| ())
    }

    fn sync_teams(&mut self, code: &str, season: &str) -> Result<StepReport> {
        Syncer::sync_teams(self, code, season)
    }

    fn sync_fixtures(&mut self, code: &str, season: &str) -> Result<StepReport> {
        Syncer::sync_fixtures(self, code, season)
    }

    fn sync_standings(&mut self, code: &str, season: &str) -> Result<StepReport> {
        Syncer::sync_standings(self, code, season)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Leagues,
    Teams,
    Fixtures,
    Standings,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Leagues, Stage::Teams, Stage::Fixtures, Stage::Standings];

    pub fn label(self) -> &'static str {
        match self {
            Stage::Leagues => "leagues",
            Stage::Teams => "teams",
            Stage::Fixtures => "fixtures",
            Stage::Standings => "standings",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    pub succeeded: usize,
    pub missed: usize,
    pub written: usize,
    pub skipped: usize,
}

impl StageReport {
    fn new(stage: Stage) -> Self {
        Self {
            stage,
            succeeded: 0,
            missed: 0,
            written: 0,
            skipped: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub season: String,
    pub leagues: Vec<&'static str>,
    pub stages: Vec<StageReport>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    pub fn total_missed(&self) -> usize {
        self.stages.iter().map(|s| s.missed).sum()
    }
}

/// Leagues a run covers: the whole catalogue, or the one named by `filter`.
pub fn select_leagues(filter: Option<&str>) -> Result<Vec<&'static LeagueInfo>, SyncError> {
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        None => Ok(LEAGUES.iter().collect()),
        Some(code) => catalog::league_by_code(code)
            .map(|info| vec![info])
            .ok_or_else(|| SyncError::unknown_league(code)),
    }
}

pub fn run_all<S: SyncSteps>(
    steps: &mut S,
    season: &str,
    league_filter: Option<&str>,
) -> Result<RunSummary, SyncError> {
    catalog::season_to_year(season)?;
    let leagues = select_leagues(league_filter)?;
    let started = Instant::now();
    let total = leagues.len();

    info!(season, leagues = total, "starting full sync");

    let mut stages = Vec::with_capacity(Stage::ALL.len());
    for (idx, stage) in Stage::ALL.into_iter().enumerate() {
        info!(
            stage = stage.label(),
            step = idx + 1,
            of = Stage::ALL.len(),
            leagues = total,
            "stage started"
        );
        let mut report = StageReport::new(stage);

        for (pos, league) in leagues.iter().enumerate() {
            debug!(stage = stage.label(), league = league.code, position = pos + 1, of = total, "syncing league");
            let outcome = match stage {
                Stage::Leagues => steps.sync_league(league.code).map(|_| StepReport::default()),
                Stage::Teams => steps.sync_teams(league.code, season),
                Stage::Fixtures => steps.sync_fixtures(league.code, season),
                Stage::Standings => steps.sync_standings(league.code, season),
            };
            match outcome {
                Ok(step) => {
                    report.succeeded += 1;
                    report.written += step.written;
                    report.skipped += step.skipped;
                }
                Err(err) => {
                    warn!(
                        stage = stage.label(),
                        league = league.code,
                        error = %format!("{err:#}"),
                        "sync step failed"
                    );
                    report.missed += 1;
                }
            }
        }

        info!(
            stage = stage.label(),
            succeeded = report.succeeded,
            missed = report.missed,
            "stage finished"
        );
        stages.push(report);
    }

    let summary = RunSummary {
        season: season.to_string(),
        leagues: leagues.iter().map(|l| l.code).collect(),
        stages,
        elapsed: started.elapsed(),
    };
    info!(
        season,
        missed = summary.total_missed(),
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "sync complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(Stage, String)>,
        fail: Vec<(Stage, &'static str)>,
    }

    impl Recorder {
        fn step(&mut self, stage: Stage, code: &str) -> Result<StepReport> {
            self.calls.push((stage, code.to_string()));
            if self.fail.iter().any(|(s, c)| *s == stage && *c == code) {
                return Err(anyhow!("boom"));
            }
            Ok(StepReport {
                written: 10,
                skipped: 1,
            })
        }
    }

    impl SyncSteps for Recorder {
        fn sync_league(&mut self, code: &str) -> Result<()> {
            self.step(Stage::Leagues, code).map(|_| ())
        }
        fn sync_teams(&mut self, code: &str, _season: &str) -> Result<StepReport> {
            self.step(Stage::Teams, code)
        }
        fn sync_fixtures(&mut self, code: &str, _season: &str) -> Result<StepReport> {
            self.step(Stage::Fixtures, code)
        }
        fn sync_standings(&mut self, code: &str, _season: &str) -> Result<StepReport> {
            self.step(Stage::Standings, code)
        }
    }

    #[test]
    fn stages_run_in_order_for_every_league() {
        let mut rec = Recorder::default();
        let summary = run_all(&mut rec, "2024-25", None).unwrap();

        assert_eq!(rec.calls.len(), 4 * LEAGUES.len());
        let stage_order: Vec<Stage> = rec
            .calls
            .chunks(LEAGUES.len())
            .map(|chunk| chunk[0].0)
            .collect();
        assert_eq!(stage_order, Stage::ALL);
        assert_eq!(summary.total_missed(), 0);
        assert_eq!(summary.leagues.len(), LEAGUES.len());
    }

    #[test]
    fn single_failure_is_one_miss() {
        let mut rec = Recorder {
            fail: vec![(Stage::Fixtures, "en.1")],
            ..Recorder::default()
        };
        let summary = run_all(&mut rec, "2024-25", None).unwrap();

        let fixtures = summary.stage(Stage::Fixtures).unwrap();
        assert_eq!(fixtures.missed, 1);
        assert_eq!(fixtures.succeeded, LEAGUES.len() - 1);
        assert_eq!(summary.total_missed(), 1);
        // Later stages still ran for the failing league.
        assert!(rec.calls.contains(&(Stage::Standings, "en.1".to_string())));
    }

    #[test]
    fn filter_restricts_to_one_league() {
        let mut rec = Recorder::default();
        let summary = run_all(&mut rec, "2024-25", Some("de.1")).unwrap();
        assert_eq!(summary.leagues, ["de.1"]);
        assert!(rec.calls.iter().all(|(_, c)| c == "de.1"));
        let teams = summary.stage(Stage::Teams).unwrap();
        assert_eq!((teams.written, teams.skipped), (10, 1));
    }

    #[test]
    fn unknown_filter_fails_before_any_stage() {
        let mut rec = Recorder::default();
        let err = run_all(&mut rec, "2024-25", Some("xx.1")).unwrap_err();
        assert!(matches!(err, SyncError::UnknownLeague { .. }));
        assert!(rec.calls.is_empty());
    }

    #[test]
    fn malformed_season_fails_before_any_stage() {
        let mut rec = Recorder::default();
        let err = run_all(&mut rec, "latest", None).unwrap_err();
        assert_eq!(err, SyncError::InvalidSeason("latest".to_string()));
        assert!(rec.calls.is_empty());
    }
}
