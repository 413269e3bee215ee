//! Invalid-input errors surfaced to the caller as a command failure.
//!
//! Transport failures never show up here: the aggregator logs them and
//! reports "no data" instead.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("league code '{code}' not found (available: {available})")]
    UnknownLeague { code: String, available: String },

    #[error("league with id {0} not found")]
    UnknownLeagueId(i64),

    #[error("league id {0} does not map to a known league code")]
    UnmappedLeague(i64),

    #[error("league '{0}' has not been synced yet, run `leagues` first")]
    LeagueNotSynced(String),

    #[error("season {year} not found for league '{code}'")]
    SeasonNotFound { code: String, year: i32 },

    #[error("invalid season code: {0}")]
    InvalidSeason(String),
}

impl SyncError {
    pub fn unknown_league(code: &str) -> Self {
        Self::UnknownLeague {
            code: code.to_string(),
            available: crate::catalog::league_codes().join(", "),
        }
    }
}
