use chrono::NaiveDate;

use crate::error::SyncError;

pub const DEFAULT_SEASON: &str = "2024-25";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeagueInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub country: &'static str,
}

pub const LEAGUES: &[LeagueInfo] = &[
    LeagueInfo { code: "es.1", name: "La Liga", country: "Spain" },
    LeagueInfo { code: "es.2", name: "Segunda División", country: "Spain" },
    LeagueInfo { code: "en.1", name: "Premier League", country: "England" },
    LeagueInfo { code: "en.2", name: "Championship", country: "England" },
    LeagueInfo { code: "de.1", name: "Bundesliga", country: "Germany" },
    LeagueInfo { code: "de.2", name: "2. Bundesliga", country: "Germany" },
    LeagueInfo { code: "it.1", name: "Serie A", country: "Italy" },
    LeagueInfo { code: "it.2", name: "Serie B", country: "Italy" },
    LeagueInfo { code: "fr.1", name: "Ligue 1", country: "France" },
    LeagueInfo { code: "fr.2", name: "Ligue 2", country: "France" },
    LeagueInfo { code: "pt.1", name: "Primeira Liga", country: "Portugal" },
    LeagueInfo { code: "nl.1", name: "Eredivisie", country: "Netherlands" },
    LeagueInfo { code: "be.1", name: "First Division A", country: "Belgium" },
    LeagueInfo { code: "at.1", name: "Bundesliga", country: "Austria" },
    LeagueInfo { code: "ch.1", name: "Super League", country: "Switzerland" },
];

/// Newest first.
pub const SEASONS: &[&str] = &["2025-26", "2024-25", "2023-24", "2022-23", "2021-22", "2020-21"];

pub fn league_by_code(code: &str) -> Option<&'static LeagueInfo> {
    LEAGUES.iter().find(|l| l.code == code)
}

pub fn league_codes() -> Vec<&'static str> {
    LEAGUES.iter().map(|l| l.code).collect()
}

/// "2024-25" -> 2024. Only the leading four digits are significant.
pub fn season_to_year(season: &str) -> Result<i32, SyncError> {
    season
        .get(..4)
        .and_then(|y| y.parse::<i32>().ok())
        .ok_or_else(|| SyncError::InvalidSeason(season.to_string()))
}

pub fn year_to_season(year: i32) -> String {
    let next = (year + 1).rem_euclid(100);
    format!("{year}-{next:02}")
}

/// Season rows run from August 1st to June 30th of the following year.
pub fn season_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, 8, 1)?;
    let end = NaiveDate::from_ymd_opt(year + 1, 6, 30)?;
    Some((start, end))
}

pub fn is_current_season(season: &str) -> bool {
    season == DEFAULT_SEASON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_year_conversions() {
        assert_eq!(season_to_year("2024-25").unwrap(), 2024);
        assert_eq!(year_to_season(2024), "2024-25");
        assert_eq!(year_to_season(1999), "1999-00");
        assert!(matches!(season_to_year("24-25"), Err(SyncError::InvalidSeason(_))));
    }

    #[test]
    fn every_catalogue_season_round_trips() {
        for season in SEASONS {
            let year = season_to_year(season).unwrap();
            assert_eq!(year_to_season(year), *season);
        }
    }

    #[test]
    fn league_lookup() {
        assert_eq!(league_by_code("en.1").map(|l| l.name), Some("Premier League"));
        assert!(league_by_code("xx.9").is_none());
        assert_eq!(league_codes().len(), LEAGUES.len());
    }

    #[test]
    fn season_bounds_span_summer_break() {
        let (start, end) = season_bounds(2024).unwrap();
        assert_eq!(start.to_string(), "2024-08-01");
        assert_eq!(end.to_string(), "2025-06-30");
    }
}
