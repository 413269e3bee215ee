use std::cmp::Ordering;
use std::collections::HashMap;

use crate::football_json::Match;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandingRow {
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_diff: i32,
    pub points: u32,
    pub rank: u32,
}

impl StandingRow {
    fn new(team: &str) -> Self {
        Self {
            team: team.to_string(),
            ..Self::default()
        }
    }

    fn record(&mut self, scored: u32, conceded: u32) {
        self.played = self.played.saturating_add(1);
        self.goals_for = self.goals_for.saturating_add(scored);
        self.goals_against = self.goals_against.saturating_add(conceded);
        match scored.cmp(&conceded) {
            Ordering::Greater => {
                self.won = self.won.saturating_add(1);
                self.points = self.points.saturating_add(3);
            }
            Ordering::Less => self.lost = self.lost.saturating_add(1),
            Ordering::Equal => {
                self.drawn = self.drawn.saturating_add(1);
                self.points = self.points.saturating_add(1);
            }
        }
    }
}

/// Build a ranked league table from the scored subset of `matches`.
///
/// Unscored fixtures are ignored, so a team that has not played yet does
/// not appear. Ties on points, goal difference and goals for keep the
/// order in which teams first appeared.
pub fn compute_standings(matches: &[Match]) -> Vec<StandingRow> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<StandingRow> = Vec::new();

    for m in matches {
        let Some(score) = m.score else {
            continue;
        };
        let home = slot(&mut index, &mut rows, &m.home);
        rows[home].record(score.home, score.away);
        let away = slot(&mut index, &mut rows, &m.away);
        rows[away].record(score.away, score.home);
    }

    for row in &mut rows {
        let diff = i64::from(row.goals_for) - i64::from(row.goals_against);
        row.goal_diff = diff.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
    }
    rows.sort_by(compare_rows);
    for (pos, row) in rows.iter_mut().enumerate() {
        row.rank = pos as u32 + 1;
    }
    rows
}

fn slot<'a>(index: &mut HashMap<&'a str, usize>, rows: &mut Vec<StandingRow>, team: &'a str) -> usize {
    *index.entry(team).or_insert_with(|| {
        rows.push(StandingRow::new(team));
        rows.len() - 1
    })
}

/// Points, then goal difference, then goals for; all descending.
pub fn compare_rows(a: &StandingRow, b: &StandingRow) -> Ordering {
    b.points
        .cmp(&a.points)
        .then(b.goal_diff.cmp(&a.goal_diff))
        .then(b.goals_for.cmp(&a.goals_for))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    ChampionsLeague,
    EuropaLeague,
    Relegation,
}

impl Zone {
    pub fn label(self) -> &'static str {
        match self {
            Zone::ChampionsLeague => "Champions League",
            Zone::EuropaLeague => "Europa League",
            Zone::Relegation => "Relegation",
        }
    }
}

/// Top 4, next 2, bottom 3. Earlier zones win when a small table overlaps.
pub fn qualification_zone(rank: u32, table_size: usize) -> Option<Zone> {
    if rank == 0 {
        return None;
    }
    if rank <= 4 {
        return Some(Zone::ChampionsLeague);
    }
    if rank <= 6 {
        return Some(Zone::EuropaLeague);
    }
    if rank as usize + 3 > table_size {
        return Some(Zone::Relegation);
    }
    None
}
