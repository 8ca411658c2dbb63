use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::fixtures::{MatchResult, Schedule};
use crate::team::Team;

pub const POINTS_WIN: u32 = 3;
pub const POINTS_DRAW: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StandingRow {
    pub name: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
}

impl StandingRow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }

    fn record(&mut self, scored: u8, conceded: u8) {
        self.played += 1;
        self.goals_for += u32::from(scored);
        self.goals_against += u32::from(conceded);
        match scored.cmp(&conceded) {
            Ordering::Greater => {
                self.won += 1;
                self.points += POINTS_WIN;
            }
            Ordering::Equal => {
                self.drawn += 1;
                self.points += POINTS_DRAW;
            }
            Ordering::Less => self.lost += 1,
        }
    }
}

/// Table order: points, goal difference, goals scored, then name.
pub fn rank_order(a: &StandingRow, b: &StandingRow) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_difference().cmp(&a.goal_difference()))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
        .then_with(|| a.name.cmp(&b.name))
}

/// Running table with one row per team, in roster order.
#[derive(Debug, Clone)]
pub struct LeagueTable {
    rows: Vec<StandingRow>,
}

impl LeagueTable {
    pub fn new(teams: &[Team]) -> Self {
        Self {
            rows: teams.iter().map(|t| StandingRow::new(t.name.clone())).collect(),
        }
    }

    pub fn rows(&self) -> &[StandingRow] {
        &self.rows
    }

    pub fn record(&mut self, home: usize, away: usize, result: MatchResult) {
        self.rows[home].record(result.home_goals, result.away_goals);
        self.rows[away].record(result.away_goals, result.home_goals);
    }

    /// Roster index of the team currently on top.
    pub fn leader(&self) -> Option<usize> {
        (0..self.rows.len()).min_by(|&a, &b| rank_order(&self.rows[a], &self.rows[b]))
    }

    pub fn into_ranked(mut self) -> Vec<StandingRow> {
        self.rows.sort_by(rank_order);
        self.rows
    }
}

pub(crate) fn roster_index(teams: &[Team]) -> HashMap<&str, usize> {
    teams
        .iter()
        .enumerate()
        .map(|(i, t)| (t.name.as_str(), i))
        .collect()
}

/// Table as of every played fixture in `schedule`.
pub fn table_for(teams: &[Team], schedule: &Schedule) -> LeagueTable {
    let index = roster_index(teams);
    let mut table = LeagueTable::new(teams);
    for fixture in schedule.fixtures() {
        let Some(result) = fixture.result else {
            continue;
        };
        let (Some(&h), Some(&a)) = (
            index.get(fixture.home.name.as_str()),
            index.get(fixture.away.name.as_str()),
        ) else {
            continue;
        };
        table.record(h, a, result);
    }
    table
}

pub fn compute_standings(teams: &[Team], schedule: &Schedule) -> Vec<StandingRow> {
    table_for(teams, schedule).into_ranked()
}
