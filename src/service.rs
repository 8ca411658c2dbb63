//! Call surface for whatever transport sits in front of the league.
//!
//! One `LeagueService` wraps the single engine behind a mutex. Every operation
//! takes the lock exactly once; the Monte Carlo part of `standings` runs on a
//! snapshot after the lock is released. Payloads serialize with the field
//! names the web client reads (`homeGoals`, `goalsFor`, ...), and week numbers
//! are 1-based here while the engine counts from 0.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::config::LeagueConfig;
use crate::engine::{LeagueEngine, LeagueStatus};
use crate::error::LeagueError;
use crate::fixtures::{Fixture, Matchweek, Schedule};
use crate::predict::predict_champion;
use crate::standings::StandingRow;
use crate::team::Team;

#[derive(Debug, Clone, Deserialize)]
pub struct AddTeamRequest {
    pub name: String,
    pub power: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulateWeekRequest {
    pub week: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamsPayload {
    pub teams: Vec<Team>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub home: Team,
    pub away: Team,
    pub played: bool,
    pub home_goals: Option<u8>,
    pub away_goals: Option<u8>,
}

impl From<&Fixture> for MatchView {
    fn from(f: &Fixture) -> Self {
        Self {
            home: f.home.clone(),
            away: f.away.clone(),
            played: f.is_played(),
            home_goals: f.result.map(|r| r.home_goals),
            away_goals: f.result.map(|r| r.away_goals),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekView {
    pub week: usize,
    pub matches: Vec<MatchView>,
}

impl WeekView {
    fn new(index: usize, week: &Matchweek) -> Self {
        Self {
            week: index + 1,
            matches: week.matches.iter().map(MatchView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixturesPayload {
    pub fixtures: Vec<WeekView>,
}

impl From<&Schedule> for FixturesPayload {
    fn from(schedule: &Schedule) -> Self {
        Self {
            fixtures: schedule
                .weeks()
                .iter()
                .enumerate()
                .map(|(i, w)| WeekView::new(i, w))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekPayload {
    pub fixtures: Vec<WeekView>,
    pub week: usize,
    pub results: Vec<MatchView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingView {
    pub name: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub points: u32,
}

impl From<&StandingRow> for StandingView {
    fn from(row: &StandingRow) -> Self {
        Self {
            name: row.name.clone(),
            played: row.played,
            won: row.won,
            drawn: row.drawn,
            lost: row.lost,
            goals_for: row.goals_for,
            goals_against: row.goals_against,
            goal_difference: row.goal_difference(),
            points: row.points,
        }
    }
}

/// `predictions[i]` belongs to `standings[i]`. Empty until fixtures exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsPayload {
    pub standings: Vec<StandingView>,
    pub predictions: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusPayload {
    pub status: LeagueStatus,
    /// Next week to play (1-based); `weeks + 1` once the season is over.
    pub week: usize,
    pub weeks: usize,
}

impl From<&LeagueEngine> for StatusPayload {
    fn from(engine: &LeagueEngine) -> Self {
        Self {
            status: engine.status(),
            week: engine.next_unplayed_week() + 1,
            weeks: engine.schedule().len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    pub message: String,
}

impl From<&LeagueError> for ErrorPayload {
    fn from(err: &LeagueError) -> Self {
        Self {
            error: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

pub struct LeagueService {
    engine: Mutex<LeagueEngine>,
}

impl LeagueService {
    pub fn new(engine: LeagueEngine) -> Self {
        Self {
            engine: Mutex::new(engine),
        }
    }

    pub fn from_config(config: &LeagueConfig) -> Self {
        Self::new(LeagueEngine::new(config))
    }

    // Engine mutations are all-or-nothing, so a poisoned lock still guards
    // consistent state.
    fn lock(&self) -> MutexGuard<'_, LeagueEngine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_team(&self, req: &AddTeamRequest) -> Result<Team, LeagueError> {
        self.lock().add_team(&req.name, req.power)
    }

    pub fn teams(&self) -> TeamsPayload {
        TeamsPayload {
            teams: self.lock().teams().to_vec(),
        }
    }

    pub fn fixtures(&self) -> FixturesPayload {
        FixturesPayload::from(self.lock().schedule())
    }

    pub fn generate_fixtures(&self) -> Result<FixturesPayload, LeagueError> {
        let mut engine = self.lock();
        engine.generate_fixtures().map(FixturesPayload::from)
    }

    pub fn simulate_week(&self, req: &SimulateWeekRequest) -> Result<WeekPayload, LeagueError> {
        let mut engine = self.lock();
        if engine.schedule().is_empty() {
            return Err(LeagueError::NoSchedule);
        }
        let Some(index) = req.week.checked_sub(1) else {
            return Err(LeagueError::OutOfOrderWeek {
                requested: 0,
                next: engine.next_unplayed_week() + 1,
            });
        };

        let results: Vec<MatchView> = match engine.simulate_week(index) {
            Ok(week) => week.matches.iter().map(MatchView::from).collect(),
            Err(LeagueError::OutOfOrderWeek { requested, next }) => {
                return Err(LeagueError::OutOfOrderWeek {
                    requested: requested + 1,
                    next: next + 1,
                });
            }
            Err(err) => return Err(err),
        };
        Ok(WeekPayload {
            fixtures: FixturesPayload::from(engine.schedule()).fixtures,
            week: req.week,
            results,
        })
    }

    pub fn simulate_all(&self) -> Result<FixturesPayload, LeagueError> {
        let mut engine = self.lock();
        engine.simulate_all().map(FixturesPayload::from)
    }

    pub fn standings(&self) -> StandingsPayload {
        let (rows, snapshot, runs, seed) = {
            let engine = self.lock();
            (
                engine.standings(),
                engine.snapshot(),
                engine.prediction_runs(),
                engine.prediction_seed(),
            )
        };

        let odds = predict_champion(&snapshot, runs, seed);
        let predictions = if odds.is_empty() {
            Vec::new()
        } else {
            rows.iter()
                .map(|row| {
                    odds.iter()
                        .find(|p| p.name == row.name)
                        .map_or(0, |p| p.probability)
                })
                .collect()
        };

        StandingsPayload {
            standings: rows.iter().map(StandingView::from).collect(),
            predictions,
        }
    }

    pub fn status(&self) -> StatusPayload {
        StatusPayload::from(&*self.lock())
    }

    pub fn reset(&self) -> StatusPayload {
        let mut engine = self.lock();
        engine.reset();
        StatusPayload::from(&*engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_sim::MatchModel;

    fn service(teams: &[(&str, i64)]) -> LeagueService {
        let svc = LeagueService::new(LeagueEngine::with_seed(5, MatchModel::default(), 300));
        for (name, power) in teams {
            svc.add_team(&AddTeamRequest {
                name: name.to_string(),
                power: *power,
            })
            .unwrap();
        }
        svc
    }

    #[test]
    fn week_zero_is_rejected() {
        let svc = service(&[("A", 50), ("B", 50)]);
        svc.generate_fixtures().unwrap();
        assert_eq!(
            svc.simulate_week(&SimulateWeekRequest { week: 0 }).err(),
            Some(LeagueError::OutOfOrderWeek {
                requested: 0,
                next: 1
            })
        );
    }

    #[test]
    fn out_of_order_errors_use_client_week_numbers() {
        let svc = service(&[("A", 50), ("B", 50), ("C", 50), ("D", 50)]);
        svc.generate_fixtures().unwrap();
        assert_eq!(
            svc.simulate_week(&SimulateWeekRequest { week: 3 }).err(),
            Some(LeagueError::OutOfOrderWeek {
                requested: 3,
                next: 1
            })
        );
    }

    #[test]
    fn week_payload_carries_that_weeks_results() {
        let svc = service(&[("A", 50), ("B", 50), ("C", 50), ("D", 50)]);
        svc.generate_fixtures().unwrap();
        let payload = svc.simulate_week(&SimulateWeekRequest { week: 1 }).unwrap();
        assert_eq!(payload.week, 1);
        assert_eq!(payload.results.len(), 2);
        assert!(payload.results.iter().all(|m| m.played));
        assert_eq!(payload.fixtures[0].matches, payload.results);
        assert!(payload.fixtures[1].matches.iter().all(|m| !m.played));
    }

    #[test]
    fn predictions_line_up_with_standings() {
        let svc = service(&[("A", 90), ("B", 10), ("C", 30), ("D", 20)]);
        svc.generate_fixtures().unwrap();
        svc.simulate_all().unwrap();
        let payload = svc.standings();
        assert_eq!(payload.predictions.len(), payload.standings.len());
        assert_eq!(payload.predictions[0], 100);
        assert!(payload.predictions[1..].iter().all(|p| *p == 0));
    }

    #[test]
    fn unscheduled_standings_have_no_predictions() {
        let svc = service(&[("A", 50), ("B", 50)]);
        let payload = svc.standings();
        assert_eq!(payload.standings.len(), 2);
        assert!(payload.predictions.is_empty());
    }

    #[test]
    fn status_reports_next_week() {
        let svc = service(&[("A", 50), ("B", 50)]);
        svc.generate_fixtures().unwrap();
        svc.simulate_week(&SimulateWeekRequest { week: 1 }).unwrap();
        let status = svc.status();
        assert_eq!(status.status, LeagueStatus::InProgress);
        assert_eq!((status.week, status.weeks), (2, 2));
    }

    #[test]
    fn reset_returns_empty_status() {
        let svc = service(&[("A", 50), ("B", 50)]);
        svc.generate_fixtures().unwrap();
        svc.simulate_week(&SimulateWeekRequest { week: 1 }).unwrap();
        let status = svc.reset();
        assert_eq!(status.status, LeagueStatus::Empty);
        assert_eq!((status.week, status.weeks), (1, 0));
        assert_eq!(status, svc.status());
        assert!(svc.teams().teams.is_empty());
    }
}
