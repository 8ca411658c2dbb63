use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::LeagueConfig;
use crate::error::LeagueError;
use crate::fixtures::{Matchweek, Schedule, generate_fixtures};
use crate::match_sim::MatchModel;
use crate::predict::{LeagueSnapshot, PredictionRow, predict_champion};
use crate::standings::{StandingRow, compute_standings};
use crate::team::{Team, TeamRegistry};

// Keeps prediction streams apart from the live match stream.
const PREDICTION_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeagueStatus {
    Empty,
    Scheduled,
    InProgress,
    Completed,
}

/// Owner of all mutable league state: roster, schedule and the match RNG.
#[derive(Debug, Clone)]
pub struct LeagueEngine {
    registry: TeamRegistry,
    schedule: Schedule,
    model: MatchModel,
    rng: ChaCha8Rng,
    prediction_runs: usize,
    prediction_seed: u64,
}

impl LeagueEngine {
    pub fn new(config: &LeagueConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::with_seed(seed, config.model, config.prediction_runs)
    }

    pub fn with_seed(seed: u64, model: MatchModel, prediction_runs: usize) -> Self {
        Self {
            registry: TeamRegistry::new(),
            schedule: Schedule::default(),
            model,
            rng: ChaCha8Rng::seed_from_u64(seed),
            prediction_runs: prediction_runs.max(1),
            prediction_seed: seed ^ PREDICTION_SALT,
        }
    }

    pub fn status(&self) -> LeagueStatus {
        if self.schedule.is_empty() {
            LeagueStatus::Empty
        } else if self.schedule.is_complete() {
            LeagueStatus::Completed
        } else if self.schedule.played_count() == 0 {
            LeagueStatus::Scheduled
        } else {
            LeagueStatus::InProgress
        }
    }

    pub fn teams(&self) -> &[Team] {
        self.registry.list()
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn prediction_runs(&self) -> usize {
        self.prediction_runs
    }

    /// 0-based index of the next week to play; equals the week count once
    /// the season is over.
    pub fn next_unplayed_week(&self) -> usize {
        self.schedule
            .next_unplayed()
            .unwrap_or_else(|| self.schedule.len())
    }

    /// Week `index` (0-based) once it has been played.
    pub fn week_results(&self, index: usize) -> Option<&Matchweek> {
        self.schedule.week(index).filter(|w| w.is_played())
    }

    /// Registers a team. A roster change invalidates any existing schedule.
    pub fn add_team(&mut self, name: &str, power: i64) -> Result<Team, LeagueError> {
        let team = self.registry.add(name, power)?;
        info!("team added: {} (power {})", team.name, team.power);
        if !self.schedule.is_empty() {
            warn!(
                "roster changed after fixtures were generated; dropping {} weeks",
                self.schedule.len()
            );
            self.schedule = Schedule::default();
        }
        Ok(team)
    }

    /// Builds a fresh double round robin, discarding any previous season.
    pub fn generate_fixtures(&mut self) -> Result<&Schedule, LeagueError> {
        let schedule = generate_fixtures(self.registry.list())?;
        if self.schedule.played_count() > 0 {
            warn!(
                "regenerating fixtures discards {} played matches",
                self.schedule.played_count()
            );
        }
        info!(
            "fixtures generated: {} weeks for {} teams",
            schedule.len(),
            self.registry.len()
        );
        self.schedule = schedule;
        Ok(&self.schedule)
    }

    /// Plays week `index` (0-based) if it is the next one due. Weeks already
    /// played come back unchanged; later weeks are refused.
    pub fn simulate_week(&mut self, index: usize) -> Result<&Matchweek, LeagueError> {
        if self.schedule.is_empty() {
            return Err(LeagueError::NoSchedule);
        }
        let next = self.next_unplayed_week();
        if index < next {
            return Ok(&self.schedule.weeks()[index]);
        }
        if index > next || index >= self.schedule.len() {
            return Err(LeagueError::OutOfOrderWeek {
                requested: index,
                next,
            });
        }

        let results: Vec<_> = self.schedule.weeks()[index]
            .matches
            .iter()
            .map(|f| self.model.simulate(&f.home, &f.away, &mut self.rng))
            .collect();

        let week = &mut self.schedule.weeks_mut()[index];
        for (fixture, result) in week.matches.iter_mut().zip(results) {
            debug!(
                "week {}: {} {}-{} {}",
                index + 1,
                fixture.home.name,
                result.home_goals,
                result.away_goals,
                fixture.away.name
            );
            fixture.result = Some(result);
        }
        info!("week {} played", index + 1);
        Ok(&self.schedule.weeks()[index])
    }

    /// Plays every remaining week in order.
    pub fn simulate_all(&mut self) -> Result<&Schedule, LeagueError> {
        if self.schedule.is_empty() {
            return Err(LeagueError::NoSchedule);
        }
        while let Some(next) = self.schedule.next_unplayed() {
            self.simulate_week(next)?;
        }
        Ok(&self.schedule)
    }

    pub fn standings(&self) -> Vec<StandingRow> {
        compute_standings(self.registry.list(), &self.schedule)
    }

    /// Detached copy for prediction work done outside any lock.
    pub fn snapshot(&self) -> LeagueSnapshot {
        LeagueSnapshot {
            teams: self.registry.list().to_vec(),
            schedule: self.schedule.clone(),
            model: self.model,
        }
    }

    pub fn prediction_seed(&self) -> u64 {
        self.prediction_seed
    }

    pub fn predict_champion(&self) -> Vec<PredictionRow> {
        predict_champion(&self.snapshot(), self.prediction_runs, self.prediction_seed)
    }

    pub fn reset(&mut self) {
        self.registry.clear();
        self.schedule = Schedule::default();
        info!("league reset");
    }
}
