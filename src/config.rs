use std::env;

use log::LevelFilter;

use crate::match_sim::MatchModel;
use crate::predict::DEFAULT_PREDICTION_RUNS;

const MAX_PREDICTION_RUNS: usize = 100_000;
// Lower bounds stay positive so power and venue always move the odds.
const MIN_HOME_ADV: f64 = 0.05;
const MIN_K_STRENGTH: f64 = 0.001;

/// Runtime knobs, read from the environment (after `.env.local`/`.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct LeagueConfig {
    /// Fixed seed for reproducible seasons; random when unset.
    pub seed: Option<u64>,
    pub prediction_runs: usize,
    pub model: MatchModel,
    pub log_level: LevelFilter,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            seed: None,
            prediction_runs: DEFAULT_PREDICTION_RUNS,
            model: MatchModel::default(),
            log_level: LevelFilter::Info,
        }
    }
}

impl LeagueConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        let seed = lookup("LEAGUE_SEED").and_then(|val| val.trim().parse::<u64>().ok());
        let prediction_runs = lookup("LEAGUE_PREDICTION_RUNS")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(d.prediction_runs)
            .clamp(1, MAX_PREDICTION_RUNS);

        // Extreme combinations can still push the weaker side onto the expected-goals floor.
        let model = MatchModel {
            goals_total_base: parse_f64(&lookup, "LEAGUE_GOALS_BASE")
                .unwrap_or(d.model.goals_total_base)
                .clamp(1.0, 6.0),
            home_adv_goals: parse_f64(&lookup, "LEAGUE_HOME_ADV")
                .unwrap_or(d.model.home_adv_goals)
                .clamp(MIN_HOME_ADV, 0.5),
            k_strength: parse_f64(&lookup, "LEAGUE_K_STRENGTH")
                .unwrap_or(d.model.k_strength)
                .clamp(MIN_K_STRENGTH, 0.02),
        };

        let log_level = lookup("LEAGUE_LOG")
            .and_then(|val| val.trim().parse::<LevelFilter>().ok())
            .unwrap_or(d.log_level);

        Self {
            seed,
            prediction_runs,
            model,
            log_level,
        }
    }
}

fn parse_f64(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<f64> {
    lookup(key)
        .and_then(|val| val.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
