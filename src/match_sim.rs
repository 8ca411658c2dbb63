use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::fixtures::MatchResult;
use crate::team::Team;

const GOALS_TOTAL_BASE: f64 = 2.60;
const HOME_ADV_GOALS: f64 = 0.25;
// Goal-difference swing per power point.
const K_STRENGTH: f64 = 0.02;

const MIN_LAMBDA: f64 = 0.05;
pub const MAX_GOALS: u32 = 10;

/// Poisson goal model driven by the power gap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchModel {
    pub goals_total_base: f64,
    pub home_adv_goals: f64,
    pub k_strength: f64,
}

impl Default for MatchModel {
    fn default() -> Self {
        Self {
            goals_total_base: GOALS_TOTAL_BASE,
            home_adv_goals: HOME_ADV_GOALS,
            k_strength: K_STRENGTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeProbs {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
}

impl MatchModel {
    /// Expected goals for each side.
    pub fn expected_goals(&self, home: &Team, away: &Team) -> (f64, f64) {
        let gap = f64::from(home.power) - f64::from(away.power);
        let diff = self.home_adv_goals + self.k_strength * gap;
        let lambda_home = ((self.goals_total_base / 2.0) + (diff / 2.0)).max(MIN_LAMBDA);
        let lambda_away = ((self.goals_total_base / 2.0) - (diff / 2.0)).max(MIN_LAMBDA);
        (lambda_home, lambda_away)
    }

    pub fn outcome_probabilities(&self, home: &Team, away: &Team) -> OutcomeProbs {
        let (lambda_home, lambda_away) = self.expected_goals(home, away);
        let pmf_h = poisson_pmf(lambda_home, MAX_GOALS);
        let pmf_a = poisson_pmf(lambda_away, MAX_GOALS);

        let mut home_win = 0.0;
        let mut draw = 0.0;
        let mut away_win = 0.0;
        for (i, p_i) in pmf_h.iter().enumerate() {
            for (j, p_j) in pmf_a.iter().enumerate() {
                let p = p_i * p_j;
                if i > j {
                    home_win += p;
                } else if i < j {
                    away_win += p;
                } else {
                    draw += p;
                }
            }
        }

        // Guard against tiny float drift.
        let sum = home_win + draw + away_win;
        OutcomeProbs {
            home_win: home_win / sum,
            draw: draw / sum,
            away_win: away_win / sum,
        }
    }

    /// Plays one match. Each side's goals come from a single uniform draw
    /// mapped through its truncated pmf, so the call always terminates and
    /// consumes exactly two values from `rng`.
    pub fn simulate<R: Rng + ?Sized>(&self, home: &Team, away: &Team, rng: &mut R) -> MatchResult {
        let (lambda_home, lambda_away) = self.expected_goals(home, away);
        let home_goals = sample_goals(&poisson_pmf(lambda_home, MAX_GOALS), rng);
        let away_goals = sample_goals(&poisson_pmf(lambda_away, MAX_GOALS), rng);
        MatchResult {
            home_goals,
            away_goals,
        }
    }
}

/// Poisson pmf over `0..=max_k`; the tail beyond `max_k` is folded into the
/// last bucket so the vector sums to 1.
fn poisson_pmf(lambda: f64, max_k: u32) -> Vec<f64> {
    let max_k = max_k as usize;
    let mut out = vec![0.0; max_k + 1];
    let lambda = lambda.max(0.0);

    out[0] = (-lambda).exp();
    for k in 1..=max_k {
        out[k] = out[k - 1] * lambda / k as f64;
    }

    let sum: f64 = out.iter().sum();
    if sum < 1.0 {
        out[max_k] += 1.0 - sum;
    }
    out
}

fn sample_goals<R: Rng + ?Sized>(pmf: &[f64], rng: &mut R) -> u8 {
    let u: f64 = rng.gen_range(0.0..1.0);
    let mut acc = 0.0;
    for (k, p) in pmf.iter().enumerate() {
        acc += p;
        if u < acc {
            return k as u8;
        }
    }
    pmf.len().saturating_sub(1) as u8
}
