use serde::{Deserialize, Serialize};

use crate::error::LeagueError;
use crate::team::Team;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub home_goals: u8,
    pub away_goals: u8,
}

/// One scheduled meeting. Goals exist exactly when the match has been played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub home: Team,
    pub away: Team,
    pub result: Option<MatchResult>,
}

impl Fixture {
    fn unplayed(home: &Team, away: &Team) -> Self {
        Self {
            home: home.clone(),
            away: away.clone(),
            result: None,
        }
    }

    pub fn is_played(&self) -> bool {
        self.result.is_some()
    }

    pub fn involves(&self, name: &str) -> bool {
        self.home.name == name || self.away.name == name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Matchweek {
    pub matches: Vec<Fixture>,
}

impl Matchweek {
    pub fn is_played(&self) -> bool {
        self.matches.iter().all(Fixture::is_played)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schedule {
    weeks: Vec<Matchweek>,
}

impl Schedule {
    pub fn weeks(&self) -> &[Matchweek] {
        &self.weeks
    }

    pub(crate) fn weeks_mut(&mut self) -> &mut [Matchweek] {
        &mut self.weeks
    }

    pub fn week(&self, index: usize) -> Option<&Matchweek> {
        self.weeks.get(index)
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// 0-based index of the first week still to be played, `None` once the
    /// season is over.
    pub fn next_unplayed(&self) -> Option<usize> {
        self.weeks.iter().position(|w| !w.is_played())
    }

    pub fn is_complete(&self) -> bool {
        !self.is_empty() && self.next_unplayed().is_none()
    }

    pub fn fixtures(&self) -> impl Iterator<Item = &Fixture> {
        self.weeks.iter().flat_map(|w| w.matches.iter())
    }

    pub fn played_count(&self) -> usize {
        self.fixtures().filter(|f| f.is_played()).count()
    }

    pub fn remaining(&self) -> impl Iterator<Item = &Fixture> {
        self.fixtures().filter(|f| !f.is_played())
    }
}

/// Double round robin by the circle method.
///
/// The first team stays put while the others rotate one slot per round. An
/// odd roster gets an empty slot, and whoever faces it sits the week out.
/// The second half repeats the first half week for week with venues swapped.
pub fn generate_fixtures(teams: &[Team]) -> Result<Schedule, LeagueError> {
    if teams.len() < 2 {
        return Err(LeagueError::InsufficientTeams { found: teams.len() });
    }

    let mut slots: Vec<Option<&Team>> = teams.iter().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let m = slots.len();
    let rounds = m - 1;

    let mut first_half = Vec::with_capacity(rounds);
    for round in 0..rounds {
        let mut week = Matchweek::default();
        for i in 0..m / 2 {
            let (Some(a), Some(b)) = (slots[i], slots[m - 1 - i]) else {
                continue;
            };
            // Alternate the anchored team's venue so it is not at home all half.
            let (home, away) = if i == 0 && round % 2 == 1 { (b, a) } else { (a, b) };
            week.matches.push(Fixture::unplayed(home, away));
        }
        first_half.push(week);
        slots[1..].rotate_right(1);
    }

    let second_half: Vec<Matchweek> = first_half
        .iter()
        .map(|week| Matchweek {
            matches: week
                .matches
                .iter()
                .map(|f| Fixture::unplayed(&f.away, &f.home))
                .collect(),
        })
        .collect();

    let mut weeks = first_half;
    weeks.extend(second_half);
    Ok(Schedule { weeks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn roster(n: usize) -> Vec<Team> {
        (0..n)
            .map(|i| Team {
                name: format!("T{i}"),
                power: 50,
            })
            .collect()
    }

    #[test]
    fn rejects_fewer_than_two_teams() {
        assert_eq!(
            generate_fixtures(&roster(1)),
            Err(LeagueError::InsufficientTeams { found: 1 })
        );
        assert_eq!(
            generate_fixtures(&[]),
            Err(LeagueError::InsufficientTeams { found: 0 })
        );
    }

    #[test]
    fn two_teams_meet_once_at_each_venue() {
        let schedule = generate_fixtures(&roster(2)).unwrap();
        assert_eq!(schedule.len(), 2);
        let w1 = &schedule.weeks()[0].matches[0];
        let w2 = &schedule.weeks()[1].matches[0];
        assert_eq!((w1.home.name.as_str(), w1.away.name.as_str()), ("T0", "T1"));
        assert_eq!((w2.home.name.as_str(), w2.away.name.as_str()), ("T1", "T0"));
    }

    #[test]
    fn four_teams_give_six_weeks_of_two() {
        let schedule = generate_fixtures(&roster(4)).unwrap();
        assert_eq!(schedule.len(), 6);
        assert!(schedule.weeks().iter().all(|w| w.matches.len() == 2));
    }

    #[test]
    fn odd_roster_sits_one_team_out_each_week() {
        let schedule = generate_fixtures(&roster(3)).unwrap();
        assert_eq!(schedule.len(), 6);
        assert!(schedule.weeks().iter().all(|w| w.matches.len() == 1));

        let pairs: HashSet<(String, String)> = schedule
            .fixtures()
            .map(|f| (f.home.name.clone(), f.away.name.clone()))
            .collect();
        assert_eq!(pairs.len(), 6);
    }

    #[test]
    fn second_half_mirrors_first_half() {
        let schedule = generate_fixtures(&roster(4)).unwrap();
        let half = schedule.len() / 2;
        for w in 0..half {
            let first = &schedule.weeks()[w].matches;
            let second = &schedule.weeks()[w + half].matches;
            for (a, b) in first.iter().zip(second) {
                assert_eq!(a.home, b.away);
                assert_eq!(a.away, b.home);
            }
        }
    }

    #[test]
    fn fresh_schedule_is_unplayed() {
        let schedule = generate_fixtures(&roster(4)).unwrap();
        assert_eq!(schedule.next_unplayed(), Some(0));
        assert_eq!(schedule.played_count(), 0);
        assert!(!schedule.is_complete());
        assert_eq!(schedule.remaining().count(), 12);
    }
}
