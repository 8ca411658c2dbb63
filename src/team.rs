use serde::{Deserialize, Serialize};

use crate::error::LeagueError;

pub const MAX_TEAMS: usize = 4;
pub const MIN_POWER: i64 = 0;
pub const MAX_POWER: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub power: u8,
}

/// Roster in registration order. Names are the natural key.
#[derive(Debug, Clone, Default)]
pub struct TeamRegistry {
    teams: Vec<Team>,
}

impl TeamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, power: i64) -> Result<Team, LeagueError> {
        if name.trim().is_empty() {
            return Err(LeagueError::EmptyName);
        }
        if !(MIN_POWER..=MAX_POWER).contains(&power) {
            return Err(LeagueError::InvalidPower(power));
        }
        if self.teams.len() >= MAX_TEAMS {
            return Err(LeagueError::RosterFull { max: MAX_TEAMS });
        }
        if self.contains(name) {
            return Err(LeagueError::DuplicateName(name.to_string()));
        }

        let team = Team {
            name: name.to_string(),
            power: power as u8,
        };
        self.teams.push(team.clone());
        Ok(team)
    }

    pub fn list(&self) -> &[Team] {
        &self.teams
    }

    pub fn contains(&self, name: &str) -> bool {
        self.teams.iter().any(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn clear(&mut self) {
        self.teams.clear();
    }
}
