use thiserror::Error;

/// Precondition failures surfaced to whoever drives the league.
///
/// None of these are transient; an operation that returns one has left the
/// league untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeagueError {
    #[error("team name must not be empty")]
    EmptyName,
    #[error("team \"{0}\" is already registered")]
    DuplicateName(String),
    #[error("power {0} is outside 0..=100")]
    InvalidPower(i64),
    #[error("roster is full ({max} teams)")]
    RosterFull { max: usize },
    #[error("at least 2 teams are needed for fixtures ({found} registered)")]
    InsufficientTeams { found: usize },
    #[error("no fixtures have been generated")]
    NoSchedule,
    #[error("week {requested} cannot be played yet (next playable week is {next})")]
    OutOfOrderWeek { requested: usize, next: usize },
}

impl LeagueError {
    /// Stable code handed to callers that render their own messages.
    pub fn kind(&self) -> &'static str {
        match self {
            LeagueError::EmptyName => "EmptyName",
            LeagueError::DuplicateName(_) => "DuplicateName",
            LeagueError::InvalidPower(_) => "InvalidPower",
            LeagueError::RosterFull { .. } => "RosterFull",
            LeagueError::InsufficientTeams { .. } => "InsufficientTeams",
            LeagueError::NoSchedule => "NoSchedule",
            LeagueError::OutOfOrderWeek { .. } => "OutOfOrderWeek",
        }
    }
}
