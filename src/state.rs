use std::collections::VecDeque;

use crate::engine::LeagueStatus;
use crate::service::{
    AddTeamRequest, ErrorPayload, MatchView, StandingView, StandingsPayload, StatusPayload,
    WeekView,
};
use crate::team::{MAX_TEAMS, Team};

const MAX_LOGS: usize = 200;
const DEFAULT_FORM_POWER: &str = "50";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Fixtures,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Power,
}

/// Add-team form. Power is kept as typed so the engine gets to reject it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamForm {
    pub active: bool,
    pub field: FormField,
    pub name: String,
    pub power: String,
}

impl Default for TeamForm {
    fn default() -> Self {
        Self {
            active: false,
            field: FormField::Name,
            name: String::new(),
            power: DEFAULT_FORM_POWER.to_string(),
        }
    }
}

impl TeamForm {
    pub fn push_char(&mut self, c: char) {
        match self.field {
            FormField::Name => self.name.push(c),
            FormField::Power => {
                if c.is_ascii_digit() || (c == '-' && self.power.is_empty()) {
                    self.power.push(c);
                }
            }
        }
    }

    pub fn backspace(&mut self) {
        match self.field {
            FormField::Name => self.name.pop(),
            FormField::Power => self.power.pop(),
        };
    }

    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            FormField::Name => FormField::Power,
            FormField::Power => FormField::Name,
        };
    }

    pub fn nudge_power(&mut self, step: i64) {
        let current = self.power.parse::<i64>().unwrap_or(50);
        self.power = (current + step).clamp(0, 100).to_string();
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub status: LeagueStatus,
    pub teams: Vec<Team>,
    pub fixtures: Vec<WeekView>,
    pub standings: Vec<StandingView>,
    pub predictions: Vec<u8>,
    pub week_results: Vec<MatchView>,
    pub results_week: Option<usize>,
    /// Next week to simulate, 1-based like the week numbers on screen.
    pub current_week: usize,
    pub pending: usize,
    pub form: TeamForm,
    pub fixtures_scroll: u16,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Dashboard,
            status: LeagueStatus::Empty,
            teams: Vec::new(),
            fixtures: Vec::new(),
            standings: Vec::new(),
            predictions: Vec::new(),
            week_results: Vec::new(),
            results_week: None,
            current_week: 1,
            pending: 0,
            form: TeamForm::default(),
            fixtures_scroll: 0,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        self.logs.push_back(format!("{stamp} {}", msg.into()));
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn busy(&self) -> bool {
        self.pending > 0
    }

    pub fn can_add_team(&self) -> bool {
        self.teams.len() < MAX_TEAMS
    }

    pub fn can_generate(&self) -> bool {
        self.teams.len() >= 2
    }

    pub fn can_simulate_week(&self) -> bool {
        !self.fixtures.is_empty() && self.current_week <= self.fixtures.len()
    }

    pub fn season_over(&self) -> bool {
        !self.fixtures.is_empty() && self.current_week > self.fixtures.len()
    }

    pub fn open_form(&mut self) {
        if !self.can_add_team() {
            self.push_log(format!("[WARN] Roster is full ({MAX_TEAMS} teams)"));
            return;
        }
        self.form.active = true;
        self.form.field = FormField::Name;
    }

    pub fn close_form(&mut self) {
        self.form = TeamForm::default();
    }

    /// Turns the form into a request, or logs why it cannot be sent.
    pub fn take_form_request(&mut self) -> Option<AddTeamRequest> {
        if self.form.name.trim().is_empty() {
            self.push_log("[WARN] Team name is required");
            self.form.field = FormField::Name;
            return None;
        }
        let Ok(power) = self.form.power.trim().parse::<i64>() else {
            self.push_log(format!("[WARN] Power \"{}\" is not a number", self.form.power));
            self.form.field = FormField::Power;
            return None;
        };
        let req = AddTeamRequest {
            name: self.form.name.clone(),
            power,
        };
        self.close_form();
        Some(req)
    }

    pub fn scroll_fixtures_down(&mut self, max_scroll: u16) {
        self.fixtures_scroll = self.fixtures_scroll.saturating_add(1).min(max_scroll);
    }

    pub fn scroll_fixtures_up(&mut self) {
        self.fixtures_scroll = self.fixtures_scroll.saturating_sub(1);
    }

    /// Prediction for a standings row, if the league has one.
    pub fn prediction_for(&self, standings_index: usize) -> Option<u8> {
        self.predictions.get(standings_index).copied()
    }
}

/// 1-based number of the first week with an unplayed match.
pub fn next_week_number(fixtures: &[WeekView]) -> usize {
    fixtures
        .iter()
        .position(|w| w.matches.iter().any(|m| !m.played))
        .unwrap_or(fixtures.len())
        + 1
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetTeams(Vec<Team>),
    SetFixtures(Vec<WeekView>),
    WeekPlayed {
        week: usize,
        fixtures: Vec<WeekView>,
        results: Vec<MatchView>,
    },
    SeasonPlayed(Vec<WeekView>),
    SetStandings(StandingsPayload),
    SetStatus(StatusPayload),
    Reset,
    Failed {
        action: &'static str,
        error: ErrorPayload,
    },
    CommandFinished,
    Log(String),
}

#[derive(Debug, Clone)]
pub enum LeagueCommand {
    AddTeam(AddTeamRequest),
    GenerateFixtures,
    SimulateWeek { week: usize },
    SimulateAll,
    RefreshStandings,
    Reset,
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetTeams(teams) => {
            state.teams = teams;
            if !state.can_add_team() {
                state.form.active = false;
            }
        }
        Delta::SetFixtures(fixtures) => {
            state.current_week = next_week_number(&fixtures);
            state.fixtures = fixtures;
            state.week_results.clear();
            state.results_week = None;
            state.standings.clear();
            state.predictions.clear();
            state.fixtures_scroll = 0;
        }
        Delta::WeekPlayed {
            week,
            fixtures,
            results,
        } => {
            state.fixtures = fixtures;
            state.week_results = results;
            state.results_week = Some(week);
            // Replaying an earlier week must not move the cursor back.
            state.current_week = state.current_week.max(week + 1);
        }
        Delta::SeasonPlayed(fixtures) => {
            let last_played = fixtures
                .iter()
                .rposition(|w| w.matches.iter().any(|m| m.played));
            match last_played {
                Some(i) => {
                    state.week_results = fixtures[i].matches.clone();
                    state.results_week = Some(i + 1);
                }
                None => {
                    state.week_results.clear();
                    state.results_week = None;
                }
            }
            state.current_week = next_week_number(&fixtures);
            state.fixtures = fixtures;
        }
        Delta::SetStandings(payload) => {
            state.standings = payload.standings;
            state.predictions = payload.predictions;
        }
        Delta::SetStatus(status) => {
            state.status = status.status;
            state.current_week = status.week;
        }
        Delta::Reset => {
            let logs = std::mem::take(&mut state.logs);
            let help = state.help_overlay;
            *state = AppState::new();
            state.logs = logs;
            state.help_overlay = help;
        }
        Delta::Failed { action, error } => {
            state.push_log(format!("[WARN] {action} failed ({}): {}", error.error, error.message));
        }
        Delta::CommandFinished => state.pending = state.pending.saturating_sub(1),
        Delta::Log(msg) => state.push_log(msg),
    }
}

pub fn status_label(status: LeagueStatus) -> &'static str {
    match status {
        LeagueStatus::Empty => "No fixtures",
        LeagueStatus::Scheduled => "Scheduled",
        LeagueStatus::InProgress => "In progress",
        LeagueStatus::Completed => "Completed",
    }
}
