use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::error::LeagueError;
use crate::service::{ErrorPayload, LeagueService, SimulateWeekRequest};
use crate::state::{Delta, LeagueCommand};

/// Runs league commands off the draw loop and reports back as deltas.
pub fn spawn_league_worker(
    service: Arc<LeagueService>,
    tx: Sender<Delta>,
    cmd_rx: Receiver<LeagueCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let _ = tx.send(Delta::SetTeams(service.teams().teams));
        let _ = tx.send(Delta::SetFixtures(service.fixtures().fixtures));
        let _ = tx.send(Delta::SetStatus(service.status()));

        while let Ok(cmd) = cmd_rx.recv() {
            handle_command(&service, cmd, &tx);
            let _ = tx.send(Delta::CommandFinished);
        }
    })
}

pub fn handle_command(service: &LeagueService, cmd: LeagueCommand, tx: &Sender<Delta>) {
    match cmd {
        LeagueCommand::AddTeam(req) => match service.add_team(&req) {
            Ok(team) => {
                let _ = tx.send(Delta::Log(format!(
                    "[INFO] Team added: {} (power {})",
                    team.name, team.power
                )));
                let _ = tx.send(Delta::SetTeams(service.teams().teams));
                // A roster change always leaves the league without fixtures.
                let _ = tx.send(Delta::SetFixtures(service.fixtures().fixtures));
            }
            Err(err) => send_failure(tx, "Add team", &err),
        },
        LeagueCommand::GenerateFixtures => match service.generate_fixtures() {
            Ok(payload) => {
                let _ = tx.send(Delta::Log(format!(
                    "[INFO] Fixtures generated: {} weeks",
                    payload.fixtures.len()
                )));
                let _ = tx.send(Delta::SetFixtures(payload.fixtures));
                refresh_standings(service, tx);
            }
            Err(err) => send_failure(tx, "Generate fixtures", &err),
        },
        LeagueCommand::SimulateWeek { week } => {
            match service.simulate_week(&SimulateWeekRequest { week }) {
                Ok(payload) => {
                    let _ = tx.send(Delta::Log(format!(
                        "[INFO] Week {} played: {}",
                        payload.week,
                        payload
                            .results
                            .iter()
                            .map(|m| format!(
                                "{} {}-{} {}",
                                m.home.name,
                                m.home_goals.unwrap_or(0),
                                m.away_goals.unwrap_or(0),
                                m.away.name
                            ))
                            .collect::<Vec<_>>()
                            .join(", ")
                    )));
                    let _ = tx.send(Delta::WeekPlayed {
                        week: payload.week,
                        fixtures: payload.fixtures,
                        results: payload.results,
                    });
                    refresh_standings(service, tx);
                }
                Err(err) => send_failure(tx, "Simulate week", &err),
            }
        }
        LeagueCommand::SimulateAll => match service.simulate_all() {
            Ok(payload) => {
                let _ = tx.send(Delta::Log("[INFO] Season simulated to the end".to_string()));
                let _ = tx.send(Delta::SeasonPlayed(payload.fixtures));
                refresh_standings(service, tx);
            }
            Err(err) => send_failure(tx, "Simulate all", &err),
        },
        LeagueCommand::RefreshStandings => refresh_standings(service, tx),
        LeagueCommand::Reset => {
            service.reset();
            let _ = tx.send(Delta::Reset);
            let _ = tx.send(Delta::Log("[INFO] League reset".to_string()));
        }
    }
    let _ = tx.send(Delta::SetStatus(service.status()));
}

fn refresh_standings(service: &LeagueService, tx: &Sender<Delta>) {
    let started = Instant::now();
    let payload = service.standings();
    if !payload.predictions.is_empty() {
        let _ = tx.send(Delta::Log(format!(
            "[INFO] Title odds refreshed in {} ms",
            started.elapsed().as_millis()
        )));
    }
    let _ = tx.send(Delta::SetStandings(payload));
}

fn send_failure(tx: &Sender<Delta>, action: &'static str, err: &LeagueError) {
    let _ = tx.send(Delta::Failed {
        action,
        error: ErrorPayload::from(err),
    });
}
