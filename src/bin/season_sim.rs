use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use league_terminal::config::LeagueConfig;
use league_terminal::logging::{self, LeagueLogger};
use league_terminal::service::{AddTeamRequest, LeagueService, SimulateWeekRequest};

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let config = LeagueConfig::from_env();
    logging::install(LeagueLogger::stderr(config.log_level))?;

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/roster.json"));

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("reading roster {}", path.display()))?;
    let roster: Vec<AddTeamRequest> =
        serde_json::from_str(&raw).with_context(|| format!("parsing roster {}", path.display()))?;

    let service = LeagueService::from_config(&config);
    for req in &roster {
        service
            .add_team(req)
            .with_context(|| format!("adding team {}", req.name))?;
    }

    let fixtures = service.generate_fixtures()?;
    println!("{}", serde_json::to_string_pretty(&fixtures)?);

    // Week by week so every intermediate table and prediction is printed.
    for week in 1..=fixtures.fixtures.len() {
        let played = service.simulate_week(&SimulateWeekRequest { week })?;
        println!("{}", serde_json::to_string_pretty(&played.results)?);
        println!("{}", serde_json::to_string_pretty(&service.standings())?);
    }

    println!("{}", serde_json::to_string_pretty(&service.status())?);
    Ok(())
}
