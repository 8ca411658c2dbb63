pub mod config;
pub mod engine;
pub mod error;
pub mod fixtures;
pub mod logging;
pub mod match_sim;
pub mod predict;
pub mod service;
pub mod standings;
pub mod state;
pub mod team;
pub mod worker;
