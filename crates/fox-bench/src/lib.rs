pub mod analytics;
pub mod config;
pub mod game;
pub mod logging;
pub mod telemetry;
pub mod tournament;
