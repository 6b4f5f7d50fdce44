mod agents;

pub use agents::{AgentBlueprint, AgentError};

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use fox_bot::Policy;
use fox_core::game::record::GameRecord;
use fox_core::model::player::Player;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;

use crate::analytics::{AnalyticsCollector, AnalyticsError, SeatResult};
use crate::config::{BenchConfig, ResolvedOutputs};
use crate::game::{GameError, GameOutcome, play_game};
use crate::telemetry::{
    TelemetryError, TelemetryOutputs, append_highlights_to_markdown, write_summary_outputs,
};

/// Plays every configured deal, once per seating, between the two agents.
pub struct TournamentRunner {
    config: BenchConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
    pub telemetry_outputs: Option<TelemetryOutputs>,
}

impl TournamentRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;
        if agents.len() != 2 {
            return Err(RunnerError::SeatCount {
                found: agents.len(),
            });
        }

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            agents,
        })
    }

    /// Execute the run, streaming one JSONL row per agent per game.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut analytics = AnalyticsCollector::new(&self.config);
        let mut games_played = 0usize;
        let mut rows_written = 0usize;

        for game_index in 0..self.config.games.count {
            let deal_seed = rng.next_u64();

            for (seating_index, seating) in self.config.games.seatings().iter().enumerate() {
                let game_id = format!("G{game_index:05}_S{seating_index}");
                let mut players: [Box<dyn Policy>; 2] = [
                    self.agents[seating[0]].spawn_policy(deal_seed),
                    self.agents[seating[1]].spawn_policy(deal_seed.rotate_left(17)),
                ];
                let outcome = play_game(GameRecord::with_seed(deal_seed), &mut players, &game_id)
                    .map_err(|source| RunnerError::Game {
                        game_id: game_id.clone(),
                        source,
                    })?;

                let seats = seat_results(&outcome, seating, &self.agents);
                analytics.record_game(&game_id, &seats)?;
                rows_written += write_game_rows(
                    &mut writer,
                    &self.config.run_id,
                    &game_id,
                    game_index,
                    seating_index,
                    deal_seed,
                    &outcome,
                    &seats,
                )?;
                games_played += 1;
            }
        }

        writer.flush()?;

        let summary = analytics.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;

        let report_dir = self.outputs.report_dir();
        let telemetry_path = self
            .logging_enabled
            .then(|| report_dir.join("telemetry.jsonl"));
        let telemetry_outputs = match telemetry_path.as_ref() {
            Some(path) => write_summary_outputs(path, &report_dir)?,
            None => None,
        };
        if let Some(outputs) = telemetry_outputs.as_ref() {
            append_highlights_to_markdown(&self.outputs.summary_md, outputs)?;
        }

        Ok(RunSummary {
            games_played,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
            telemetry_outputs,
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Per-player results, indexed by player.
fn seat_results(
    outcome: &GameOutcome,
    seating: &[usize; 2],
    agents: &[AgentBlueprint],
) -> Vec<SeatResult> {
    let winner = outcome.score.winner();
    Player::BOTH
        .iter()
        .map(|&player| {
            let decisions = outcome.decisions[player.index()];
            SeatResult {
                agent_name: agents[seating[player.index()]].name.clone(),
                points: outcome.score.points(player),
                tricks: outcome.score.tricks(player),
                won: winner == Some(player),
                decisions: decisions.decisions,
                total_ms: decisions.total_ms,
            }
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn write_game_rows(
    writer: &mut BufWriter<File>,
    run_id: &str,
    game_id: &str,
    game_index: usize,
    seating_index: usize,
    deal_seed: u64,
    outcome: &GameOutcome,
    seats: &[SeatResult],
) -> Result<usize, RunnerError> {
    let mut rows_written = 0usize;
    for player in Player::BOTH {
        let seat = &seats[player.index()];
        let opponent = &seats[player.opponent().index()];
        let decisions = outcome.decisions[player.index()];
        let row = GameLogRow {
            run_id,
            game_id,
            game_index,
            seating_index,
            deal_seed,
            seat: player.to_string(),
            agent: &seat.agent_name,
            opponent: &opponent.agent_name,
            points: seat.points,
            opponent_points: opponent.points,
            tricks: seat.tricks,
            tier: outcome.score.tier(player).as_str(),
            won: seat.won,
            decisions: decisions.decisions,
            speed_ms_turn: decisions.avg_ms_per_decision,
        };

        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        rows_written += 1;
    }
    Ok(rows_written)
}

#[derive(Serialize)]
struct GameLogRow<'a> {
    run_id: &'a str,
    game_id: &'a str,
    game_index: usize,
    seating_index: usize,
    deal_seed: u64,
    seat: String,
    agent: &'a str,
    opponent: &'a str,
    points: u32,
    opponent_points: u32,
    tricks: usize,
    tier: &'static str,
    won: bool,
    decisions: u32,
    speed_ms_turn: f64,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("game {game_id} failed: {source}")]
    Game {
        game_id: String,
        #[source]
        source: GameError,
    },
    #[error("configuration requires exactly 2 agents but found {found}")]
    SeatCount { found: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
    #[error("telemetry summarisation failed: {0}")]
    Telemetry(#[from] TelemetryError),
}
