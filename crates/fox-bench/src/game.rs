//! Self-play loop: each policy only ever sees its own redacted record.

use std::time::{Duration, Instant};

use fox_bot::Policy;
use fox_core::game::record::GameRecord;
use fox_core::game::rules::LegalityError;
use fox_core::model::player::Player;
use fox_core::model::score::FinalScore;
use thiserror::Error;
use tracing::{Level, event};

#[derive(Debug, Error)]
pub enum GameError {
    #[error("{policy} returned no move for {player} in an unfinished game")]
    NoMove { player: Player, policy: &'static str },
    #[error("{policy} chose an illegal move for {player}: {source}")]
    Illegal {
        player: Player,
        policy: &'static str,
        #[source]
        source: LegalityError,
    },
    #[error("finished game produced no score")]
    Unscored,
}

#[derive(Debug, Default)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) -> f64 {
        self.total += duration;
        self.decisions += 1;
        duration.as_secs_f64() * 1000.0
    }

    fn finalize(&self) -> DecisionSummary {
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.decisions)
        };

        DecisionSummary {
            decisions: self.decisions,
            avg_ms_per_decision: avg_ms,
            total_ms: self.total.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

#[derive(Debug, Clone)]
pub struct GameOutcome {
    pub record: GameRecord,
    pub score: FinalScore,
    /// Indexed by player.
    pub decisions: [DecisionSummary; 2],
}

/// Plays `record` to the end, asking `players[p]` for every move of `p`.
pub fn play_game(
    mut record: GameRecord,
    players: &mut [Box<dyn Policy>; 2],
    label: &str,
) -> Result<GameOutcome, GameError> {
    let mut metrics = [DecisionMetrics::default(), DecisionMetrics::default()];

    loop {
        let state = record.derive();
        if state.is_over() {
            break;
        }
        let player = state.current_player();
        let policy = &mut players[player.index()];
        let view = record.player_view(player);

        let start = Instant::now();
        let mv = policy.choose(&view).ok_or(GameError::NoMove {
            player,
            policy: policy.name(),
        })?;
        let elapsed_ms = metrics[player.index()].record(start.elapsed());

        record
            .push_move(player, mv.card)
            .map_err(|source| GameError::Illegal {
                player,
                policy: policy.name(),
                source,
            })?;

        if tracing::enabled!(Level::DEBUG) {
            event!(
                target: "fox_bench::game",
                Level::DEBUG,
                game = label,
                player = %player,
                policy = policy.name(),
                card = %mv.card,
                elapsed_ms
            );
        }
    }

    let score = *record.derive().score().ok_or(GameError::Unscored)?;
    log_game(label, players, &score);

    Ok(GameOutcome {
        record,
        score,
        decisions: [metrics[0].finalize(), metrics[1].finalize()],
    })
}

fn log_game(label: &str, players: &[Box<dyn Policy>; 2], score: &FinalScore) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }
    event!(
        target: "fox_bench::game",
        Level::INFO,
        game = label,
        p0 = players[0].name(),
        p1 = players[1].name(),
        p0_points = score.points(Player::Zero),
        p1_points = score.points(Player::One),
        p0_tier = score.tier(Player::Zero).as_str(),
        p1_tier = score.tier(Player::One).as_str(),
    );
}

#[cfg(test)]
mod tests {
    use super::{GameError, play_game};
    use fox_bot::{Policy, RandomPolicy};
    use fox_core::game::record::GameRecord;
    use fox_core::game::rules::Move;
    use fox_core::model::player::Player;

    struct Resigns;

    impl Policy for Resigns {
        fn name(&self) -> &'static str {
            "resigns"
        }

        fn choose(&mut self, _view: &GameRecord) -> Option<Move> {
            None
        }
    }

    #[test]
    fn random_players_finish_with_thirteen_tricks() {
        let mut players: [Box<dyn Policy>; 2] = [
            Box::new(RandomPolicy::with_seed(1)),
            Box::new(RandomPolicy::with_seed(2)),
        ];
        let outcome = play_game(GameRecord::with_seed(10), &mut players, "g0").unwrap();
        assert!(outcome.record.derive().is_over());
        assert_eq!(
            outcome.score.tricks(Player::Zero) + outcome.score.tricks(Player::One),
            13
        );
        let decisions = outcome.decisions[0].decisions + outcome.decisions[1].decisions;
        assert_eq!(decisions as usize, outcome.record.plays().len());
    }

    #[test]
    fn missing_move_is_reported() {
        let mut players: [Box<dyn Policy>; 2] = [Box::new(Resigns), Box::new(Resigns)];
        let err = play_game(GameRecord::with_seed(10), &mut players, "g0").unwrap_err();
        assert!(matches!(err, GameError::NoMove { policy: "resigns", .. }));
    }
}
