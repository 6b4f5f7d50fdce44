use super::Policy;
use fox_core::game::record::GameRecord;
use fox_core::game::rules::{Move, allowed_moves};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

/// Plays a uniformly random legal move. Baseline opponent for the bench.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: SmallRng,
}

impl RandomPolicy {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn choose(&mut self, view: &GameRecord) -> Option<Move> {
        let state = view.derive();
        let moves = allowed_moves(&state, state.current_player());
        moves.choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::RandomPolicy;
    use crate::policy::Policy;
    use fox_core::game::record::GameRecord;
    use fox_core::game::rules::is_legal;

    #[test]
    fn picks_legal_moves_until_the_game_ends() {
        let mut policy = RandomPolicy::with_seed(5);
        let mut record = GameRecord::with_seed(21);
        loop {
            let state = record.derive();
            if state.is_over() {
                break;
            }
            let player = state.current_player();
            let mv = policy.choose(&record.player_view(player)).unwrap();
            assert_eq!(mv.player, player);
            assert!(is_legal(&state, player, mv.card));
            record.push_move(player, mv.card).unwrap();
        }
        assert!(policy.choose(&record).is_none());
    }

    #[test]
    fn seeded_policies_agree() {
        let record = GameRecord::with_seed(4);
        let player = record.derive().current_player();
        let view = record.player_view(player);
        let a = RandomPolicy::with_seed(9).choose(&view);
        let b = RandomPolicy::with_seed(9).choose(&view);
        assert_eq!(a, b);
    }
}
