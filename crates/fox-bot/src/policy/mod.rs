mod ismcts;
mod random;

pub use ismcts::IsmctsPolicy;
pub use random::RandomPolicy;

use fox_core::game::record::GameRecord;
use fox_core::game::rules::Move;

/// Unified interface for players that pick a move from their own view.
pub trait Policy: Send {
    /// Short label used in logs and result rows.
    fn name(&self) -> &'static str;

    /// Choose the next move for the player to act in `view`, a record
    /// redacted for that player. `None` when the game is over.
    fn choose(&mut self, view: &GameRecord) -> Option<Move>;
}
