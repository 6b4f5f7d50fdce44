pub mod policy;
pub mod search;

pub use policy::{IsmctsPolicy, Policy, RandomPolicy};
pub use search::{Budget, SearchConfig, SearchHandle, SearchOutcome, SearchTree, Searcher};

use fox_core::game::record::GameRecord;
use fox_core::game::rules::Move;

/// Picks a move for the player to act in `view`, a record redacted for that
/// player. Search knobs come from `FOX_SEARCH_*`, the budget from the caller.
/// `None` only once the player has nothing left to play.
pub fn choose_move(view: &GameRecord, budget: Budget) -> Option<Move> {
    let config = SearchConfig::from_env().with_budget(budget);
    Searcher::new(config)
        .search(&view.derive())
        .map(|outcome| outcome.chosen)
}
