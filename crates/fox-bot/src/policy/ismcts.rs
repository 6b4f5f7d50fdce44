use super::Policy;
use crate::search::{SearchConfig, SearchHandle, Searcher};
use fox_core::game::record::GameRecord;
use fox_core::game::rules::Move;

/// Searches every decision with ISMCTS under a fixed configuration.
#[derive(Debug, Clone)]
pub struct IsmctsPolicy {
    searcher: Searcher,
    decisions: u64,
}

impl IsmctsPolicy {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            searcher: Searcher::new(config),
            decisions: 0,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        self.searcher.config()
    }

    pub fn handle(&self) -> SearchHandle {
        self.searcher.handle()
    }
}

impl Policy for IsmctsPolicy {
    fn name(&self) -> &'static str {
        "ismcts"
    }

    fn choose(&mut self, view: &GameRecord) -> Option<Move> {
        // Seeded runs vary per decision but stay reproducible.
        let searcher = match self.searcher.config().seed {
            Some(seed) => Searcher::with_handle(
                self.searcher.config().with_seed(seed.wrapping_add(self.decisions)),
                self.searcher.handle(),
            ),
            None => self.searcher.clone(),
        };
        self.decisions += 1;
        searcher.search(&view.derive()).map(|outcome| outcome.chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::IsmctsPolicy;
    use crate::policy::Policy;
    use crate::search::{Budget, SearchConfig};
    use fox_core::game::record::GameRecord;
    use fox_core::game::rules::is_legal;

    #[test]
    fn chooses_a_legal_move_from_the_redacted_view() {
        let record = GameRecord::with_seed(13);
        let state = record.derive();
        let player = state.current_player();
        let config = SearchConfig::default()
            .with_budget(Budget::Iterations(150))
            .with_seed(3);
        let mut policy = IsmctsPolicy::new(config);
        let mv = policy.choose(&record.player_view(player)).unwrap();
        assert_eq!(mv.player, player);
        assert!(is_legal(&state, player, mv.card));
        assert_eq!(policy.name(), "ismcts");
    }
}
