//! Information-set Monte Carlo tree search.
//!
//! Every iteration samples a fresh determinization of the hidden cards and
//! walks the shared tree with UCB1, falling back to uniform random moves
//! below the expansion threshold. Batches run on a rayon pool when more than
//! one worker is configured; the tree is locked per step.

mod config;
mod tree;

pub use config::{Budget, SearchConfig};
pub use tree::{Node, NodeId, ROOT, SearchTree};

use fox_core::belief::{Determinizer, Knowledge};
use fox_core::game::rules::{Move, allowed_moves};
use fox_core::game::state::DerivedState;
use fox_core::model::player::Player;
use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{Level, event};

const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Cooperative cancellation, checked between batches.
#[derive(Debug, Clone, Default)]
pub struct SearchHandle {
    cancelled: Arc<AtomicBool>,
}

impl SearchHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub chosen: Move,
    pub iterations: usize,
    pub elapsed: Duration,
    /// Target in force when the search stopped.
    pub target: Duration,
    pub extended: bool,
    pub tree: SearchTree,
}

#[derive(Debug, Clone, Default)]
pub struct Searcher {
    config: SearchConfig,
    handle: SearchHandle,
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            handle: SearchHandle::default(),
        }
    }

    /// Shares cancellation with another searcher.
    pub fn with_handle(config: SearchConfig, handle: SearchHandle) -> Self {
        Self { config, handle }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn handle(&self) -> SearchHandle {
        self.handle.clone()
    }

    /// Searches the move for the player to act in `view`, a state derived
    /// from that player's redacted record. `None` when they cannot move.
    pub fn search(&self, view: &DerivedState) -> Option<SearchOutcome> {
        let start = Instant::now();
        let player = view.current_player();
        let moves = allowed_moves(view, player);
        match moves.as_slice() {
            [] => return None,
            [only] => {
                return Some(SearchOutcome {
                    chosen: *only,
                    iterations: 0,
                    elapsed: start.elapsed(),
                    target: self.config.target,
                    extended: false,
                    tree: SearchTree::new(),
                });
            }
            _ => {}
        }

        let knowledge = Knowledge::extract(view, player);
        let tree = Mutex::new(SearchTree::new());
        let seed = self
            .config
            .seed
            .unwrap_or_else(|| rand::thread_rng().r#gen::<u64>());
        let pool = self.thread_pool();

        let mut target = self.config.target;
        let mut extended = false;
        let mut iterations = 0usize;
        loop {
            let batch = match self.config.iteration_cap {
                Some(cap) => self.config.batch_size.min(cap - iterations),
                None => self.config.batch_size,
            };
            let run = |index: usize| {
                let mut rng = SmallRng::seed_from_u64(seed ^ (index as u64).wrapping_mul(SEED_STRIDE));
                run_iteration(&tree, view, &knowledge, player, &self.config, &mut rng);
            };
            match &pool {
                Some(pool) => pool.install(|| {
                    (iterations..iterations + batch).into_par_iter().for_each(run)
                }),
                None => (iterations..iterations + batch).for_each(run),
            }
            iterations += batch;

            if self.handle.is_cancelled() {
                break;
            }
            if let Some(cap) = self.config.iteration_cap {
                if iterations >= cap {
                    break;
                }
                continue;
            }
            let elapsed = start.elapsed();
            if elapsed < target {
                continue;
            }
            if tree.lock().root_converged() || elapsed >= self.config.max_duration {
                break;
            }
            target = target
                .mul_f64(self.config.extension_factor)
                .min(self.config.max_duration);
            extended = true;
        }

        let tree = tree.into_inner();
        let chosen = tree
            .most_visited_child(ROOT)
            .and_then(|id| tree.node(id).mv())
            .unwrap_or(moves[0]);
        assert!(moves.contains(&chosen), "search picked illegal move {chosen}");

        let outcome = SearchOutcome {
            chosen,
            iterations,
            elapsed: start.elapsed(),
            target,
            extended,
            tree,
        };
        log_search(player, moves.len(), &outcome);
        Some(outcome)
    }

    fn thread_pool(&self) -> Option<rayon::ThreadPool> {
        if self.config.workers <= 1 {
            return None;
        }
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()
        {
            Ok(pool) => Some(pool),
            Err(err) => {
                event!(
                    target: "fox_bot::search",
                    Level::WARN,
                    workers = self.config.workers,
                    error = %err,
                    "falling back to a single worker"
                );
                None
            }
        }
    }
}

/// One simulation from the root to the end of the game.
fn run_iteration<R: Rng>(
    tree: &Mutex<SearchTree>,
    view: &DerivedState,
    knowledge: &Knowledge,
    searcher: Player,
    config: &SearchConfig,
    rng: &mut R,
) {
    let mut world = Determinizer::sample(view, knowledge, rng);
    let mut node = ROOT;
    let mut tracking = true;

    while !world.is_over() {
        let moves = allowed_moves(&world, world.current_player());
        let chosen = if tracking {
            let mut guard = tree.lock();
            if guard.node(node).visits() >= config.expansion_threshold {
                node = guard.select(node, &moves, config.exploration);
                guard.node(node).mv()
            } else {
                tracking = false;
                None
            }
        } else {
            None
        };
        let mv = match chosen {
            Some(mv) => {
                assert!(moves.contains(&mv), "tree move {mv} is not legal here");
                mv
            }
            None => match moves.choose(rng) {
                Some(mv) => *mv,
                None => break,
            },
        };
        if let Err(violation) = world.advance(mv.player, Some(mv.card)) {
            panic!("determinized world broke conservation: {violation}");
        }
    }

    let Some(score) = world.score() else {
        return;
    };
    let reward = config.reward(score.margin(searcher));
    tree.lock()
        .backpropagate(node, searcher, reward, score.tier(searcher));
}

fn log_search(player: Player, legal_count: usize, outcome: &SearchOutcome) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }
    let root = outcome.tree.node(ROOT);
    event!(
        target: "fox_bot::search",
        Level::INFO,
        player = %player,
        chosen = %outcome.chosen,
        legal_count,
        iterations = outcome.iterations,
        elapsed_ms = outcome.elapsed.as_millis() as u64,
        target_ms = outcome.target.as_millis() as u64,
        extended = outcome.extended,
        root_visits = root.visits(),
        nodes = outcome.tree.len(),
    );
}
