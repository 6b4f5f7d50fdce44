//! Arena-backed search tree shared by every determinization.

use fox_core::model::player::Player;
use fox_core::model::score::TrickTier;
use fox_core::Move;
use std::fmt::Write as _;

/// Index into the tree's node storage.
pub type NodeId = u32;

pub const ROOT: NodeId = 0;

#[derive(Debug, Clone)]
pub struct Node {
    mv: Option<Move>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    visits: u32,
    availability: u32,
    /// Sum of rewards from the point of view of the player who made `mv`.
    reward: f64,
    outcomes: [u32; 4],
}

impl Node {
    fn new(mv: Option<Move>, parent: Option<NodeId>) -> Self {
        Self {
            mv,
            parent,
            children: Vec::new(),
            visits: 0,
            availability: 0,
            reward: 0.0,
            outcomes: [0; 4],
        }
    }

    pub fn mv(&self) -> Option<Move> {
        self.mv
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    pub fn availability(&self) -> u32 {
        self.availability
    }

    pub fn reward(&self) -> f64 {
        self.reward
    }

    pub fn mean_reward(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.reward / self.visits as f64
        }
    }

    pub fn outcome(&self, tier: TrickTier) -> u32 {
        self.outcomes[tier.index()]
    }

    fn ucb(&self, exploration: f64) -> f64 {
        let visits = self.visits as f64;
        let availability = self.availability.max(1) as f64;
        self.mean_reward() + exploration * (availability.ln() / visits).sqrt()
    }

    fn outcome_summary(&self) -> String {
        let total = self.outcomes.iter().sum::<u32>().max(1) as f64;
        let share = |tier: TrickTier| self.outcome(tier) as f64 / total * 100.0;
        format!(
            "h:{:.1}% d:{:.1}% v:{:.1}% g:{:.1}%",
            share(TrickTier::Humble),
            share(TrickTier::Defeated),
            share(TrickTier::Victorious),
            share(TrickTier::Greedy)
        )
    }
}

#[derive(Debug, Clone)]
pub struct SearchTree {
    nodes: Vec<Node>,
}

impl Default for SearchTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(None, None)],
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn child_for(&mut self, parent: NodeId, mv: Move) -> NodeId {
        let existing = self.nodes[parent as usize]
            .children
            .iter()
            .copied()
            .find(|child| self.nodes[*child as usize].mv == Some(mv));
        if let Some(child) = existing {
            return child;
        }
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node::new(Some(mv), Some(parent)));
        self.nodes[parent as usize].children.push(id);
        id
    }

    /// Picks the child to follow among `moves`, all of which become
    /// available once more. Unvisited children come first, then the best
    /// UCB1 score for the player to move.
    pub fn select(&mut self, parent: NodeId, moves: &[Move], exploration: f64) -> NodeId {
        let ids: Vec<NodeId> = moves.iter().map(|mv| self.child_for(parent, *mv)).collect();
        for id in &ids {
            self.nodes[*id as usize].availability += 1;
        }
        if let Some(fresh) = ids.iter().copied().find(|id| self.node(*id).visits == 0) {
            return fresh;
        }
        let mut best = ids[0];
        let mut best_score = f64::NEG_INFINITY;
        for id in ids {
            let score = self.node(id).ucb(exploration);
            if score > best_score {
                best = id;
                best_score = score;
            }
        }
        best
    }

    /// Credits one finished simulation to `leaf` and its ancestors.
    /// `reward` is from `searcher`'s point of view; nodes holding an
    /// opponent move get the complement.
    pub fn backpropagate(&mut self, leaf: NodeId, searcher: Player, reward: f64, tier: TrickTier) {
        let mut cursor = Some(leaf);
        while let Some(id) = cursor {
            let node = &mut self.nodes[id as usize];
            node.visits += 1;
            node.reward += match node.mv {
                Some(mv) if mv.player != searcher => 1.0 - reward,
                _ => reward,
            };
            node.outcomes[tier.index()] += 1;
            cursor = node.parent;
        }
    }

    pub fn most_visited_child(&self, id: NodeId) -> Option<NodeId> {
        let mut best: Option<NodeId> = None;
        for child in self.node(id).children.iter().copied() {
            match best {
                Some(current) if self.node(current).visits >= self.node(child).visits => {}
                _ => best = Some(child),
            }
        }
        best
    }

    pub fn best_average_child(&self, id: NodeId) -> Option<NodeId> {
        let mut best: Option<NodeId> = None;
        for child in self.node(id).children.iter().copied() {
            if self.node(child).visits == 0 {
                continue;
            }
            match best {
                Some(current)
                    if self.node(current).mean_reward() >= self.node(child).mean_reward() => {}
                _ => best = Some(child),
            }
        }
        best
    }

    /// True once the most visited root move is also the best on average.
    pub fn root_converged(&self) -> bool {
        self.most_visited_child(ROOT) == self.best_average_child(ROOT)
    }

    /// Indented dump of the tree, children ordered by visits.
    pub fn describe(&self, depth: usize) -> String {
        let mut out = String::new();
        self.describe_node(ROOT, 0, depth, &mut out);
        out
    }

    fn describe_node(&self, id: NodeId, indent: usize, depth: usize, out: &mut String) {
        let node = self.node(id);
        let label = node.mv.map_or_else(|| "root".to_string(), |mv| mv.to_string());
        let _ = writeln!(
            out,
            "{}{} visits:{} reward:{:.2} av.:{} {}",
            "  ".repeat(indent),
            label,
            node.visits,
            node.mean_reward(),
            node.availability,
            node.outcome_summary()
        );
        if depth == 0 {
            return;
        }
        for child in self.sorted_children(id) {
            self.describe_node(child, indent + 1, depth - 1, out);
        }
    }

    /// Graphviz rendering of the top `depth` levels.
    pub fn to_dot(&self, depth: usize) -> String {
        let mut out = String::from("graph search {\n");
        self.dot_node(ROOT, depth, &mut out);
        out.push_str("}\n");
        out
    }

    fn dot_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = self.node(id);
        let label = node.mv.map_or_else(|| "root".to_string(), |mv| mv.to_string());
        let _ = writeln!(
            out,
            "  n{id} [label=\"{label} n={} r={:.2}\"];",
            node.visits,
            node.mean_reward()
        );
        if depth == 0 {
            return;
        }
        for child in self.sorted_children(id) {
            let _ = writeln!(out, "  n{id} -- n{child};");
            self.dot_node(child, depth - 1, out);
        }
    }

    fn sorted_children(&self, id: NodeId) -> Vec<NodeId> {
        let mut children = self.node(id).children.clone();
        children.sort_by_key(|child| std::cmp::Reverse(self.node(*child).visits));
        children
    }
}

#[cfg(test)]
mod tests {
    use super::{ROOT, SearchTree};
    use fox_core::model::player::Player;
    use fox_core::model::score::TrickTier;
    use fox_core::Move;

    fn mv(player: Player, token: &str) -> Move {
        Move::new(player, token.parse().unwrap())
    }

    #[test]
    fn select_prefers_unvisited_and_counts_availability() {
        let mut tree = SearchTree::new();
        let moves = [mv(Player::Zero, "1h"), mv(Player::Zero, "2h")];
        let first = tree.select(ROOT, &moves, 5.0);
        tree.backpropagate(first, Player::Zero, 1.0, TrickTier::Humble);
        let second = tree.select(ROOT, &moves, 5.0);
        assert_ne!(first, second);
        assert_eq!(tree.node(first).availability(), 2);
        assert_eq!(tree.node(second).availability(), 2);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn select_reuses_children_for_the_same_move() {
        let mut tree = SearchTree::new();
        let moves = [mv(Player::One, "4c")];
        let a = tree.select(ROOT, &moves, 5.0);
        let b = tree.select(ROOT, &moves, 5.0);
        assert_eq!(a, b);
        assert_eq!(tree.node(ROOT).children().len(), 1);
    }

    #[test]
    fn backpropagation_complements_opponent_nodes() {
        let mut tree = SearchTree::new();
        let mine = tree.select(ROOT, &[mv(Player::Zero, "1h")], 1.0);
        let theirs = tree.select(mine, &[mv(Player::One, "2h")], 1.0);
        tree.backpropagate(theirs, Player::Zero, 0.8, TrickTier::Victorious);

        assert_eq!(tree.node(ROOT).visits(), 1);
        assert!((tree.node(mine).reward() - 0.8).abs() < 1e-12);
        assert!((tree.node(theirs).reward() - 0.2).abs() < 1e-12);
        assert_eq!(tree.node(theirs).outcome(TrickTier::Victorious), 1);
        assert_eq!(tree.node(theirs).parent(), Some(mine));
    }

    #[test]
    fn convergence_compares_visits_and_average() {
        let mut tree = SearchTree::new();
        let moves = [mv(Player::Zero, "1h"), mv(Player::Zero, "2h")];
        let a = tree.select(ROOT, &moves, 0.0);
        tree.backpropagate(a, Player::Zero, 0.2, TrickTier::Defeated);
        let b = tree.select(ROOT, &moves, 0.0);
        tree.backpropagate(b, Player::Zero, 0.9, TrickTier::Humble);
        tree.backpropagate(a, Player::Zero, 0.2, TrickTier::Defeated);

        assert_eq!(tree.most_visited_child(ROOT), Some(a));
        assert_eq!(tree.best_average_child(ROOT), Some(b));
        assert!(!tree.root_converged());
    }

    #[test]
    fn describe_and_dot_render_the_root() {
        let mut tree = SearchTree::new();
        let child = tree.select(ROOT, &[mv(Player::Zero, "7c")], 5.0);
        tree.backpropagate(child, Player::Zero, 0.5, TrickTier::Greedy);

        let text = tree.describe(1);
        assert!(text.starts_with("root visits:1"));
        assert!(text.contains("  P0:7c visits:1"));
        assert!(text.contains("g:100.0%"));

        let dot = tree.to_dot(1);
        assert!(dot.starts_with("graph search {"));
        assert!(dot.contains("n0 -- n1;"));
        assert!(dot.trim_end().ends_with('}'));
    }
}
