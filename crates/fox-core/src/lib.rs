pub mod belief;
pub mod game;
pub mod model;

pub use game::record::{GameRecord, Play};
pub use game::rules::{LegalityError, Move, allowed_moves, is_legal};
pub use game::state::{ConservationViolation, DerivedState, Pending};
pub use model::card::{Card, DecodeError};
pub use model::player::Player;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "foxforest"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "foxforest");
        assert!(!AppInfo::version().is_empty());
    }
}
