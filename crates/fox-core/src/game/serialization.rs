use super::record::GameRecord;
use crate::model::player::Player;
use crate::model::score::FinalScore;
use serde::{Deserialize, Serialize};

/// JSON interchange form of a record, optionally redacted for one player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer: Option<Player>,
    pub record: GameRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<FinalScore>,
}

impl GameSnapshot {
    pub fn capture(record: &GameRecord) -> Self {
        GameSnapshot {
            viewer: None,
            record: record.clone(),
            score: record.derive().score().copied(),
        }
    }

    pub fn capture_for(record: &GameRecord, viewer: Player) -> Self {
        let view = record.player_view(viewer);
        GameSnapshot {
            viewer: Some(viewer),
            score: view.derive().score().copied(),
            record: view,
        }
    }

    pub fn restore(self) -> GameRecord {
        self.record
    }

    pub fn to_json(record: &GameRecord) -> serde_json::Result<String> {
        let snapshot = Self::capture(record);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
