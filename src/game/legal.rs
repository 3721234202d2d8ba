use super::Coord;
use serde::Deserialize;
use serde::Serialize;

/// What a held card is allowed to do right now.
/// Two-eyed jacks place on any open cell, one-eyed jacks remove an
/// opponent chip; everything else places on its printed cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Place,
    TwoEyed,
    OneEyed,
    None,
}

/// Response to "what can this card do right now".
/// Recomputed fresh per selection, never cached across turns.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalMoves {
    pub action_type: ActionKind,
    pub positions: Vec<Coord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl LegalMoves {
    pub fn contains(&self, at: Coord) -> bool {
        self.positions.contains(&at)
    }
    pub fn none() -> Self {
        Self {
            action_type: ActionKind::None,
            positions: Vec::new(),
            reason: None,
        }
    }
}
