use super::BoardCell;
use crate::PlayerId;
use crate::TeamId;
use crate::TurnIndex;
use serde::Deserialize;
use serde::Serialize;

/// One player's view within the session snapshot.
/// The hand is the server's word on what this player holds; the
/// client never deals or shuffles.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: PlayerId,
    pub team_id: TeamId,
    pub hand: Vec<String>,
    #[serde(default)]
    pub is_bot: bool,
}

/// An append-only move record from the server log.
/// Dead-card exchanges carry no team or target; placements and
/// removals carry both.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MoveRecord {
    #[serde(default)]
    pub turn: Option<TurnIndex>,
    #[serde(default)]
    pub player: Option<PlayerId>,
    #[serde(default)]
    pub team: Option<TeamId>,
    pub action: String,
    pub card: String,
    #[serde(default)]
    pub target: Option<(u8, u8)>,
}

/// The authoritative session snapshot as last observed by the client.
/// A newer snapshot always fully replaces the prior one; the client
/// never patches individual fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub game_id: String,
    pub board: Vec<Vec<BoardCell>>,
    pub players: Vec<PlayerView>,
    pub current_turn_index: TurnIndex,
    pub current_player_id: PlayerId,
    pub current_team_id: TeamId,
    #[serde(default)]
    pub winner_team: Option<TeamId>,
    #[serde(default)]
    pub log: Vec<MoveRecord>,
    pub cards_left: u32,
}

impl GameSession {
    pub fn player(&self, id: PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|p| p.id == id)
    }
    /// Whether the given player currently owns the turn.
    pub fn is_turn(&self, id: PlayerId) -> bool {
        self.current_player_id == id
    }
    /// Set exactly once, permanently, when a team wins.
    pub fn finished(&self) -> bool {
        self.winner_team.is_some()
    }
    /// Log entries newer than the given turn. The server ships only a
    /// trailing window of the log, so consumers track the turn of the
    /// last entry they handled rather than an offset into the window.
    pub fn log_since(&self, last: Option<TurnIndex>) -> impl Iterator<Item = &MoveRecord> {
        self.log.iter().filter(move |entry| entry.turn > last)
    }
}
