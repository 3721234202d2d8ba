use crate::game::Coord;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;

/// Parameters for creating a session.
/// A missing seed means the server picks one.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionRequest {
    pub n_players: u8,
    pub board_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub ai_level: String,
}

impl Default for NewSessionRequest {
    fn default() -> Self {
        Self {
            n_players: 2,
            board_type: "standard".to_string(),
            seed: None,
            ai_level: "smart".to_string(),
        }
    }
}

/// Body for move submission and dead-card exchange.
/// The exchange endpoint ignores the position but requires the shape.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub hand_index: usize,
    pub pos: Coord,
}

/// Body for the simulated-turn advance.
#[derive(Clone, Debug, Serialize)]
pub struct StepRequest {
    pub steps: u32,
}

/// Body for batch Monte Carlo simulation.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    pub trials: u32,
    pub board_type: String,
    pub ai_level: String,
}

/// Aggregate win-rate and turn statistics from a simulation batch.
#[derive(Clone, Debug, Deserialize)]
pub struct SimulationReport {
    pub games: u32,
    /// Wins per team, keyed by the team id as the server prints it.
    #[serde(default)]
    pub win_rates: HashMap<String, u64>,
    #[serde(default)]
    pub avg_turns: f64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCreated {
    pub room_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn seed_omitted_from_wire_when_unset() {
        let json = serde_json::to_value(NewSessionRequest::default()).unwrap();
        assert_eq!(json["nPlayers"], 2);
        assert_eq!(json["boardType"], "standard");
        assert_eq!(json["aiLevel"], "smart");
        assert!(json.get("seed").is_none());
    }
    #[test]
    fn move_request_wire_shape() {
        let json = serde_json::to_value(MoveRequest {
            hand_index: 2,
            pos: Coord::new(3, 4),
        })
        .unwrap();
        assert_eq!(json["handIndex"], 2);
        assert_eq!(json["pos"]["r"], 3);
        assert_eq!(json["pos"]["c"], 4);
    }
    #[test]
    fn report_tolerates_extra_fields() {
        let report: SimulationReport = serde_json::from_str(
            r#"{"games":10,"win_rates":{"0":6,"1":4},"avg_turns":41.5,"stats":[]}"#,
        )
        .unwrap();
        assert_eq!(report.games, 10);
        assert_eq!(report.win_rates["0"], 6);
    }
}
