use crate::PlayerId;
use crate::game::Coord;
use crate::game::GameSession;
use serde::Deserialize;
use serde::Serialize;

/// Messages pushed by the room.
#[derive(Debug)]
pub enum Inbound {
    /// Identity handshake; assigns the local player id once.
    Welcome {
        player_id: PlayerId,
        room_code: String,
    },
    /// Joined-player counter; gates the waiting state below 2.
    PlayerCount { count: u32 },
    /// Everything else is a full state broadcast.
    State(GameSession),
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Tagged {
    #[serde(rename = "WELCOME", rename_all = "camelCase")]
    Welcome {
        player_id: PlayerId,
        room_code: String,
    },
    #[serde(rename = "PLAYER_COUNT")]
    PlayerCount { count: u32 },
}

impl Inbound {
    /// Parses a raw frame. Untagged payloads fall through to the
    /// state-broadcast interpretation: a `state` field shaped like a
    /// session, or the whole payload as one.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        if let Ok(tagged) = serde_json::from_str::<Tagged>(text) {
            return Ok(match tagged {
                Tagged::Welcome {
                    player_id,
                    room_code,
                } => Self::Welcome {
                    player_id,
                    room_code,
                },
                Tagged::PlayerCount { count } => Self::PlayerCount { count },
            });
        }
        let value: serde_json::Value = serde_json::from_str(text)?;
        let session = match value.get("state") {
            Some(state) => serde_json::from_value::<GameSession>(state.clone())?,
            None => serde_json::from_value::<GameSession>(value)?,
        };
        Ok(Self::State(session))
    }
}

/// Commands the client may push to the room.
/// The server validates and rebroadcasts state to all participants.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Outbound {
    #[serde(rename = "MOVE", rename_all = "camelCase")]
    Move { card_index: usize, target: Coord },
}

impl Outbound {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize outbound message")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_welcome() {
        let inbound =
            Inbound::parse(r#"{"type":"WELCOME","playerId":1,"roomCode":"ABCD"}"#).unwrap();
        match inbound {
            Inbound::Welcome {
                player_id,
                room_code,
            } => {
                assert_eq!(player_id, 1);
                assert_eq!(room_code, "ABCD");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
    #[test]
    fn parses_player_count() {
        let inbound = Inbound::parse(r#"{"type":"PLAYER_COUNT","count":2}"#).unwrap();
        assert!(matches!(inbound, Inbound::PlayerCount { count: 2 }));
    }
    #[test]
    fn unknown_type_falls_through_to_state() {
        let state = serde_json::to_value(crate::game::tests::fixture(0, None)).unwrap();
        let framed = serde_json::json!({"type": "STATE", "state": state});
        let inbound = Inbound::parse(&framed.to_string()).unwrap();
        assert!(matches!(inbound, Inbound::State(_)));
        // A bare session body works too.
        let inbound = Inbound::parse(&state.to_string()).unwrap();
        assert!(matches!(inbound, Inbound::State(_)));
    }
    #[test]
    fn malformed_payload_is_an_error() {
        assert!(Inbound::parse("not json").is_err());
        assert!(Inbound::parse(r#"{"type":"STATE"}"#).is_err());
    }
    #[test]
    fn outbound_move_wire_shape() {
        let json: serde_json::Value = serde_json::from_str(
            &Outbound::Move {
                card_index: 2,
                target: Coord::new(3, 4),
            }
            .to_json(),
        )
        .unwrap();
        assert_eq!(json["type"], "MOVE");
        assert_eq!(json["cardIndex"], 2);
        assert_eq!(json["target"]["r"], 3);
    }
}
