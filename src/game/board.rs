use crate::TeamId;
use serde::Deserialize;
use serde::Serialize;

/// A board coordinate in row-major order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub r: u8,
    pub c: u8,
}

impl Coord {
    pub fn new(r: u8, c: u8) -> Self {
        Self { r, c }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.r, self.c)
    }
}

/// The printed face of a card as the server labels it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CardFace {
    pub rank: String,
    pub suit: String,
    pub label: String,
}

/// One cell of the 10x10 board as last observed.
/// Corners are wild and carry no card; locked cells belong to a
/// completed sequence and cannot be removed.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardCell {
    pub r: u8,
    pub c: u8,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub card: Option<CardFace>,
    #[serde(default)]
    pub chip_team: Option<TeamId>,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub is_corner: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn coord_display() {
        assert_eq!(Coord::new(3, 4).to_string(), "[3, 4]");
    }
    #[test]
    fn cell_deserializes_sparse_json() {
        let cell: BoardCell =
            serde_json::from_str(r#"{"r":0,"c":0,"label":"FREE","isCorner":true}"#).unwrap();
        assert!(cell.is_corner);
        assert!(!cell.is_locked);
        assert!(cell.card.is_none());
        assert!(cell.chip_team.is_none());
    }
}
