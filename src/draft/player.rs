// Player records as received from the server.

use serde::{Deserialize, Serialize};

use super::position::Position;

/// Unique player identifier assigned by the server.
pub type PlayerId = i64;

/// A player in the draft pool.
///
/// Field names match the wire format. Immutable once received; `salary` is
/// only meaningful for owned players (the wire omits it for players that have
/// not been won yet, so it defaults to zero).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub firstname: String,
    pub lastname: String,
    pub mlbteam: String,
    /// Position codes this player is eligible at. Non-empty for any player
    /// the server considers draftable.
    pub positions: Vec<Position>,
    /// Winning bid, in cents. Zero until the player is owned.
    #[serde(default)]
    pub salary: i64,
}

impl Player {
    /// Display name, first last.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }

    /// Whether this player is eligible at `pos`.
    pub fn eligible_at(&self, pos: Position) -> bool {
        self.positions.contains(&pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zobrist() -> Player {
        Player {
            id: 91,
            firstname: "Ben".into(),
            lastname: "Zobrist".into(),
            mlbteam: "Tampa Bay Rays".into(),
            positions: vec![
                Position::SecondBase,
                Position::ShortStop,
                Position::MiddleInfield,
                Position::Outfield,
                Position::Utility,
            ],
            salary: 650,
        }
    }

    #[test]
    fn full_name_joins_first_and_last() {
        assert_eq!(zobrist().full_name(), "Ben Zobrist");
    }

    #[test]
    fn eligible_at_checks_position_list() {
        let p = zobrist();
        assert!(p.eligible_at(Position::MiddleInfield));
        assert!(p.eligible_at(Position::Utility));
        assert!(!p.eligible_at(Position::Catcher));
    }

    #[test]
    fn deserializes_wire_shape_without_salary() {
        let json = r#"{
            "id": 91,
            "firstname": "Ben",
            "lastname": "Zobrist",
            "mlbteam": "Tampa Bay Rays",
            "positions": ["2B", "SS", "MI", "OF", "U"]
        }"#;
        let p: Player = serde_json::from_str(json).unwrap();
        assert_eq!(p.id, 91);
        assert_eq!(p.salary, 0);
        assert_eq!(p.positions.len(), 5);
    }

    #[test]
    fn deserializes_owned_player_with_salary() {
        let json = r#"{
            "id": 91,
            "firstname": "Ben",
            "lastname": "Zobrist",
            "mlbteam": "Tampa Bay Rays",
            "positions": ["2B"],
            "salary": 650
        }"#;
        let p: Player = serde_json::from_str(json).unwrap();
        assert_eq!(p.salary, 650);
    }
}
