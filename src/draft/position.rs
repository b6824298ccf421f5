// Roster position codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Roster slot categories a player may be eligible for.
///
/// The set is fixed by the league format; the declaration order here is the
/// canonical display order used when laying out rosters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "P")]
    Pitcher,
    #[serde(rename = "C")]
    Catcher,
    #[serde(rename = "1B")]
    FirstBase,
    #[serde(rename = "2B")]
    SecondBase,
    #[serde(rename = "3B")]
    ThirdBase,
    #[serde(rename = "SS")]
    ShortStop,
    #[serde(rename = "MI")]
    MiddleInfield,
    #[serde(rename = "CI")]
    CornerInfield,
    #[serde(rename = "OF")]
    Outfield,
    #[serde(rename = "U")]
    Utility,
}

/// All position codes in canonical display order.
pub const ALL_POSITIONS: [Position; 10] = [
    Position::Pitcher,
    Position::Catcher,
    Position::FirstBase,
    Position::SecondBase,
    Position::ThirdBase,
    Position::ShortStop,
    Position::MiddleInfield,
    Position::CornerInfield,
    Position::Outfield,
    Position::Utility,
];

impl Position {
    /// Parse a position code string (e.g. `"1B"`, `"MI"`, `"U"`).
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "P" => Some(Position::Pitcher),
            "C" => Some(Position::Catcher),
            "1B" => Some(Position::FirstBase),
            "2B" => Some(Position::SecondBase),
            "3B" => Some(Position::ThirdBase),
            "SS" => Some(Position::ShortStop),
            "MI" => Some(Position::MiddleInfield),
            "CI" => Some(Position::CornerInfield),
            "OF" => Some(Position::Outfield),
            "U" => Some(Position::Utility),
            _ => None,
        }
    }

    /// The wire/display code for this position.
    pub fn code(&self) -> &'static str {
        match self {
            Position::Pitcher => "P",
            Position::Catcher => "C",
            Position::FirstBase => "1B",
            Position::SecondBase => "2B",
            Position::ThirdBase => "3B",
            Position::ShortStop => "SS",
            Position::MiddleInfield => "MI",
            Position::CornerInfield => "CI",
            Position::Outfield => "OF",
            Position::Utility => "U",
        }
    }

    /// Index of this position in the canonical display order.
    pub fn sort_order(&self) -> usize {
        ALL_POSITIONS.iter().position(|p| p == self).unwrap_or(0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
