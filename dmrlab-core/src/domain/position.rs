//! Position — what the strategy holds on a given day.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two rotated risk assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    A,
    B,
}

impl Asset {
    pub fn position(self) -> Position {
        match self {
            Asset::A => Position::AssetA,
            Asset::B => Position::AssetB,
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::A => write!(f, "A"),
            Asset::B => write!(f, "B"),
        }
    }
}

/// Exactly one of these holds at any date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Position {
    #[default]
    Cash,
    AssetA,
    AssetB,
}

impl Position {
    pub fn asset(self) -> Option<Asset> {
        match self {
            Position::Cash => None,
            Position::AssetA => Some(Asset::A),
            Position::AssetB => Some(Asset::B),
        }
    }

    pub fn is_cash(self) -> bool {
        matches!(self, Position::Cash)
    }

    /// Number of commission legs paid to move from `self` to `target`.
    ///
    /// Into or out of cash is one leg; asset-to-asset on the same day is two.
    pub fn legs_to(self, target: Position) -> u32 {
        match (self, target) {
            (a, b) if a == b => 0,
            (Position::Cash, _) | (_, Position::Cash) => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Cash => write!(f, "CASH"),
            Position::AssetA => write!(f, "ASSET_A"),
            Position::AssetB => write!(f, "ASSET_B"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legs_between_positions() {
        assert_eq!(Position::Cash.legs_to(Position::Cash), 0);
        assert_eq!(Position::Cash.legs_to(Position::AssetA), 1);
        assert_eq!(Position::AssetB.legs_to(Position::Cash), 1);
        assert_eq!(Position::AssetA.legs_to(Position::AssetB), 2);
        assert_eq!(Position::AssetB.legs_to(Position::AssetB), 0);
    }

    #[test]
    fn asset_round_trip() {
        assert_eq!(Asset::A.position().asset(), Some(Asset::A));
        assert_eq!(Asset::B.position().asset(), Some(Asset::B));
        assert_eq!(Position::Cash.asset(), None);
    }

    #[test]
    fn position_serializes_screaming_case() {
        let json = serde_json::to_string(&Position::AssetA).unwrap();
        assert_eq!(json, "\"ASSET_A\"");
    }
}
