//! Target categories

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse semantic category of an effect target.
///
/// Only used to rescale effect presentation, never to gate correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    #[default]
    Unknown,
    Weapon,
    Tool,
    Shield,
    Bow,
    Armor,
    Helmet,
    Cape,
    Character,
    Creature,
    Item,
    Piece,
    Destructible,
    Vehicle,
    Custom,
}

impl TargetType {
    pub const ALL: [TargetType; 15] = [
        TargetType::Unknown,
        TargetType::Weapon,
        TargetType::Tool,
        TargetType::Shield,
        TargetType::Bow,
        TargetType::Armor,
        TargetType::Helmet,
        TargetType::Cape,
        TargetType::Character,
        TargetType::Creature,
        TargetType::Item,
        TargetType::Piece,
        TargetType::Destructible,
        TargetType::Vehicle,
        TargetType::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Unknown => "unknown",
            TargetType::Weapon => "weapon",
            TargetType::Tool => "tool",
            TargetType::Shield => "shield",
            TargetType::Bow => "bow",
            TargetType::Armor => "armor",
            TargetType::Helmet => "helmet",
            TargetType::Cape => "cape",
            TargetType::Character => "character",
            TargetType::Creature => "creature",
            TargetType::Item => "item",
            TargetType::Piece => "piece",
            TargetType::Destructible => "destructible",
            TargetType::Vehicle => "vehicle",
            TargetType::Custom => "custom",
        }
    }

    /// Categories that always hang or stand upright, whatever the mesh says
    pub fn is_vertical(&self) -> bool {
        matches!(
            self,
            TargetType::Cape | TargetType::Character | TargetType::Creature
        )
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_is_exhaustive_and_unique() {
        let set: HashSet<_> = TargetType::ALL.iter().collect();
        assert_eq!(set.len(), TargetType::ALL.len());
        assert_eq!(TargetType::default(), TargetType::Unknown);
    }

    #[test]
    fn vertical_categories() {
        let vertical: Vec<_> = TargetType::ALL
            .iter()
            .filter(|t| t.is_vertical())
            .copied()
            .collect();
        assert_eq!(
            vertical,
            vec![TargetType::Cape, TargetType::Character, TargetType::Creature]
        );
    }
}
