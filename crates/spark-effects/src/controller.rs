//! Effect controller contract and per-category multipliers

use crate::registry::MaterialRegistry;
use serde::Serialize;
use spark_bounds::{SparkBounds, TargetType};
use spark_core::SparkError;
use spark_scene::{Entity, SceneWorld};
use std::fmt;
use std::str::FromStr;

/// Elemental effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Fire,
    Lightning,
}

impl Element {
    pub const ALL: [Element; 2] = [Element::Fire, Element::Lightning];

    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Fire => "fire",
            Element::Lightning => "lightning",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Element {
    type Err = SparkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fire" => Ok(Element::Fire),
            "lightning" => Ok(Element::Lightning),
            other => Err(SparkError::ConfigError(format!("Unknown element '{other}'"))),
        }
    }
}

/// Controller lifecycle. `Destroyed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    #[default]
    Uninitialized,
    Active,
    Destroyed,
}

/// What a controller needs to build its nodes
pub struct EffectContext<'a> {
    pub world: &'a mut SceneWorld,
    pub materials: &'a MaterialRegistry,
}

/// Snapshot of a controller for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectSummary {
    pub element: Element,
    pub state: ControllerState,
    /// Requested intensity
    pub intensity: f32,
    /// Intensity after the target-type multiplier
    pub effective_intensity: f32,
    pub light_intensity: f32,
    /// Live scene nodes owned by the controller
    pub nodes: usize,
    pub particles_emitted: u64,
    pub bolts_spawned: u64,
    pub bolts_active: usize,
}

/// Owner of one elemental effect on one target.
///
/// Every method other than `initialize` is a no-op unless the controller
/// is `Active`; `initialize` itself only works once.
pub trait EffectController {
    fn element(&self) -> Element;

    fn state(&self) -> ControllerState;

    /// Build the effect's nodes under `target` using measured `bounds`
    fn initialize(&mut self, ctx: &mut EffectContext<'_>, target: Entity, bounds: SparkBounds);

    /// Recompute parameters for a new intensity. Repeating a value changes nothing.
    fn set_intensity(&mut self, world: &mut SceneWorld, intensity: f32);

    /// Per-frame tick
    fn update(&mut self, world: &mut SceneWorld, dt: f32);

    /// Primary emitter still exists and is playing
    fn is_active(&self, world: &SceneWorld) -> bool;

    /// Despawn every node the controller owns
    fn destroy(&mut self, world: &mut SceneWorld);

    fn summary(&self, world: &SceneWorld) -> EffectSummary;

    /// Optional per-category rescaling capability
    fn as_target_adapter(&mut self) -> Option<&mut dyn TargetTypeAdapter> {
        None
    }
}

/// Rescales a controller once its target's category is known
pub trait TargetTypeAdapter {
    fn adapt_to_target_type(&mut self, world: &mut SceneWorld, target_type: TargetType);

    /// Multiplier currently applied on top of the requested intensity
    fn type_multiplier(&self) -> f32;
}

/// Fire intensity multiplier by target category
pub fn fire_multiplier(target_type: TargetType) -> f32 {
    match target_type {
        TargetType::Weapon => 1.0,
        TargetType::Tool => 0.8,
        TargetType::Shield => 0.7,
        TargetType::Armor => 0.4,
        TargetType::Helmet => 0.3,
        TargetType::Cape => 0.5,
        TargetType::Character => 1.2,
        TargetType::Creature => 1.5,
        TargetType::Item => 0.6,
        TargetType::Piece => 0.8,
        _ => 1.0,
    }
}

/// Lightning intensity multiplier by target category
pub fn lightning_multiplier(target_type: TargetType) -> f32 {
    match target_type {
        TargetType::Weapon => 1.0,
        TargetType::Tool => 0.7,
        TargetType::Shield => 0.6,
        TargetType::Armor => 0.3,
        TargetType::Helmet => 0.2,
        TargetType::Cape => 0.4,
        TargetType::Character => 1.2,
        TargetType::Creature => 1.5,
        TargetType::Item => 0.5,
        TargetType::Piece => 0.6,
        _ => 1.0,
    }
}

/// Requested intensity clamped to something usable
pub(crate) fn sanitize_intensity(intensity: f32) -> f32 {
    if intensity.is_finite() {
        intensity.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Worn gear ≤ wielded/inert objects ≤ living things
    fn assert_monotone(table: fn(TargetType) -> f32) {
        let helmet = table(TargetType::Helmet);
        let armor = table(TargetType::Armor);
        let cape = table(TargetType::Cape);
        let character = table(TargetType::Character);
        let creature = table(TargetType::Creature);
        let middle = [
            TargetType::Weapon,
            TargetType::Tool,
            TargetType::Shield,
            TargetType::Item,
            TargetType::Piece,
        ];

        assert!(helmet <= armor);
        assert!(armor <= cape);
        for t in middle {
            assert!(cape <= table(t), "cape above {t}");
            assert!(table(t) <= character, "{t} above character");
        }
        assert!(character <= creature);

        for t in TargetType::ALL {
            let m = table(t);
            assert!(m.is_finite() && m > 0.0, "{t} has multiplier {m}");
            assert!(helmet <= m && m <= creature, "{t} outside the helmet..creature range");
        }
    }

    #[test]
    fn fire_table_is_monotone() {
        assert_monotone(fire_multiplier);
    }

    #[test]
    fn lightning_table_is_monotone() {
        assert_monotone(lightning_multiplier);
    }

    #[test]
    fn unlisted_categories_are_neutral() {
        for t in [
            TargetType::Unknown,
            TargetType::Bow,
            TargetType::Destructible,
            TargetType::Vehicle,
            TargetType::Custom,
        ] {
            assert_eq!(fire_multiplier(t), 1.0);
            assert_eq!(lightning_multiplier(t), 1.0);
        }
    }

    #[test]
    fn element_parsing() {
        assert_eq!("fire".parse::<Element>().unwrap(), Element::Fire);
        assert_eq!("Lightning".parse::<Element>().unwrap(), Element::Lightning);
        assert!("frost".parse::<Element>().is_err());
        for e in Element::ALL {
            assert_eq!(e.to_string().parse::<Element>().unwrap(), e);
        }
    }

    #[test]
    fn intensity_sanitizing() {
        assert_eq!(sanitize_intensity(2.5), 2.5);
        assert_eq!(sanitize_intensity(-1.0), 0.0);
        assert_eq!(sanitize_intensity(f32::NAN), 0.0);
        assert_eq!(sanitize_intensity(f32::INFINITY), 0.0);
    }
}
