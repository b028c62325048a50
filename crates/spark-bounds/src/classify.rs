//! Target classification from components and names

use crate::target::TargetType;
use spark_scene::{BuildPiece, Character, Destructible, Entity, ItemDrop, SceneWorld, Vehicle};

/// Component check against a single entity of the ancestor chain
type ComponentRule = fn(&SceneWorld, Entity) -> Option<TargetType>;

/// Component rules in priority order
const COMPONENT_RULES: &[ComponentRule] = &[
    character_rule,
    |world, e| world.has::<BuildPiece>(e).then_some(TargetType::Piece),
    |world, e| world.has::<ItemDrop>(e).then_some(TargetType::Item),
    |world, e| world.has::<Destructible>(e).then_some(TargetType::Destructible),
    |world, e| world.has::<Vehicle>(e).then_some(TargetType::Vehicle),
];

fn character_rule(world: &SceneWorld, e: Entity) -> Option<TargetType> {
    let character = world.get::<Character>(e)?;
    Some(if character.local_player {
        TargetType::Character
    } else {
        TargetType::Creature
    })
}

/// Built-in name table, evaluated top to bottom
const DEFAULT_NAME_RULES: &[(TargetType, &[&str])] = &[
    (TargetType::Shield, &["shield"]),
    (TargetType::Bow, &["bow"]),
    (TargetType::Helmet, &["helmet", "hood", "hat"]),
    (TargetType::Cape, &["cape", "cloak"]),
    (TargetType::Armor, &["armor", "chest", "legs", "cuirass", "greaves"]),
    (TargetType::Tool, &["pickaxe", "hammer", "hoe", "cultivator", "fishing"]),
    (
        TargetType::Weapon,
        &[
            "sword", "axe", "mace", "knife", "club", "atgeir", "spear", "sledge", "battleaxe",
        ],
    ),
];

/// Case-insensitive substring rule mapping a name to a category
#[derive(Debug, Clone, PartialEq)]
pub struct NameRule {
    pub target: TargetType,
    /// Lowercase substrings; any match fires the rule
    pub needles: Vec<String>,
}

impl NameRule {
    pub fn new<S: AsRef<str>>(target: TargetType, needles: &[S]) -> Self {
        Self {
            target,
            needles: needles.iter().map(|n| n.as_ref().to_lowercase()).collect(),
        }
    }

    /// `lower_name` must already be lowercase
    pub fn matches(&self, lower_name: &str) -> bool {
        self.needles.iter().any(|n| lower_name.contains(n.as_str()))
    }
}

/// Labels scene objects with a `TargetType`.
///
/// Pure function of the object's current components and name: nothing is
/// cached, so re-classifying after a rename or re-parent sees the change.
#[derive(Debug, Clone)]
pub struct Classifier {
    name_rules: Vec<NameRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    /// Classifier with the built-in name table
    pub fn new() -> Self {
        Self {
            name_rules: DEFAULT_NAME_RULES
                .iter()
                .map(|(target, needles)| NameRule::new(*target, *needles))
                .collect(),
        }
    }

    /// Classifier with component rules only
    pub fn without_name_rules() -> Self {
        Self {
            name_rules: Vec::new(),
        }
    }

    /// Append a rule after the existing ones
    pub fn with_name_rule(mut self, rule: NameRule) -> Self {
        self.name_rules.push(rule);
        self
    }

    /// Insert a rule ahead of every existing one
    pub fn with_priority_name_rule(mut self, rule: NameRule) -> Self {
        self.name_rules.insert(0, rule);
        self
    }

    pub fn name_rules(&self) -> &[NameRule] {
        &self.name_rules
    }

    /// Classify an entity. Missing entities are `Unknown`.
    pub fn classify(&self, world: &SceneWorld, entity: Entity) -> TargetType {
        let chain = world.ancestors(entity);
        if chain.is_empty() {
            return TargetType::Unknown;
        }

        // Each rule looks up the chain before the next rule is tried
        for rule in COMPONENT_RULES {
            if let Some(target) = chain.iter().find_map(|e| rule(world, *e)) {
                return target;
            }
        }

        world
            .name(entity)
            .and_then(|name| self.classify_name(&name))
            .unwrap_or(TargetType::Unknown)
    }

    /// Name-table lookup alone
    pub fn classify_name(&self, name: &str) -> Option<TargetType> {
        let lower = name.to_lowercase();
        self.name_rules
            .iter()
            .find(|rule| rule.matches(&lower))
            .map(|rule| rule.target)
    }
}
