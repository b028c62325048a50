//! CLI command implementations

pub mod bounds;
pub mod classify;
pub mod simulate;

use anyhow::{Context, Result};
use spark_scene::{load_scene, Entity, SceneWorld};

/// Load a scene file with a readable error
pub fn open_scene(path: &str) -> Result<SceneWorld> {
    let (world, _) = load_scene(path).with_context(|| format!("Failed to load scene {path}"))?;
    Ok(world)
}

/// Look up an entity by name or fail with a readable error
pub fn find_entity(world: &SceneWorld, name: &str) -> Result<Entity> {
    world
        .find_by_name(name)
        .with_context(|| format!("No entity named '{name}' in scene"))
}

/// Root entities (no parent), by name
pub fn root_entities(world: &SceneWorld) -> Vec<(String, Entity)> {
    let mut roots: Vec<(String, Entity)> = world
        .entities()
        .into_iter()
        .filter(|e| world.parent(*e).is_none())
        .map(|e| (world.name(e).unwrap_or_default(), e))
        .collect();
    roots.sort_by(|a, b| a.0.cmp(&b.0));
    roots
}
