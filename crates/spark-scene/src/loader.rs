//! Scene loading from TOML files

use crate::component::{
    BuildPiece, Character, ColliderSource, Destructible, ItemDrop, MeshSource, RendererSource,
    Vehicle,
};
use crate::format::{EntityDef, SceneFile};
use crate::world::SceneWorld;
use spark_core::{Aabb, Result, SparkError, Transform, Vec3};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Load a scene from a TOML file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<(SceneWorld, SceneFile)> {
    let content = fs::read_to_string(path)?;
    load_scene_string(&content)
}

/// Load a scene from a TOML string
pub fn load_scene_string(content: &str) -> Result<(SceneWorld, SceneFile)> {
    let scene_file: SceneFile = toml::from_str(content)?;
    let mut world = SceneWorld::new();

    // First pass: create all entities
    let mut ids = HashMap::new();
    for name in scene_file.entities.keys() {
        ids.insert(name.as_str(), world.spawn(name.clone()));
    }

    // Second pass: set up components and relationships
    for (name, def) in &scene_file.entities {
        let id = ids[name.as_str()];
        apply_entity_def(&mut world, id, name, def)?;

        if let Some(parent_name) = &def.parent {
            let parent = ids
                .get(parent_name.as_str())
                .copied()
                .ok_or_else(|| SparkError::EntityNotFound(parent_name.clone()))?;
            world.set_parent(id, parent)?;
        }
    }

    tracing::debug!(
        scene = %scene_file.scene.name,
        entities = world.entity_count(),
        "loaded scene"
    );

    Ok((world, scene_file))
}

fn apply_entity_def(
    world: &mut SceneWorld,
    id: hecs::Entity,
    name: &str,
    def: &EntityDef,
) -> Result<()> {
    if let Some(t) = &def.transform {
        let transform = Transform::from_translation(Vec3::from_array(t.position))
            .with_euler_degrees(Vec3::from_array(t.rotation))
            .with_scale(Vec3::from_array(t.scale));
        world.set_transform(id, transform)?;
    }

    if let Some(mesh) = &def.mesh {
        let bounds = checked_bounds("mesh", name, mesh.min, mesh.max)?;
        let mesh_name = mesh.name.clone().unwrap_or_else(|| name.to_string());
        world.insert(id, MeshSource::new(mesh_name, bounds))?;
    }

    if let Some(collider) = &def.collider {
        let bounds = checked_bounds("collider", name, collider.min, collider.max)?;
        world.insert(
            id,
            ColliderSource {
                bounds,
                is_trigger: collider.trigger,
            },
        )?;
    }

    if let Some(renderer) = &def.renderer {
        let bounds = checked_bounds("renderer", name, renderer.min, renderer.max)?;
        world.insert(
            id,
            RendererSource {
                bounds,
                enabled: renderer.enabled,
            },
        )?;
    }

    if let Some(character) = &def.character {
        world.insert(
            id,
            Character {
                local_player: character.local_player,
            },
        )?;
    }

    for capability in &def.capabilities {
        match capability.as_str() {
            "piece" => world.insert(id, BuildPiece)?,
            "item_drop" => world.insert(id, ItemDrop)?,
            "destructible" => world.insert(id, Destructible)?,
            "vehicle" => world.insert(id, Vehicle)?,
            other => {
                return Err(SparkError::InvalidComponent {
                    component: "capabilities".into(),
                    reason: format!("unknown capability '{other}' on '{name}'"),
                })
            }
        }
    }

    Ok(())
}

fn checked_bounds(component: &str, entity: &str, min: [f32; 3], max: [f32; 3]) -> Result<Aabb> {
    let (min, max) = (Vec3::from_array(min), Vec3::from_array(max));
    if !min.is_finite() || !max.is_finite() || min.cmpgt(max).any() {
        return Err(SparkError::InvalidComponent {
            component: component.into(),
            reason: format!("bounds on '{entity}' must be finite with min <= max"),
        });
    }
    Ok(Aabb::new(min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAMP: &str = r#"
[scene]
name = "Camp"

[entities.Player]
character = { local_player = true }
collider = { min = [-0.4, 0.0, -0.4], max = [0.4, 1.8, 0.4] }

[entities.SwordIron]
parent = "Player"
transform = { position = [0.5, 1.0, 0.0] }
mesh = { min = [-1.0, -0.5, -0.05], max = [1.0, 0.5, 0.05] }

[entities.Bench]
capabilities = ["piece", "destructible"]
renderer = { min = [-1.0, 0.0, -0.5], max = [1.0, 1.0, 0.5], enabled = false }
"#;

    #[test]
    fn test_load_scene_string() {
        let (world, scene) = load_scene_string(CAMP).unwrap();
        assert_eq!(scene.scene.name, "Camp");
        assert_eq!(world.entity_count(), 3);

        let player = world.find_by_name("Player").unwrap();
        let sword = world.find_by_name("SwordIron").unwrap();
        let bench = world.find_by_name("Bench").unwrap();

        assert_eq!(world.parent(sword), Some(player));
        assert!(world.get::<Character>(player).unwrap().local_player);
        assert_eq!(world.get::<MeshSource>(sword).unwrap().name, "SwordIron");
        assert!(world.has::<BuildPiece>(bench));
        assert!(world.has::<Destructible>(bench));
        assert!(!world.get::<RendererSource>(bench).unwrap().enabled);

        let pos = world.world_position(sword).unwrap();
        assert!((pos - Vec3::new(0.5, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_unknown_parent() {
        let content = r#"
[scene]
name = "Broken"

[entities.orphan]
parent = "nobody"
"#;
        assert!(matches!(
            load_scene_string(content),
            Err(SparkError::EntityNotFound(_))
        ));
    }

    #[test]
    fn test_unknown_capability() {
        let content = r#"
[scene]
name = "Broken"

[entities.thing]
capabilities = ["teleporter"]
"#;
        assert!(matches!(
            load_scene_string(content),
            Err(SparkError::InvalidComponent { .. })
        ));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let content = r#"
[scene]
name = "Broken"

[entities.thing]
mesh = { min = [1.0, 0.0, 0.0], max = [0.0, 1.0, 1.0] }
"#;
        assert!(load_scene_string(content).is_err());
    }
}
