//! SceneWorld - hecs world with names, hierarchy and transforms

use crate::component::{Name, Parent, RendererSource};
use hecs::{Component, Entity};
use spark_core::{Aabb, Mat4, Result, SparkError, Transform, Vec3};
use std::collections::{HashMap, HashSet};

/// The host scene graph
///
/// Wraps hecs::World with:
/// - A `Name` and local `Transform` on every entity
/// - Parent links and recursive despawn
/// - World/local matrix helpers for geometry measurement
pub struct SceneWorld {
    world: hecs::World,
}

impl Default for SceneWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneWorld {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            world: hecs::World::new(),
        }
    }

    /// Spawn a root entity with an identity transform
    pub fn spawn(&mut self, name: impl Into<String>) -> Entity {
        self.world.spawn((Name(name.into()), Transform::IDENTITY))
    }

    /// Spawn an entity parented to `parent`
    pub fn spawn_child(&mut self, name: impl Into<String>, parent: Entity) -> Result<Entity> {
        if !self.contains(parent) {
            return Err(SparkError::EntityNotFound(format!("{parent:?}")));
        }
        Ok(self
            .world
            .spawn((Name(name.into()), Transform::IDENTITY, Parent(parent))))
    }

    /// Despawn an entity and its whole subtree
    pub fn despawn(&mut self, entity: Entity) -> Result<()> {
        if !self.contains(entity) {
            return Err(SparkError::EntityNotFound(format!("{entity:?}")));
        }

        for e in self.hierarchy(entity) {
            // Already-gone entities are fine; the subtree is what matters
            let _ = self.world.despawn(e);
        }
        Ok(())
    }

    /// Check if an entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.world.contains(entity)
    }

    /// Get number of entities
    pub fn entity_count(&self) -> usize {
        self.world.len() as usize
    }

    /// All entities in spawn order
    pub fn entities(&self) -> Vec<Entity> {
        let mut out: Vec<Entity> = self.world.iter().map(|e| e.entity()).collect();
        out.sort_by_key(|e| e.to_bits());
        out
    }

    /// Clear the world
    pub fn clear(&mut self) {
        self.world.clear();
    }

    // ── Components ──

    /// Attach (or replace) a component
    pub fn insert<C: Component>(&mut self, entity: Entity, component: C) -> Result<()> {
        self.world
            .insert_one(entity, component)
            .map_err(|_| SparkError::EntityNotFound(format!("{entity:?}")))
    }

    /// Detach a component, returning it if present
    pub fn remove<C: Component>(&mut self, entity: Entity) -> Option<C> {
        self.world.remove_one::<C>(entity).ok()
    }

    /// Clone a component out of the world
    pub fn get<C: Component + Clone>(&self, entity: Entity) -> Option<C> {
        self.world.get::<&C>(entity).ok().map(|c| (*c).clone())
    }

    /// Check if an entity carries a component
    pub fn has<C: Component>(&self, entity: Entity) -> bool {
        self.world
            .entity(entity)
            .map(|e| e.has::<C>())
            .unwrap_or(false)
    }

    /// Mutate a component in place. Returns None if entity or component is missing.
    pub fn update<C: Component, R>(
        &mut self,
        entity: Entity,
        f: impl FnOnce(&mut C) -> R,
    ) -> Option<R> {
        let mut component = self.world.get::<&mut C>(entity).ok()?;
        Some(f(&mut *component))
    }

    // ── Names ──

    /// Get entity name
    pub fn name(&self, entity: Entity) -> Option<String> {
        self.get::<Name>(entity).map(|n| n.0)
    }

    /// Rename an entity
    pub fn set_name(&mut self, entity: Entity, name: impl Into<String>) -> Result<()> {
        self.insert(entity, Name(name.into()))
    }

    /// First entity (in spawn order) with the given name
    pub fn find_by_name(&self, name: &str) -> Option<Entity> {
        self.world
            .query::<&Name>()
            .iter()
            .filter(|(_, n)| n.0 == name)
            .map(|(e, _)| e)
            .min_by_key(|e| e.to_bits())
    }

    // ── Hierarchy ──

    /// Set parent relationship
    pub fn set_parent(&mut self, child: Entity, parent: Entity) -> Result<()> {
        if !self.contains(child) {
            return Err(SparkError::EntityNotFound(format!("{child:?}")));
        }
        if !self.contains(parent) {
            return Err(SparkError::EntityNotFound(format!("{parent:?}")));
        }
        if self.ancestors(parent).contains(&child) {
            return Err(SparkError::SceneError(format!(
                "parenting {child:?} under {parent:?} would create a cycle"
            )));
        }
        self.insert(child, Parent(parent))
    }

    /// Get parent of an entity
    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.get::<Parent>(entity)
            .map(|p| p.0)
            .filter(|p| self.contains(*p))
    }

    /// Get direct children of an entity, in spawn order
    pub fn children(&self, parent: Entity) -> Vec<Entity> {
        let mut out: Vec<Entity> = self
            .world
            .query::<&Parent>()
            .iter()
            .filter(|(_, p)| p.0 == parent)
            .map(|(e, _)| e)
            .collect();
        out.sort_by_key(|e| e.to_bits());
        out
    }

    /// The entity followed by all of its descendants, depth-first
    pub fn hierarchy(&self, root: Entity) -> Vec<Entity> {
        if !self.contains(root) {
            return Vec::new();
        }

        let mut child_map: HashMap<Entity, Vec<Entity>> = HashMap::new();
        for (e, p) in self.world.query::<&Parent>().iter() {
            child_map.entry(p.0).or_default().push(e);
        }
        for children in child_map.values_mut() {
            children.sort_by_key(|e| e.to_bits());
        }

        let mut visited = HashSet::new();
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(e) = stack.pop() {
            if !visited.insert(e) {
                continue;
            }
            out.push(e);
            if let Some(children) = child_map.get(&e) {
                stack.extend(children.iter().rev().copied());
            }
        }
        out
    }

    /// The entity followed by its parent chain, nearest first
    pub fn ancestors(&self, entity: Entity) -> Vec<Entity> {
        let mut out = Vec::new();
        let mut current = Some(entity).filter(|e| self.contains(*e));
        while let Some(e) = current {
            if out.contains(&e) {
                break;
            }
            out.push(e);
            current = self.parent(e);
        }
        out
    }

    // ── Transforms ──

    /// Local transform relative to the parent (identity if unset)
    pub fn transform(&self, entity: Entity) -> Option<Transform> {
        if !self.contains(entity) {
            return None;
        }
        Some(self.get::<Transform>(entity).unwrap_or_default())
    }

    pub fn set_transform(&mut self, entity: Entity, transform: Transform) -> Result<()> {
        self.insert(entity, transform)
    }

    /// Local-to-world matrix, walking the parent chain
    pub fn world_matrix(&self, entity: Entity) -> Option<Mat4> {
        if !self.contains(entity) {
            return None;
        }
        let mut matrix = Mat4::IDENTITY;
        for e in self.ancestors(entity) {
            let local = self.get::<Transform>(e).unwrap_or_default();
            matrix = local.to_matrix() * matrix;
        }
        Some(matrix)
    }

    /// World-to-local matrix; None for missing entities or singular transforms
    pub fn inverse_world_matrix(&self, entity: Entity) -> Option<Mat4> {
        let matrix = self.world_matrix(entity)?;
        let det = matrix.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        Some(matrix.inverse()).filter(|m| m.is_finite())
    }

    /// World-space position of an entity's origin
    pub fn world_position(&self, entity: Entity) -> Option<Vec3> {
        self.world_matrix(entity)
            .map(|m| m.transform_point3(Vec3::ZERO))
    }

    /// World-aligned renderer box, if the entity has a renderer
    pub fn renderer_world_bounds(&self, entity: Entity) -> Option<Aabb> {
        let renderer = self.get::<RendererSource>(entity)?;
        let matrix = self.world_matrix(entity)?;
        Some(renderer.bounds.transformed(&matrix))
    }

    pub(crate) fn raw(&self) -> &hecs::World {
        &self.world
    }
}
