//! Ray queries against collider boxes

use crate::component::ColliderSource;
use crate::world::SceneWorld;
use hecs::Entity;
use spark_core::Vec3;
use std::collections::HashSet;

/// A ray with a bounded reach
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Normalized direction
    pub direction: Vec3,
    pub max_distance: f32,
}

impl Ray {
    /// Build a ray; a zero direction falls back to straight down
    pub fn new(origin: Vec3, direction: Vec3, max_distance: f32) -> Self {
        Self {
            origin,
            direction: direction.try_normalize().unwrap_or(Vec3::NEG_Y),
            max_distance: max_distance.max(0.0),
        }
    }

    pub fn down(origin: Vec3, max_distance: f32) -> Self {
        Self::new(origin, Vec3::NEG_Y, max_distance)
    }

    pub fn point_at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Closest collider hit along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub point: Vec3,
    pub distance: f32,
}

impl SceneWorld {
    /// Cast against every solid collider's world-aligned box.
    ///
    /// Colliders in `exclude`'s hierarchy are skipped so an object never
    /// hits itself. Triggers never block.
    pub fn cast_ray(&self, ray: &Ray, exclude: Option<Entity>) -> Option<RayHit> {
        if !ray.origin.is_finite() || !ray.direction.is_finite() {
            return None;
        }

        let excluded: HashSet<Entity> = exclude
            .map(|e| self.hierarchy(e).into_iter().collect())
            .unwrap_or_default();

        let mut best: Option<RayHit> = None;
        for (entity, collider) in self.raw().query::<&ColliderSource>().iter() {
            if collider.is_trigger || excluded.contains(&entity) {
                continue;
            }
            let Some(matrix) = self.world_matrix(entity) else {
                continue;
            };
            let world_box = collider.bounds.transformed(&matrix);
            let hit = world_box.ray_intersection(ray.origin, ray.direction, ray.max_distance);
            let Some(distance) = hit else {
                continue;
            };
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(RayHit {
                    entity,
                    point: ray.point_at(distance),
                    distance,
                });
            }
        }
        best
    }
}
