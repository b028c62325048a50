//! Geometry bounds detection with mesh → collider → renderer fallback

use crate::bounds::{BoundsSource, SparkBounds};
use crate::classify::Classifier;
use glam::{Mat4, Vec3};
use spark_core::Aabb;
use spark_scene::{ColliderSource, Entity, MeshSource, RendererSource, SceneWorld};

/// Measures arbitrary scene objects with no authored attachment data.
///
/// Sources are tried from most to least precise: visible meshes, then solid
/// colliders, then renderer volumes. The first tier that yields any point
/// wins; lower tiers are not blended in.
#[derive(Debug, Clone, Default)]
pub struct BoundsCalculator {
    classifier: Classifier,
}

impl BoundsCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classifier(classifier: Classifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Measure `target` in its own local space.
    ///
    /// Never fails: an absent target or one without geometry yields
    /// `SparkBounds::invalid()`.
    pub fn calculate(&self, world: &SceneWorld, target: Option<Entity>) -> SparkBounds {
        match target {
            Some(entity) => self.measure(world, entity, entity),
            None => SparkBounds::invalid(),
        }
    }

    /// Measure `target` but express every point in `frame`'s local space
    pub fn calculate_relative_to(
        &self,
        world: &SceneWorld,
        target: Option<Entity>,
        frame: Entity,
    ) -> SparkBounds {
        match target {
            Some(entity) => self.measure(world, entity, frame),
            None => SparkBounds::invalid(),
        }
    }

    fn measure(&self, world: &SceneWorld, target: Entity, frame: Entity) -> SparkBounds {
        if !world.contains(target) {
            return SparkBounds::invalid();
        }

        let target_type = self.classifier.classify(world, target);
        let invalid = SparkBounds {
            target_type,
            ..SparkBounds::invalid()
        };

        // A collapsed frame can't express anything
        let Some(to_frame) = world.inverse_world_matrix(frame) else {
            tracing::debug!(?frame, "bounds frame has a singular transform");
            return invalid;
        };

        let hierarchy = world.hierarchy(target);
        let measured = mesh_bounds(world, &hierarchy, &to_frame)
            .map(|b| (b, BoundsSource::Mesh))
            .or_else(|| {
                collider_bounds(world, &hierarchy, &to_frame).map(|b| (b, BoundsSource::Collider))
            })
            .or_else(|| {
                renderer_bounds(world, &hierarchy, &to_frame).map(|b| (b, BoundsSource::Renderer))
            });

        let Some((aabb, source)) = measured else {
            tracing::debug!(?target, "no mesh, collider or renderer to measure");
            return invalid;
        };

        let mut bounds = SparkBounds::from_aabb(aabb, source);
        bounds.target_type = target_type;
        if target_type.is_vertical() {
            bounds.pin_length_axis(1);
        }

        tracing::trace!(
            ?target,
            %target_type,
            ?source,
            size = ?bounds.size,
            length_axis = bounds.length_axis,
            "measured bounds"
        );
        bounds
    }
}

/// Shadow casters and non-primary LODs would inflate the measurement
fn is_proxy_mesh(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("shadow") || (lower.contains("lod") && !lower.contains("lod0"))
}

fn mesh_bounds(world: &SceneWorld, hierarchy: &[Entity], to_frame: &Mat4) -> Option<Aabb> {
    let mut acc = None;
    for &entity in hierarchy {
        let Some(mesh) = world.get::<MeshSource>(entity) else {
            continue;
        };
        let entity_name = world.name(entity).unwrap_or_default();
        if is_proxy_mesh(&mesh.name) || is_proxy_mesh(&entity_name) {
            tracing::trace!(mesh = %mesh.name, "skipping proxy mesh");
            continue;
        }
        let Some(to_world) = world.world_matrix(entity) else {
            continue;
        };
        accumulate(&mut acc, &(*to_frame * to_world), &mesh.bounds);
    }
    acc
}

fn collider_bounds(world: &SceneWorld, hierarchy: &[Entity], to_frame: &Mat4) -> Option<Aabb> {
    let mut acc = None;
    for &entity in hierarchy {
        let Some(collider) = world.get::<ColliderSource>(entity) else {
            continue;
        };
        if collider.is_trigger {
            continue;
        }
        let Some(to_world) = world.world_matrix(entity) else {
            continue;
        };
        accumulate(&mut acc, &(*to_frame * to_world), &collider.bounds);
    }
    acc
}

fn renderer_bounds(world: &SceneWorld, hierarchy: &[Entity], to_frame: &Mat4) -> Option<Aabb> {
    let mut acc = None;
    for &entity in hierarchy {
        let enabled = world
            .get::<RendererSource>(entity)
            .map(|r| r.enabled)
            .unwrap_or(false);
        if !enabled {
            continue;
        }
        // Renderer volumes arrive world-aligned, then go back into the frame
        let Some(world_box) = world.renderer_world_bounds(entity) else {
            continue;
        };
        accumulate(&mut acc, to_frame, &world_box);
    }
    acc
}

/// Grow `acc` by the eight corners of `aabb` mapped through `matrix`.
/// Non-finite corners are dropped.
fn accumulate(acc: &mut Option<Aabb>, matrix: &Mat4, aabb: &Aabb) {
    for corner in aabb.corners() {
        let p: Vec3 = matrix.transform_point3(corner);
        if !p.is_finite() {
            continue;
        }
        match acc {
            Some(a) => a.encapsulate(p),
            None => *acc = Some(Aabb::new(p, p)),
        }
    }
}
