//! Typed components understood by the effects layer

use hecs::Entity;
use spark_core::Aabb;

/// Human-readable entity name
#[derive(Debug, Clone, PartialEq)]
pub struct Name(pub String);

/// Link to the parent entity in the scene graph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parent(pub Entity);

/// Visible mesh geometry, bounds in the owning entity's local space
#[derive(Debug, Clone, PartialEq)]
pub struct MeshSource {
    /// Mesh asset name. Shadow and LOD proxies are recognized by it.
    pub name: String,
    pub bounds: Aabb,
}

impl MeshSource {
    pub fn new(name: impl Into<String>, bounds: Aabb) -> Self {
        Self {
            name: name.into(),
            bounds,
        }
    }
}

/// Physics collider, bounds in the owning entity's local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderSource {
    pub bounds: Aabb,
    /// Trigger volumes don't block rays and never count as geometry
    pub is_trigger: bool,
}

impl ColliderSource {
    pub fn solid(bounds: Aabb) -> Self {
        Self {
            bounds,
            is_trigger: false,
        }
    }

    pub fn trigger(bounds: Aabb) -> Self {
        Self {
            bounds,
            is_trigger: true,
        }
    }
}

/// Renderer volume. The host reports renderer bounds world-aligned, so
/// `SceneWorld::renderer_world_bounds` re-boxes these local bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererSource {
    pub bounds: Aabb,
    pub enabled: bool,
}

impl RendererSource {
    pub fn enabled(bounds: Aabb) -> Self {
        Self {
            bounds,
            enabled: true,
        }
    }
}

/// Playable character. Non-local characters are treated as creatures.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Character {
    pub local_player: bool,
}

/// Building piece placed in the world
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BuildPiece;

/// Item lying in the world as a pickup
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ItemDrop;

/// Destructible object such as a tree or rock
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Destructible;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vehicle;
