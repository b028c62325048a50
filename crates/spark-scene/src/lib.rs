//! Spark Scene - the host scene graph the effects layer rides on
//!
//! Wraps hecs with:
//! - Named entities and parent links (scene-graph hierarchy)
//! - Geometry sources (meshes, colliders, renderers) used for bounds detection
//! - Capability markers (characters, build pieces, item drops, ...)
//! - Downward ray queries against collider boxes
//! - TOML scene files

mod component;
mod format;
mod loader;
mod raycast;
mod world;

pub use component::{
    BuildPiece, Character, ColliderSource, Destructible, ItemDrop, MeshSource, Name, Parent,
    RendererSource, Vehicle,
};
pub use format::{EntityDef, SceneFile, SceneMetadata};
pub use loader::{load_scene, load_scene_string};
pub use raycast::{Ray, RayHit};
pub use world::SceneWorld;

pub use hecs::Entity;
