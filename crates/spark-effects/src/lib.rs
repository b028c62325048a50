//! Spark Effects - elemental effects that fit any scene object
//!
//! Provides:
//! - Fire and lightning controllers driven by measured `SparkBounds`
//! - Per-category intensity adaptation through an optional capability
//! - Procedural jagged bolt paths with ground chaining
//! - An `EffectManager` with holster/unholster and an effect ceiling
//! - `EffectSystem`, the `RuntimeSystem` that ticks everything

pub mod bolt;
pub mod config;
pub mod controller;
pub mod emitter;
pub mod fire;
pub mod light;
pub mod lightning;
pub mod line;
pub mod manager;
pub mod registry;
pub mod system;

pub use bolt::{generate_bolt_path, MIN_BOLT_LENGTH};
pub use config::{EffectsConfig, FireConfig, LightningConfig};
pub use controller::{
    fire_multiplier, lightning_multiplier, ControllerState, EffectContext, EffectController,
    EffectSummary, Element, TargetTypeAdapter,
};
pub use emitter::{EmissionShape, EmitterConfig, ParticleBlendMode, ParticleEmitter};
pub use fire::FireController;
pub use light::PointLight;
pub use lightning::LightningController;
pub use line::LineStrip;
pub use manager::{EffectHandle, EffectManager};
pub use registry::{MaterialHandle, MaterialRegistry};
pub use system::{EffectSystem, SharedEffects};
