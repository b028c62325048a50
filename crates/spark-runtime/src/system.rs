//! Runtime system trait

use spark_core::Result;
use spark_scene::SceneWorld;

/// A system that can be ticked by the host's frame loop
///
/// Systems are updated in registration order, once per frame. There is no
/// fixed-rate step: everything here is presentation and tolerates a
/// variable delta.
pub trait RuntimeSystem {
    /// Called once when the system is first registered
    fn initialize(&mut self, world: &mut SceneWorld) -> Result<()>;

    /// Called once per frame
    fn update(&mut self, world: &mut SceneWorld, dt: f32) -> Result<()>;

    /// Called when the system is being shut down; release everything owned in `world`
    fn shutdown(&mut self, world: &mut SceneWorld) -> Result<()>;

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
