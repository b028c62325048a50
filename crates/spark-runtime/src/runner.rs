//! Ordered system runner

use crate::clock::FrameClock;
use crate::system::RuntimeSystem;
use spark_core::Result;
use spark_scene::SceneWorld;

/// Owns the registered systems and ticks them in order
pub struct SystemRunner {
    systems: Vec<Box<dyn RuntimeSystem>>,
    pub clock: FrameClock,
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemRunner {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
            clock: FrameClock::new(),
        }
    }

    /// Register and initialize a system
    pub fn add_system(
        &mut self,
        world: &mut SceneWorld,
        mut system: Box<dyn RuntimeSystem>,
    ) -> Result<()> {
        system.initialize(world)?;
        tracing::debug!(system = system.name(), "registered runtime system");
        self.systems.push(system);
        Ok(())
    }

    /// Advance the clock by `dt` and update every system
    pub fn step(&mut self, world: &mut SceneWorld, dt: f32) -> Result<()> {
        let delta = self.clock.advance(dt);
        for system in &mut self.systems {
            system.update(world, delta)?;
        }
        Ok(())
    }

    /// Shut down in reverse registration order
    pub fn shutdown(&mut self, world: &mut SceneWorld) -> Result<()> {
        for system in self.systems.iter_mut().rev() {
            system.shutdown(world)?;
        }
        self.systems.clear();
        Ok(())
    }

    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }
}
