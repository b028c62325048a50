//! Game-loop integration

use crate::config::EffectsConfig;
use crate::manager::EffectManager;
use spark_core::Result;
use spark_runtime::RuntimeSystem;
use spark_scene::SceneWorld;
use std::cell::RefCell;
use std::rc::Rc;

/// Manager handle shared between the runner and gameplay code
pub type SharedEffects = Rc<RefCell<EffectManager>>;

/// Ticks the effect manager from a `SystemRunner`.
///
/// The runner owns the system, so gameplay code keeps a `SharedEffects`
/// clone to attach and detach effects between frames.
pub struct EffectSystem {
    manager: SharedEffects,
}

impl EffectSystem {
    pub fn new(config: EffectsConfig) -> Self {
        Self::from_manager(EffectManager::new(config))
    }

    pub fn from_manager(manager: EffectManager) -> Self {
        Self {
            manager: Rc::new(RefCell::new(manager)),
        }
    }

    pub fn handle(&self) -> SharedEffects {
        Rc::clone(&self.manager)
    }
}

impl RuntimeSystem for EffectSystem {
    fn initialize(&mut self, _world: &mut SceneWorld) -> Result<()> {
        self.manager.borrow_mut().initialize();
        Ok(())
    }

    fn update(&mut self, world: &mut SceneWorld, dt: f32) -> Result<()> {
        self.manager.borrow_mut().update(world, dt);
        Ok(())
    }

    fn shutdown(&mut self, world: &mut SceneWorld) -> Result<()> {
        let mut manager = self.manager.borrow_mut();
        let count = manager.active_count();
        manager.teardown(world);
        tracing::debug!(count, "effects shut down");
        Ok(())
    }

    fn name(&self) -> &str {
        "effects"
    }
}
