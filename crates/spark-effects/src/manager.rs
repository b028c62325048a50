//! Attaching, tracking and tearing down effects

use crate::config::EffectsConfig;
use crate::controller::{EffectContext, EffectController, EffectSummary, Element};
use crate::fire::FireController;
use crate::lightning::LightningController;
use crate::registry::MaterialRegistry;
use spark_bounds::BoundsCalculator;
use spark_scene::{Entity, SceneWorld};
use std::collections::HashMap;

/// Stable identifier for an attached effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectHandle(pub u64);

struct ActiveEffect {
    handle: EffectHandle,
    target: Entity,
    intensity: f32,
    controller: Box<dyn EffectController>,
}

/// Attachment remembered while its target is holstered
#[derive(Debug, Clone, Copy, PartialEq)]
struct Holstered {
    element: Element,
    intensity: f32,
}

/// Owns every live effect controller.
///
/// Bounds and classification are measured fresh on each attach, so an
/// unholstered item picks up whatever changed while it was away.
pub struct EffectManager {
    config: EffectsConfig,
    materials: MaterialRegistry,
    calculator: BoundsCalculator,
    effects: Vec<ActiveEffect>,
    holstered: HashMap<Entity, Vec<Holstered>>,
    next_handle: u64,
    rng: fastrand::Rng,
}

impl EffectManager {
    pub fn new(config: EffectsConfig) -> Self {
        Self::with_seed(config, fastrand::u64(..))
    }

    /// Deterministic manager: controller seeds derive from `seed`
    pub fn with_seed(config: EffectsConfig, seed: u64) -> Self {
        Self {
            config,
            materials: MaterialRegistry::new(),
            calculator: BoundsCalculator::new(),
            effects: Vec::new(),
            holstered: HashMap::new(),
            next_handle: 1,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn with_calculator(mut self, calculator: BoundsCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn config(&self) -> &EffectsConfig {
        &self.config
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    pub fn calculator(&self) -> &BoundsCalculator {
        &self.calculator
    }

    /// Bring up shared resources
    pub fn initialize(&mut self) {
        self.materials.initialize();
    }

    /// Destroy everything and release shared resources
    pub fn teardown(&mut self, world: &mut SceneWorld) {
        self.clear(world);
        self.materials.teardown();
    }

    /// Attach an effect to `target`.
    ///
    /// Returns `None` when the target is gone, the effect ceiling is reached,
    /// or the controller failed to come up.
    pub fn attach(
        &mut self,
        world: &mut SceneWorld,
        target: Entity,
        element: Element,
        intensity: f32,
    ) -> Option<EffectHandle> {
        if !world.contains(target) {
            tracing::debug!(?target, %element, "attach target does not exist");
            return None;
        }
        if self.effects.len() >= self.config.max_effects {
            tracing::warn!(max = self.config.max_effects, %element, "effect limit reached");
            return None;
        }

        let bounds = self.calculator.calculate(world, Some(target));
        let seed = self.rng.u64(..);
        let mut controller: Box<dyn EffectController> = match element {
            Element::Fire => Box::new(FireController::new(self.config.fire.clone(), seed)),
            Element::Lightning => {
                Box::new(LightningController::new(self.config.lightning.clone(), seed))
            }
        };

        let mut ctx = EffectContext {
            world: &mut *world,
            materials: &self.materials,
        };
        controller.initialize(&mut ctx, target, bounds);
        if let Some(adapter) = controller.as_target_adapter() {
            adapter.adapt_to_target_type(world, bounds.target_type);
        }
        controller.set_intensity(world, intensity);

        if !controller.is_active(world) {
            controller.destroy(world);
            tracing::debug!(?target, %element, "effect failed to start");
            return None;
        }

        let handle = EffectHandle(self.next_handle);
        self.next_handle += 1;
        tracing::debug!(
            ?target,
            %element,
            handle = handle.0,
            target_type = %bounds.target_type,
            valid_bounds = bounds.is_valid,
            "effect attached"
        );
        self.effects.push(ActiveEffect {
            handle,
            target,
            intensity,
            controller,
        });
        Some(handle)
    }

    /// Destroy one effect. Returns false for unknown handles.
    pub fn detach(&mut self, world: &mut SceneWorld, handle: EffectHandle) -> bool {
        let Some(index) = self.effects.iter().position(|e| e.handle == handle) else {
            return false;
        };
        let mut effect = self.effects.remove(index);
        effect.controller.destroy(world);
        tracing::debug!(handle = handle.0, "effect detached");
        true
    }

    /// Destroy every effect on `target`; returns how many went
    pub fn detach_target(&mut self, world: &mut SceneWorld, target: Entity) -> usize {
        let mut removed = 0;
        self.effects.retain_mut(|effect| {
            if effect.target != target {
                return true;
            }
            effect.controller.destroy(world);
            removed += 1;
            false
        });
        removed
    }

    pub fn set_intensity(
        &mut self,
        world: &mut SceneWorld,
        handle: EffectHandle,
        intensity: f32,
    ) -> bool {
        let Some(effect) = self.effects.iter_mut().find(|e| e.handle == handle) else {
            return false;
        };
        effect.intensity = intensity;
        effect.controller.set_intensity(world, intensity);
        true
    }

    /// Tear down `target`'s effects but remember them for `unholster`
    pub fn holster(&mut self, world: &mut SceneWorld, target: Entity) -> usize {
        let records: Vec<Holstered> = self
            .effects
            .iter()
            .filter(|e| e.target == target)
            .map(|e| Holstered {
                element: e.controller.element(),
                intensity: e.intensity,
            })
            .collect();
        if records.is_empty() {
            return 0;
        }
        let count = self.detach_target(world, target);
        self.holstered.entry(target).or_default().extend(records);
        tracing::debug!(?target, count, "effects holstered");
        count
    }

    /// Re-attach holstered effects with freshly measured bounds
    pub fn unholster(&mut self, world: &mut SceneWorld, target: Entity) -> Vec<EffectHandle> {
        let Some(records) = self.holstered.remove(&target) else {
            return Vec::new();
        };
        let handles: Vec<EffectHandle> = records
            .into_iter()
            .filter_map(|r| self.attach(world, target, r.element, r.intensity))
            .collect();
        tracing::debug!(?target, count = handles.len(), "effects unholstered");
        handles
    }

    pub fn is_holstered(&self, target: Entity) -> bool {
        self.holstered.contains_key(&target)
    }

    /// Tick every controller, pruning ones whose nodes are gone
    pub fn update(&mut self, world: &mut SceneWorld, dt: f32) {
        self.effects.retain_mut(|effect| {
            if !effect.controller.is_active(world) {
                effect.controller.destroy(world);
                tracing::debug!(handle = effect.handle.0, "pruned inactive effect");
                return false;
            }
            effect.controller.update(world, dt);
            true
        });
        self.holstered.retain(|target, _| world.contains(*target));
    }

    pub fn active_count(&self) -> usize {
        self.effects.len()
    }

    pub fn handles_for(&self, target: Entity) -> Vec<EffectHandle> {
        self.effects
            .iter()
            .filter(|e| e.target == target)
            .map(|e| e.handle)
            .collect()
    }

    pub fn controller(&self, handle: EffectHandle) -> Option<&dyn EffectController> {
        self.effects
            .iter()
            .find(|e| e.handle == handle)
            .map(|e| e.controller.as_ref())
    }

    pub fn summary(&self, world: &SceneWorld, handle: EffectHandle) -> Option<EffectSummary> {
        self.controller(handle).map(|c| c.summary(world))
    }

    /// Destroy every effect and forget holstered ones
    pub fn clear(&mut self, world: &mut SceneWorld) {
        for effect in &mut self.effects {
            effect.controller.destroy(world);
        }
        self.effects.clear();
        self.holstered.clear();
    }
}
