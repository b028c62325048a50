//! Fire: flames and embers fitted to the target, with a flickering light

use crate::config::FireConfig;
use crate::controller::{
    fire_multiplier, sanitize_intensity, ControllerState, EffectContext, EffectController,
    EffectSummary, Element, TargetTypeAdapter,
};
use crate::emitter::{
    EmissionShape, EmitterConfig, ParticleBlendMode, ParticleEmitter, MAX_PARTICLES_CAP,
};
use crate::light::{ease_factor, flicker_noise, PointLight};
use crate::registry::{MaterialHandle, FIRE_EMBER, FIRE_FLAME};
use glam::Vec3;
use spark_bounds::{SparkBounds, TargetType, MIN_SHAPE_EXTENT};
use spark_core::{Result, Transform};
use spark_scene::{Entity, SceneWorld};

#[derive(Debug, Clone, Copy)]
struct FireNodes {
    root: Entity,
    flames: Entity,
    embers: Entity,
    light: Entity,
}

pub struct FireController {
    config: FireConfig,
    state: ControllerState,
    noise_seed: u32,
    intensity: f32,
    type_multiplier: f32,
    bounds: SparkBounds,
    nodes: Option<FireNodes>,
    flame_material: Option<MaterialHandle>,
    ember_material: Option<MaterialHandle>,
    /// Light level the flicker oscillates around
    base_light: f32,
    time: f32,
}

impl FireController {
    pub fn new(config: FireConfig, seed: u64) -> Self {
        Self {
            config,
            state: ControllerState::Uninitialized,
            noise_seed: (seed ^ (seed >> 32)) as u32,
            intensity: 1.0,
            type_multiplier: 1.0,
            bounds: SparkBounds::invalid(),
            nodes: None,
            flame_material: None,
            ember_material: None,
            base_light: 0.0,
            time: 0.0,
        }
    }

    pub fn effective_intensity(&self) -> f32 {
        self.intensity * self.type_multiplier
    }

    pub fn root(&self) -> Option<Entity> {
        self.nodes.map(|n| n.root)
    }

    pub fn base_light(&self) -> f32 {
        self.base_light
    }

    fn build(&self, world: &mut SceneWorld, target: Entity) -> Result<FireNodes> {
        let root = world.spawn_child("spark_fire", target)?;
        world.set_transform(root, Transform::from_translation(self.bounds.center))?;

        let flames = world.spawn_child("flames", root)?;
        world.insert(flames, ParticleEmitter::new(EmitterConfig::default()))?;
        let embers = world.spawn_child("embers", root)?;
        world.insert(embers, ParticleEmitter::new(EmitterConfig::default()))?;
        let light = world.spawn_child("fire_light", root)?;
        world.insert(light, PointLight::new(self.config.color, 0.0, self.config.light_range))?;

        Ok(FireNodes {
            root,
            flames,
            embers,
            light,
        })
    }

    /// Derive every parameter from base settings, intensity and category
    fn apply_parameters(&mut self, world: &mut SceneWorld) {
        let Some(nodes) = self.nodes else {
            return;
        };
        let c = &self.config;
        let eff = self.effective_intensity();
        let length = self.bounds.length().max(MIN_SHAPE_EXTENT);
        let shape = EmissionShape::fitted_box(self.bounds.particle_shape_scale());
        let scale = eff.sqrt().max(0.25);

        let flame_rate = c.flame_rate * length * eff;
        let flames = EmitterConfig {
            emission_rate: flame_rate,
            max_particles: particle_budget(flame_rate, c.flame_lifetime_max),
            lifetime_min: c.flame_lifetime_min,
            lifetime_max: c.flame_lifetime_max,
            speed_min: c.flame_speed * 0.5 * scale,
            speed_max: c.flame_speed * scale,
            direction: Vec3::Y,
            spread: 20.0,
            gravity: Vec3::new(0.0, 1.5, 0.0),
            size_start: c.flame_size * scale,
            size_end: 0.0,
            color_start: c.color,
            color_end: c.color.with_alpha(0.0),
            blend_mode: ParticleBlendMode::Additive,
            shape,
            material: self.flame_material,
        };

        let ember_rate = c.ember_rate * length * eff;
        let ember_lifetime = c.flame_lifetime_max * 2.0;
        let embers = EmitterConfig {
            emission_rate: ember_rate,
            max_particles: particle_budget(ember_rate, ember_lifetime),
            lifetime_min: c.flame_lifetime_max,
            lifetime_max: ember_lifetime,
            speed_min: c.flame_speed * scale,
            speed_max: c.flame_speed * 2.0 * scale,
            direction: Vec3::Y,
            spread: 45.0,
            gravity: Vec3::new(0.0, 0.5, 0.0),
            size_start: c.flame_size * 0.2 * scale,
            size_end: 0.0,
            color_start: c.color,
            color_end: c.color.with_alpha(0.0),
            blend_mode: ParticleBlendMode::Additive,
            shape,
            material: self.ember_material,
        };

        self.base_light = c.light_intensity * eff;
        let range = c.light_range * (1.0 + 0.25 * length);
        let color = c.color;

        world.update::<ParticleEmitter, _>(nodes.flames, |e| e.config = flames);
        world.update::<ParticleEmitter, _>(nodes.embers, |e| e.config = embers);
        world.update::<PointLight, _>(nodes.light, |l| {
            l.range = range;
            l.color = color;
        });
    }
}

/// Enough slots for a full lifetime of emission, within the global cap
fn particle_budget(rate: f32, lifetime: f32) -> usize {
    let needed = (rate * lifetime).ceil();
    if needed.is_finite() && needed > 0.0 {
        (needed as usize + 8).min(MAX_PARTICLES_CAP)
    } else {
        8
    }
}

impl EffectController for FireController {
    fn element(&self) -> Element {
        Element::Fire
    }

    fn state(&self) -> ControllerState {
        self.state
    }

    fn initialize(&mut self, ctx: &mut EffectContext<'_>, target: Entity, bounds: SparkBounds) {
        if self.state != ControllerState::Uninitialized {
            tracing::trace!("fire controller already initialized");
            return;
        }
        self.bounds = bounds;
        self.flame_material = ctx.materials.get(FIRE_FLAME);
        self.ember_material = ctx.materials.get(FIRE_EMBER);

        let nodes = match self.build(ctx.world, target) {
            Ok(nodes) => nodes,
            Err(e) => {
                tracing::warn!(?target, error = %e, "failed to build fire nodes");
                return;
            }
        };
        self.nodes = Some(nodes);
        self.state = ControllerState::Active;
        self.apply_parameters(ctx.world);

        let base = self.base_light;
        ctx.world.update::<PointLight, _>(nodes.light, |l| l.intensity = base);
        tracing::debug!(?target, target_type = %bounds.target_type, "fire initialized");
    }

    fn set_intensity(&mut self, world: &mut SceneWorld, intensity: f32) {
        if self.state != ControllerState::Active {
            return;
        }
        self.intensity = sanitize_intensity(intensity);
        self.apply_parameters(world);
    }

    fn update(&mut self, world: &mut SceneWorld, dt: f32) {
        if self.state != ControllerState::Active || !(dt > 0.0) || !dt.is_finite() {
            return;
        }
        let Some(nodes) = self.nodes else {
            return;
        };
        self.time += dt;

        let noise = flicker_noise(self.time * self.config.flicker_speed, self.noise_seed);
        let goal = self.base_light * (1.0 + self.config.flicker_amount * (2.0 * noise - 1.0));
        let ease = ease_factor(self.config.smoothing, dt);
        world.update::<PointLight, _>(nodes.light, |l| {
            l.intensity += (goal - l.intensity) * ease;
        });

        world.update::<ParticleEmitter, _>(nodes.flames, |e| e.advance(dt));
        world.update::<ParticleEmitter, _>(nodes.embers, |e| e.advance(dt));
    }

    fn is_active(&self, world: &SceneWorld) -> bool {
        if self.state != ControllerState::Active {
            return false;
        }
        self.nodes
            .and_then(|n| world.get::<ParticleEmitter>(n.flames))
            .map(|e| e.playing)
            .unwrap_or(false)
    }

    fn destroy(&mut self, world: &mut SceneWorld) {
        if self.state == ControllerState::Destroyed {
            return;
        }
        if let Some(nodes) = self.nodes.take() {
            if world.contains(nodes.root) {
                let _ = world.despawn(nodes.root);
            }
        }
        self.state = ControllerState::Destroyed;
        tracing::debug!("fire destroyed");
    }

    fn summary(&self, world: &SceneWorld) -> EffectSummary {
        let nodes = self.nodes.filter(|n| world.contains(n.root));
        let emitted = |e: Entity| world.get::<ParticleEmitter>(e).map(|p| p.emitted).unwrap_or(0);
        EffectSummary {
            element: Element::Fire,
            state: self.state,
            intensity: self.intensity,
            effective_intensity: self.effective_intensity(),
            light_intensity: nodes
                .and_then(|n| world.get::<PointLight>(n.light))
                .map(|l| l.intensity)
                .unwrap_or(0.0),
            nodes: nodes.map(|n| world.hierarchy(n.root).len()).unwrap_or(0),
            particles_emitted: nodes.map(|n| emitted(n.flames) + emitted(n.embers)).unwrap_or(0),
            bolts_spawned: 0,
            bolts_active: 0,
        }
    }

    fn as_target_adapter(&mut self) -> Option<&mut dyn TargetTypeAdapter> {
        Some(self)
    }
}

impl TargetTypeAdapter for FireController {
    fn adapt_to_target_type(&mut self, world: &mut SceneWorld, target_type: TargetType) {
        if self.state != ControllerState::Active {
            return;
        }
        self.type_multiplier = fire_multiplier(target_type);
        self.apply_parameters(world);
    }

    fn type_multiplier(&self) -> f32 {
        self.type_multiplier
    }
}
