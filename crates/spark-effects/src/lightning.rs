//! Lightning: a spark glow along the target, flash light, and short-lived bolts
//!
//! Each tick expired bolts are retired before a new one may spawn, so a bolt
//! timing out this frame never blocks its own replacement.

use crate::bolt::{chain_paths, ground_point, random_unit};
use crate::config::LightningConfig;
use crate::controller::{
    lightning_multiplier, sanitize_intensity, ControllerState, EffectContext, EffectController,
    EffectSummary, Element, TargetTypeAdapter,
};
use crate::emitter::{
    EmissionShape, EmitterConfig, ParticleBlendMode, ParticleEmitter, MAX_PARTICLES_CAP,
};
use crate::light::PointLight;
use crate::line::LineStrip;
use crate::registry::{MaterialHandle, LIGHTNING_BOLT, LIGHTNING_GLOW};
use fastrand::Rng;
use glam::Vec3;
use spark_bounds::{SparkBounds, TargetType, MIN_SHAPE_EXTENT};
use spark_core::{Result, Transform};
use spark_scene::{Entity, SceneWorld};

#[derive(Debug, Clone, Copy)]
struct LightningNodes {
    target: Entity,
    root: Entity,
    glow: Entity,
    light: Entity,
}

/// A bolt in flight
#[derive(Debug, Clone, Copy)]
struct Bolt {
    node: Entity,
    age: f32,
}

pub struct LightningController {
    config: LightningConfig,
    state: ControllerState,
    rng: Rng,
    intensity: f32,
    type_multiplier: f32,
    bounds: SparkBounds,
    nodes: Option<LightningNodes>,
    glow_material: Option<MaterialHandle>,
    bolt_material: Option<MaterialHandle>,
    bolts: Vec<Bolt>,
    bolts_spawned: u64,
    /// Time since the last zap
    elapsed: f32,
    /// Uniform draw placing the next zap between min and max interval
    next_roll: f32,
    flash_level: f32,
}

impl LightningController {
    pub fn new(config: LightningConfig, seed: u64) -> Self {
        let mut rng = Rng::with_seed(seed);
        let next_roll = rng.f32();
        Self {
            config,
            state: ControllerState::Uninitialized,
            rng,
            intensity: 1.0,
            type_multiplier: 1.0,
            bounds: SparkBounds::invalid(),
            nodes: None,
            glow_material: None,
            bolt_material: None,
            bolts: Vec::new(),
            bolts_spawned: 0,
            elapsed: 0.0,
            next_roll,
            flash_level: 0.0,
        }
    }

    pub fn effective_intensity(&self) -> f32 {
        self.intensity * self.type_multiplier
    }

    pub fn root(&self) -> Option<Entity> {
        self.nodes.map(|n| n.root)
    }

    pub fn active_bolts(&self) -> usize {
        self.bolts.len()
    }

    /// Bolt node entities currently in flight
    pub fn bolt_nodes(&self) -> Vec<Entity> {
        self.bolts.iter().map(|b| b.node).collect()
    }

    pub fn bolts_spawned(&self) -> u64 {
        self.bolts_spawned
    }

    /// Seconds between zaps for the current roll; infinite at zero intensity
    pub fn spawn_interval(&self) -> f32 {
        let eff = self.effective_intensity();
        if !(eff > 0.0) {
            return f32::INFINITY;
        }
        let c = &self.config;
        (c.min_interval + self.next_roll * (c.max_interval - c.min_interval)) / eff
    }

    fn build(&self, world: &mut SceneWorld, target: Entity) -> Result<LightningNodes> {
        let root = world.spawn_child("spark_lightning", target)?;
        world.set_transform(root, Transform::from_translation(self.bounds.center))?;

        let glow = world.spawn_child("glow", root)?;
        world.insert(glow, ParticleEmitter::new(EmitterConfig::default()))?;
        let light = world.spawn_child("flash_light", root)?;
        world.insert(light, PointLight::new(self.config.color, 0.0, self.config.light_range))?;

        Ok(LightningNodes {
            target,
            root,
            glow,
            light,
        })
    }

    fn apply_parameters(&mut self, world: &mut SceneWorld) {
        let Some(nodes) = self.nodes else {
            return;
        };
        let c = &self.config;
        let eff = self.effective_intensity();
        let length = self.bounds.length().max(MIN_SHAPE_EXTENT);

        let rate = c.glow_rate * length * eff;
        let lifetime = 0.3;
        let glow = EmitterConfig {
            emission_rate: rate,
            max_particles: ((rate * lifetime).ceil().max(0.0) as usize + 8).min(MAX_PARTICLES_CAP),
            lifetime_min: 0.1,
            lifetime_max: lifetime,
            speed_min: 0.0,
            speed_max: 0.5,
            direction: Vec3::Y,
            spread: 180.0,
            gravity: Vec3::ZERO,
            size_start: c.spark_size * eff.sqrt().max(0.25),
            size_end: 0.0,
            color_start: c.color,
            color_end: c.color.with_alpha(0.0),
            blend_mode: ParticleBlendMode::Additive,
            shape: EmissionShape::fitted_box(self.bounds.particle_shape_scale()),
            material: self.glow_material,
        };

        self.flash_level = c.flash_intensity * eff;
        let range = c.light_range * (1.0 + 0.25 * length);
        let color = c.color;

        world.update::<ParticleEmitter, _>(nodes.glow, |e| e.config = glow);
        world.update::<PointLight, _>(nodes.light, |l| {
            l.range = range;
            l.color = color;
        });
    }

    /// Random point near the target's surface, in the target's local space
    fn random_anchor(&mut self, spread: f32) -> Vec3 {
        let along = self.bounds.position_along_length(self.rng.f32() - 0.5);
        along + random_unit(&mut self.rng) * spread
    }

    /// Try to spawn one bolt. Returns false if nothing drawable came out.
    fn spawn_bolt(&mut self, world: &mut SceneWorld, nodes: LightningNodes) -> bool {
        let Some(to_world) = world.world_matrix(nodes.target) else {
            return false;
        };
        let spread = self.bounds.cross_section_radius() * self.config.arc_spread;
        let start_local = self.bounds.position_along_length(self.rng.f32() - 0.5);
        let start = self.bounds.local_to_world(start_local, &to_world);

        let mut waypoints = vec![start];
        let chained = self.rng.f32() < self.config.chain_chance;
        if chained {
            let anchors = if self.rng.bool() { 2 } else { 1 };
            for _ in 0..anchors {
                let anchor = self.random_anchor(spread);
                waypoints.push(self.bounds.local_to_world(anchor, &to_world));
            }
            let last = waypoints[waypoints.len() - 1];
            waypoints.push(ground_point(
                world,
                last,
                self.config.ground_reach,
                self.config.ground_fallback,
                Some(nodes.target),
            ));
        } else {
            let end = self.random_anchor(spread);
            waypoints.push(self.bounds.local_to_world(end, &to_world));
        }

        let legs = chain_paths(
            &waypoints,
            self.config.bolt_segments,
            self.config.jag,
            &mut self.rng,
        );
        if legs.is_empty() {
            tracing::trace!("bolt had no drawable segment");
            return false;
        }

        match self.place_bolt(world, nodes.root, legs) {
            Ok(node) => {
                self.bolts.push(Bolt { node, age: 0.0 });
                self.bolts_spawned += 1;
                tracing::trace!(chained, active = self.bolts.len(), "bolt spawned");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to place bolt");
                false
            }
        }
    }

    fn place_bolt(
        &self,
        world: &mut SceneWorld,
        root: Entity,
        legs: Vec<Vec<Vec3>>,
    ) -> Result<Entity> {
        let node = world.spawn_child("bolt", root)?;
        for points in legs {
            let leg = world.spawn_child("bolt_leg", node)?;
            world.insert(
                leg,
                LineStrip::new(points, self.config.bolt_width, self.config.color)
                    .with_material(self.bolt_material),
            )?;
        }
        Ok(node)
    }

    /// Age bolts and despawn the expired ones
    fn retire_bolts(&mut self, world: &mut SceneWorld, dt: f32) {
        let lifetime = self.config.bolt_lifetime;
        self.bolts.retain_mut(|bolt| {
            bolt.age += dt;
            if bolt.age < lifetime {
                return true;
            }
            if world.contains(bolt.node) {
                let _ = world.despawn(bolt.node);
            }
            false
        });
    }
}

impl EffectController for LightningController {
    fn element(&self) -> Element {
        Element::Lightning
    }

    fn state(&self) -> ControllerState {
        self.state
    }

    fn initialize(&mut self, ctx: &mut EffectContext<'_>, target: Entity, bounds: SparkBounds) {
        if self.state != ControllerState::Uninitialized {
            tracing::trace!("lightning controller already initialized");
            return;
        }
        self.bounds = bounds;
        self.glow_material = ctx.materials.get(LIGHTNING_GLOW);
        self.bolt_material = ctx.materials.get(LIGHTNING_BOLT);

        let nodes = match self.build(ctx.world, target) {
            Ok(nodes) => nodes,
            Err(e) => {
                tracing::warn!(?target, error = %e, "failed to build lightning nodes");
                return;
            }
        };
        self.nodes = Some(nodes);
        self.state = ControllerState::Active;
        self.apply_parameters(ctx.world);
        tracing::debug!(?target, target_type = %bounds.target_type, "lightning initialized");
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
        if !world.contains(nodes.root) {
            return;
        }

        self.retire_bolts(world, dt);

        let decay = (-self.config.flash_decay * dt).exp();
        world.update::<PointLight, _>(nodes.light, |l| l.intensity *= decay);
        world.update::<ParticleEmitter, _>(nodes.glow, |e| e.advance(dt));

        self.elapsed += dt;
        if self.elapsed < self.spawn_interval() {
            return;
        }
        self.elapsed = 0.0;
        self.next_roll = self.rng.f32();
        if self.bolts.len() >= self.config.max_active_bolts {
            return;
        }
        if self.spawn_bolt(world, nodes) {
            let flash = self.flash_level;
            world.update::<PointLight, _>(nodes.light, |l| l.intensity = flash);
        }
    }

    fn is_active(&self, world: &SceneWorld) -> bool {
        if self.state != ControllerState::Active {
            return false;
        }
        self.nodes
            .and_then(|n| world.get::<ParticleEmitter>(n.glow))
            .map(|e| e.playing)
            .unwrap_or(false)
    }

    fn destroy(&mut self, world: &mut SceneWorld) {
        if self.state == ControllerState::Destroyed {
            return;
        }
        // Bolts live under the root, so one despawn takes them too
        if let Some(nodes) = self.nodes.take() {
            if world.contains(nodes.root) {
                let _ = world.despawn(nodes.root);
            }
        }
        self.bolts.clear();
        self.state = ControllerState::Destroyed;
        tracing::debug!(bolts_spawned = self.bolts_spawned, "lightning destroyed");
    }

    fn summary(&self, world: &SceneWorld) -> EffectSummary {
        let nodes = self.nodes.filter(|n| world.contains(n.root));
        EffectSummary {
            element: Element::Lightning,
            state: self.state,
            intensity: self.intensity,
            effective_intensity: self.effective_intensity(),
            light_intensity: nodes
                .and_then(|n| world.get::<PointLight>(n.light))
                .map(|l| l.intensity)
                .unwrap_or(0.0),
            nodes: nodes.map(|n| world.hierarchy(n.root).len()).unwrap_or(0),
            particles_emitted: nodes
                .and_then(|n| world.get::<ParticleEmitter>(n.glow))
                .map(|e| e.emitted)
                .unwrap_or(0),
            bolts_spawned: self.bolts_spawned,
            bolts_active: self.bolts.len(),
        }
    }

    fn as_target_adapter(&mut self) -> Option<&mut dyn TargetTypeAdapter> {
        Some(self)
    }
}

impl TargetTypeAdapter for LightningController {
    fn adapt_to_target_type(&mut self, world: &mut SceneWorld, target_type: TargetType) {
        if self.state != ControllerState::Active {
            return;
        }
        self.type_multiplier = lightning_multiplier(target_type);
        self.apply_parameters(world);
    }

    fn type_multiplier(&self) -> f32 {
        self.type_multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MaterialRegistry;
    use spark_bounds::BoundsCalculator;
    use spark_core::Aabb;
    use spark_scene::{ColliderSource, MeshSource};

    fn steady_config() -> LightningConfig {
        LightningConfig {
            min_interval: 0.1,
            max_interval: 0.1,
            bolt_lifetime: 0.1,
            max_active_bolts: 1,
            chain_chance: 0.0,
            ..Default::default()
        }
    }

    fn spear(world: &mut SceneWorld, at: Vec3) -> (Entity, SparkBounds) {
        let e = world.spawn("SpearBronze");
        world.set_transform(e, Transform::from_translation(at)).unwrap();
        let shaft = Aabb::from_center_size(Vec3::ZERO, Vec3::new(2.0, 0.2, 0.1));
        world.insert(e, MeshSource::new("spear", shaft)).unwrap();
        let bounds = BoundsCalculator::new().calculate(world, Some(e));
        (e, bounds)
    }

    fn charged(
        world: &mut SceneWorld,
        config: LightningConfig,
        seed: u64,
    ) -> (Entity, LightningController) {
        let (target, bounds) = spear(world, Vec3::new(0.0, 2.0, 0.0));
        let materials = MaterialRegistry::new();
        let mut lightning = LightningController::new(config, seed);
        lightning.initialize(&mut EffectContext { world, materials: &materials }, target, bounds);
        (target, lightning)
    }

    fn bolt_points(world: &SceneWorld, lightning: &LightningController) -> Vec<Vec<Vec3>> {
        lightning
            .bolt_nodes()
            .into_iter()
            .flat_map(|node| world.children(node))
            .filter_map(|leg| world.get::<LineStrip>(leg))
            .map(|line| line.points)
            .collect()
    }

    #[test]
    fn calls_before_initialize_are_noops() {
        let mut world = SceneWorld::new();
        let mut lightning = LightningController::new(steady_config(), 1);
        lightning.set_intensity(&mut world, 4.0);
        for _ in 0..10 {
            lightning.update(&mut world, 0.1);
        }
        lightning.adapt_to_target_type(&mut world, TargetType::Armor);

        assert_eq!(lightning.state(), ControllerState::Uninitialized);
        assert!(!lightning.is_active(&world));
        assert_eq!(lightning.bolts_spawned(), 0);
        assert_eq!(lightning.type_multiplier(), 1.0);
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn initialize_builds_glow_and_light() {
        let mut world = SceneWorld::new();
        let (target, lightning) = charged(&mut world, steady_config(), 2);
        assert!(lightning.is_active(&world));
        let root = lightning.root().unwrap();
        assert_eq!(world.parent(root), Some(target));
        assert_eq!(world.hierarchy(root).len(), 3);
        assert_eq!(lightning.summary(&world).nodes, 3);
    }

    #[test]
    fn cleanup_happens_before_spawn() {
        let mut world = SceneWorld::new();
        let (_, mut lightning) = charged(&mut world, steady_config(), 3);

        lightning.update(&mut world, 0.1);
        assert_eq!(lightning.bolts_spawned(), 1);
        let first = lightning.bolt_nodes()[0];

        // The first bolt expires this tick, freeing the single slot
        lightning.update(&mut world, 0.1);
        assert_eq!(lightning.bolts_spawned(), 2);
        assert_eq!(lightning.active_bolts(), 1);
        assert!(!world.contains(first));
    }

    #[test]
    fn bolt_cap_is_respected() {
        let mut world = SceneWorld::new();
        let config = LightningConfig {
            min_interval: 0.02,
            max_interval: 0.05,
            bolt_lifetime: 10.0,
            max_active_bolts: 3,
            ..steady_config()
        };
        let (_, mut lightning) = charged(&mut world, config, 4);
        for _ in 0..200 {
            lightning.update(&mut world, 0.05);
            assert!(lightning.active_bolts() <= 3);
        }
        assert_eq!(lightning.active_bolts(), 3);
        assert_eq!(lightning.bolts_spawned(), 3);
    }

    #[test]
    fn bolts_expire_and_light_flashes() {
        let mut world = SceneWorld::new();
        let config = LightningConfig {
            bolt_lifetime: 0.15,
            ..steady_config()
        };
        let (_, mut lightning) = charged(&mut world, config.clone(), 5);
        let light = |world: &SceneWorld, l: &LightningController| l.summary(world).light_intensity;

        lightning.update(&mut world, 0.1);
        assert_eq!(lightning.active_bolts(), 1);
        let flash = light(&world, &lightning);
        assert!((flash - config.flash_intensity).abs() < 1e-5);

        // Decays between zaps, bolt still alive at 0.05s of age
        lightning.update(&mut world, 0.05);
        assert!(light(&world, &lightning) < flash);
        assert_eq!(lightning.active_bolts(), 1);

        // 0.15s of age: expired
        lightning.update(&mut world, 0.1);
        assert!(lightning.bolts_spawned() >= 1);
        assert!(lightning.summary(&world).bolts_active <= 1);
    }

    #[test]
    fn bolts_start_on_the_target() {
        let mut world = SceneWorld::new();
        let (target, mut lightning) = charged(&mut world, steady_config(), 6);
        lightning.update(&mut world, 0.1);

        let world_box = Aabb::from_center_size(Vec3::new(0.0, 2.0, 0.0), Vec3::new(2.0, 0.2, 0.1));
        let legs = bolt_points(&world, &lightning);
        assert_eq!(legs.len(), 1);
        let start = legs[0][0];
        // Starts on the length axis, inside the measured box
        assert!(world_box.contains(start), "{start:?} outside target");
        assert!(world.contains(target));
    }

    #[test]
    fn chained_bolts_reach_the_ground() {
        let mut world = SceneWorld::new();
        let ground = world.spawn("ground");
        let slab = Aabb::new(Vec3::new(-20.0, -1.0, -20.0), Vec3::new(20.0, 0.0, 20.0));
        world.insert(ground, ColliderSource::solid(slab)).unwrap();
        let config = LightningConfig {
            chain_chance: 1.0,
            ..steady_config()
        };
        let (_, mut lightning) = charged(&mut world, config, 7);
        lightning.update(&mut world, 0.1);

        let legs = bolt_points(&world, &lightning);
        assert!(legs.len() >= 2 && legs.len() <= 3, "{} legs", legs.len());
        let end = *legs.last().unwrap().last().unwrap();
        assert!(end.y.abs() < 1e-4, "chain ended at {end:?}");
    }

    #[test]
    fn chain_falls_back_without_ground() {
        let mut world = SceneWorld::new();
        let config = LightningConfig {
            chain_chance: 1.0,
            ground_fallback: 1.0,
            ..steady_config()
        };
        let (_, mut lightning) = charged(&mut world, config, 8);
        lightning.update(&mut world, 0.1);

        let legs = bolt_points(&world, &lightning);
        let last_leg = legs.last().unwrap();
        let end = *last_leg.last().unwrap();
        let anchor = last_leg[0];
        assert!((anchor - end - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn zero_intensity_never_zaps() {
        let mut world = SceneWorld::new();
        let (_, mut lightning) = charged(&mut world, steady_config(), 9);
        lightning.set_intensity(&mut world, 0.0);
        for _ in 0..100 {
            lightning.update(&mut world, 0.1);
        }
        assert_eq!(lightning.bolts_spawned(), 0);
        assert!(lightning.is_active(&world));
    }

    #[test]
    fn interval_scales_inversely_with_intensity() {
        let mut world = SceneWorld::new();
        let config = LightningConfig {
            min_interval: 0.2,
            max_interval: 0.6,
            ..steady_config()
        };
        let (_, mut lightning) = charged(&mut world, config, 10);
        let base = lightning.spawn_interval();
        assert!((0.2..=0.6).contains(&base));

        lightning.set_intensity(&mut world, 2.0);
        assert!((lightning.spawn_interval() - base / 2.0).abs() < 1e-5);
        // Same value again: same schedule
        lightning.set_intensity(&mut world, 2.0);
        assert!((lightning.spawn_interval() - base / 2.0).abs() < 1e-5);
    }

    #[test]
    fn adapter_scales_by_category() {
        let mut world = SceneWorld::new();
        let (_, mut lightning) = charged(&mut world, steady_config(), 11);
        let weapon = lightning.spawn_interval();

        lightning
            .as_target_adapter()
            .unwrap()
            .adapt_to_target_type(&mut world, TargetType::Creature);
        assert_eq!(lightning.type_multiplier(), 1.5);
        assert!((lightning.spawn_interval() - weapon / 1.5).abs() < 1e-5);
        assert!((lightning.effective_intensity() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn destroy_mid_flight_releases_bolts() {
        let mut world = SceneWorld::new();
        let config = LightningConfig {
            bolt_lifetime: 10.0,
            max_active_bolts: 4,
            ..steady_config()
        };
        let (_, mut lightning) = charged(&mut world, config, 12);
        for _ in 0..4 {
            lightning.update(&mut world, 0.1);
        }
        assert_eq!(lightning.active_bolts(), 4);

        lightning.destroy(&mut world);
        // Only the target remains
        assert_eq!(world.entity_count(), 1);
        assert_eq!(lightning.active_bolts(), 0);
        assert_eq!(lightning.state(), ControllerState::Destroyed);

        lightning.update(&mut world, 0.1);
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn same_seed_same_storm() {
        let run = |seed| {
            let mut world = SceneWorld::new();
            let (_, mut lightning) = charged(&mut world, LightningConfig::default(), seed);
            for _ in 0..50 {
                lightning.update(&mut world, 1.0 / 30.0);
            }
            (lightning.bolts_spawned(), bolt_points(&world, &lightning))
        };
        assert_eq!(run(77), run(77));
    }
}
