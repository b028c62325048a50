//! Particle emitter descriptors and emission bookkeeping
//!
//! Particles themselves are the renderer's business. The effects layer only
//! decides where, how fast, and in which shape they are emitted.

use crate::registry::MaterialHandle;
use glam::Vec3;
use spark_core::Color;

/// Blend mode for particle rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleBlendMode {
    Alpha,
    Additive,
}

/// Emission shape, in the emitter's local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmissionShape {
    Point,
    Sphere { radius: f32 },
    /// Half-extents of the emission box
    Box { extents: Vec3 },
}

impl EmissionShape {
    /// Box hugging a target's particle shape scale
    pub fn fitted_box(shape_scale: Vec3) -> Self {
        EmissionShape::Box {
            extents: shape_scale * 0.5,
        }
    }
}

/// Emitter parameters, recomputed from base settings whenever intensity changes
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterConfig {
    /// Particles per second
    pub emission_rate: f32,
    pub max_particles: usize,
    pub lifetime_min: f32,
    pub lifetime_max: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    pub direction: Vec3,
    /// Cone half-angle around `direction`, degrees
    pub spread: f32,
    pub gravity: Vec3,
    pub size_start: f32,
    pub size_end: f32,
    pub color_start: Color,
    pub color_end: Color,
    pub blend_mode: ParticleBlendMode,
    pub shape: EmissionShape,
    pub material: Option<MaterialHandle>,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            emission_rate: 10.0,
            max_particles: 256,
            lifetime_min: 1.0,
            lifetime_max: 2.0,
            speed_min: 1.0,
            speed_max: 3.0,
            direction: Vec3::Y,
            spread: 15.0,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            size_start: 0.1,
            size_end: 0.0,
            color_start: Color::WHITE,
            color_end: Color::WHITE.with_alpha(0.0),
            blend_mode: ParticleBlendMode::Alpha,
            shape: EmissionShape::Point,
            material: None,
        }
    }
}

/// Upper bound on `max_particles`, whatever the effect asks for
pub const MAX_PARTICLES_CAP: usize = 10_000;

/// Emitter component attached to an effect node
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleEmitter {
    pub config: EmitterConfig,
    pub playing: bool,
    /// Fractional particle accumulator for sub-frame emission
    accumulator: f32,
    /// Particles emitted since the emitter started
    pub emitted: u64,
}

impl ParticleEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self {
            config,
            playing: true,
            accumulator: 0.0,
            emitted: 0,
        }
    }

    /// Advance emission by `dt`; returns how many particles were released
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !self.playing || !(self.config.emission_rate > 0.0) || !(dt > 0.0) {
            return 0;
        }
        self.accumulator += self.config.emission_rate * dt;
        let count = self.accumulator as u32;
        self.accumulator -= count as f32;
        self.emitted += u64::from(count);
        count
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let config = EmitterConfig::default();
        assert!(config.emission_rate > 0.0);
        assert!(config.lifetime_max >= config.lifetime_min);
        assert!(config.max_particles > 0);
        assert!(config.max_particles <= MAX_PARTICLES_CAP);
    }

    #[test]
    fn accumulates_sub_frame_emission() {
        let mut emitter = ParticleEmitter::new(EmitterConfig {
            emission_rate: 10.0,
            ..Default::default()
        });
        // 10/s at 0.05s per frame: one particle every other frame
        let released: u32 = (0..20).map(|_| emitter.advance(0.05)).sum();
        assert!((9..=10).contains(&released));
        assert_eq!(emitter.emitted, u64::from(released));
    }

    #[test]
    fn stopped_emitter_is_silent() {
        let mut emitter = ParticleEmitter::new(EmitterConfig::default());
        emitter.stop();
        assert_eq!(emitter.advance(10.0), 0);
        assert!(!emitter.playing);
    }

    #[test]
    fn bad_rates_emit_nothing() {
        let mut emitter = ParticleEmitter::new(EmitterConfig {
            emission_rate: f32::NAN,
            ..Default::default()
        });
        assert_eq!(emitter.advance(1.0), 0);
        emitter.config.emission_rate = 5.0;
        assert_eq!(emitter.advance(-1.0), 0);
    }

    #[test]
    fn fitted_box_is_half_extents() {
        let shape = EmissionShape::fitted_box(Vec3::new(2.0, 1.0, 0.1));
        assert_eq!(
            shape,
            EmissionShape::Box {
                extents: Vec3::new(1.0, 0.5, 0.05)
            }
        );
    }
}
