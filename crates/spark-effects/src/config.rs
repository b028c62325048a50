//! Effect tuning loaded from TOML
//!
//! Every field has a default, so an empty file (or no file) is valid.
//! Out-of-range values are replaced by their defaults with a warning.
//!
//! ```toml
//! max_effects = 32
//!
//! [fire]
//! light_intensity = 3.0
//!
//! [lightning]
//! chain_chance = 0.4
//! ```

use serde::{Deserialize, Serialize};
use spark_core::{Color, Result, SparkError};
use std::path::Path;

/// Base fire settings, before intensity and target-type scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireConfig {
    /// Flame particles per second per unit of target length
    pub flame_rate: f32,
    pub ember_rate: f32,
    pub flame_lifetime_min: f32,
    pub flame_lifetime_max: f32,
    pub flame_size: f32,
    pub flame_speed: f32,
    pub color: Color,
    pub light_intensity: f32,
    pub light_range: f32,
    /// Noise samples per second driving the flicker
    pub flicker_speed: f32,
    /// Flicker swing as a fraction of the base light intensity
    pub flicker_amount: f32,
    /// Exponential easing rate toward the flicker target
    pub smoothing: f32,
}

impl Default for FireConfig {
    fn default() -> Self {
        Self {
            flame_rate: 30.0,
            ember_rate: 6.0,
            flame_lifetime_min: 0.4,
            flame_lifetime_max: 0.9,
            flame_size: 0.2,
            flame_speed: 0.8,
            color: Color::FIRE,
            light_intensity: 2.0,
            light_range: 4.0,
            flicker_speed: 8.0,
            flicker_amount: 0.35,
            smoothing: 12.0,
        }
    }
}

/// Base lightning settings, before intensity and target-type scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightningConfig {
    /// Glow particles per second per unit of target length
    pub glow_rate: f32,
    pub spark_size: f32,
    pub color: Color,
    pub flash_intensity: f32,
    pub light_range: f32,
    /// Exponential decay rate of the flash light
    pub flash_decay: f32,
    /// Zap interval bounds at effective intensity 1, seconds
    pub min_interval: f32,
    pub max_interval: f32,
    pub bolt_lifetime: f32,
    pub bolt_segments: usize,
    /// Peak perpendicular jag as a fraction of bolt length
    pub jag: f32,
    pub bolt_width: f32,
    pub max_active_bolts: usize,
    /// How far bolts arc off the surface, in cross-section radii
    pub arc_spread: f32,
    /// Probability that a zap chains through anchors to the ground
    pub chain_chance: f32,
    pub ground_reach: f32,
    /// Drop below the last anchor used when the ground ray misses
    pub ground_fallback: f32,
}

impl Default for LightningConfig {
    fn default() -> Self {
        Self {
            glow_rate: 15.0,
            spark_size: 0.08,
            color: Color::LIGHTNING,
            flash_intensity: 4.0,
            light_range: 5.0,
            flash_decay: 14.0,
            min_interval: 0.12,
            max_interval: 0.5,
            bolt_lifetime: 0.15,
            bolt_segments: 8,
            jag: 0.18,
            bolt_width: 0.03,
            max_active_bolts: 4,
            arc_spread: 1.5,
            chain_chance: 0.2,
            ground_reach: 3.0,
            ground_fallback: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// Ceiling on simultaneously attached effects
    pub max_effects: usize,
    pub fire: FireConfig,
    pub lightning: LightningConfig,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            max_effects: 64,
            fire: FireConfig::default(),
            lightning: LightningConfig::default(),
        }
    }
}

impl EffectsConfig {
    /// Load and sanitize a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EffectsConfig = toml::from_str(&content).map_err(|e| {
            SparkError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), "loaded effects config");
        Ok(config.sanitized())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EffectsConfig = toml::from_str(content)?;
        Ok(config.sanitized())
    }

    /// Replace unusable values with defaults
    pub fn sanitized(mut self) -> Self {
        let fire_defaults = FireConfig::default();
        let f = &mut self.fire;
        non_negative("fire.flame_rate", &mut f.flame_rate, fire_defaults.flame_rate);
        non_negative("fire.ember_rate", &mut f.ember_rate, fire_defaults.ember_rate);
        non_negative(
            "fire.flame_lifetime_min",
            &mut f.flame_lifetime_min,
            fire_defaults.flame_lifetime_min,
        );
        non_negative(
            "fire.flame_lifetime_max",
            &mut f.flame_lifetime_max,
            fire_defaults.flame_lifetime_max,
        );
        ordered(&mut f.flame_lifetime_min, &mut f.flame_lifetime_max);
        non_negative("fire.flame_size", &mut f.flame_size, fire_defaults.flame_size);
        non_negative("fire.flame_speed", &mut f.flame_speed, fire_defaults.flame_speed);
        non_negative("fire.light_intensity", &mut f.light_intensity, fire_defaults.light_intensity);
        non_negative("fire.light_range", &mut f.light_range, fire_defaults.light_range);
        non_negative("fire.flicker_speed", &mut f.flicker_speed, fire_defaults.flicker_speed);
        unit_interval("fire.flicker_amount", &mut f.flicker_amount, fire_defaults.flicker_amount);
        non_negative("fire.smoothing", &mut f.smoothing, fire_defaults.smoothing);

        let lightning_defaults = LightningConfig::default();
        let l = &mut self.lightning;
        non_negative("lightning.glow_rate", &mut l.glow_rate, lightning_defaults.glow_rate);
        non_negative("lightning.spark_size", &mut l.spark_size, lightning_defaults.spark_size);
        non_negative(
            "lightning.flash_intensity",
            &mut l.flash_intensity,
            lightning_defaults.flash_intensity,
        );
        non_negative("lightning.light_range", &mut l.light_range, lightning_defaults.light_range);
        non_negative("lightning.flash_decay", &mut l.flash_decay, lightning_defaults.flash_decay);
        positive("lightning.min_interval", &mut l.min_interval, lightning_defaults.min_interval);
        positive("lightning.max_interval", &mut l.max_interval, lightning_defaults.max_interval);
        ordered(&mut l.min_interval, &mut l.max_interval);
        positive("lightning.bolt_lifetime", &mut l.bolt_lifetime, lightning_defaults.bolt_lifetime);
        if l.bolt_segments == 0 {
            tracing::warn!(field = "lightning.bolt_segments", "zero segments, using default");
            l.bolt_segments = lightning_defaults.bolt_segments;
        }
        non_negative("lightning.jag", &mut l.jag, lightning_defaults.jag);
        non_negative("lightning.bolt_width", &mut l.bolt_width, lightning_defaults.bolt_width);
        non_negative("lightning.arc_spread", &mut l.arc_spread, lightning_defaults.arc_spread);
        unit_interval(
            "lightning.chain_chance",
            &mut l.chain_chance,
            lightning_defaults.chain_chance,
        );
        non_negative(
            "lightning.ground_reach",
            &mut l.ground_reach,
            lightning_defaults.ground_reach,
        );
        non_negative(
            "lightning.ground_fallback",
            &mut l.ground_fallback,
            lightning_defaults.ground_fallback,
        );

        self
    }
}

// ── Sanitizing helpers ──

fn non_negative(name: &str, value: &mut f32, default: f32) {
    if !(value.is_finite() && *value >= 0.0) {
        tracing::warn!(
            field = name,
            value = *value,
            default,
            "invalid config value, using default"
        );
        *value = default;
    }
}

fn positive(name: &str, value: &mut f32, default: f32) {
    if !(value.is_finite() && *value > 0.0) {
        tracing::warn!(
            field = name,
            value = *value,
            default,
            "invalid config value, using default"
        );
        *value = default;
    }
}

fn unit_interval(name: &str, value: &mut f32, default: f32) {
    if !(0.0..=1.0).contains(value) {
        tracing::warn!(
            field = name,
            value = *value,
            default,
            "value outside [0, 1], using default"
        );
        *value = default;
    }
}

fn ordered(min: &mut f32, max: &mut f32) {
    if *min > *max {
        std::mem::swap(min, max);
    }
}
