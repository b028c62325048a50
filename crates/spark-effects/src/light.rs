//! Point lights owned by effects, plus flicker and fade helpers

use spark_core::Color;

/// Dynamic point light attached to an effect node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Color,
    /// Current intensity as rendered this frame
    pub intensity: f32,
    pub range: f32,
}

impl PointLight {
    pub fn new(color: Color, intensity: f32, range: f32) -> Self {
        Self {
            color,
            intensity,
            range,
        }
    }
}

/// Fraction of the remaining gap closed in `dt` by an exponential ease.
///
/// Frame-rate independent: two steps of `dt/2` land where one step of `dt` does.
pub fn ease_factor(smoothing: f32, dt: f32) -> f32 {
    if !(smoothing > 0.0) || !(dt > 0.0) {
        return 0.0;
    }
    1.0 - (-smoothing * dt).exp()
}

/// Smooth 1D value noise in [0, 1].
///
/// Lattice values come from an integer hash of `(cell, seed)`; between
/// lattice points the value is smoothstep-interpolated, so consecutive
/// samples never jump.
pub fn flicker_noise(t: f32, seed: u32) -> f32 {
    if !t.is_finite() {
        return 0.5;
    }
    let cell = t.floor();
    let frac = t - cell;
    let i = cell as i64;
    let a = lattice(i, seed);
    let b = lattice(i.wrapping_add(1), seed);
    let s = frac * frac * (3.0 - 2.0 * frac);
    a + (b - a) * s
}

fn lattice(i: i64, seed: u32) -> f32 {
    let mut x = (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ u64::from(seed);
    x ^= x >> 33;
    x = x.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    x ^= x >> 33;
    (x >> 40) as f32 / (1u64 << 24) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_stays_in_unit_range() {
        for i in 0..2000 {
            let n = flicker_noise(i as f32 * 0.037 - 20.0, 7);
            assert!((0.0..=1.0).contains(&n), "{n} out of range");
        }
        assert_eq!(flicker_noise(f32::NAN, 1), 0.5);
    }

    #[test]
    fn noise_is_continuous() {
        let step = 0.001;
        for i in 0..1000 {
            let t = i as f32 * step;
            let d = (flicker_noise(t + step, 3) - flicker_noise(t, 3)).abs();
            assert!(d < 0.01, "jump of {d} at t={t}");
        }
    }

    #[test]
    fn noise_depends_on_seed() {
        let differs = (0..16).any(|i| {
            let t = i as f32 + 0.5;
            (flicker_noise(t, 1) - flicker_noise(t, 2)).abs() > 1e-3
        });
        assert!(differs);
    }

    #[test]
    fn ease_is_frame_rate_independent() {
        let one = ease_factor(10.0, 0.1);
        let half = ease_factor(10.0, 0.05);
        // Remaining gap after two half steps equals one full step
        assert!(((1.0 - half) * (1.0 - half) - (1.0 - one)).abs() < 1e-5);
        assert!(one > 0.0 && one < 1.0);
    }

    #[test]
    fn ease_guards_bad_input() {
        assert_eq!(ease_factor(0.0, 0.1), 0.0);
        assert_eq!(ease_factor(10.0, 0.0), 0.0);
        assert_eq!(ease_factor(f32::NAN, 0.1), 0.0);
    }
}
