//! Frame clock

use std::time::Instant;

/// Longest frame delta handed to systems, in seconds
const MAX_FRAME_DELTA: f32 = 0.25;

/// Tracks frame time for the per-frame update
///
/// `tick` reads the wall clock; `advance` feeds an explicit delta so headless
/// simulations and tests stay deterministic.
pub struct FrameClock {
    /// Total elapsed time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds, clamped and scaled
    pub delta_time: f32,
    /// Frames ticked so far
    pub frame_count: u64,
    /// Multiplier applied to every delta (0 pauses)
    pub time_scale: f32,
    last_instant: Option<Instant>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            frame_count: 0,
            time_scale: 1.0,
            last_instant: None,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance from the wall clock. The first call yields a zero delta.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = match self.last_instant {
            Some(last) => now.duration_since(last).as_secs_f32(),
            None => 0.0,
        };
        self.last_instant = Some(now);
        self.advance(elapsed)
    }

    /// Advance by an explicit delta. Returns the delta systems should see.
    pub fn advance(&mut self, raw_delta: f32) -> f32 {
        // Clamp hitches so timers don't burst through several lifetimes at once
        let delta = if raw_delta.is_finite() {
            raw_delta.clamp(0.0, MAX_FRAME_DELTA)
        } else {
            0.0
        };
        self.delta_time = delta * self.time_scale.max(0.0);
        self.total_time += self.delta_time as f64;
        self.frame_count += 1;
        self.delta_time
    }
}
