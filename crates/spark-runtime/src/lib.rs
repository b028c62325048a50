//! Spark Runtime - per-frame loop building blocks
//!
//! Everything in the effects layer is driven by one cooperative tick:
//! - `FrameClock` — frame delta tracking with a hitch clamp
//! - `RuntimeSystem` — trait for systems ticked by the host loop
//! - `SystemRunner` — runs registered systems in order

mod clock;
mod runner;
mod system;

pub use clock::FrameClock;
pub use runner::SystemRunner;
pub use system::RuntimeSystem;
