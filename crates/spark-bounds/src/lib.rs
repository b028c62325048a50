//! Spark Bounds - measures arbitrary scene objects so effects can fit them
//!
//! - `BoundsCalculator` — mesh → collider → renderer fallback measurement
//! - `SparkBounds` — the measured box, its dominant axes and attachment helpers
//! - `Classifier` / `TargetType` — coarse semantic category of the object

mod bounds;
mod calculator;
mod classify;
mod target;

pub use bounds::{BoundsSource, SparkBounds, MIN_SHAPE_EXTENT};
pub use calculator::BoundsCalculator;
pub use classify::{Classifier, NameRule};
pub use target::TargetType;
