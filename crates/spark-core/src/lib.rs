//! Spark Core - Foundational types for the Spark effects layer
//!
//! This crate provides the types every other Spark crate depends on:
//! - `Transform` - translation/rotation/scale backed by glam
//! - `Aabb` - axis-aligned boxes with corner transforms and ray tests
//! - `Color` - linear RGBA
//! - Error types and Result alias

mod error;
mod types;

pub use error::{Result, SparkError};
pub use glam::{Mat4, Quat, Vec3};
pub use types::{Aabb, Color, Transform};
