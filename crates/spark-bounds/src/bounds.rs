//! The measured box of an effect target

use crate::target::TargetType;
use glam::{Mat4, Vec3};
use serde::Serialize;
use spark_core::Aabb;

/// Smallest per-axis extent handed to particle shapes
pub const MIN_SHAPE_EXTENT: f32 = 0.05;

/// Which geometry tier produced a measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsSource {
    #[default]
    None,
    Mesh,
    Collider,
    Renderer,
}

/// Local-space measurement of an effect target.
///
/// Produced in one pass by `BoundsCalculator`. When `is_valid` is false the
/// box is a unit cube at the origin: usable, but not a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SparkBounds {
    pub center: Vec3,
    pub size: Vec3,
    pub min: Vec3,
    pub max: Vec3,
    /// Axis with the largest extent
    pub length_axis: usize,
    pub secondary_axis: usize,
    /// Axis with the smallest extent
    pub tertiary_axis: usize,
    pub target_type: TargetType,
    pub source: BoundsSource,
    pub is_valid: bool,
}

impl Default for SparkBounds {
    fn default() -> Self {
        Self::invalid()
    }
}

impl SparkBounds {
    /// Unit-cube stand-in for "nothing to measure"
    pub fn invalid() -> Self {
        Self {
            center: Vec3::ZERO,
            size: Vec3::ONE,
            min: Vec3::splat(-0.5),
            max: Vec3::splat(0.5),
            length_axis: 1,
            secondary_axis: 0,
            tertiary_axis: 2,
            target_type: TargetType::Unknown,
            source: BoundsSource::None,
            is_valid: false,
        }
    }

    /// Valid bounds from a measured box, axes sorted by extent
    pub fn from_aabb(aabb: Aabb, source: BoundsSource) -> Self {
        let size = aabb.size();
        let [length_axis, secondary_axis, tertiary_axis] = sort_axes(size);
        Self {
            center: aabb.center(),
            size,
            min: aabb.min,
            max: aabb.max,
            length_axis,
            secondary_axis,
            tertiary_axis,
            target_type: TargetType::Unknown,
            source,
            is_valid: true,
        }
    }

    /// Force `axis` to be the length axis; the other two keep extent order
    pub fn pin_length_axis(&mut self, axis: usize) {
        let axis = axis.min(2);
        let mut rest = sort_axes(self.size).into_iter().filter(|a| *a != axis);
        // sort_axes is a permutation, so exactly two remain
        self.secondary_axis = rest.next().unwrap_or((axis + 1) % 3);
        self.tertiary_axis = rest.next().unwrap_or((axis + 2) % 3);
        self.length_axis = axis;
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.min, self.max)
    }

    /// Largest extent
    pub fn length(&self) -> f32 {
        self.size.max_element()
    }

    /// Smallest extent
    pub fn thickness(&self) -> f32 {
        self.size.min_element()
    }

    pub fn volume(&self) -> f32 {
        self.size.x * self.size.y * self.size.z
    }

    /// Unit vector along the length axis
    pub fn length_direction(&self) -> Vec3 {
        axis_vector(self.length_axis)
    }

    /// Extents for an emitter shape, never thinner than `MIN_SHAPE_EXTENT`
    pub fn particle_shape_scale(&self) -> Vec3 {
        if !self.is_valid {
            return Vec3::ONE;
        }
        self.size.max(Vec3::splat(MIN_SHAPE_EXTENT))
    }

    /// Point on the length axis; `t` runs from -0.5 (base) to 0.5 (tip)
    pub fn position_along_length(&self, t: f32) -> Vec3 {
        let t = if t.is_finite() { t.clamp(-0.5, 0.5) } else { 0.0 };
        self.center + self.length_direction() * (t * self.size[self.length_axis])
    }

    pub fn tip(&self) -> Vec3 {
        self.position_along_length(0.5)
    }

    pub fn base(&self) -> Vec3 {
        self.position_along_length(-0.5)
    }

    /// Half the wider of the two cross-section extents
    pub fn cross_section_radius(&self) -> f32 {
        let wide = self.size[self.secondary_axis].max(self.size[self.tertiary_axis]);
        (wide * 0.5).max(MIN_SHAPE_EXTENT)
    }

    /// Map a point of the measuring frame into world space
    pub fn local_to_world(&self, point: Vec3, frame_matrix: &Mat4) -> Vec3 {
        frame_matrix.transform_point3(point)
    }
}

/// Axis indices sorted by descending extent, ties by ascending index
pub fn sort_axes(size: Vec3) -> [usize; 3] {
    let mut axes = [0usize, 1, 2];
    // Stable sort keeps index order among equal extents
    axes.sort_by(|a, b| size[*b].total_cmp(&size[*a]));
    axes
}

fn axis_vector(axis: usize) -> Vec3 {
    match axis {
        0 => Vec3::X,
        1 => Vec3::Y,
        _ => Vec3::Z,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds_of(size: Vec3) -> SparkBounds {
        SparkBounds::from_aabb(Aabb::from_center_size(Vec3::ZERO, size), BoundsSource::Mesh)
    }

    #[test]
    fn axis_order_over_size_grid() {
        let values = [0.0, 0.5, 1.0, 2.0];
        for &x in &values {
            for &y in &values {
                for &z in &values {
                    let size = Vec3::new(x, y, z);
                    let b = bounds_of(size);
                    let axes = [b.length_axis, b.secondary_axis, b.tertiary_axis];

                    let mut sorted = axes;
                    sorted.sort();
                    assert_eq!(sorted, [0, 1, 2], "not a permutation for {size:?}");

                    assert!(size[axes[0]] >= size[axes[1]]);
                    assert!(size[axes[1]] >= size[axes[2]]);
                    for pair in axes.windows(2) {
                        if size[pair[0]] == size[pair[1]] {
                            assert!(pair[0] < pair[1], "tie order broken for {size:?}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn cube_ties_keep_index_order() {
        assert_eq!(sort_axes(Vec3::ONE), [0, 1, 2]);
        assert_eq!(sort_axes(Vec3::new(1.0, 2.0, 2.0)), [1, 2, 0]);
    }

    #[test]
    fn invalid_defaults() {
        let b = SparkBounds::invalid();
        assert!(!b.is_valid);
        assert_eq!(b.size, Vec3::ONE);
        assert_eq!(b.center, Vec3::ZERO);
        assert_eq!(b.length_axis, 1);
        assert_eq!(b.particle_shape_scale(), Vec3::ONE);
        assert_eq!(b.source, BoundsSource::None);
        assert_eq!(SparkBounds::default(), b);
    }

    #[test]
    fn derived_quantities() {
        let b = bounds_of(Vec3::new(2.0, 1.0, 0.1));
        assert_eq!(b.length(), 2.0);
        assert!((b.thickness() - 0.1).abs() < 1e-6);
        assert_eq!(b.length_direction(), Vec3::X);
        assert!((b.tip() - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-6);
        assert!((b.base() - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-6);
        assert!((b.position_along_length(0.25) - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
        assert!((b.cross_section_radius() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn position_along_length_clamps() {
        let b = bounds_of(Vec3::new(0.2, 3.0, 0.2));
        assert_eq!(b.position_along_length(7.0), b.tip());
        assert_eq!(b.position_along_length(-7.0), b.base());
        assert_eq!(b.position_along_length(f32::NAN), b.center);
    }

    #[test]
    fn degenerate_size_clamps_shape() {
        let b = bounds_of(Vec3::new(1.0, 0.0, 0.0));
        assert!(b.is_valid);
        assert_eq!(b.thickness(), 0.0);
        let shape = b.particle_shape_scale();
        assert_eq!(shape, Vec3::new(1.0, MIN_SHAPE_EXTENT, MIN_SHAPE_EXTENT));
        assert_eq!(b.cross_section_radius(), MIN_SHAPE_EXTENT);
    }

    #[test]
    fn pinning_keeps_a_permutation() {
        let mut b = bounds_of(Vec3::new(3.0, 1.0, 2.0));
        assert_eq!((b.length_axis, b.secondary_axis, b.tertiary_axis), (0, 2, 1));

        b.pin_length_axis(1);
        assert_eq!((b.length_axis, b.secondary_axis, b.tertiary_axis), (1, 0, 2));
        assert_eq!(b.length_direction(), Vec3::Y);
    }
}
