//! Line geometry for procedural bolts

use crate::registry::MaterialHandle;
use glam::Vec3;
use spark_core::Color;

/// World-space polyline drawn by the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct LineStrip {
    pub points: Vec<Vec3>,
    pub width: f32,
    pub color: Color,
    pub material: Option<MaterialHandle>,
}

impl LineStrip {
    pub fn new(points: Vec<Vec3>, width: f32, color: Color) -> Self {
        Self {
            points,
            width,
            color,
            material: None,
        }
    }

    pub fn with_material(mut self, material: Option<MaterialHandle>) -> Self {
        self.material = material;
        self
    }

    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Total polyline length
    pub fn length(&self) -> f32 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_and_length() {
        let line = LineStrip::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 2.0, 0.0)],
            0.05,
            Color::LIGHTNING,
        );
        assert_eq!(line.segment_count(), 2);
        assert!((line.length() - 3.0).abs() < 1e-6);
        assert_eq!(LineStrip::new(Vec::new(), 0.1, Color::WHITE).segment_count(), 0);
    }
}
