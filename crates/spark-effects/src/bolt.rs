//! Procedural lightning bolt geometry
//!
//! A bolt is a straight line from `start` to `end`, resampled into segments
//! whose interior points are pushed sideways at random. The push is capped
//! by `jag * distance * sin(pi * t)`, so both ends stay pinned while the
//! middle wanders the most.

use fastrand::Rng;
use glam::Vec3;
use spark_scene::{Entity, Ray, SceneWorld};
use std::f32::consts::{PI, TAU};

/// Endpoints closer than this produce no bolt
pub const MIN_BOLT_LENGTH: f32 = 0.01;

/// Jagged polyline from `start` to `end` with `segments + 1` samples.
///
/// Returns `None` when either endpoint is non-finite or the endpoints are
/// closer than `MIN_BOLT_LENGTH`. The first and last samples are exactly
/// `start` and `end`.
pub fn generate_bolt_path(
    start: Vec3,
    end: Vec3,
    segments: usize,
    jag: f32,
    rng: &mut Rng,
) -> Option<Vec<Vec3>> {
    if !start.is_finite() || !end.is_finite() {
        return None;
    }
    let delta = end - start;
    let distance = delta.length();
    if !(distance >= MIN_BOLT_LENGTH) {
        return None;
    }

    let segments = segments.max(1);
    let jag = if jag.is_finite() { jag.max(0.0) } else { 0.0 };
    let direction = delta / distance;
    let (u, v) = direction.any_orthonormal_pair();

    let mut points = Vec::with_capacity(segments + 1);
    points.push(start);
    for i in 1..segments {
        let t = i as f32 / segments as f32;
        let max_offset = jag * distance * (PI * t).sin();
        let angle = rng.f32() * TAU;
        let radius = rng.f32() * max_offset;
        let offset = (u * angle.cos() + v * angle.sin()) * radius;
        points.push(start.lerp(end, t) + offset);
    }
    points.push(end);
    Some(points)
}

/// Where a chained bolt lands below `from`.
///
/// Casts straight down at most `reach`, ignoring `exclude`'s hierarchy.
/// On a miss the bolt drops a fixed `fallback` instead.
pub fn ground_point(
    world: &SceneWorld,
    from: Vec3,
    reach: f32,
    fallback: f32,
    exclude: Option<Entity>,
) -> Vec3 {
    world
        .cast_ray(&Ray::down(from, reach), exclude)
        .map(|hit| hit.point)
        .unwrap_or(from - Vec3::new(0.0, fallback, 0.0))
}

/// Legs of a bolt through `waypoints`, degenerate legs dropped
pub fn chain_paths(
    waypoints: &[Vec3],
    segments: usize,
    jag: f32,
    rng: &mut Rng,
) -> Vec<Vec<Vec3>> {
    waypoints
        .windows(2)
        .filter_map(|leg| {
            let path = generate_bolt_path(leg[0], leg[1], segments, jag, rng);
            if path.is_none() {
                tracing::trace!(from = ?leg[0], to = ?leg[1], "skipping degenerate bolt leg");
            }
            path
        })
        .collect()
}

/// Random unit vector, uniform on the sphere
pub fn random_unit(rng: &mut Rng) -> Vec3 {
    let z = rng.f32() * 2.0 - 1.0;
    let angle = rng.f32() * TAU;
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * angle.cos(), r * angle.sin(), z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark_core::{Aabb, Transform};
    use spark_scene::ColliderSource;

    fn perpendicular_offset(p: Vec3, start: Vec3, end: Vec3, t: f32) -> f32 {
        let dir = (end - start).normalize();
        let off = p - start.lerp(end, t);
        (off - dir * off.dot(dir)).length()
    }

    #[test]
    fn endpoints_are_exact_and_jag_is_bounded() {
        let mut rng = Rng::with_seed(11);
        let cases = [
            (Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)),
            (Vec3::new(1.0, 5.0, -3.0), Vec3::new(-2.0, 0.5, 4.0)),
            (Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, 0.0, 0.0)),
        ];
        for (start, end) in cases {
            for segments in [3, 8, 20] {
                let jag = 0.25;
                let path = generate_bolt_path(start, end, segments, jag, &mut rng).unwrap();
                assert_eq!(path.len(), segments + 1);
                assert_eq!(path[0], start);
                assert_eq!(path[segments], end);

                let distance = start.distance(end);
                for (i, p) in path.iter().enumerate().skip(1).take(segments - 1) {
                    let t = i as f32 / segments as f32;
                    let bound = jag * distance * (PI * t).sin();
                    let actual = perpendicular_offset(*p, start, end, t);
                    assert!(actual <= bound + 1e-4, "offset {actual} > bound {bound}");
                }
            }
        }
    }

    #[test]
    fn zero_jag_is_straight() {
        let mut rng = Rng::with_seed(1);
        let path = generate_bolt_path(Vec3::ZERO, Vec3::Y * 4.0, 4, 0.0, &mut rng).unwrap();
        for (i, p) in path.iter().enumerate() {
            assert!((*p - Vec3::Y * i as f32).length() < 1e-5);
        }
    }

    #[test]
    fn degenerate_bolts_are_rejected() {
        let mut rng = Rng::with_seed(2);
        let short = Vec3::new(0.005, 0.0, 0.0);
        assert!(generate_bolt_path(Vec3::ZERO, short, 8, 0.2, &mut rng).is_none());
        assert!(generate_bolt_path(Vec3::ONE, Vec3::ONE, 8, 0.2, &mut rng).is_none());
        let nan = Vec3::new(f32::NAN, 0.0, 0.0);
        assert!(generate_bolt_path(nan, Vec3::ONE, 8, 0.2, &mut rng).is_none());
        let far = Vec3::splat(f32::INFINITY);
        assert!(generate_bolt_path(Vec3::ZERO, far, 8, 0.2, &mut rng).is_none());
    }

    #[test]
    fn minimum_length_is_accepted() {
        let mut rng = Rng::with_seed(3);
        let path =
            generate_bolt_path(Vec3::ZERO, Vec3::new(0.02, 0.0, 0.0), 0, 0.2, &mut rng).unwrap();
        // Zero segments are treated as one straight segment
        assert_eq!(path, vec![Vec3::ZERO, Vec3::new(0.02, 0.0, 0.0)]);
    }

    #[test]
    fn same_seed_same_bolt() {
        let a = generate_bolt_path(Vec3::ZERO, Vec3::X * 3.0, 6, 0.3, &mut Rng::with_seed(9));
        let b = generate_bolt_path(Vec3::ZERO, Vec3::X * 3.0, 6, 0.3, &mut Rng::with_seed(9));
        assert_eq!(a, b);
    }

    #[test]
    fn ground_point_hits_or_falls_back() {
        let mut world = SceneWorld::new();
        let ground = world.spawn("ground");
        let slab = Aabb::new(Vec3::new(-10.0, -1.0, -10.0), Vec3::new(10.0, 0.0, 10.0));
        world.insert(ground, ColliderSource::solid(slab)).unwrap();

        let hit = ground_point(&world, Vec3::new(1.0, 2.0, 1.0), 3.0, 1.0, None);
        assert!((hit - Vec3::new(1.0, 0.0, 1.0)).length() < 1e-4);

        // Out of reach: fixed drop
        let miss = ground_point(&world, Vec3::new(1.0, 8.0, 1.0), 3.0, 1.0, None);
        assert_eq!(miss, Vec3::new(1.0, 7.0, 1.0));
    }

    #[test]
    fn ground_point_ignores_excluded_hierarchy() {
        let mut world = SceneWorld::new();
        let floor = world.spawn("floor");
        let slab = Aabb::new(Vec3::new(-5.0, -1.0, -5.0), Vec3::new(5.0, 0.0, 5.0));
        world.insert(floor, ColliderSource::solid(slab)).unwrap();
        let shield = world.spawn("shield");
        world.set_transform(shield, Transform::from_xyz(0.0, 1.0, 0.0)).unwrap();
        let rim = world.spawn_child("rim", shield).unwrap();
        world
            .insert(rim, ColliderSource::solid(Aabb::from_center_size(Vec3::ZERO, Vec3::ONE)))
            .unwrap();

        let p = ground_point(&world, Vec3::new(0.0, 2.0, 0.0), 5.0, 1.0, Some(shield));
        assert!((p.y - 0.0).abs() < 1e-4);

        let p = ground_point(&world, Vec3::new(0.0, 2.0, 0.0), 5.0, 1.0, None);
        assert!((p.y - 1.5).abs() < 1e-4);
    }

    #[test]
    fn chain_skips_degenerate_legs() {
        let mut rng = Rng::with_seed(4);
        let waypoints = [Vec3::ZERO, Vec3::ZERO, Vec3::X, Vec3::new(1.0, -2.0, 0.0)];
        let legs = chain_paths(&waypoints, 4, 0.1, &mut rng);
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0][0], Vec3::ZERO);
        assert_eq!(*legs[1].last().unwrap(), Vec3::new(1.0, -2.0, 0.0));
    }

    #[test]
    fn random_unit_is_unit() {
        let mut rng = Rng::with_seed(5);
        for _ in 0..100 {
            assert!((random_unit(&mut rng).length() - 1.0).abs() < 1e-4);
        }
    }
}
