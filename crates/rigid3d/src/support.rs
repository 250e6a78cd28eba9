//! Convex support oracle (spec §4.1).
//!
//! Every narrow-phase routine in this crate operates on raw point clouds —
//! the world-space vertices of a [`crate::collider::Collider`] — rather than
//! on the collider itself, so the oracle and GJK/EPA stay decoupled from the
//! collider/prefab model and are independently testable.

use nalgebra::Vector3;

/// Returns the vertex of `points` that maximizes `<p, direction>`.
///
/// Ties are broken by first-seen, matching the reference prototype's linear
/// scan (`collisions/math_functions.py::get_furthest_point`).
///
/// # Panics
///
/// Panics if `points` is empty; callers are expected to only invoke this on
/// non-empty collider vertex lists.
pub fn support(points: &[Vector3<f64>], direction: Vector3<f64>) -> Vector3<f64> {
    let mut best_point = points[0];
    let mut best_dot = best_point.dot(&direction);

    for &point in &points[1..] {
        let dot = point.dot(&direction);
        if dot > best_dot {
            best_dot = dot;
            best_point = point;
        }
    }

    best_point
}

/// Support point of the Minkowski difference `A - B` along `direction`.
///
/// Explicitly returns `support(a, direction) - support(b, -direction)` —
/// the reference prototype's `get_support_point` computed this expression
/// but never returned it (spec.md §9, Open Question).
pub fn support_minkowski(
    points_a: &[Vector3<f64>],
    points_b: &[Vector3<f64>],
    direction: Vector3<f64>,
) -> Vector3<f64> {
    support(points_a, direction) - support(points_b, -direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(center: Vector3<f64>, half: f64) -> Vec<Vector3<f64>> {
        let mut verts = Vec::with_capacity(8);
        for &x in &[-half, half] {
            for &y in &[-half, half] {
                for &z in &[-half, half] {
                    verts.push(center + Vector3::new(x, y, z));
                }
            }
        }
        verts
    }

    #[test]
    fn support_maximizes_dot_product() {
        let points = cube(Vector3::zeros(), 1.0);
        for &direction in &[
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(-1.0, -0.3, 0.7),
        ] {
            let best = support(&points, direction);
            let best_dot = best.dot(&direction);
            for &p in &points {
                assert!(p.dot(&direction) <= best_dot + 1e-12);
            }
        }
    }

    #[test]
    fn minkowski_support_matches_definition() {
        let a = cube(Vector3::new(2.0, 0.0, 0.0), 1.0);
        let b = cube(Vector3::zeros(), 1.0);
        let direction = Vector3::new(1.0, 0.0, 0.0);
        let got = support_minkowski(&a, &b, direction);
        let expected = support(&a, direction) - support(&b, -direction);
        assert_eq!(got, expected);
    }
}
