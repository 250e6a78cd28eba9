//! Contact point reconstruction (spec §4.4).
//!
//! EPA only tells us the separating normal and depth in Minkowski-difference
//! space. To get an actual world-space contact point on each body we take
//! the barycentric weights of the origin's projection onto the nearest
//! face, then re-run the support oracle to find which vertex of each body
//! produced each face vertex.

use crate::support::support;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

const VOLUME_EPSILON: f64 = 1e-9;

/// Reconstructs the contact point on body 1 (and, for completeness, body 2)
/// from the EPA result's nearest face.
///
/// `normal` is the EPA-returned separating normal; `face_vertices` are the
/// three Minkowski-space vertices `a, b, c` of the nearest face, in the
/// order EPA stored them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContactPoint {
    /// Contact point on body 1, in body 1's coordinate space.
    pub on_body_a: Vector3<f64>,
    /// Contact point on body 2, in body 2's coordinate space.
    pub on_body_b: Vector3<f64>,
}

/// Computes the contact point(s) for the nearest EPA face.
pub fn reconstruct(
    points_a: &[Vector3<f64>],
    points_b: &[Vector3<f64>],
    normal: Vector3<f64>,
    face_vertices: [Vector3<f64>; 3],
) -> ContactPoint {
    let [a, b, c] = face_vertices;

    let signed_volume = |p1: Vector3<f64>, p2: Vector3<f64>, p3: Vector3<f64>| -> f64 {
        (p1 - p3).cross(&(p2 - p3)).dot(&normal) / 6.0
    };

    let total_volume = signed_volume(a, b, c);

    let origin = Vector3::zeros();
    if total_volume.abs() < VOLUME_EPSILON {
        // Degenerate (near-zero-area) face: fall back to the geometric mean
        // of the face's own body-1/body-2 support points.
        let (s1a, s2a) = supports_for(points_a, points_b, a);
        let (s1b, s2b) = supports_for(points_a, points_b, b);
        let (s1c, s2c) = supports_for(points_a, points_b, c);
        return ContactPoint {
            on_body_a: (s1a + s1b + s1c) / 3.0,
            on_body_b: (s2a + s2b + s2c) / 3.0,
        };
    }

    let mut u = signed_volume(origin, b, c) / total_volume;
    let mut v = signed_volume(origin, c, a) / total_volume;
    let mut w = signed_volume(origin, a, b) / total_volume;

    let sum = u + v + w;
    if sum.abs() > VOLUME_EPSILON {
        u /= sum;
        v /= sum;
        w /= sum;
    }

    let (s1a, s2a) = supports_for(points_a, points_b, a);
    let (s1b, s2b) = supports_for(points_a, points_b, b);
    let (s1c, s2c) = supports_for(points_a, points_b, c);

    ContactPoint {
        on_body_a: u * s1a + v * s1b + w * s1c,
        on_body_b: u * s2a + v * s2b + w * s2c,
    }
}

/// For a Minkowski-space vertex `m = support(a, d) - support(b, -d)`, recover
/// the original body-1 and body-2 support points by querying the oracle
/// with `d = m` itself (spec §4.4 step 3).
fn supports_for(
    points_a: &[Vector3<f64>],
    points_b: &[Vector3<f64>],
    minkowski_vertex: Vector3<f64>,
) -> (Vector3<f64>, Vector3<f64>) {
    let s1 = support(points_a, minkowski_vertex);
    let s2 = support(points_b, -minkowski_vertex);
    (s1, s2)
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
    fn contact_point_lies_between_the_two_bodies() {
        use crate::epa::epa;
        use crate::gjk::{intersect, GjkOutcome};

        let a = cube(Vector3::zeros(), 0.5);
        let b = cube(Vector3::new(0.8, 0.0, 0.0), 0.5);

        let simplex = match intersect(&a, &b) {
            GjkOutcome::Collision(s) => s,
            GjkOutcome::NoCollision => panic!("expected collision"),
        };
        let epa_result = epa(&a, &b, simplex).expect("epa should succeed");
        let face = [
            epa_result.polytope[epa_result.face[0]],
            epa_result.polytope[epa_result.face[1]],
            epa_result.polytope[epa_result.face[2]],
        ];

        let contact = reconstruct(&a, &b, epa_result.normal, face);
        // Body 1 is the unit cube centered at the origin: its contact point
        // must lie on its +x face.
        assert!((contact.on_body_a.x - 0.5).abs() < 1e-6);
    }
}
