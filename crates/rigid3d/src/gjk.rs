//! Gilbert–Johnson–Keerthi intersection test (spec §4.2).
//!
//! Iteratively builds a simplex inside the Minkowski difference of two
//! convex point sets and decides whether it encloses the origin. On success
//! the terminal tetrahedron is handed to [`crate::epa`] to extract contact
//! geometry.

use crate::support::support_minkowski;
use nalgebra::Vector3;

/// Safety cap on GJK iterations (spec §4.2, §7).
pub const MAX_ITERATIONS: usize = 32;

const EPSILON: f64 = 1e-6;

/// The terminal tetrahedron of a successful GJK run, ordered as produced by
/// the simplex routine (not necessarily CCW — EPA re-derives outward
/// normals from scratch).
pub type Simplex = [Vector3<f64>; 4];

/// Outcome of a GJK intersection test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GjkOutcome {
    /// The shapes do not intersect (or the test hit a safe fallback: an
    /// iteration cap or a degenerate support oracle — both policy-mapped to
    /// "no collision" per spec §7).
    NoCollision,
    /// The Minkowski difference's origin is enclosed by `simplex`.
    Collision(Simplex),
}

/// Tests whether the convex hulls of `points_a` and `points_b` intersect.
///
/// Returns [`GjkOutcome::NoCollision`] for empty inputs, genuine separation,
/// an exhausted iteration cap, or a degenerate support oracle (both support
/// sets collapsing to a single point or direction).
pub fn intersect(points_a: &[Vector3<f64>], points_b: &[Vector3<f64>]) -> GjkOutcome {
    if points_a.is_empty() || points_b.is_empty() {
        return GjkOutcome::NoCollision;
    }

    let mut simplex: Vec<Vector3<f64>> = Vec::with_capacity(4);

    let first = support_minkowski(points_a, points_b, Vector3::x());
    simplex.push(first);
    let mut direction = -first;

    for _ in 0..MAX_ITERATIONS {
        if direction.norm_squared() < EPSILON * EPSILON {
            // Origin coincides with the existing simplex; nudge along an
            // arbitrary axis rather than report a false degenerate.
            direction = Vector3::x();
        }

        let candidate = support_minkowski(points_a, points_b, direction);

        if candidate.dot(&direction) < 0.0 {
            return GjkOutcome::NoCollision;
        }

        if simplex.iter().any(|v| (v - candidate).norm_squared() < EPSILON * EPSILON) {
            // Same vertex keeps getting selected: the Minkowski difference
            // has collapsed to something lower-dimensional than GJK can
            // make progress on.
            tracing::warn!("gjk: degenerate geometry, support oracle stalled");
            return GjkOutcome::NoCollision;
        }

        simplex.push(candidate);

        if let Some(result) = evolve_simplex(&mut simplex, &mut direction) {
            return result;
        }
    }

    tracing::warn!(limit = MAX_ITERATIONS, "gjk: iteration cap exceeded");
    GjkOutcome::NoCollision
}

/// Updates `simplex` and `direction` for the newest point, returning
/// `Some(outcome)` once the tetrahedron case resolves.
fn evolve_simplex(simplex: &mut Vec<Vector3<f64>>, direction: &mut Vector3<f64>) -> Option<GjkOutcome> {
    match simplex.len() {
        2 => {
            line_case(simplex, direction);
            None
        }
        3 => {
            triangle_case(simplex, direction);
            None
        }
        4 => {
            if tetrahedron_case(simplex, direction) {
                let tetra: Simplex = [simplex[0], simplex[1], simplex[2], simplex[3]];
                Some(GjkOutcome::Collision(tetra))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// 2-point simplex (line) case: direction perpendicular to `AB` toward the
/// origin via the triple product `(AB x AO) x AB`.
fn line_case(simplex: &mut Vec<Vector3<f64>>, direction: &mut Vector3<f64>) {
    let a = simplex[1];
    let b = simplex[0];
    let ab = b - a;
    let ao = -a;

    if ab.dot(&ao) > 0.0 {
        *direction = triple_product(ab, ao, ab);
        if direction.norm_squared() < EPSILON {
            // AO is (anti)parallel to AB: pick any direction orthogonal to AB.
            let fallback = if ab.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
            *direction = ab.cross(&fallback);
        }
    } else {
        simplex.clear();
        simplex.push(a);
        *direction = ao;
    }
}

/// 3-point simplex (triangle) case: classify the origin against the three
/// Voronoi regions and reduce to 2 or 3 points accordingly.
fn triangle_case(simplex: &mut Vec<Vector3<f64>>, direction: &mut Vector3<f64>) {
    let a = simplex[2];
    let b = simplex[1];
    let c = simplex[0];

    let ab = b - a;
    let ac = c - a;
    let ao = -a;
    let abc = ab.cross(&ac);

    if abc.cross(&ac).dot(&ao) > 0.0 {
        if ac.dot(&ao) > 0.0 {
            simplex.clear();
            simplex.push(c);
            simplex.push(a);
            *direction = triple_product(ac, ao, ac);
        } else {
            reduce_to_ab_region(simplex, a, b, ab, ao, direction);
        }
    } else if ab.cross(&abc).dot(&ao) > 0.0 {
        reduce_to_ab_region(simplex, a, b, ab, ao, direction);
    } else if abc.dot(&ao) > 0.0 {
        *direction = abc;
    } else {
        simplex.clear();
        simplex.push(b);
        simplex.push(c);
        simplex.push(a);
        *direction = -abc;
    }
}

fn reduce_to_ab_region(
    simplex: &mut Vec<Vector3<f64>>,
    a: Vector3<f64>,
    b: Vector3<f64>,
    ab: Vector3<f64>,
    ao: Vector3<f64>,
    direction: &mut Vector3<f64>,
) {
    if ab.dot(&ao) > 0.0 {
        simplex.clear();
        simplex.push(b);
        simplex.push(a);
        *direction = triple_product(ab, ao, ab);
    } else {
        simplex.clear();
        simplex.push(a);
        *direction = ao;
    }
}

/// 4-point simplex (tetrahedron) case: test each face for the origin on its
/// outward side. If a face separates, drop the opposite vertex and recurse
/// into the triangle case with that face; otherwise the origin is enclosed.
fn tetrahedron_case(simplex: &mut Vec<Vector3<f64>>, direction: &mut Vector3<f64>) -> bool {
    let a = simplex[3];
    let b = simplex[2];
    let c = simplex[1];
    let d = simplex[0];

    let ab = b - a;
    let ac = c - a;
    let ad = d - a;
    let ao = -a;

    let abc = ab.cross(&ac);
    let acd = ac.cross(&ad);
    let adb = ad.cross(&ab);

    if abc.dot(&ao) > 0.0 {
        *simplex = vec![c, b, a];
        triangle_case(simplex, direction);
        return false;
    }
    if acd.dot(&ao) > 0.0 {
        *simplex = vec![d, c, a];
        triangle_case(simplex, direction);
        return false;
    }
    if adb.dot(&ao) > 0.0 {
        *simplex = vec![b, d, a];
        triangle_case(simplex, direction);
        return false;
    }

    true
}

fn triple_product(v1: Vector3<f64>, v2: Vector3<f64>, v3: Vector3<f64>) -> Vector3<f64> {
    v1.cross(&v2).cross(&v3)
}
