//! Expanding Polytope Algorithm (spec §4.3).
//!
//! Takes the tetrahedral simplex GJK leaves behind when it finds the origin
//! enclosed, and expands it face-by-face until the closest face to the
//! origin is also the surface of the Minkowski difference — at which point
//! its normal and distance are the contact normal and penetration depth.

use crate::gjk::Simplex;
use crate::support::support_minkowski;
use nalgebra::Vector3;

/// Safety cap on EPA iterations (spec §4.3, §7).
pub const MAX_ITERATIONS: usize = 64;

const TOLERANCE: f64 = 1e-4;
const EPSILON: f64 = 1e-9;

/// An oriented triangular face of the expanding polytope.
#[derive(Debug, Clone, Copy)]
struct Face {
    indices: [usize; 3],
    normal: Vector3<f64>,
    distance: f64,
}

/// Penetration geometry extracted by EPA.
#[derive(Debug, Clone)]
pub struct EpaResult {
    /// Unit contact normal, pointing from body 1 toward body 2.
    pub normal: Vector3<f64>,
    /// Penetration depth along `normal`.
    pub depth: f64,
    /// All polytope vertices at termination (Minkowski-difference space).
    pub polytope: Vec<Vector3<f64>>,
    /// Indices into `polytope` of the nearest face's three vertices.
    pub face: [usize; 3],
}

/// Expands `simplex` into a polytope and returns the nearest-face contact
/// geometry, or `None` if the simplex is degenerate or the iteration cap is
/// exhausted without a usable face (both logged and treated by callers as
/// no-collision, per spec §7).
pub fn epa(points_a: &[Vector3<f64>], points_b: &[Vector3<f64>], simplex: Simplex) -> Option<EpaResult> {
    let (mut vertices, mut faces) = build_initial_polytope(&simplex)?;

    for _ in 0..MAX_ITERATIONS {
        let closest = closest_face(&faces)?;
        let closest_face = faces[closest];

        let support = support_minkowski(points_a, points_b, closest_face.normal);
        let support_distance = closest_face.normal.dot(&support);
        let delta = support_distance - closest_face.distance;

        if delta < TOLERANCE {
            return Some(EpaResult {
                normal: closest_face.normal,
                depth: closest_face.distance,
                polytope: vertices,
                face: closest_face.indices,
            });
        }

        if !expand(&mut vertices, &mut faces, support) {
            return Some(EpaResult {
                normal: closest_face.normal,
                depth: closest_face.distance,
                polytope: vertices,
                face: closest_face.indices,
            });
        }
    }

    tracing::warn!(limit = MAX_ITERATIONS, "epa: iteration cap exceeded");
    let closest = closest_face(&faces)?;
    let closest_face = faces[closest];
    Some(EpaResult {
        normal: closest_face.normal,
        depth: closest_face.distance,
        polytope: vertices,
        face: closest_face.indices,
    })
}

fn build_initial_polytope(simplex: &Simplex) -> Option<(Vec<Vector3<f64>>, Vec<Face>)> {
    let vertices = simplex.to_vec();
    let face_indices = [(0, 1, 2), (0, 3, 1), (0, 2, 3), (1, 3, 2)];

    let mut faces = Vec::with_capacity(4);
    for (i0, i1, i2) in face_indices {
        faces.push(make_face_outward(&vertices, i0, i1, i2)?);
    }

    Some((vertices, faces))
}

/// Builds a face with its normal oriented away from the polytope origin,
/// returning `None` for a degenerate (near-zero-area) triangle.
fn make_face_outward(vertices: &[Vector3<f64>], a: usize, b: usize, c: usize) -> Option<Face> {
    let ab = vertices[b] - vertices[a];
    let ac = vertices[c] - vertices[a];
    let mut normal = ab.cross(&ac);

    if normal.norm_squared() < EPSILON {
        return None;
    }
    normal.normalize_mut();

    let mut distance = normal.dot(&vertices[a]);
    if distance < 0.0 {
        normal = -normal;
        distance = -distance;
    }

    Some(Face {
        indices: [a, b, c],
        normal,
        distance,
    })
}

fn closest_face(faces: &[Face]) -> Option<usize> {
    faces
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.distance.partial_cmp(&b.distance).unwrap())
        .map(|(i, _)| i)
}

fn is_face_visible(vertices: &[Vector3<f64>], face: &Face, point: Vector3<f64>) -> bool {
    face.normal.dot(&(point - vertices[face.indices[0]])) > 1e-6
}

/// Adds `p` to the polytope, removing every face it can see and
/// re-triangulating the resulting silhouette hole. Returns `false` if `p`
/// duplicates an existing vertex or no faces end up facing away from it
/// (both signal the polytope cannot usefully grow further).
fn expand(vertices: &mut Vec<Vector3<f64>>, faces: &mut Vec<Face>, p: Vector3<f64>) -> bool {
    if vertices.iter().any(|v| (v - p).norm_squared() < EPSILON * 10.0) {
        return false;
    }

    let new_index = vertices.len();
    vertices.push(p);

    let mut silhouette: Vec<(usize, usize)> = Vec::new();
    let mut kept: Vec<Face> = Vec::with_capacity(faces.len());

    for face in faces.iter() {
        if is_face_visible(vertices, face, p) {
            add_edge(&mut silhouette, face.indices[0], face.indices[1]);
            add_edge(&mut silhouette, face.indices[1], face.indices[2]);
            add_edge(&mut silhouette, face.indices[2], face.indices[0]);
        } else {
            kept.push(*face);
        }
    }

    if silhouette.is_empty() {
        vertices.pop();
        return false;
    }

    for (a, b) in silhouette {
        if let Some(face) = make_face_outward(vertices, a, b, new_index) {
            kept.push(face);
        }
    }

    if kept.is_empty() {
        vertices.pop();
        return false;
    }

    *faces = kept;
    true
}

/// An edge is a silhouette edge iff it borders exactly one removed face;
/// seeing it twice (once per winding direction) cancels it back out.
fn add_edge(edges: &mut Vec<(usize, usize)>, a: usize, b: usize) {
    if let Some(pos) = edges.iter().position(|&(u, v)| u == b && v == a) {
        edges.swap_remove(pos);
    } else {
        edges.push((a, b));
    }
}
