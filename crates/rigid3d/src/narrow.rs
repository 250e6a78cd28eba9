//! Narrow-phase collision entry point (spec §6 "Narrow collision call").
//!
//! Glues together GJK, EPA, and contact reconstruction behind the single
//! signature external callers (the collection/scene handler) depend on.

use crate::contact::reconstruct;
use crate::epa::epa;
use crate::gjk::{intersect, GjkOutcome};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Result of a narrow-phase test: separating normal (unit, body 1 toward
/// body 2), penetration depth, and the contact point on body 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NarrowCollision {
    /// Unit contact normal, from body 1 toward body 2.
    pub normal: Vector3<f64>,
    /// Penetration depth along `normal`.
    pub depth: f64,
    /// Contact point on body 1, in world space.
    pub contact_point: Vector3<f64>,
}

impl NarrowCollision {
    fn none() -> Self {
        Self {
            normal: Vector3::zeros(),
            depth: 0.0,
            contact_point: Vector3::zeros(),
        }
    }
}

/// Tests two convex vertex sets (given in a shared local space, offset by
/// `position1`/`position2`) for collision, returning contact geometry on
/// no-hit as the zero/zero/zero triple spec.md §6 specifies.
pub fn get_narrow_collision(
    points1: &[Vector3<f64>],
    points2: &[Vector3<f64>],
    position1: Vector3<f64>,
    position2: Vector3<f64>,
) -> NarrowCollision {
    let world1: Vec<Vector3<f64>> = points1.iter().map(|p| p + position1).collect();
    let world2: Vec<Vector3<f64>> = points2.iter().map(|p| p + position2).collect();

    let simplex = match intersect(&world1, &world2) {
        GjkOutcome::Collision(simplex) => simplex,
        GjkOutcome::NoCollision => return NarrowCollision::none(),
    };

    let Some(epa_result) = epa(&world1, &world2, simplex) else {
        return NarrowCollision::none();
    };

    let face = [
        epa_result.polytope[epa_result.face[0]],
        epa_result.polytope[epa_result.face[1]],
        epa_result.polytope[epa_result.face[2]],
    ];
    let contact = reconstruct(&world1, &world2, epa_result.normal, face);

    NarrowCollision {
        normal: epa_result.normal,
        depth: epa_result.depth,
        contact_point: contact.on_body_a,
    }
}
