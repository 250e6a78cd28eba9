//! Impulse resolver: normal and friction impulses for a single contact
//! between one or two bodies (spec §4.6).
//!
//! A "static" body (world geometry, an anchor) is modeled by zeroing its
//! inverse mass and inverse inertia contribution to the impulse
//! denominator rather than by a separate one-body code path — the same
//! formulas cover both the one-body and two-body cases this way, and in
//! particular both paths use the same tangential-sliding epsilon (the
//! source prototype's two-body path used `1e6` instead of `1e-6` there,
//! which effectively disabled friction between two dynamic bodies; this
//! resolver does not reproduce that).

use crate::body::RigidBody;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

const FRICTION_EPSILON: f64 = 1e-6;

/// Geometry of a single contact point, as produced by narrow-phase
/// collision (spec §4.4): a world-space point, a unit normal from body A
/// toward body B, and the penetration depth along that normal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContactGeometry {
    pub point: Vector3<f64>,
    pub normal: Vector3<f64>,
    pub penetration: f64,
}

/// Per-body material and kinematic inputs the resolver needs beyond the
/// body's own velocity state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResolverBody {
    pub center: Vector3<f64>,
    pub unit_inertia: Matrix3<f64>,
    pub is_static: bool,
    pub elasticity: f64,
    pub static_friction: f64,
    pub kinetic_friction: f64,
}

/// Resolves a single contact between `body_a` and `body_b`, applying a
/// normal impulse and, when the contact point is sliding, a friction
/// impulse. Bodies already separating along the normal are left untouched.
pub fn resolve(
    body_a: &mut RigidBody,
    meta_a: ResolverBody,
    body_b: &mut RigidBody,
    meta_b: ResolverBody,
    contact: &ContactGeometry,
) {
    let ra = contact.point - meta_a.center;
    let rb = contact.point - meta_b.center;

    let inv_mass_a = if meta_a.is_static { 0.0 } else { body_a.inverse_mass() };
    let inv_mass_b = if meta_b.is_static { 0.0 } else { body_b.inverse_mass() };
    let inv_inertia_a = if meta_a.is_static {
        Matrix3::zeros()
    } else {
        body_a.inverse_inertia(meta_a.unit_inertia)
    };
    let inv_inertia_b = if meta_b.is_static {
        Matrix3::zeros()
    } else {
        body_b.inverse_inertia(meta_b.unit_inertia)
    };

    if inv_mass_a == 0.0 && inv_mass_b == 0.0 {
        return;
    }

    let relative_velocity = body_b.velocity_at_point(rb) - body_a.velocity_at_point(ra);
    let velocity_along_normal = relative_velocity.dot(&contact.normal);
    if velocity_along_normal > 0.0 {
        // Already separating.
        return;
    }

    let angular_term = |inv_inertia: Matrix3<f64>, r: Vector3<f64>, axis: Vector3<f64>| -> f64 {
        (inv_inertia * r.cross(&axis)).cross(&r).dot(&axis)
    };

    let normal_denominator = inv_mass_a
        + inv_mass_b
        + angular_term(inv_inertia_a, ra, contact.normal)
        + angular_term(inv_inertia_b, rb, contact.normal);
    if normal_denominator <= 0.0 {
        return;
    }

    let elasticity = meta_a.elasticity.max(meta_b.elasticity);
    let j = -(1.0 + elasticity) * velocity_along_normal / normal_denominator;
    let normal_impulse = contact.normal * j;

    if !meta_a.is_static {
        body_a.apply_impulse(-normal_impulse, ra, meta_a.unit_inertia);
    }
    if !meta_b.is_static {
        body_b.apply_impulse(normal_impulse, rb, meta_b.unit_inertia);
    }

    apply_friction(body_a, meta_a, ra, body_b, meta_b, rb, contact, j);
}

#[allow(clippy::too_many_arguments)]
fn apply_friction(
    body_a: &mut RigidBody,
    meta_a: ResolverBody,
    ra: Vector3<f64>,
    body_b: &mut RigidBody,
    meta_b: ResolverBody,
    rb: Vector3<f64>,
    contact: &ContactGeometry,
    normal_impulse_magnitude: f64,
) {
    let relative_velocity = body_b.velocity_at_point(rb) - body_a.velocity_at_point(ra);
    let normal_component = relative_velocity.dot(&contact.normal) * contact.normal;
    let tangential_velocity = relative_velocity - normal_component;
    let tangential_speed = tangential_velocity.norm();

    if tangential_speed < FRICTION_EPSILON {
        return;
    }
    let tangent = tangential_velocity / tangential_speed;

    let kinetic_friction = (meta_a.kinetic_friction + meta_b.kinetic_friction) / 2.0;
    let friction_impulse = -tangent * (kinetic_friction * normal_impulse_magnitude.abs());

    if !meta_a.is_static {
        body_a.apply_impulse(-friction_impulse, ra, meta_a.unit_inertia);
    }
    if !meta_b.is_static {
        body_b.apply_impulse(friction_impulse, rb, meta_b.unit_inertia);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn meta(center: Vector3<f64>, is_static: bool) -> ResolverBody {
        ResolverBody {
            center,
            unit_inertia: Matrix3::identity(),
            is_static,
            elasticity: 0.5,
            static_friction: 0.8,
            kinetic_friction: 0.4,
        }
    }

    #[test]
    fn head_on_collision_against_static_body_bounces() {
        let mut a = RigidBody::new(1.0, Vector3::y()).unwrap();
        a.set_linear_velocity(Vector3::new(0.0, -2.0, 0.0));
        let mut b = RigidBody::new(1.0, Vector3::y()).unwrap();

        let contact = ContactGeometry {
            point: Vector3::new(0.0, -0.5, 0.0),
            normal: Vector3::new(0.0, -1.0, 0.0),
            penetration: 0.01,
        };

        resolve(
            &mut a,
            meta(Vector3::zeros(), false),
            &mut b,
            meta(Vector3::new(0.0, -1.0, 0.0), true),
            &contact,
        );

        // Elastic (e=0.5) bounce should reverse and partially damp velocity.
        assert!(a.linear_velocity().y > 0.0);
        assert_relative_eq!(a.linear_velocity().y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn separating_bodies_are_left_untouched() {
        let mut a = RigidBody::new(1.0, Vector3::y()).unwrap();
        a.set_linear_velocity(Vector3::new(0.0, 2.0, 0.0));
        let mut b = RigidBody::new(1.0, Vector3::y()).unwrap();

        let contact = ContactGeometry {
            point: Vector3::new(0.0, -0.5, 0.0),
            normal: Vector3::new(0.0, 1.0, 0.0),
            penetration: 0.01,
        };

        resolve(
            &mut a,
            meta(Vector3::zeros(), false),
            &mut b,
            meta(Vector3::new(0.0, -1.0, 0.0), true),
            &contact,
        );

        assert_relative_eq!(a.linear_velocity().y, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn two_dynamic_bodies_exchange_momentum() {
        let mut a = RigidBody::new(1.0, Vector3::y()).unwrap();
        a.set_linear_velocity(Vector3::new(1.0, 0.0, 0.0));
        let mut b = RigidBody::new(1.0, Vector3::y()).unwrap();
        b.set_linear_velocity(Vector3::new(-1.0, 0.0, 0.0));

        let contact = ContactGeometry {
            point: Vector3::new(0.5, 0.0, 0.0),
            normal: Vector3::new(1.0, 0.0, 0.0),
            penetration: 0.01,
        };

        let mut meta_a = meta(Vector3::zeros(), false);
        meta_a.elasticity = 1.0;
        let mut meta_b = meta(Vector3::new(1.0, 0.0, 0.0), false);
        meta_b.elasticity = 1.0;

        resolve(&mut a, meta_a, &mut b, meta_b, &contact);

        // Equal-mass perfectly elastic head-on collision swaps velocities.
        assert_relative_eq!(a.linear_velocity().x, -1.0, epsilon = 1e-9);
        assert_relative_eq!(b.linear_velocity().x, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn linear_momentum_is_conserved_without_friction() {
        let mut a = RigidBody::new(1.0, Vector3::y()).unwrap();
        a.set_linear_velocity(Vector3::new(2.0, 0.0, 0.0));
        let mut b = RigidBody::new(1.0, Vector3::y()).unwrap();
        b.set_linear_velocity(Vector3::new(-1.0, 0.0, 0.0));

        let before_a = a.linear_velocity();
        let before_b = b.linear_velocity();

        // Contact point on the line between centers keeps friction out of it
        // (no tangential component to the closing velocity).
        let contact = ContactGeometry {
            point: Vector3::new(0.5, 0.0, 0.0),
            normal: Vector3::new(1.0, 0.0, 0.0),
            penetration: 0.01,
        };
        let mut meta_a = meta(Vector3::zeros(), false);
        meta_a.elasticity = 0.5;
        let mut meta_b = meta(Vector3::new(1.0, 0.0, 0.0), false);
        meta_b.elasticity = 0.5;

        resolve(&mut a, meta_a, &mut b, meta_b, &contact);

        let delta_a = a.mass() * (a.linear_velocity() - before_a);
        let delta_b = b.mass() * (b.linear_velocity() - before_b);
        assert_relative_eq!((delta_a + delta_b).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn elastic_collision_preserves_kinetic_energy() {
        let mut a = RigidBody::new(1.0, Vector3::y()).unwrap();
        a.set_linear_velocity(Vector3::new(3.0, 0.0, 0.0));
        let mut b = RigidBody::new(2.0, Vector3::y()).unwrap();
        b.set_linear_velocity(Vector3::new(-1.0, 0.0, 0.0));

        let kinetic_energy =
            |body: &RigidBody| 0.5 * body.mass() * body.linear_velocity().norm_squared();
        let ke_before = kinetic_energy(&a) + kinetic_energy(&b);

        let contact = ContactGeometry {
            point: Vector3::new(0.5, 0.0, 0.0),
            normal: Vector3::new(1.0, 0.0, 0.0),
            penetration: 0.01,
        };
        let mut meta_a = meta(Vector3::zeros(), false);
        meta_a.elasticity = 1.0;
        let mut meta_b = meta(Vector3::new(1.0, 0.0, 0.0), false);
        meta_b.elasticity = 1.0;

        resolve(&mut a, meta_a, &mut b, meta_b, &contact);

        let ke_after = kinetic_energy(&a) + kinetic_energy(&b);
        assert_relative_eq!(ke_after, ke_before, epsilon = 1e-3);
    }

    #[test]
    fn inelastic_collision_loses_kinetic_energy() {
        let mut a = RigidBody::new(1.0, Vector3::y()).unwrap();
        a.set_linear_velocity(Vector3::new(2.0, 0.0, 0.0));
        let mut b = RigidBody::new(1.0, Vector3::y()).unwrap();
        b.set_linear_velocity(Vector3::zeros());

        let kinetic_energy =
            |body: &RigidBody| 0.5 * body.mass() * body.linear_velocity().norm_squared();
        let ke_before = kinetic_energy(&a) + kinetic_energy(&b);

        let contact = ContactGeometry {
            point: Vector3::new(0.5, 0.0, 0.0),
            normal: Vector3::new(1.0, 0.0, 0.0),
            penetration: 0.01,
        };
        let mut meta_a = meta(Vector3::zeros(), false);
        meta_a.elasticity = 0.0;
        let mut meta_b = meta(Vector3::new(1.0, 0.0, 0.0), false);
        meta_b.elasticity = 0.0;

        resolve(&mut a, meta_a, &mut b, meta_b, &contact);

        let ke_after = kinetic_energy(&a) + kinetic_energy(&b);
        assert!(ke_after < ke_before - 1e-6);

        // Inelastic head-on: relative normal velocity should reach zero.
        let relative_normal_velocity = (b.linear_velocity() - a.linear_velocity()).x;
        assert_relative_eq!(relative_normal_velocity, 0.0, epsilon = 1e-9);
    }
}
