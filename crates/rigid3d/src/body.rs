//! Physics bodies: the velocity/orientation state that drives a collider's
//! transform forward in time (spec §3 "PointBody" / "RigidBody", §4.7
//! "Integration").

use nalgebra::{Matrix3, UnitQuaternion, UnitVector3, Vector3};
use rigid3d_errors::{PhysicsError, Result};
use serde::{Deserialize, Serialize};

/// A point mass: linear velocity only, no orientation state. Used for
/// bodies whose rotation is irrelevant to the simulation (spec §3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointBody {
    mass: f64,
    inverse_mass: f64,
    pub linear_velocity: Vector3<f64>,
}

impl PointBody {
    /// Creates a point body at rest. `mass` must be strictly positive.
    pub fn new(mass: f64) -> Result<Self> {
        if !(mass > 0.0) {
            return Err(PhysicsError::InvalidMass(mass));
        }
        Ok(Self {
            mass,
            inverse_mass: 1.0 / mass,
            linear_velocity: Vector3::zeros(),
        })
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn inverse_mass(&self) -> f64 {
        self.inverse_mass
    }

    /// Displacement over `dt` at the current linear velocity.
    pub fn delta_position(&self, dt: f64) -> Vector3<f64> {
        self.linear_velocity * dt
    }

    /// Advances linear velocity by a constant acceleration (e.g. gravity)
    /// over `dt`.
    pub fn accelerate(&mut self, acceleration: Vector3<f64>, dt: f64) {
        self.linear_velocity += acceleration * dt;
    }
}

/// A rigid body: a point body plus rotational state around a single axis.
///
/// The orientation quaternion is the body's own rotational state and is
/// deliberately kept separate from any Euler-angle representation a
/// collider's transform exposes (spec §3) — the scene driver is
/// responsible for projecting it down to Euler angles when it writes the
/// integrated pose back onto the body's collider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RigidBody {
    point: PointBody,
    /// Scalar rotational speed, radians/second, about `rotation_axis`.
    pub angular_speed: f64,
    pub rotation_axis: UnitVector3<f64>,
    pub orientation: UnitQuaternion<f64>,
}

impl RigidBody {
    /// Creates a rigid body at rest with identity orientation.
    pub fn new(mass: f64, rotation_axis: Vector3<f64>) -> Result<Self> {
        let axis = UnitVector3::new_normalize(if rotation_axis.norm_squared() > 0.0 {
            rotation_axis
        } else {
            Vector3::y()
        });
        Ok(Self {
            point: PointBody::new(mass)?,
            angular_speed: 0.0,
            rotation_axis: axis,
            orientation: UnitQuaternion::identity(),
        })
    }

    pub fn mass(&self) -> f64 {
        self.point.mass()
    }

    pub fn inverse_mass(&self) -> f64 {
        self.point.inverse_mass()
    }

    pub fn linear_velocity(&self) -> Vector3<f64> {
        self.point.linear_velocity
    }

    pub fn set_linear_velocity(&mut self, velocity: Vector3<f64>) {
        self.point.linear_velocity = velocity;
    }

    pub fn delta_position(&self, dt: f64) -> Vector3<f64> {
        self.point.delta_position(dt)
    }

    pub fn accelerate(&mut self, acceleration: Vector3<f64>, dt: f64) {
        self.point.accelerate(acceleration, dt);
    }

    /// The orientation after `dt` seconds at the current angular speed,
    /// without mutating `self`. Composition is `delta * orientation`, a
    /// rotation about the world-space axis applied before the body's
    /// existing orientation; the negated angle matches the source
    /// convention (positive `angular_speed` spins clockwise about the
    /// axis as seen from its tip).
    pub fn next_orientation(&self, dt: f64) -> UnitQuaternion<f64> {
        if self.angular_speed == 0.0 {
            return self.orientation;
        }
        let delta = UnitQuaternion::from_axis_angle(&self.rotation_axis, -self.angular_speed * dt);
        delta * self.orientation
    }

    /// Advances linear position (via the caller applying `delta_position`)
    /// and rotational orientation by `dt`.
    pub fn integrate(&mut self, dt: f64) {
        self.orientation = self.next_orientation(dt);
    }

    /// World-space angular velocity vector (`axis * angular_speed`).
    pub fn angular_velocity_vector(&self) -> Vector3<f64> {
        self.rotation_axis.into_inner() * self.angular_speed
    }

    /// Velocity of a world-space point `r` offset from this body's center,
    /// accounting for rotation: `v + ω × r`.
    pub fn velocity_at_point(&self, r: Vector3<f64>) -> Vector3<f64> {
        self.point.linear_velocity + self.angular_velocity_vector().cross(&r)
    }

    /// World-space inertia tensor for this body's mass, given the
    /// collider's cached unit-mass tensor (spec §4.6).
    pub fn effective_inertia(&self, unit_inertia: Matrix3<f64>) -> Matrix3<f64> {
        unit_inertia * self.mass()
    }

    /// Inverse of [`Self::effective_inertia`], or the zero matrix if the
    /// tensor is singular (degenerate point cloud — treated the same as a
    /// static body for rotational response purposes).
    pub fn inverse_inertia(&self, unit_inertia: Matrix3<f64>) -> Matrix3<f64> {
        self.effective_inertia(unit_inertia)
            .try_inverse()
            .unwrap_or_else(Matrix3::zeros)
    }

    /// Applies an impulse `j` at world-space offset `r` from the body's
    /// center, updating linear velocity and re-deriving rotation speed/axis
    /// from the resulting angular velocity vector (spec §4.6 "Apply to body
    /// i"): `ω_vec' = ω_vec + I⁻¹·(r × j)`, then decomposed back into a
    /// scalar speed and unit axis, or snapped to `(1,0,0)` at rest.
    pub fn apply_impulse(&mut self, j: Vector3<f64>, r: Vector3<f64>, unit_inertia: Matrix3<f64>) {
        self.point.linear_velocity += j * self.inverse_mass();

        let torque = r.cross(&j);
        let angular_delta = self.inverse_inertia(unit_inertia) * torque;
        let angular_velocity_vector = self.angular_velocity_vector() + angular_delta;

        if angular_velocity_vector.norm() < 1e-6 {
            self.angular_speed = 0.0;
            self.rotation_axis = UnitVector3::new_unchecked(Vector3::x());
        } else {
            self.angular_speed = angular_velocity_vector.norm();
            self.rotation_axis = UnitVector3::new_normalize(angular_velocity_vector);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_or_negative_mass_is_rejected() {
        assert!(matches!(PointBody::new(0.0), Err(PhysicsError::InvalidMass(_))));
        assert!(matches!(PointBody::new(-1.0), Err(PhysicsError::InvalidMass(_))));
        assert!(PointBody::new(1.0).is_ok());
    }

    #[test]
    fn point_body_accelerates_linearly() {
        let mut body = PointBody::new(2.0).unwrap();
        body.accelerate(Vector3::new(0.0, -9.8, 0.0), 0.5);
        assert_relative_eq!(body.linear_velocity.y, -4.9, epsilon = 1e-9);
        assert_relative_eq!(body.delta_position(1.0).y, -4.9, epsilon = 1e-9);
    }

    #[test]
    fn stationary_rigid_body_keeps_identity_orientation() {
        let body = RigidBody::new(1.0, Vector3::y()).unwrap();
        assert_eq!(body.next_orientation(1.0), UnitQuaternion::identity());
    }

    #[test]
    fn spinning_rigid_body_rotates_about_its_axis() {
        let mut body = RigidBody::new(1.0, Vector3::y()).unwrap();
        body.angular_speed = std::f64::consts::FRAC_PI_2;
        body.integrate(1.0);

        let rotated = body.orientation * Vector3::x();
        // A quarter turn about +y (negated per convention) sends +x to -z.
        assert_relative_eq!(rotated.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(rotated.z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn impulse_at_center_only_changes_linear_velocity() {
        let mut body = RigidBody::new(2.0, Vector3::y()).unwrap();
        let inertia = Matrix3::identity();
        body.apply_impulse(Vector3::new(4.0, 0.0, 0.0), Vector3::zeros(), inertia);
        assert_relative_eq!(body.linear_velocity().x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(body.angular_speed, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn offset_impulse_induces_spin() {
        let mut body = RigidBody::new(1.0, Vector3::y()).unwrap();
        let inertia = Matrix3::identity();
        body.apply_impulse(Vector3::new(0.0, 0.0, 1.0), Vector3::new(1.0, 0.0, 0.0), inertia);
        assert!(body.angular_speed.abs() > 0.0);
    }

    #[test]
    fn impulse_off_existing_axis_re_derives_rotation_axis() {
        // A torque entirely off the body's current spin axis should move the
        // axis toward the torque's own axis, not just scale the old one.
        let mut body = RigidBody::new(1.0, Vector3::y()).unwrap();
        body.angular_speed = 5.0;
        let inertia = Matrix3::identity();
        body.apply_impulse(Vector3::new(0.0, 1.0, 10.0), Vector3::new(1.0, 0.0, 0.0), inertia);

        // The torque has a component off the existing +y spin axis, so the
        // resulting axis should tilt away from pure +y rather than stay on it.
        assert!(body.rotation_axis.y.abs() < 1.0);
    }

    #[test]
    fn impulse_that_cancels_spin_resets_to_canonical_axis() {
        let mut body = RigidBody::new(1.0, Vector3::y()).unwrap();
        body.angular_speed = 1.0;
        let inertia = Matrix3::identity();
        // r x j = (1,0,0) x (0,0,1) = (0,-1,0), exactly cancelling the
        // existing +y angular velocity vector of magnitude 1.
        body.apply_impulse(Vector3::new(0.0, 0.0, 1.0), Vector3::new(1.0, 0.0, 0.0), inertia);

        assert_relative_eq!(body.angular_speed, 0.0, epsilon = 1e-9);
        assert_relative_eq!(body.rotation_axis.x, 1.0, epsilon = 1e-9);
    }
}
