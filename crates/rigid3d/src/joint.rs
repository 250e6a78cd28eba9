//! Joint constraints: anchor two bodies' positions (and, for some
//! variants, orientations) together (spec §4.8).
//!
//! The source prototype modeled this as a `Joint` base class with
//! `BallJoint`/`HingeJoint`/`RotatorJoint`/`LockedJoint` subclasses, most of
//! which only overrode a detail or two of `restrict`. Per spec §9's design
//! note that collapses to one [`Joint`] struct whose behavior is selected by
//! a [`JointKind`] tag, dispatched from a single `restrict` method instead
//! of virtual-call inheritance.

use nalgebra::{Quaternion, UnitQuaternion, UnitVector3, Vector3};
use serde::{Deserialize, Serialize};

/// Which constraint variant a [`Joint`] enforces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum JointKind {
    /// Plain position anchor; both bodies rotate freely.
    Basic,
    /// Position anchor plus orientation solved so the child faces the
    /// anchor (spec §4.8 "BallJoint: BasicJoint + orient child to face
    /// parent"). Left as a `#TODO` in the source prototype
    /// (`skeletons/joints.py::BallJoint.restrict`); implemented here.
    Ball,
    /// Position anchor plus rotation locked to swing about a single
    /// parent-local axis (a door hinge).
    Hinge { axis: Vector3<f64> },
    /// Position anchor whose parent-side attachment point is continuously
    /// re-derived from the parent's current orientation, so the arm sweeps
    /// around as the parent spins instead of snapping to a fixed offset.
    Rotator,
    /// Fully rigid attachment: child orientation is slaved to the parent's.
    Locked,
}

/// A constraint binding a child body's anchor point to a parent body's
/// anchor point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Joint {
    pub kind: JointKind,
    /// Anchor offset from the parent's center, in the parent's local frame.
    parent_offset: Vector3<f64>,
    /// The offset `parent_offset` is reset from for `Rotator` joints.
    original_parent_offset: Vector3<f64>,
    /// Anchor offset from the child's center, in the child's local frame.
    pub child_offset: Vector3<f64>,
    /// Reserved for a spring-damper correction (spec §9 Open Question: the
    /// source's spring path was commented out and never reached; this
    /// resolver keeps the hard position snap and leaves `spring_constant`
    /// unused rather than inventing undocumented spring behavior).
    pub spring_constant: f64,
    pub min_radius: f64,
    pub max_radius: f64,
}

impl Joint {
    /// Creates a joint anchored at the given local offsets, snapping
    /// whenever the anchors drift outside `[min_radius, max_radius]`.
    pub fn new(kind: JointKind, parent_offset: Vector3<f64>, child_offset: Vector3<f64>) -> Self {
        Self {
            kind,
            parent_offset,
            original_parent_offset: parent_offset,
            child_offset,
            spring_constant: 0.0,
            min_radius: 0.0,
            max_radius: 0.01,
        }
    }

    /// Applies this joint's constraint, updating the child's position and
    /// (for `Hinge`/`Locked`) orientation in place.
    pub fn restrict(
        &mut self,
        parent_position: Vector3<f64>,
        parent_orientation: UnitQuaternion<f64>,
        child_position: &mut Vector3<f64>,
        child_orientation: &mut UnitQuaternion<f64>,
        _dt: f64,
    ) {
        match self.kind {
            JointKind::Basic => {
                self.snap_position(parent_position, parent_orientation, child_position, *child_orientation);
            }
            JointKind::Ball => {
                self.snap_position(parent_position, parent_orientation, child_position, *child_orientation);
                self.face_anchor(parent_position, parent_orientation, *child_position, child_orientation);
            }
            JointKind::Hinge { axis } => {
                self.snap_position(parent_position, parent_orientation, child_position, *child_orientation);
                let axis = UnitVector3::new_normalize(axis);
                let relative = parent_orientation.inverse() * *child_orientation;
                *child_orientation = parent_orientation * twist_around_axis(relative, axis);
            }
            JointKind::Rotator => {
                self.parent_offset = parent_orientation * self.original_parent_offset;
                self.snap_position(parent_position, parent_orientation, child_position, *child_orientation);
            }
            JointKind::Locked => {
                *child_orientation = parent_orientation;
                self.snap_position(parent_position, parent_orientation, child_position, *child_orientation);
            }
        }
    }

    fn snap_position(
        &self,
        parent_position: Vector3<f64>,
        parent_orientation: UnitQuaternion<f64>,
        child_position: &mut Vector3<f64>,
        child_orientation: UnitQuaternion<f64>,
    ) {
        let anchor = parent_position + parent_orientation * self.parent_offset;
        let target = anchor - child_orientation * self.child_offset;

        let distance = (*child_position - anchor).norm();
        if distance > self.max_radius || distance < self.min_radius {
            *child_position = target;
        }
    }

    /// Orients the child so its local `+z` axis points at the parent's
    /// anchor point (spec §4.8 "BallJoint"). Early-exits when the anchor and
    /// child coincide, per spec §4.8's `1e-7` guard, rather than normalizing
    /// a near-zero displacement.
    fn face_anchor(
        &self,
        parent_position: Vector3<f64>,
        parent_orientation: UnitQuaternion<f64>,
        child_position: Vector3<f64>,
        child_orientation: &mut UnitQuaternion<f64>,
    ) {
        let anchor = parent_position + parent_orientation * self.parent_offset;
        let displacement = anchor - child_position;
        let distance = displacement.norm();
        if distance < 1e-7 {
            return;
        }

        let direction = displacement / distance;
        if let Some(facing) = UnitQuaternion::rotation_between(&Vector3::z(), &direction) {
            *child_orientation = facing;
        }
    }
}

/// Swing-twist decomposition: returns the component of `rotation` that is a
/// pure rotation about `axis`, discarding the swing component.
fn twist_around_axis(rotation: UnitQuaternion<f64>, axis: UnitVector3<f64>) -> UnitQuaternion<f64> {
    let q = rotation.quaternion();
    let vector_part = Vector3::new(q.i, q.j, q.k);
    let projection = vector_part.dot(&axis) * axis.into_inner();

    let twist = Quaternion::new(q.w, projection.x, projection.y, projection.z);
    if twist.norm() < 1e-9 {
        return UnitQuaternion::identity();
    }
    UnitQuaternion::new_normalize(twist)
}
