//! Top-level simulation driver (spec §5 "Simulation loop", §6 "External
//! interfaces").
//!
//! A [`Scene`] owns every collider, body, and joint in a simulation and
//! advances them one fixed timestep at a time via [`Scene::step`]. Collision
//! pairs are supplied by the caller rather than discovered by a broad
//! phase — spec.md's Non-goals explicitly exclude spatial partitioning, so
//! `step` takes the pair list as an argument instead of growing one.

use crate::body::RigidBody;
use crate::collider::{Collider, ColliderData};
use crate::joint::Joint;
use crate::narrow::get_narrow_collision;
use crate::prefab::{Prefab, PrefabHandle, PrefabTable};
use crate::resolver::{self, ContactGeometry, ResolverBody};
use nalgebra::{UnitQuaternion, Vector3};
use rigid3d_errors::Result;
use serde::{Deserialize, Serialize};

/// Handle to a body (and its paired collider) within a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(u32);

struct JointEntry {
    joint: Joint,
    parent: BodyId,
    child: BodyId,
}

/// Scene-wide tuning knobs, mirroring the original prototype's
/// `PhysicsHandler(scene, accelerations: list = [...])` (spec §4.7).
///
/// The engine applies every listed acceleration to every dynamic body each
/// tick, rather than a single hardcoded gravity vector — the original kept
/// this as a list specifically so callers could layer e.g. wind on top of
/// gravity via `add_acceleration` without replacing the existing constant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Constant world-space accelerations applied to every dynamic body
    /// each tick (spec §4.7 "Σ a · Δt for each external acceleration").
    pub accelerations: Vec<Vector3<f64>>,
}

impl Default for SceneConfig {
    /// Earth-like gravity along `-y`, matching the original prototype's
    /// default `accelerations = [glm.vec3(0, -9.8, 0)]` (rounded from its
    /// `-0.8` placeholder to the documented 9.8 m/s2 figure spec.md §8's
    /// scenarios assume).
    fn default() -> Self {
        Self {
            accelerations: vec![Vector3::new(0.0, -9.8, 0.0)],
        }
    }
}

/// Owns the colliders, bodies, and joints of one simulation and drives them
/// forward in time.
pub struct Scene {
    prefabs: PrefabTable,
    colliders: Vec<Collider>,
    /// `None` marks a static body (world geometry): it participates in
    /// collision and joints but is never integrated or moved.
    bodies: Vec<Option<RigidBody>>,
    joints: Vec<JointEntry>,
    config: SceneConfig,
}

impl Scene {
    /// Creates an empty scene with the default [`SceneConfig`] (Earth-like
    /// gravity along -y).
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Creates an empty scene with an explicit [`SceneConfig`].
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            prefabs: PrefabTable::new(),
            colliders: Vec::new(),
            bodies: Vec::new(),
            joints: Vec::new(),
            config,
        }
    }

    /// This scene's current configuration.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Appends a constant acceleration to the scene (spec §4.7's
    /// `add_acceleration`), leaving any existing ones (e.g. gravity) intact.
    pub fn add_acceleration(&mut self, acceleration: Vector3<f64>) {
        self.config.accelerations.push(acceleration);
    }

    /// Replaces the scene's constant accelerations wholesale.
    pub fn set_accelerations(&mut self, accelerations: Vec<Vector3<f64>>) {
        self.config.accelerations = accelerations;
    }

    /// Registers a prefab, returning a handle colliders can reference.
    pub fn add_prefab(&mut self, prefab: Prefab) -> PrefabHandle {
        self.prefabs.insert(prefab)
    }

    /// Spawns a dynamic (simulated) body with the given mass and rotation
    /// axis.
    pub fn spawn_dynamic(
        &mut self,
        data: ColliderData,
        prefab: PrefabHandle,
        mass: f64,
        rotation_axis: Vector3<f64>,
    ) -> Result<BodyId> {
        let body = RigidBody::new(mass, rotation_axis)?;
        let collider = Collider::new(data, prefab, &self.prefabs, false);
        self.colliders.push(collider);
        self.bodies.push(Some(body));
        Ok(BodyId((self.colliders.len() - 1) as u32))
    }

    /// Spawns static world geometry: contributes to collision and joints
    /// but never moves under its own power.
    pub fn spawn_static(&mut self, data: ColliderData, prefab: PrefabHandle) -> BodyId {
        let collider = Collider::new(data, prefab, &self.prefabs, true);
        self.colliders.push(collider);
        self.bodies.push(None);
        BodyId((self.colliders.len() - 1) as u32)
    }

    pub fn collider(&self, id: BodyId) -> &Collider {
        &self.colliders[id.0 as usize]
    }

    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies[id.0 as usize].as_ref()
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies[id.0 as usize].as_mut()
    }

    /// Registers a joint constraining `child` to `parent`.
    pub fn add_joint(&mut self, joint: Joint, parent: BodyId, child: BodyId) {
        self.joints.push(JointEntry { joint, parent, child });
    }

    /// Advances the scene by `dt` seconds.
    ///
    /// `pairs` lists the body pairs to narrow-test this tick, in the order
    /// they should be resolved — the resolver is Gauss-Seidel, so earlier
    /// pairs influence the velocities later pairs see.
    pub fn step(&mut self, dt: f64, pairs: &[(BodyId, BodyId)]) {
        for body in self.bodies.iter_mut().flatten() {
            for &acceleration in &self.config.accelerations {
                body.accelerate(acceleration, dt);
            }
        }

        for &(a, b) in pairs {
            self.resolve_pair(a, b);
        }

        let mut positions: Vec<Vector3<f64>> =
            self.colliders.iter().map(|c| c.data().translation).collect();
        let mut orientations: Vec<UnitQuaternion<f64>> = self
            .bodies
            .iter()
            .map(|b| b.as_ref().map(|body| body.orientation).unwrap_or_else(UnitQuaternion::identity))
            .collect();

        for (i, body) in self.bodies.iter().enumerate() {
            if let Some(body) = body {
                positions[i] += body.delta_position(dt);
                orientations[i] = body.next_orientation(dt);
            }
        }

        for entry in self.joints.iter_mut() {
            let parent_idx = entry.parent.0 as usize;
            let child_idx = entry.child.0 as usize;
            let parent_position = positions[parent_idx];
            let parent_orientation = orientations[parent_idx];

            let child_position = &mut positions[child_idx];
            let child_orientation = &mut orientations[child_idx];
            entry
                .joint
                .restrict(parent_position, parent_orientation, child_position, child_orientation, dt);
        }

        for i in 0..self.colliders.len() {
            if self.bodies[i].is_none() {
                continue;
            }
            let mut data = self.colliders[i].data();
            data.translation = positions[i];
            data.rotation = euler_from_quaternion(orientations[i]);
            self.colliders[i].set_data(data, &self.prefabs);
            if let Some(body) = self.bodies[i].as_mut() {
                body.orientation = orientations[i];
            }
        }
    }

    fn resolve_pair(&mut self, a: BodyId, b: BodyId) {
        let (ai, bi) = (a.0 as usize, b.0 as usize);
        debug_assert_ne!(ai, bi, "a body cannot collide with itself");

        let verts_a = self.colliders[ai].world_vertices().to_vec();
        let verts_b = self.colliders[bi].world_vertices().to_vec();
        let collision = get_narrow_collision(&verts_a, &verts_b, Vector3::zeros(), Vector3::zeros());
        if collision.depth <= 0.0 {
            return;
        }

        let meta_a = self.resolver_body(ai);
        let meta_b = self.resolver_body(bi);
        let contact = ContactGeometry {
            point: collision.contact_point,
            normal: collision.normal,
            penetration: collision.depth,
        };

        let mut static_stand_in_a = RigidBody::new(1.0, Vector3::y()).unwrap();
        let mut static_stand_in_b = RigidBody::new(1.0, Vector3::y()).unwrap();
        let (body_a, body_b) = borrow_pair(&mut self.bodies, ai, bi);

        resolver::resolve(
            body_a.unwrap_or(&mut static_stand_in_a),
            meta_a,
            body_b.unwrap_or(&mut static_stand_in_b),
            meta_b,
            &contact,
        );
    }

    fn resolver_body(&self, index: usize) -> ResolverBody {
        let collider = &self.colliders[index];
        ResolverBody {
            center: collider.geometric_center(),
            unit_inertia: collider.unit_inertia_tensor(),
            is_static: self.bodies[index].is_none(),
            elasticity: collider.elasticity,
            static_friction: collider.static_friction,
            kinetic_friction: collider.kinetic_friction,
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrows two distinct, possibly-`None` elements of `bodies` mutably at
/// once. Panics if `i == j` — a body cannot collide with itself.
fn borrow_pair(bodies: &mut [Option<RigidBody>], i: usize, j: usize) -> (Option<&mut RigidBody>, Option<&mut RigidBody>) {
    assert_ne!(i, j);
    if i < j {
        let (left, right) = bodies.split_at_mut(j);
        (left[i].as_mut(), right[0].as_mut())
    } else {
        let (left, right) = bodies.split_at_mut(i);
        (right[0].as_mut(), left[j].as_mut())
    }
}

/// Projects an orientation quaternion down to the negated-axis Euler angles
/// a [`Collider`]'s transform uses. Exact for single-axis rotation (the
/// common case for the body/joint scenarios this engine targets); composed
/// multi-axis rotations are not generally representable as three
/// independent Euler angles applied in the collider's fixed `x, y, z`
/// order, so this is a documented approximation rather than a lossless
/// round trip.
fn euler_from_quaternion(orientation: UnitQuaternion<f64>) -> Vector3<f64> {
    let (roll, pitch, yaw) = orientation.euler_angles();
    Vector3::new(-roll, -pitch, -yaw)
}
