//! A rigid-body collision and impulse-response core: GJK/EPA narrow-phase
//! intersection, barycentric contact reconstruction, a collider/prefab
//! model with cached derived geometry, quaternion-integrated bodies, an
//! impulse resolver, and a small joint constraint layer.
//!
//! [`Scene`] is the typical entry point: register prefabs, spawn colliders
//! and bodies, wire up joints, then call [`Scene::step`] once per fixed
//! timestep with the collision pairs to test that tick.

pub mod body;
pub mod collider;
pub mod contact;
pub mod epa;
pub mod gjk;
pub mod joint;
pub mod narrow;
pub mod prefab;
pub mod resolver;
pub mod scene;
pub mod support;

pub use body::{PointBody, RigidBody};
pub use collider::{Collider, ColliderData};
pub use joint::{Joint, JointKind};
pub use narrow::{get_narrow_collision, NarrowCollision};
pub use prefab::{Prefab, PrefabHandle, PrefabTable};
pub use scene::{BodyId, Scene, SceneConfig};

pub use nalgebra;
pub use rigid3d_errors::{PhysicsError, Result};
