//! Shared convex-polyhedron prefabs (spec §3 "Prefab", §9 "Shared prefab
//! references").
//!
//! A prefab is an immutable, ordered list of unique local-space vertices,
//! held by many colliders at once. Rather than an owning pointer or a
//! lifetime-carrying borrow, colliders hold a [`PrefabHandle`] — an index
//! into a [`PrefabTable`] — so the table can be mutated (new prefabs added)
//! without invalidating existing colliders, and so a collider's lifetime
//! never has to outlive or be tied to the table's.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// An immutable convex polyhedron template: an ordered set of unique
/// local-space vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prefab {
    vertices: Vec<Vector3<f64>>,
}

impl Prefab {
    /// Creates a prefab from its local-space vertices.
    pub fn new(vertices: Vec<Vector3<f64>>) -> Self {
        Self { vertices }
    }

    /// A unit cube centered at the origin, the base shape spec.md §3/§4.5
    /// assumes for `base_volume = 8`.
    pub fn unit_cube() -> Self {
        let mut vertices = Vec::with_capacity(8);
        for &x in &[-0.5, 0.5] {
            for &y in &[-0.5, 0.5] {
                for &z in &[-0.5, 0.5] {
                    vertices.push(Vector3::new(x, y, z));
                }
            }
        }
        Self { vertices }
    }

    /// The prefab's local-space vertices.
    pub fn vertices(&self) -> &[Vector3<f64>] {
        &self.vertices
    }
}

/// Opaque handle into a [`PrefabTable`]. Cheap to copy, never dereferences
/// a pointer into collider-owned memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrefabHandle(u32);

/// Arena of prefabs, shared by reference (via [`PrefabHandle`]) across all
/// colliders in a scene. Prefabs are never mutated after insertion.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PrefabTable {
    prefabs: Vec<Prefab>,
}

impl PrefabTable {
    /// Creates an empty prefab table.
    pub fn new() -> Self {
        Self { prefabs: Vec::new() }
    }

    /// Inserts a prefab and returns a handle to it.
    pub fn insert(&mut self, prefab: Prefab) -> PrefabHandle {
        let handle = PrefabHandle(self.prefabs.len() as u32);
        self.prefabs.push(prefab);
        handle
    }

    /// Looks up a prefab by handle.
    ///
    /// # Panics
    ///
    /// Panics if `handle` was not issued by this table — prefab handles are
    /// not meant to outlive or cross between tables.
    pub fn get(&self, handle: PrefabHandle) -> &Prefab {
        &self.prefabs[handle.0 as usize]
    }
}
