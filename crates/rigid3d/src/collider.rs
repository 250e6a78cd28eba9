//! Collider model: per-body transform, prefab reference, and derived
//! geometry caches (spec §3 "Collider", §4.5 "Collider transforms").

use crate::prefab::{Prefab, PrefabHandle, PrefabTable};
use nalgebra::{Matrix3, Matrix4, Rotation3, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// The 9-element transform spec.md §6 specifies for collider construction:
/// translation, scale, and Euler rotation (radians), in that order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColliderData {
    pub translation: Vector3<f64>,
    pub scale: Vector3<f64>,
    pub rotation: Vector3<f64>,
}

impl ColliderData {
    /// Identity transform: no translation, unit scale, no rotation.
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation: Vector3::zeros(),
        }
    }

    /// Builds from the flat `[tx, ty, tz, sx, sy, sz, rx, ry, rz]` layout
    /// spec.md §6 describes for the external construction interface.
    pub fn from_slice(data: [f64; 9]) -> Self {
        Self {
            translation: Vector3::new(data[0], data[1], data[2]),
            scale: Vector3::new(data[3], data[4], data[5]),
            rotation: Vector3::new(data[6], data[7], data[8]),
        }
    }
}

impl Default for ColliderData {
    fn default() -> Self {
        Self::identity()
    }
}

/// A collider: a prefab reference plus a transform and the geometry/physics
/// state derived from it.
///
/// Per spec §9's redesign note, the collider is treated as an immutable
/// transform snapshot: every setter recomputes *all* derived fields
/// together from scratch, rather than chasing field-by-field invalidation
/// (the source prototype's `set_data` only refreshed `dimensions` when
/// scale changed and the inertia tensor only when *both* scale and rotation
/// changed in the same call — a latent bug this design sidesteps entirely).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collider {
    data: ColliderData,
    prefab: PrefabHandle,
    pub is_static: bool,
    pub elasticity: f64,
    pub static_friction: f64,
    pub kinetic_friction: f64,

    world_vertices: Vec<Vector3<f64>>,
    dimensions: Vector3<f64>,
    geometric_center: Vector3<f64>,
    /// Inertia tensor for a unit-mass body; scale by actual body mass to
    /// use (spec §4.6 — the resolver multiplies by the paired body's mass).
    unit_inertia_tensor: Matrix3<f64>,
}

/// Base volume of the unit-cube prefab assumption (spec §3).
pub const BASE_VOLUME: f64 = 8.0;

impl Collider {
    /// Creates a collider from its transform data and a prefab reference.
    pub fn new(data: ColliderData, prefab: PrefabHandle, prefabs: &PrefabTable, is_static: bool) -> Self {
        Self::with_elasticity(data, prefab, prefabs, is_static, 0.2)
    }

    /// Creates a collider with an explicit elasticity coefficient (default
    /// 0.2 per spec §6); friction defaults to static 0.8 / kinetic 0.4.
    pub fn with_elasticity(
        data: ColliderData,
        prefab: PrefabHandle,
        prefabs: &PrefabTable,
        is_static: bool,
        elasticity: f64,
    ) -> Self {
        let mut collider = Self {
            data,
            prefab,
            is_static,
            elasticity,
            static_friction: 0.8,
            kinetic_friction: 0.4,
            world_vertices: Vec::new(),
            dimensions: Vector3::zeros(),
            geometric_center: Vector3::zeros(),
            unit_inertia_tensor: Matrix3::zeros(),
        };
        collider.recompute(prefabs);
        collider
    }

    /// Replaces the transform and recomputes every derived cache.
    pub fn set_data(&mut self, data: ColliderData, prefabs: &PrefabTable) {
        self.data = data;
        self.recompute(prefabs);
    }

    /// Current transform snapshot.
    pub fn data(&self) -> ColliderData {
        self.data
    }

    /// The prefab this collider references.
    pub fn prefab(&self) -> PrefabHandle {
        self.prefab
    }

    /// Cached world-space vertices.
    pub fn world_vertices(&self) -> &[Vector3<f64>] {
        &self.world_vertices
    }

    /// Cached AABB extents (local-space, rotation-invariant).
    pub fn dimensions(&self) -> Vector3<f64> {
        self.dimensions
    }

    /// Cached geometric center (AABB midpoint of world vertices).
    pub fn geometric_center(&self) -> Vector3<f64> {
        self.geometric_center
    }

    /// Unit-mass inertia tensor; multiply by a body's mass to use in the
    /// impulse resolver (spec §4.6).
    pub fn unit_inertia_tensor(&self) -> Matrix3<f64> {
        self.unit_inertia_tensor
    }

    /// Volume under the unit-cube base-volume assumption (spec §3).
    pub fn volume(&self) -> f64 {
        BASE_VOLUME * self.data.scale.x * self.data.scale.y * self.data.scale.z
    }

    /// Offset from the geometric center to a world-space point.
    pub fn radius_to_point(&self, point: Vector3<f64>) -> Vector3<f64> {
        point - self.geometric_center
    }

    /// Model matrix: `translate * rotateX(-rx) * rotateY(-ry) * rotateZ(-rz)
    /// * scale`, applied to column vectors (spec §4.5). The negated rotation
    /// axes match the source convention and are preserved for compatibility.
    pub fn model_matrix(&self) -> Matrix4<f64> {
        let t = &self.data.translation;
        let r = &self.data.rotation;
        let s = &self.data.scale;

        let translation = Matrix4::new_translation(t);
        let rotate_x = Rotation3::from_axis_angle(&Vector3::x_axis(), -r.x).to_homogeneous();
        let rotate_y = Rotation3::from_axis_angle(&Vector3::y_axis(), -r.y).to_homogeneous();
        let rotate_z = Rotation3::from_axis_angle(&Vector3::z_axis(), -r.z).to_homogeneous();
        let scale = Matrix4::new_nonuniform_scaling(s);

        translation * rotate_x * rotate_y * rotate_z * scale
    }

    fn recompute(&mut self, prefabs: &PrefabTable) {
        let prefab: &Prefab = prefabs.get(self.prefab);
        self.world_vertices = Self::compute_world_vertices(&self.model_matrix(), prefab);
        self.dimensions = Self::compute_dimensions(prefab, self.data.scale);
        self.geometric_center = Self::compute_geometric_center(&self.world_vertices);
        self.unit_inertia_tensor =
            Self::compute_unit_inertia_tensor(&self.world_vertices, self.geometric_center);
    }

    fn compute_world_vertices(model: &Matrix4<f64>, prefab: &Prefab) -> Vec<Vector3<f64>> {
        prefab
            .vertices()
            .iter()
            .map(|v| {
                let homogeneous = model * Vector4::new(v.x, v.y, v.z, 1.0);
                homogeneous.xyz()
            })
            .collect()
    }

    /// AABB extents computed in local space: each prefab vertex scaled
    /// component-wise, then max minus min per axis (spec §4.5).
    fn compute_dimensions(prefab: &Prefab, scale: Vector3<f64>) -> Vector3<f64> {
        let mut minimum = Vector3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut maximum = Vector3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);

        for v in prefab.vertices() {
            let scaled = Vector3::new(v.x * scale.x, v.y * scale.y, v.z * scale.z);
            minimum = minimum.inf(&scaled);
            maximum = maximum.sup(&scaled);
        }

        maximum - minimum
    }

    fn compute_geometric_center(world_vertices: &[Vector3<f64>]) -> Vector3<f64> {
        if world_vertices.is_empty() {
            return Vector3::zeros();
        }
        let mut minimum = world_vertices[0];
        let mut maximum = world_vertices[0];
        for &v in &world_vertices[1..] {
            minimum = minimum.inf(&v);
            maximum = maximum.sup(&v);
        }
        (minimum + maximum) / 2.0
    }

    /// Point-cloud approximation of the inertia tensor for a unit-density,
    /// unit-mass body (spec §4.5) — not an integral over the solid volume.
    fn compute_unit_inertia_tensor(world_vertices: &[Vector3<f64>], center: Vector3<f64>) -> Matrix3<f64> {
        if world_vertices.is_empty() {
            return Matrix3::zeros();
        }

        let mut tensor = Matrix3::zeros();
        for &v in world_vertices {
            let r = v - center;
            tensor[(0, 0)] += r.y * r.y + r.z * r.z;
            tensor[(1, 1)] += r.x * r.x + r.z * r.z;
            tensor[(2, 2)] += r.x * r.x + r.y * r.y;
            tensor[(0, 1)] -= r.x * r.y;
            tensor[(0, 2)] -= r.x * r.z;
            tensor[(1, 2)] -= r.y * r.z;
        }
        tensor[(1, 0)] = tensor[(0, 1)];
        tensor[(2, 0)] = tensor[(0, 2)];
        tensor[(2, 1)] = tensor[(1, 2)];

        tensor / world_vertices.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_cube() -> (PrefabTable, PrefabHandle) {
        let mut table = PrefabTable::new();
        let handle = table.insert(Prefab::unit_cube());
        (table, handle)
    }

    #[test]
    fn identity_collider_has_unit_dimensions() {
        let (table, handle) = table_with_cube();
        let collider = Collider::new(ColliderData::identity(), handle, &table, false);
        let dims = collider.dimensions();
        assert!((dims.x - 1.0).abs() < 1e-9);
        assert!((dims.y - 1.0).abs() < 1e-9);
        assert!((dims.z - 1.0).abs() < 1e-9);
    }

    #[test]
    fn translation_moves_world_vertices_and_center() {
        let (table, handle) = table_with_cube();
        let mut data = ColliderData::identity();
        data.translation = Vector3::new(2.0, 0.0, 0.0);
        let collider = Collider::new(data, handle, &table, false);

        assert!((collider.geometric_center().x - 2.0).abs() < 1e-9);
        for v in collider.world_vertices() {
            assert!(v.x >= 1.49 && v.x <= 2.51);
        }
    }

    #[test]
    fn inertia_tensor_is_symmetric_and_psd() {
        let (table, handle) = table_with_cube();
        let collider = Collider::new(ColliderData::identity(), handle, &table, false);
        let tensor = collider.unit_inertia_tensor();

        assert!((tensor[(0, 1)] - tensor[(1, 0)]).abs() < 1e-9);
        assert!((tensor[(0, 2)] - tensor[(2, 0)]).abs() < 1e-9);
        assert!((tensor[(1, 2)] - tensor[(2, 1)]).abs() < 1e-9);

        // Symmetric eigenvalue decomposition should have no negative
        // eigenvalues for a physically valid point cloud.
        let eigen = tensor.symmetric_eigen();
        for value in eigen.eigenvalues.iter() {
            assert!(*value >= -1e-9);
        }
    }

    #[test]
    fn idempotent_cache_after_repeated_set_data() {
        let (table, handle) = table_with_cube();
        let mut collider = Collider::new(ColliderData::identity(), handle, &table, false);
        let data = collider.data();

        collider.set_data(data, &table);
        let first = (
            collider.world_vertices().to_vec(),
            collider.dimensions(),
            collider.unit_inertia_tensor(),
        );
        collider.set_data(data, &table);
        let second = (
            collider.world_vertices().to_vec(),
            collider.dimensions(),
            collider.unit_inertia_tensor(),
        );

        assert_eq!(first.0, second.0);
        assert_eq!(first.1, second.1);
        assert_eq!(first.2, second.2);
    }

    #[test]
    fn scale_changes_volume() {
        let (table, handle) = table_with_cube();
        let mut data = ColliderData::identity();
        data.scale = Vector3::new(2.0, 1.0, 1.0);
        let collider = Collider::new(data, handle, &table, false);
        assert!((collider.volume() - BASE_VOLUME * 2.0).abs() < 1e-9);
    }
}
