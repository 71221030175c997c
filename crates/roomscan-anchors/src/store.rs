//! The authoritative set of surface patches and its fused mesh.

use std::collections::BTreeMap;

use rayon::prelude::*;
use roomscan_geometry::{mesh_surface_area, UnifiedMesh};
use tracing::debug;

use crate::patch::{Patch, PatchId};

/// One update from the sensing subsystem.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchEvent {
    /// Insert or replace the patch stored under `patch.id`.
    Upsert(Patch),
    /// Drop the patch with this identifier.
    Remove(PatchId),
}

impl PatchEvent {
    /// Convert a sensor callback pair: `Some` upserts, `None` removes.
    pub fn from_update(id: PatchId, patch: Option<Patch>) -> Self {
        match patch {
            Some(mut patch) => {
                patch.id = id;
                PatchEvent::Upsert(patch)
            }
            None => PatchEvent::Remove(id),
        }
    }
}

/// Anything that can hand out a fused world-space mesh.
pub trait MeshSource {
    /// A consistent snapshot of the fused surface.
    fn unified_mesh(&self) -> UnifiedMesh;
}

/// Aggregate counters over the current patch set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StoreStats {
    /// Number of stored patches.
    pub patch_count: usize,
    /// Sum of all patch vertex counts.
    pub vertex_count: usize,
    /// Sum of all patch faces that survive fusion.
    pub face_count: usize,
    /// Total area of the fused surface (square meters).
    pub surface_area: f32,
}

/// Surface patches keyed by anchor identifier.
///
/// Patches are kept in ascending [`PatchId`] order, which is the order
/// [`AnchorMeshStore::unify`] concatenates them in. No operation here fails.
#[derive(Debug, Clone, Default)]
pub struct AnchorMeshStore {
    patches: BTreeMap<PatchId, Patch>,
}

impl AnchorMeshStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or atomically replace the patch for `id`.
    pub fn upsert(&mut self, id: PatchId, mut patch: Patch) {
        patch.id = id;
        let vertices = patch.vertex_count();
        let replaced = self.patches.insert(id, patch).is_some();
        debug!(%id, vertices, replaced, "upsert patch");
    }

    /// Remove the patch for `id`, returning it if it was present.
    pub fn remove(&mut self, id: PatchId) -> Option<Patch> {
        let removed = self.patches.remove(&id);
        debug!(%id, found = removed.is_some(), "remove patch");
        removed
    }

    /// Drop every patch.
    pub fn clear(&mut self) {
        debug!(count = self.patches.len(), "clear patch store");
        self.patches.clear();
    }

    /// Apply one sensing event.
    pub fn apply(&mut self, event: PatchEvent) {
        match event {
            PatchEvent::Upsert(patch) => self.upsert(patch.id, patch),
            PatchEvent::Remove(id) => {
                self.remove(id);
            }
        }
    }

    /// Apply a batch of events in order.
    pub fn apply_all<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = PatchEvent>,
    {
        for event in events {
            self.apply(event);
        }
    }

    /// The patch stored for `id`.
    pub fn get(&self, id: PatchId) -> Option<&Patch> {
        self.patches.get(&id)
    }

    /// True when a patch is stored for `id`.
    pub fn contains(&self, id: PatchId) -> bool {
        self.patches.contains_key(&id)
    }

    /// Stored identifiers in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = PatchId> + '_ {
        self.patches.keys().copied()
    }

    /// Stored patches in ascending identifier order.
    pub fn patches(&self) -> impl Iterator<Item = &Patch> + '_ {
        self.patches.values()
    }

    /// True when no patch is stored.
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Fuse every patch into one world-space mesh.
    ///
    /// Patches are transformed in parallel, then concatenated in ascending
    /// identifier order with each patch's face indices offset by the number
    /// of vertices before it. The result depends only on the stored patches.
    pub fn unify(&self) -> UnifiedMesh {
        let ordered: Vec<&Patch> = self.patches.values().collect();
        let parts: Vec<UnifiedMesh> = ordered.par_iter().map(|p| p.to_world()).collect();

        let mut mesh = UnifiedMesh {
            vertices: Vec::with_capacity(self.vertex_count()),
            normals: Vec::with_capacity(self.vertex_count()),
            faces: Vec::with_capacity(self.face_count()),
            classifications: Vec::with_capacity(self.vertex_count()),
        };
        for part in &parts {
            mesh.merge(part);
        }
        mesh
    }

    /// Number of stored patches.
    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }

    /// Total vertex count across all patches.
    pub fn vertex_count(&self) -> usize {
        self.patches.values().map(Patch::vertex_count).sum()
    }

    /// Total count of faces that survive fusion.
    pub fn face_count(&self) -> usize {
        self.patches.values().map(Patch::valid_face_count).sum()
    }

    /// Total area of the fused surface.
    pub fn total_surface_area(&self) -> f32 {
        mesh_surface_area(&self.unify())
    }

    /// All aggregate counters at once.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            patch_count: self.patch_count(),
            vertex_count: self.vertex_count(),
            face_count: self.face_count(),
            surface_area: self.total_surface_area(),
        }
    }
}

impl MeshSource for AnchorMeshStore {
    fn unified_mesh(&self) -> UnifiedMesh {
        self.unify()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use roomscan_geometry::Classification;
    use roomscan_math::{Point3, Transform, Vec3};

    fn square_patch(id: u128, x0: f32) -> Patch {
        Patch::new(
            PatchId::from_u128(id),
            vec![
                Point3::new(x0, 0.0, 0.0),
                Point3::new(x0 + 1.0, 0.0, 0.0),
                Point3::new(x0 + 1.0, 0.0, 1.0),
                Point3::new(x0, 0.0, 1.0),
            ],
            vec![Vec3::y(); 4],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    fn triangle_patch(id: u128) -> Patch {
        Patch::new(
            PatchId::from_u128(id),
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
            ],
            vec![Vec3::z(); 3],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn test_two_disjoint_squares() {
        let mut store = AnchorMeshStore::new();
        store.upsert(PatchId::from_u128(1), square_patch(1, 0.0));
        store.upsert(PatchId::from_u128(2), square_patch(2, 5.0));

        let mesh = store.unify();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 4);
        assert_relative_eq!(store.total_surface_area(), 2.0, epsilon = 1e-5);
        assert!(mesh
            .faces
            .iter()
            .all(|f| f.iter().all(|&i| (i as usize) < mesh.vertex_count())));
    }

    #[test]
    fn test_upsert_replaces() {
        let mut store = AnchorMeshStore::new();
        let id = PatchId::from_u128(7);
        store.upsert(id, square_patch(7, 0.0));
        store.upsert(id, triangle_patch(7));

        assert_eq!(store.patch_count(), 1);
        assert_eq!(store.get(id).map(Patch::vertex_count), Some(3));
        assert_eq!(store.unify().vertex_count(), 3);
    }

    #[test]
    fn test_upsert_key_wins_over_patch_id() {
        let mut store = AnchorMeshStore::new();
        store.upsert(PatchId::from_u128(9), square_patch(1, 0.0));
        assert!(store.contains(PatchId::from_u128(9)));
        assert!(!store.contains(PatchId::from_u128(1)));
        assert_eq!(store.get(PatchId::from_u128(9)).map(|p| p.id), Some(PatchId::from_u128(9)));
    }

    #[test]
    fn test_remove_subtracts_contribution() {
        let mut store = AnchorMeshStore::new();
        store.upsert(PatchId::from_u128(1), square_patch(1, 0.0));
        store.upsert(PatchId::from_u128(2), triangle_patch(2));
        let before = store.stats();

        store.remove(PatchId::from_u128(2));
        let after = store.stats();
        assert_eq!(after.vertex_count, before.vertex_count - 3);
        assert_eq!(after.face_count, before.face_count - 1);
        assert_eq!(after.patch_count, 1);

        // Missing ids are a no-op
        assert!(store.remove(PatchId::from_u128(42)).is_none());
        assert_eq!(store.stats(), after);
    }

    #[test]
    fn test_clear() {
        let mut store = AnchorMeshStore::new();
        store.upsert(PatchId::from_u128(1), square_patch(1, 0.0));
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.stats(), StoreStats::default());
        assert!(store.unify().is_empty());
    }

    #[test]
    fn test_unify_order_is_by_id_not_insertion() {
        let mut forward = AnchorMeshStore::new();
        forward.upsert(PatchId::from_u128(1), square_patch(1, 0.0));
        forward.upsert(PatchId::from_u128(2), triangle_patch(2));
        forward.upsert(PatchId::from_u128(3), square_patch(3, 9.0));

        let mut backward = AnchorMeshStore::new();
        backward.upsert(PatchId::from_u128(3), square_patch(3, 9.0));
        backward.upsert(PatchId::from_u128(2), triangle_patch(2));
        backward.upsert(PatchId::from_u128(1), square_patch(1, 0.0));

        let a = forward.unify();
        assert_eq!(a, backward.unify());
        // Patch 2 comes second, offset by patch 1's four vertices
        assert_eq!(a.faces[2], [4, 5, 6]);
        assert_eq!(forward.ids().collect::<Vec<_>>(), backward.ids().collect::<Vec<_>>());
    }

    #[test]
    fn test_transforms_and_tags_flow_through() {
        let mut store = AnchorMeshStore::new();
        let patch = square_patch(1, 0.0)
            .with_transform(Transform::translation(0.0, 3.0, 0.0))
            .with_classifications(vec![Classification::Ceiling; 4]);
        store.upsert(patch.id, patch);

        let mesh = store.unify();
        assert!(mesh.vertices.iter().all(|v| (v.y - 3.0).abs() < 1e-6));
        assert_relative_eq!(mesh.classified_area(Classification::Ceiling), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_degenerate_patch_contributes_nothing() {
        let mut store = AnchorMeshStore::new();
        store.upsert(PatchId::from_u128(1), square_patch(1, 0.0));
        store.upsert(
            PatchId::from_u128(2),
            Patch::new(PatchId::from_u128(2), Vec::new(), Vec::new(), vec![[0, 1, 2]]),
        );
        let stats = store.stats();
        assert_eq!(stats.patch_count, 2);
        assert_eq!(stats.vertex_count, 4);
        assert_eq!(stats.face_count, 2);
        assert_relative_eq!(stats.surface_area, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_apply_events() {
        let mut store = AnchorMeshStore::new();
        let id = PatchId::from_u128(5);
        store.apply_all([
            PatchEvent::from_update(id, Some(square_patch(99, 0.0))),
            PatchEvent::from_update(id, Some(triangle_patch(99))),
            PatchEvent::Upsert(square_patch(6, 2.0)),
            PatchEvent::from_update(PatchId::from_u128(6), None),
        ]);
        assert_eq!(store.ids().collect::<Vec<_>>(), vec![id]);
        assert_eq!(store.vertex_count(), 3);
    }
}
