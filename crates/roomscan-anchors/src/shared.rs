//! Lock-guarded store shared between the sensing producer and readers.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use roomscan_geometry::UnifiedMesh;

use crate::patch::{Patch, PatchId};
use crate::store::{AnchorMeshStore, MeshSource, PatchEvent, StoreStats};

/// Thread-safe handle to an [`AnchorMeshStore`].
///
/// Each mutation takes the write lock; each query holds the read lock for its
/// full duration, so `unify()` never observes a half-applied update. Clones
/// share the same store.
#[derive(Debug, Clone, Default)]
pub struct SharedAnchorStore {
    inner: Arc<RwLock<AnchorMeshStore>>,
}

impl SharedAnchorStore {
    /// Create an empty shared store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing store.
    pub fn from_store(store: AnchorMeshStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    // Every operation leaves the store consistent, so a panic in another
    // holder does not invalidate the data.
    fn read(&self) -> RwLockReadGuard<'_, AnchorMeshStore> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AnchorMeshStore> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace the patch for `id`.
    pub fn upsert(&self, id: PatchId, patch: Patch) {
        self.write().upsert(id, patch);
    }

    /// Remove the patch for `id`, if present.
    pub fn remove(&self, id: PatchId) -> Option<Patch> {
        self.write().remove(id)
    }

    /// Drop every patch.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Apply one sensing event.
    pub fn apply(&self, event: PatchEvent) {
        self.write().apply(event);
    }

    /// Apply a batch of events under a single write lock.
    pub fn apply_all<I>(&self, events: I)
    where
        I: IntoIterator<Item = PatchEvent>,
    {
        self.write().apply_all(events);
    }

    /// Fused mesh of a consistent snapshot.
    pub fn unify(&self) -> UnifiedMesh {
        self.read().unify()
    }

    /// Aggregate counters of a consistent snapshot.
    pub fn stats(&self) -> StoreStats {
        self.read().stats()
    }

    /// Number of stored patches.
    pub fn patch_count(&self) -> usize {
        self.read().patch_count()
    }

    /// Total vertex count.
    pub fn vertex_count(&self) -> usize {
        self.read().vertex_count()
    }

    /// Total surviving face count.
    pub fn face_count(&self) -> usize {
        self.read().face_count()
    }

    /// Total fused surface area.
    pub fn total_surface_area(&self) -> f32 {
        self.read().total_surface_area()
    }

    /// True when a patch is stored for `id`.
    pub fn contains(&self, id: PatchId) -> bool {
        self.read().contains(id)
    }

    /// Copy of the current store contents.
    pub fn snapshot(&self) -> AnchorMeshStore {
        self.read().clone()
    }
}

impl MeshSource for SharedAnchorStore {
    fn unified_mesh(&self) -> UnifiedMesh {
        self.unify()
    }
}
