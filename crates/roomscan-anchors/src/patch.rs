//! Surface patches delivered by the sensing subsystem.

use std::fmt;

use roomscan_geometry::{Classification, UnifiedMesh};
use roomscan_math::{Point3, Transform, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Stable identifier of a sensor anchor.
///
/// Ordered by the UUID's byte order; the store visits patches in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PatchId(Uuid);

impl PatchId {
    /// A fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Identifier from the 16 raw bytes the sensor reports.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Deterministic identifier from an integer (fixtures, replays).
    pub fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Raw bytes of the identifier.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for PatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// One anchor's fragment of the reconstructed surface, in anchor-local space.
///
/// Owned by the store once submitted; replacement is always a whole-patch swap.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// Anchor identifier.
    pub id: PatchId,
    /// Vertex positions in anchor-local space.
    pub vertices: Vec<Point3>,
    /// Per-vertex normals in anchor-local space.
    pub normals: Vec<Vec3>,
    /// Triangles as indices into `vertices`.
    pub faces: Vec<[u32; 3]>,
    /// Anchor-local to world transform.
    pub transform: Transform,
    /// Optional per-vertex surface tags.
    pub classifications: Option<Vec<Classification>>,
}

impl Patch {
    /// Create a patch with an identity transform and no tags.
    pub fn new(
        id: PatchId,
        vertices: Vec<Point3>,
        normals: Vec<Vec3>,
        faces: Vec<[u32; 3]>,
    ) -> Self {
        Self {
            id,
            vertices,
            normals,
            faces,
            transform: Transform::identity(),
            classifications: None,
        }
    }

    /// Set the local-to-world transform.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Attach per-vertex surface tags.
    pub fn with_classifications(mut self, tags: Vec<Classification>) -> Self {
        self.classifications = Some(tags);
        self
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Faces whose indices all refer to this patch's vertices.
    pub fn valid_faces(&self) -> impl Iterator<Item = &[u32; 3]> + '_ {
        let n = self.vertices.len();
        self.faces
            .iter()
            .filter(move |f| f.iter().all(|&i| (i as usize) < n))
    }

    /// Number of faces that survive fusion.
    pub fn valid_face_count(&self) -> usize {
        self.valid_faces().count()
    }

    /// True when the patch contributes nothing to the fused surface.
    pub fn is_degenerate(&self) -> bool {
        self.vertices.is_empty()
    }

    /// This patch alone, transformed into world space.
    ///
    /// Out-of-range faces are dropped. Normals and tags are padded (zero
    /// vector, [`Classification::None`]) when their counts do not match the
    /// vertex count, so the output buffers stay aligned.
    pub fn to_world(&self) -> UnifiedMesh {
        let n = self.vertices.len();
        let vertices = self
            .vertices
            .iter()
            .map(|v| self.transform.apply_point(v))
            .collect();

        let normals = if self.normals.len() == n {
            self.normals
                .iter()
                .map(|v| self.transform.apply_normal(v))
                .collect()
        } else {
            vec![Vec3::zeros(); n]
        };

        let classifications = match &self.classifications {
            Some(tags) if tags.len() == n => tags.clone(),
            _ => vec![Classification::None; n],
        };

        let faces: Vec<[u32; 3]> = self.valid_faces().copied().collect();
        if faces.len() < self.faces.len() {
            debug!(
                id = %self.id,
                skipped = self.faces.len() - faces.len(),
                "skipping faces with out-of-range indices"
            );
        }

        UnifiedMesh {
            vertices,
            normals,
            faces,
            classifications,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Patch {
        Patch::new(
            PatchId::from_u128(1),
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            vec![Vec3::y(); 4],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_patch_id_ordering() {
        assert!(PatchId::from_u128(1) < PatchId::from_u128(2));
        let id = PatchId::from_u128(0xdead_beef);
        assert_eq!(PatchId::from_bytes(*id.as_bytes()), id);
        assert_ne!(PatchId::new(), PatchId::new());
    }

    #[test]
    fn test_to_world_applies_transform() {
        let transform = Transform::translation(0.0, 2.0, 0.0)
            .then(&Transform::rotation_z(std::f32::consts::PI));
        let patch = quad().with_transform(transform);
        let world = patch.to_world();
        assert_eq!(world.vertex_count(), 4);
        assert!((world.vertices[1] - Point3::new(-1.0, 2.0, 0.0)).norm() < 1e-5);
        // Floor normal flipped upside down
        assert!((world.normals[0] - Vec3::new(0.0, -1.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_malformed_faces_dropped() {
        let mut patch = quad();
        patch.faces.push([0, 3, 4]);
        assert_eq!(patch.valid_face_count(), 2);
        assert_eq!(patch.to_world().face_count(), 2);
    }

    #[test]
    fn test_mismatched_buffers_padded() {
        let mut patch = quad().with_classifications(vec![Classification::Wall; 3]);
        patch.normals.truncate(1);
        let world = patch.to_world();
        assert_eq!(world.normals, vec![Vec3::zeros(); 4]);
        assert_eq!(world.classifications, vec![Classification::None; 4]);
    }

    #[test]
    fn test_degenerate_patch() {
        let patch = Patch::new(PatchId::new(), Vec::new(), Vec::new(), vec![[0, 1, 2]]);
        assert!(patch.is_degenerate());
        assert_eq!(patch.valid_face_count(), 0);
        assert!(patch.to_world().is_empty());
    }
}
