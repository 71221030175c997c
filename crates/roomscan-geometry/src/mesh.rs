//! The consolidated world-space surface produced by fusing patches.

use roomscan_math::{Point3, Vec3};
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;
use crate::kernel::triangle_area;

/// Semantic surface tag attached to a vertex by the sensing subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Unclassified surface.
    #[default]
    None,
    /// Vertical wall.
    Wall,
    /// Floor.
    Floor,
    /// Ceiling.
    Ceiling,
    /// Table or desk top.
    Table,
    /// Chair, sofa, bench.
    Seat,
    /// Window.
    Window,
    /// Door.
    Door,
}

impl Classification {
    /// Every tag, in wire-code order.
    pub const ALL: [Classification; 8] = [
        Classification::None,
        Classification::Wall,
        Classification::Floor,
        Classification::Ceiling,
        Classification::Table,
        Classification::Seat,
        Classification::Window,
        Classification::Door,
    ];

    /// Decode a wire code. Unknown codes are unclassified.
    pub fn from_code(code: u8) -> Self {
        Self::ALL
            .get(code as usize)
            .copied()
            .unwrap_or(Classification::None)
    }

    /// Wire code of this tag.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// World-space triangle mesh assembled from every stored patch.
///
/// `classifications` is aligned 1:1 with `vertices`; `normals` likewise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnifiedMesh {
    /// Vertex positions in world space.
    pub vertices: Vec<Point3>,
    /// Per-vertex unit normals in world space.
    pub normals: Vec<Vec3>,
    /// Triangles as indices into `vertices`.
    pub faces: Vec<[u32; 3]>,
    /// Per-vertex surface tags.
    pub classifications: Vec<Classification>,
}

impl UnifiedMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an untagged mesh from positions and faces (normals left zero).
    pub fn from_triangles(vertices: Vec<Point3>, faces: Vec<[u32; 3]>) -> Self {
        let n = vertices.len();
        Self {
            vertices,
            normals: vec![Vec3::zeros(); n],
            faces,
            classifications: vec![Classification::None; n],
        }
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// True when the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Merge another mesh into this one, offsetting its face indices.
    pub fn merge(&mut self, other: &UnifiedMesh) {
        let offset = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.classifications
            .extend_from_slice(&other.classifications);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]),
        );
    }

    /// Corner positions of face `index`, or `None` if the face is out of
    /// range or references a missing vertex.
    pub fn triangle(&self, index: usize) -> Option<[Point3; 3]> {
        let f = self.faces.get(index)?;
        Some([
            *self.vertices.get(f[0] as usize)?,
            *self.vertices.get(f[1] as usize)?,
            *self.vertices.get(f[2] as usize)?,
        ])
    }

    /// Iterate over the corner positions of every resolvable face.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3; 3]> + '_ {
        (0..self.faces.len()).filter_map(move |i| self.triangle(i))
    }

    /// Bounding box of all vertices.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }

    /// Area of the faces whose three vertices all carry `class`.
    pub fn classified_area(&self, class: Classification) -> f32 {
        let tag = |i: u32| self.classifications.get(i as usize).copied();
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.iter().all(|&i| tag(i) == Some(class)))
            .filter_map(|(i, _)| self.triangle(i))
            .map(|[a, b, c]| triangle_area(&a, &b, &c))
            .sum()
    }
}
