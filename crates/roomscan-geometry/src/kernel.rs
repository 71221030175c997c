//! Distance, area, volume and angle primitives.
//!
//! Degenerate input never fails: it yields `0.0` and a warning so that the
//! interactive caller keeps running with consistent state.

use roomscan_math::{Axis, Point3, Tolerance, Vec3};
use tracing::warn;

use crate::bounds::Aabb;
use crate::mesh::UnifiedMesh;

/// Gravity-aligned axis of the sensing world.
pub const UP_AXIS: Axis = Axis::Y;

/// Euclidean distance between two points.
pub fn distance(a: &Point3, b: &Point3) -> f32 {
    (b - a).norm()
}

/// Area of the triangle `(a, b, c)`: half the cross-product magnitude.
pub fn triangle_area(a: &Point3, b: &Point3, c: &Point3) -> f32 {
    0.5 * (b - a).cross(&(c - a)).norm()
}

/// Area of a (near-)planar polygon in 3D, via Newell's method.
///
/// Sums the cross products of successive vertex pairs (closing the loop) into
/// an aggregate normal and returns half its magnitude, so no 2D projection is
/// needed and the result does not depend on where the polygon sits or how it
/// is rotated. The magnitude is sign-agnostic: reversing the winding gives
/// the same area.
///
/// Returns `0.0` with a warning for fewer than three points.
pub fn polygon_area(points: &[Point3]) -> f32 {
    if points.len() < 3 {
        warn!(count = points.len(), "polygon area needs at least 3 points");
        return 0.0;
    }

    // Relative to the first vertex to keep precision far from the origin.
    let origin = points[0];
    let mut normal = Vec3::zeros();
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        normal += (p - origin).cross(&(q - origin));
    }
    0.5 * normal.norm()
}

/// Enclosed volume of a closed, consistently wound mesh.
///
/// Signed-tetrahedra sum `|Σ dot(v0, cross(v1, v2))| / 6`. Exact only for
/// closed meshes; open scan surfaces should use [`mesh_bounding_box_volume`].
pub fn mesh_volume(mesh: &UnifiedMesh) -> f32 {
    if mesh.is_empty() {
        warn!("volume requested for an empty mesh");
        return 0.0;
    }

    // Evaluated in f64: far from the origin the signed terms cancel heavily.
    let signed: f64 = mesh
        .triangles()
        .map(|[v0, v1, v2]| {
            let (a, b, c) = (
                v0.coords.cast::<f64>(),
                v1.coords.cast::<f64>(),
                v2.coords.cast::<f64>(),
            );
            a.dot(&b.cross(&c))
        })
        .sum();
    (signed / 6.0).abs() as f32
}

/// Axis-aligned bounding-box volume of a point selection.
///
/// Returns `0.0` with a warning for an empty selection.
pub fn bounding_box_volume(points: &[Point3]) -> f32 {
    match Aabb::from_points(points) {
        Some(aabb) => aabb.volume(),
        None => {
            warn!("bounding box volume requested for an empty selection");
            0.0
        }
    }
}

/// Bounding-box volume of every vertex of `mesh`.
pub fn mesh_bounding_box_volume(mesh: &UnifiedMesh) -> f32 {
    bounding_box_volume(&mesh.vertices)
}

/// Total area of all resolvable faces.
pub fn mesh_surface_area(mesh: &UnifiedMesh) -> f32 {
    mesh.triangles()
        .map(|[a, b, c]| triangle_area(&a, &b, &c))
        .sum()
}

/// Angle in degrees at `vertex` between the rays towards `p1` and `p2`.
///
/// Returns `0.0` with a warning when either ray has zero length.
pub fn angle(vertex: &Point3, p1: &Point3, p2: &Point3) -> f32 {
    let v1 = p1 - vertex;
    let v2 = p2 - vertex;
    let tol = Tolerance::DEFAULT;
    if tol.is_degenerate(&v1) || tol.is_degenerate(&v2) {
        warn!("angle ray has zero length (coincident points)");
        return 0.0;
    }

    let cos = v1.dot(&v2) / (v1.norm() * v2.norm());
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Vertical separation between two points along [`UP_AXIS`].
pub fn height(ground: &Point3, top: &Point3) -> f32 {
    height_along(ground, top, UP_AXIS)
}

/// Absolute separation between two points along `axis`.
pub fn height_along(ground: &Point3, top: &Point3, axis: Axis) -> f32 {
    (axis.component(top) - axis.component(ground)).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use roomscan_math::Transform;

    fn cube(size: f32) -> UnifiedMesh {
        let s = size;
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(s, 0.0, 0.0),
            Point3::new(s, s, 0.0),
            Point3::new(0.0, s, 0.0),
            Point3::new(0.0, 0.0, s),
            Point3::new(s, 0.0, s),
            Point3::new(s, s, s),
            Point3::new(0.0, s, s),
        ];
        let faces = vec![
            [0, 2, 1], [0, 3, 2],
            [4, 5, 6], [4, 6, 7],
            [0, 1, 5], [0, 5, 4],
            [2, 3, 7], [2, 7, 6],
            [0, 4, 7], [0, 7, 3],
            [1, 2, 6], [1, 6, 5],
        ];
        UnifiedMesh::from_triangles(vertices, faces)
    }

    #[test]
    fn test_distance_symmetric() {
        let a = Point3::new(1.0, -2.0, 0.5);
        let b = Point3::new(-3.0, 4.0, 2.0);
        assert_eq!(distance(&a, &b), distance(&b, &a));
        assert_eq!(distance(&a, &a), 0.0);
        assert_relative_eq!(distance(&Point3::origin(), &Point3::new(0.0, 3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_square_area() {
        for s in [0.01_f32, 1.0, 2.5, 40.0] {
            let square = [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(s, 0.0, 0.0),
                Point3::new(s, 0.0, s),
                Point3::new(0.0, 0.0, s),
            ];
            assert_relative_eq!(polygon_area(&square), s * s, max_relative = 1e-5);
        }
    }

    #[test]
    fn test_area_too_few_points() {
        assert_eq!(polygon_area(&[]), 0.0);
        assert_eq!(polygon_area(&[Point3::origin(), Point3::new(1.0, 0.0, 0.0)]), 0.0);
    }

    #[test]
    fn test_area_winding_and_placement_agnostic() {
        let tri = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(0.0, 3.0, 0.0),
        ];
        let reversed: Vec<_> = tri.iter().rev().copied().collect();
        assert_relative_eq!(polygon_area(&tri), 6.0, max_relative = 1e-6);
        assert_relative_eq!(polygon_area(&reversed), 6.0, max_relative = 1e-6);

        let t = Transform::translation(12.0, -3.0, 7.0).then(&Transform::rotation_y(0.7));
        let moved: Vec<_> = tri.iter().map(|p| t.apply_point(p)).collect();
        assert_relative_eq!(polygon_area(&moved), 6.0, max_relative = 1e-4);
    }

    #[test]
    fn test_l_shaped_polygon() {
        // Concave floor outline, 3x3 minus a 1x1 notch
        let l = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 2.0),
            Point3::new(2.0, 0.0, 2.0),
            Point3::new(2.0, 0.0, 3.0),
            Point3::new(0.0, 0.0, 3.0),
        ];
        assert_relative_eq!(polygon_area(&l), 8.0, max_relative = 1e-5);
    }

    #[test]
    fn test_cube_volume() {
        assert_relative_eq!(mesh_volume(&cube(2.0)), 8.0, max_relative = 1e-5);
        assert_relative_eq!(mesh_surface_area(&cube(2.0)), 24.0, max_relative = 1e-5);
    }

    #[test]
    fn test_volume_independent_of_position() {
        let mut mesh = cube(1.0);
        let t = Transform::translation(10.0, 5.0, -3.0);
        for v in &mut mesh.vertices {
            *v = t.apply_point(v);
        }
        assert_relative_eq!(mesh_volume(&mesh), 1.0, max_relative = 1e-4);
    }

    #[test]
    fn test_empty_mesh_volume() {
        assert_eq!(mesh_volume(&UnifiedMesh::new()), 0.0);
        assert_eq!(mesh_bounding_box_volume(&UnifiedMesh::new()), 0.0);
    }

    #[test]
    fn test_bounding_box_volume() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 3.0, 4.0),
            Point3::new(1.0, 1.0, 1.0),
        ];
        assert_relative_eq!(bounding_box_volume(&points), 24.0);
        assert_eq!(bounding_box_volume(&[]), 0.0);
        assert_relative_eq!(mesh_bounding_box_volume(&cube(3.0)), 27.0);
    }

    #[test]
    fn test_angle_perpendicular() {
        let v = Point3::new(1.0, 1.0, 1.0);
        let p1 = Point3::new(2.0, 1.0, 1.0);
        let p2 = Point3::new(1.0, 1.0, 5.0);
        assert_abs_diff_eq!(angle(&v, &p1, &p2), 90.0, epsilon = 1e-4);
        assert_eq!(angle(&v, &p1, &p2), angle(&v, &p2, &p1));
    }

    #[test]
    fn test_angle_straight_and_collinear() {
        let v = Point3::origin();
        let a = Point3::new(1.0, 0.0, 0.0);
        assert_abs_diff_eq!(angle(&v, &a, &Point3::new(-3.0, 0.0, 0.0)), 180.0, epsilon = 1e-3);
        // Same direction: clamping keeps acos finite
        let same = angle(&v, &a, &Point3::new(1e6, 0.0, 0.0));
        assert!(same.is_finite());
        assert_abs_diff_eq!(same, 0.0, epsilon = 0.05);
    }

    #[test]
    fn test_angle_degenerate() {
        let v = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(angle(&v, &v, &Point3::new(0.0, 0.0, 0.0)), 0.0);
        assert_eq!(angle(&v, &Point3::new(0.0, 0.0, 0.0), &v), 0.0);
    }

    #[test]
    fn test_height() {
        let ground = Point3::new(0.3, 0.0, 2.0);
        let top = Point3::new(-1.0, 2.4, 0.0);
        assert_relative_eq!(height(&ground, &top), 2.4);
        assert_relative_eq!(height(&top, &ground), 2.4);
        assert_relative_eq!(height_along(&ground, &top, Axis::Z), 2.0);
    }
}
