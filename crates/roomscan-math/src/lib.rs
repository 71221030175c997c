#![warn(missing_docs)]

//! Math types for the roomscan core.
//!
//! Thin wrappers around nalgebra for the sensing world: single-precision
//! points and vectors (meters), the 4x4 local-to-world transform attached to
//! every surface patch, world axes, and tolerance constants.

use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// A point in world or patch-local space (meters).
pub type Point3 = nalgebra::Point3<f32>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f32>;

/// A 4x4 affine local-to-world transformation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f32>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f32, dy: f32, dz: f32) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Uniform scale.
    pub fn uniform_scale(s: f32) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 0)] = s;
        m[(1, 1)] = s;
        m[(2, 2)] = s;
        Self { matrix: m }
    }

    /// Rotation about the Y (up) axis by `angle` radians.
    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 2)] = s;
        m[(2, 0)] = -s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 1)] = -s;
        m[(1, 0)] = s;
        m[(1, 1)] = c;
        Self { matrix: m }
    }

    /// Build from 16 floats in column-major order (the sensor's native layout).
    pub fn from_column_major(values: &[f32; 16]) -> Self {
        Self {
            matrix: Matrix4::from_column_slice(values),
        }
    }

    /// The 16 matrix entries in column-major order.
    pub fn to_column_major(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(self.matrix.as_slice());
        out
    }

    /// Compose: `self` then `other` (self * other).
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a direction vector (ignores translation).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// Transform a surface normal and re-normalize it.
    ///
    /// Uses the inverse transpose of the upper-left 3x3 so non-uniform scale
    /// keeps normals perpendicular to the surface. A singular transform or a
    /// zero-length input returns the input unchanged.
    pub fn apply_normal(&self, n: &Vec3) -> Vec3 {
        let m3: Matrix3<f32> = self.matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let Some(inv) = m3.try_inverse() else {
            return *n;
        };
        let out = inv.transpose() * n;
        let len = out.norm();
        if len > f32::EPSILON {
            out / len
        } else {
            *n
        }
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }

    /// True when this is exactly the identity matrix.
    pub fn is_identity(&self) -> bool {
        self.matrix == Matrix4::identity()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// A world coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// X axis.
    X,
    /// Y axis, gravity-aligned "up" in the sensing world.
    #[default]
    Y,
    /// Z axis.
    Z,
}

impl Axis {
    /// Component index (0, 1, 2).
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Component of `p` along this axis.
    pub fn component(self, p: &Point3) -> f32 {
        p[self.index()]
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in meters.
    pub linear: f32,
    /// Minimum vector length treated as non-degenerate.
    pub length: f32,
}

impl Tolerance {
    /// Default tolerances: 0.1 mm linear, machine epsilon for lengths.
    pub const DEFAULT: Self = Self {
        linear: 1e-4,
        length: f32::EPSILON,
    };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a vector is long enough to have a direction.
    pub fn is_degenerate(&self, v: &Vec3) -> bool {
        v.norm() <= self.length
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_identity_transform() {
        let t = Transform::identity();
        let p = Point3::new(1.0, 2.0, 3.0);
        assert!((t.apply_point(&p) - p).norm() < 1e-6);
        assert!(t.is_identity());
    }

    #[test]
    fn test_translation() {
        let t = Transform::translation(10.0, 20.0, 30.0);
        let result = t.apply_point(&Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(result.x, 11.0);
        assert_relative_eq!(result.y, 22.0);
        assert_relative_eq!(result.z, 33.0);
    }

    #[test]
    fn test_translation_ignored_for_vectors() {
        let t = Transform::translation(5.0, 5.0, 5.0);
        let v = t.apply_vec(&Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(v, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_rotation_y_90() {
        // +X rotates onto -Z about +Y
        let t = Transform::rotation_y(FRAC_PI_2);
        let result = t.apply_point(&Point3::new(1.0, 0.0, 0.0));
        assert!(result.x.abs() < 1e-6);
        assert!((result.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_column_major_round_trip() {
        let t = Transform::translation(1.0, 2.0, 3.0).then(&Transform::rotation_z(0.3));
        let cols = t.to_column_major();
        // translation lives in the last column
        assert_relative_eq!(cols[12], 1.0);
        assert_relative_eq!(cols[13], 2.0);
        assert_relative_eq!(cols[14], 3.0);
        assert_eq!(Transform::from_column_major(&cols), t);
    }

    #[test]
    fn test_normal_under_non_uniform_scale() {
        let mut t = Transform::identity();
        t.matrix[(0, 0)] = 2.0;
        // Normal of the plane x + y = 0 stays perpendicular after scaling x
        let n = Vec3::new(1.0, 1.0, 0.0).normalize();
        let out = t.apply_normal(&n);
        let tangent = t.apply_vec(&Vec3::new(1.0, -1.0, 0.0));
        assert!(out.dot(&tangent).abs() < 1e-6);
        assert_relative_eq!(out.norm(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_singular_normal_passthrough() {
        let t = Transform::uniform_scale(0.0);
        let n = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(t.apply_normal(&n), n);
    }

    #[test]
    fn test_inverse() {
        let t = Transform::translation(1.0, 2.0, 3.0);
        let inv = t.inverse().unwrap();
        let p = Point3::new(5.0, 6.0, 7.0);
        assert!((t.then(&inv).apply_point(&p) - p).norm() < 1e-5);
    }

    #[test]
    fn test_axis_component() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(Axis::X.component(&p), 1.0);
        assert_eq!(Axis::default().component(&p), 2.0);
        assert_eq!(Axis::Z.component(&p), 3.0);
    }

    #[test]
    fn test_tolerance() {
        let tol = Tolerance::DEFAULT;
        let a = Point3::new(1.0, 2.0, 3.0);
        assert!(tol.points_equal(&a, &Point3::new(1.00001, 2.0, 3.0)));
        assert!(!tol.points_equal(&a, &Point3::new(1.01, 2.0, 3.0)));
        assert!(tol.is_degenerate(&Vec3::zeros()));
        assert!(!tol.is_degenerate(&Vec3::new(0.0, 1e-3, 0.0)));
    }
}
