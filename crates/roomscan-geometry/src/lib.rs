#![warn(missing_docs)]

//! Geometry kernel for the roomscan core.
//!
//! Stateless numerical primitives (distance, polygon area, mesh volume,
//! angle, height) plus the [`UnifiedMesh`] they operate on. Every function is
//! pure: identical inputs give identical outputs, and degenerate input
//! resolves to a neutral value with a `tracing` warning instead of an error.
//!
//! # Example
//!
//! ```
//! use roomscan_geometry::{angle, distance, polygon_area};
//! use roomscan_math::Point3;
//!
//! let a = Point3::new(0.0, 0.0, 0.0);
//! let b = Point3::new(3.0, 4.0, 0.0);
//! assert_eq!(distance(&a, &b), 5.0);
//!
//! let square = [
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(2.0, 0.0, 0.0),
//!     Point3::new(2.0, 0.0, 2.0),
//!     Point3::new(0.0, 0.0, 2.0),
//! ];
//! assert!((polygon_area(&square) - 4.0).abs() < 1e-6);
//!
//! let corner = angle(&a, &Point3::new(1.0, 0.0, 0.0), &Point3::new(0.0, 1.0, 0.0));
//! assert!((corner - 90.0).abs() < 1e-4);
//! ```

mod bounds;
mod kernel;
mod mesh;

pub use bounds::Aabb;
pub use kernel::{
    angle, bounding_box_volume, distance, height, height_along, mesh_bounding_box_volume,
    mesh_surface_area, mesh_volume, polygon_area, triangle_area, UP_AXIS,
};
pub use mesh::{Classification, UnifiedMesh};

pub use roomscan_math::{Axis, Point3, Vec3};
