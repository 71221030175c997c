#![warn(missing_docs)]

//! roomscan: offline room scanning core.
//!
//! Fuses surface patches from a depth-sensing subsystem into one mesh and
//! takes distance, area, volume and angle measurements against it.
//!
//! - [`math`]: points, vectors, transforms
//! - [`geometry`]: the stateless geometry kernel and [`UnifiedMesh`]
//! - [`anchors`]: the patch store, its thread-safe wrapper and LRAW recordings
//! - [`measure`]: the measurement session and interactive controller
//!
//! # Example
//!
//! ```
//! use roomscan::{MeasureMode, MeasurementController, Point3, SharedAnchorStore};
//!
//! let store = SharedAnchorStore::new();
//! let mut controller = MeasurementController::new();
//! controller.set_mesh_source(store.clone());
//!
//! controller.switch_mode(MeasureMode::Angle);
//! controller.add_point(Point3::new(0.0, 0.0, 0.0));
//! controller.add_point(Point3::new(1.0, 0.0, 0.0));
//! controller.add_point(Point3::new(0.0, 1.0, 0.0));
//! assert_eq!(controller.last_result(), Some("Angle: 90.00\u{00b0}"));
//! ```

pub use roomscan_anchors as anchors;
pub use roomscan_geometry as geometry;
pub use roomscan_math as math;
pub use roomscan_measure as measure;

pub use roomscan_anchors::{
    read_lraw, read_lraw_file, write_lraw, write_lraw_file, AnchorMeshStore, LrawError,
    LrawFlags, MeshSource, Patch, PatchEvent, PatchId, Recording, SharedAnchorStore, StoreStats,
};
pub use roomscan_geometry::{
    angle, bounding_box_volume, distance, height, height_along, mesh_bounding_box_volume,
    mesh_surface_area, mesh_volume, polygon_area, triangle_area, Aabb, Classification,
    UnifiedMesh, UP_AXIS,
};
pub use roomscan_math::{Axis, Point3, Tolerance, Transform, Vec3};
pub use roomscan_measure::{
    ConfigError, DisplayUnit, MeasureConfig, MeasureMode, Measurement, MeasurementController,
    MeasurementId, MeasurementSession, MeasurementType, VolumeStrategy,
};
