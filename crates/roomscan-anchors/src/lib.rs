#![warn(missing_docs)]

//! Incremental patch fusion for the roomscan core.
//!
//! The sensing subsystem reports surface fragments per anchor. This crate
//! keeps the latest fragment for each anchor in an [`AnchorMeshStore`] and
//! fuses them on demand into one world-space [`UnifiedMesh`]. Recorded
//! sessions in the LRAW container replay through the same path.
//!
//! # Example
//!
//! ```
//! use roomscan_anchors::{AnchorMeshStore, Patch, PatchId};
//! use roomscan_math::{Point3, Vec3};
//!
//! let id = PatchId::from_u128(1);
//! let patch = Patch::new(
//!     id,
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.0, 0.0, 1.0),
//!     ],
//!     vec![Vec3::y(); 3],
//!     vec![[0, 1, 2]],
//! );
//!
//! let mut store = AnchorMeshStore::new();
//! store.upsert(id, patch);
//! assert_eq!(store.unify().vertex_count(), 3);
//! assert!((store.total_surface_area() - 0.5).abs() < 1e-6);
//! ```

pub mod error;
pub mod lraw;
pub mod patch;
pub mod shared;
pub mod store;

pub use error::{LrawError, Result};
pub use lraw::{
    read_lraw, read_lraw_file, write_lraw, write_lraw_file, LrawFlags, Recording, LRAW_MAGIC,
    LRAW_VERSION,
};
pub use patch::{Patch, PatchId};
pub use shared::SharedAnchorStore;
pub use store::{AnchorMeshStore, MeshSource, PatchEvent, StoreStats};

pub use roomscan_geometry::{Classification, UnifiedMesh};
