#![warn(missing_docs)]

//! Interactive measurements for the roomscan core.
//!
//! A [`MeasurementController`] turns world-space taps into completed
//! [`Measurement`]s using the geometry kernel, and appends them to a
//! [`MeasurementSession`]. Values are stored in meters (or square/cubic
//! meters, or degrees); the session's [`DisplayUnit`] only affects how they
//! are rendered.
//!
//! # Example
//!
//! ```
//! use roomscan_math::Point3;
//! use roomscan_measure::{DisplayUnit, MeasurementController};
//!
//! let mut controller = MeasurementController::new();
//! controller.add_point(Point3::new(0.0, 0.0, 0.0));
//! controller.add_point(Point3::new(0.0, 2.5, 0.0));
//!
//! let session = controller.session_mut();
//! session.set_unit(DisplayUnit::Centimeters);
//! let m = &session.measurements()[0];
//! assert_eq!(session.format(m), "250.00 cm");
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod measurement;
pub mod session;
pub mod unit;

pub use config::{MeasureConfig, VolumeStrategy};
pub use controller::{transition, Draft, Input, MeasureMode, MeasurementController, Step};
pub use error::{ConfigError, ModeParseError, Result, UnitParseError};
pub use measurement::{Measurement, MeasurementId, MeasurementType};
pub use session::MeasurementSession;
pub use unit::{DisplayUnit, DEFAULT_PRECISION};
