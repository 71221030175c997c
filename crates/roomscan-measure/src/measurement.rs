//! Completed measurement records.

use std::fmt;

use chrono::{DateTime, Utc};
use roomscan_math::Point3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::unit::DisplayUnit;

/// Unique identifier of a stored measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeasurementId(Uuid);

impl MeasurementId {
    /// A fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Deterministic identifier from an integer.
    pub fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}

impl Default for MeasurementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MeasurementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// What a measurement quantifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementType {
    /// Straight-line distance (meters).
    Distance,
    /// Polygon area (square meters).
    Area,
    /// Enclosed volume (cubic meters).
    Volume,
    /// Angle at a vertex (degrees).
    Angle,
}

impl MeasurementType {
    /// Every kind.
    pub const ALL: [MeasurementType; 4] = [
        MeasurementType::Distance,
        MeasurementType::Area,
        MeasurementType::Volume,
        MeasurementType::Angle,
    ];

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            MeasurementType::Distance => "Distance",
            MeasurementType::Area => "Area",
            MeasurementType::Volume => "Volume",
            MeasurementType::Angle => "Angle",
        }
    }
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One completed measurement. Immutable once stored in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Unique identifier.
    pub id: MeasurementId,
    /// Kind of quantity.
    #[serde(rename = "type")]
    pub kind: MeasurementType,
    /// World-space points the value was computed from.
    pub points: Vec<Point3>,
    /// Value in storage units (m, m², m³ or degrees).
    pub value: f32,
    /// Display unit active when the measurement was taken.
    pub unit: DisplayUnit,
    /// Optional user label.
    pub label: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Measurement {
    /// Create a record stamped with a fresh id and the current time.
    pub fn new(kind: MeasurementType, points: Vec<Point3>, value: f32, unit: DisplayUnit) -> Self {
        Self {
            id: MeasurementId::new(),
            kind,
            points,
            value,
            unit,
            label: None,
            created_at: Utc::now(),
        }
    }

    /// Copy of this record with a different label.
    pub fn with_label(&self, label: Option<String>) -> Self {
        Self {
            label,
            ..self.clone()
        }
    }
}
