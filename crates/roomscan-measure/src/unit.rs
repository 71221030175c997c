//! Display units. Stored values are always meters; conversion happens only
//! when a value is rendered.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnitParseError;
use crate::measurement::MeasurementType;

/// Decimal places used when no precision is configured.
pub const DEFAULT_PRECISION: usize = 2;

/// Unit used to present a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnit {
    /// Meters (storage unit).
    #[default]
    Meters,
    /// Centimeters.
    Centimeters,
    /// International feet.
    Feet,
    /// International inches.
    Inches,
}

impl DisplayUnit {
    /// Every unit, in menu order.
    pub const ALL: [DisplayUnit; 4] = [
        DisplayUnit::Meters,
        DisplayUnit::Centimeters,
        DisplayUnit::Feet,
        DisplayUnit::Inches,
    ];

    /// Meters per one of this unit.
    pub fn factor(self) -> f32 {
        match self {
            DisplayUnit::Meters => 1.0,
            DisplayUnit::Centimeters => 0.01,
            DisplayUnit::Feet => 0.3048,
            DisplayUnit::Inches => 0.0254,
        }
    }

    /// Short symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            DisplayUnit::Meters => "m",
            DisplayUnit::Centimeters => "cm",
            DisplayUnit::Feet => "ft",
            DisplayUnit::Inches => "in",
        }
    }

    /// Length in this unit to meters.
    pub fn to_meters(self, value: f32) -> f32 {
        value * self.factor()
    }

    /// Meters to a length in this unit.
    pub fn from_meters(self, meters: f32) -> f32 {
        meters / self.factor()
    }

    /// Re-express a length given in `from` in this unit.
    pub fn convert(self, value: f32, from: DisplayUnit) -> f32 {
        value * from.factor() / self.factor()
    }

    /// Render a length stored in meters.
    pub fn format_length(self, meters: f32) -> String {
        self.format(MeasurementType::Distance, meters, DEFAULT_PRECISION)
    }

    /// Render an area stored in square meters.
    pub fn format_area(self, square_meters: f32) -> String {
        self.format(MeasurementType::Area, square_meters, DEFAULT_PRECISION)
    }

    /// Render a volume stored in cubic meters.
    pub fn format_volume(self, cubic_meters: f32) -> String {
        self.format(MeasurementType::Volume, cubic_meters, DEFAULT_PRECISION)
    }

    /// Render a stored value of the given kind with `precision` decimals.
    ///
    /// Areas scale by the factor squared and volumes by its cube. Angles are
    /// stored in degrees and never converted.
    pub fn format(self, kind: MeasurementType, value: f32, precision: usize) -> String {
        let f = self.factor();
        match kind {
            MeasurementType::Distance => {
                format!("{:.*} {}", precision, value / f, self.symbol())
            }
            MeasurementType::Area => {
                format!("{:.*} {}\u{00b2}", precision, value / (f * f), self.symbol())
            }
            MeasurementType::Volume => {
                format!("{:.*} {}\u{00b3}", precision, value / (f * f * f), self.symbol())
            }
            MeasurementType::Angle => format!("{:.*}\u{00b0}", precision, value),
        }
    }
}

impl fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for DisplayUnit {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "meter" | "meters" | "metre" | "metres" => Ok(DisplayUnit::Meters),
            "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => {
                Ok(DisplayUnit::Centimeters)
            }
            "ft" | "foot" | "feet" => Ok(DisplayUnit::Feet),
            "in" | "inch" | "inches" => Ok(DisplayUnit::Inches),
            _ => Err(UnitParseError(s.to_string())),
        }
    }
}
