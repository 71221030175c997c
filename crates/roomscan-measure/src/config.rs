//! Measurement settings loaded from TOML.

use std::fs;
use std::path::Path;

use roomscan_math::Axis;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::unit::{DisplayUnit, DEFAULT_PRECISION};

/// How a volume measurement is computed from the fused mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeStrategy {
    /// Axis-aligned bounding box of the mesh; safe for open scan surfaces.
    #[default]
    BoundingBox,
    /// Signed-tetrahedra sum; exact only for closed meshes.
    ClosedMesh,
}

/// Settings for a measurement session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureConfig {
    /// Unit a new session displays values in.
    pub default_unit: DisplayUnit,
    /// Volume algorithm used when a mesh source is available.
    pub volume_strategy: VolumeStrategy,
    /// Gravity-aligned axis for heights.
    pub up_axis: Axis,
    /// Decimal places in formatted values.
    pub precision: usize,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            default_unit: DisplayUnit::Meters,
            volume_strategy: VolumeStrategy::BoundingBox,
            up_axis: Axis::Y,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl MeasureConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: MeasureConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.precision > 6 {
            return Err(ConfigError::Invalid(
                "precision must be between 0 and 6 decimals".into(),
            ));
        }
        Ok(())
    }
}
