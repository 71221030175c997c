//! Ordered history of completed measurements.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MeasureConfig;
use crate::measurement::{Measurement, MeasurementId, MeasurementType};
use crate::unit::{DisplayUnit, DEFAULT_PRECISION};

/// Completed measurements in insertion order plus the active display unit.
///
/// Values stay in storage units; the display unit only affects formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSession {
    measurements: Vec<Measurement>,
    unit: DisplayUnit,
    precision: usize,
}

impl Default for MeasurementSession {
    fn default() -> Self {
        Self {
            measurements: Vec::new(),
            unit: DisplayUnit::default(),
            precision: DEFAULT_PRECISION,
        }
    }
}

impl MeasurementSession {
    /// Empty session displaying meters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty session using the configured unit and precision.
    pub fn from_config(config: &MeasureConfig) -> Self {
        Self {
            measurements: Vec::new(),
            unit: config.default_unit,
            precision: config.precision,
        }
    }

    /// Append a record. History order is never changed afterwards.
    pub fn add(&mut self, measurement: Measurement) {
        debug!(id = %measurement.id, kind = %measurement.kind, value = measurement.value, "add measurement");
        self.measurements.push(measurement);
    }

    /// Remove the record with `id`; absent ids are ignored.
    pub fn remove(&mut self, id: MeasurementId) -> Option<Measurement> {
        let index = self.measurements.iter().position(|m| m.id == id)?;
        Some(self.measurements.remove(index))
    }

    /// Drop every record. The display unit is kept.
    pub fn clear(&mut self) {
        self.measurements.clear();
    }

    /// Change the display unit. Stored values are untouched.
    pub fn set_unit(&mut self, unit: DisplayUnit) {
        self.unit = unit;
    }

    /// Active display unit.
    pub fn unit(&self) -> DisplayUnit {
        self.unit
    }

    /// Records in insertion order.
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Record with `id`.
    pub fn get(&self, id: MeasurementId) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.id == id)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    /// True when no record is stored.
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Replace the label of the record with `id`, keeping its position.
    ///
    /// Returns false when no such record exists.
    pub fn set_label(&mut self, id: MeasurementId, label: Option<String>) -> bool {
        match self.measurements.iter_mut().find(|m| m.id == id) {
            Some(slot) => {
                *slot = slot.with_label(label);
                true
            }
            None => false,
        }
    }

    /// Value of `measurement` in the active unit, e.g. `"1.50 m"`.
    pub fn format(&self, measurement: &Measurement) -> String {
        self.unit
            .format(measurement.kind, measurement.value, self.precision)
    }

    /// Formatted value of the record with `id`.
    pub fn formatted(&self, id: MeasurementId) -> Option<String> {
        self.get(id).map(|m| self.format(m))
    }

    /// Sum of stored values of one kind, in storage units.
    pub fn total_by_type(&self, kind: MeasurementType) -> f32 {
        self.measurements
            .iter()
            .filter(|m| m.kind == kind)
            .map(|m| m.value)
            .sum()
    }

    /// The ordered record list as pretty JSON, for external exporters.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.measurements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomscan_math::Point3;

    fn distance(value: f32) -> Measurement {
        Measurement::new(
            MeasurementType::Distance,
            vec![Point3::origin(), Point3::new(value, 0.0, 0.0)],
            value,
            DisplayUnit::Meters,
        )
    }

    #[test]
    fn test_insertion_order() {
        let mut session = MeasurementSession::new();
        let (a, b, c) = (distance(1.0), distance(2.0), distance(3.0));
        let ids = [a.id, b.id, c.id];
        session.add(a);
        session.add(b);
        session.add(c);
        assert_eq!(session.measurements().iter().map(|m| m.id).collect::<Vec<_>>(), ids);

        session.remove(ids[1]);
        assert_eq!(session.measurements().iter().map(|m| m.id).collect::<Vec<_>>(), [ids[0], ids[2]]);
        assert!(session.remove(ids[1]).is_none());
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_unit_change_keeps_values() {
        let mut session = MeasurementSession::new();
        let m = distance(1.5);
        let id = m.id;
        session.add(m);
        assert_eq!(session.formatted(id).as_deref(), Some("1.50 m"));

        session.set_unit(DisplayUnit::Centimeters);
        assert_eq!(session.formatted(id).as_deref(), Some("150.00 cm"));
        assert_eq!(session.get(id).map(|m| m.value), Some(1.5));

        session.set_unit(DisplayUnit::Meters);
        assert_eq!(session.formatted(id).as_deref(), Some("1.50 m"));
    }

    #[test]
    fn test_set_label_preserves_position() {
        let mut session = MeasurementSession::new();
        let (a, b) = (distance(1.0), distance(2.0));
        let id = a.id;
        session.add(a);
        session.add(b);
        assert!(session.set_label(id, Some("window".into())));
        assert_eq!(session.measurements()[0].label.as_deref(), Some("window"));
        assert!(!session.set_label(MeasurementId::new(), None));
    }

    #[test]
    fn test_totals_and_clear() {
        let mut session = MeasurementSession::new();
        session.add(distance(1.0));
        session.add(distance(2.5));
        session.add(Measurement::new(MeasurementType::Area, Vec::new(), 9.0, DisplayUnit::Meters));
        assert_eq!(session.total_by_type(MeasurementType::Distance), 3.5);
        assert_eq!(session.total_by_type(MeasurementType::Volume), 0.0);

        session.set_unit(DisplayUnit::Feet);
        session.clear();
        assert!(session.is_empty());
        assert_eq!(session.unit(), DisplayUnit::Feet);
    }

    #[test]
    fn test_to_json() {
        let mut session = MeasurementSession::new();
        session.add(distance(2.0));
        let json = session.to_json().unwrap();
        let parsed: Vec<Measurement> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, session.measurements());
    }

    #[test]
    fn test_from_config() {
        let config = MeasureConfig {
            default_unit: DisplayUnit::Inches,
            precision: 1,
            ..MeasureConfig::default()
        };
        let mut session = MeasurementSession::from_config(&config);
        let m = distance(0.0254);
        let id = m.id;
        session.add(m);
        assert_eq!(session.formatted(id).as_deref(), Some("1.0 in"));
    }
}
