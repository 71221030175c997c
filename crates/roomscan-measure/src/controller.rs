//! Interactive measurement state machine.
//!
//! The mode/point rules live in the pure [`transition`] function. The
//! [`MeasurementController`] feeds user input through it and performs the
//! commits it requests: a kernel call followed by a session append.

use std::fmt;
use std::str::FromStr;

use roomscan_anchors::MeshSource;
use roomscan_geometry::{
    angle, bounding_box_volume, distance, mesh_bounding_box_volume, mesh_volume, polygon_area,
};
use roomscan_math::Point3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{MeasureConfig, VolumeStrategy};
use crate::error::ModeParseError;
use crate::measurement::{Measurement, MeasurementId, MeasurementType};
use crate::session::MeasurementSession;

/// Active measurement mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureMode {
    /// Two points, auto-completes.
    #[default]
    Distance,
    /// Three or more polygon corners, completed explicitly.
    Area,
    /// One selection point, auto-completes.
    Volume,
    /// Vertex then two ray endpoints, auto-completes.
    Angle,
}

impl MeasureMode {
    /// Every mode.
    pub const ALL: [MeasureMode; 4] = [
        MeasureMode::Distance,
        MeasureMode::Area,
        MeasureMode::Volume,
        MeasureMode::Angle,
    ];

    /// Fewest points that can be completed.
    pub fn min_points(self) -> usize {
        match self {
            MeasureMode::Distance => 2,
            MeasureMode::Area => 3,
            MeasureMode::Volume => 1,
            MeasureMode::Angle => 3,
        }
    }

    /// Point count that completes without an explicit `complete()`.
    pub fn auto_complete_at(self) -> Option<usize> {
        match self {
            MeasureMode::Distance => Some(2),
            MeasureMode::Area => None,
            MeasureMode::Volume => Some(1),
            MeasureMode::Angle => Some(3),
        }
    }

    /// Kind of record this mode produces.
    pub fn measurement_type(self) -> MeasurementType {
        match self {
            MeasureMode::Distance => MeasurementType::Distance,
            MeasureMode::Area => MeasurementType::Area,
            MeasureMode::Volume => MeasurementType::Volume,
            MeasureMode::Angle => MeasurementType::Angle,
        }
    }

    /// Prompt for the next tap given `placed` points so far.
    pub fn instruction(self, placed: usize) -> &'static str {
        match (self, placed) {
            (MeasureMode::Distance, 0) => "Tap to place the first point",
            (MeasureMode::Distance, _) => "Tap to place the second point",
            (MeasureMode::Area, n) if n < 3 => "Tap to add polygon corners",
            (MeasureMode::Area, _) => "Tap Complete to close the polygon, or add more corners",
            (MeasureMode::Volume, _) => "Tap on the object to measure its volume",
            (MeasureMode::Angle, 0) => "Tap to place the angle vertex",
            (MeasureMode::Angle, 1) => "Tap to place the first ray endpoint",
            (MeasureMode::Angle, _) => "Tap to place the second ray endpoint",
        }
    }
}

impl fmt::Display for MeasureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MeasureMode::Distance => "distance",
            MeasureMode::Area => "area",
            MeasureMode::Volume => "volume",
            MeasureMode::Angle => "angle",
        })
    }
}

impl FromStr for MeasureMode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distance" => Ok(MeasureMode::Distance),
            "area" => Ok(MeasureMode::Area),
            "volume" => Ok(MeasureMode::Volume),
            "angle" => Ok(MeasureMode::Angle),
            _ => Err(ModeParseError(s.to_string())),
        }
    }
}

/// In-progress input: the mode and the points placed so far.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Draft {
    /// Active mode.
    pub mode: MeasureMode,
    /// Uncommitted points, oldest first.
    pub points: Vec<Point3>,
}

impl Draft {
    /// Empty draft in `mode`.
    pub fn new(mode: MeasureMode) -> Self {
        Self {
            mode,
            points: Vec::new(),
        }
    }

    /// True when the placed points satisfy the mode's minimum.
    pub fn can_complete(&self) -> bool {
        self.points.len() >= self.mode.min_points()
    }
}

/// User input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    /// A world-space tap.
    AddPoint(Point3),
    /// Explicit completion request.
    Complete,
    /// Drop the most recent point.
    Undo,
    /// Drop every uncommitted point.
    Clear,
    /// Change mode.
    SwitchMode(MeasureMode),
}

/// Outcome of one [`transition`].
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Keep collecting with this draft.
    Pending(Draft),
    /// Compute and store a measurement from `points`, then continue with an
    /// empty draft in the same mode.
    Commit {
        /// Mode being committed.
        mode: MeasureMode,
        /// Points the value is computed from.
        points: Vec<Point3>,
    },
    /// Completion was requested too early; the draft is unchanged.
    Rejected {
        /// Points the mode needs.
        needed: usize,
        /// Points placed.
        placed: usize,
    },
}

/// Next state for `draft` after `input`.
pub fn transition(draft: &Draft, input: Input) -> Step {
    match input {
        Input::AddPoint(p) => {
            let mut points = draft.points.clone();
            points.push(p);
            if draft.mode.auto_complete_at() == Some(points.len()) {
                Step::Commit {
                    mode: draft.mode,
                    points,
                }
            } else {
                Step::Pending(Draft {
                    mode: draft.mode,
                    points,
                })
            }
        }
        Input::Complete if draft.can_complete() => Step::Commit {
            mode: draft.mode,
            points: draft.points.clone(),
        },
        Input::Complete => Step::Rejected {
            needed: draft.mode.min_points(),
            placed: draft.points.len(),
        },
        Input::Undo => {
            let mut next = draft.clone();
            next.points.pop();
            Step::Pending(next)
        }
        Input::Clear => Step::Pending(Draft::new(draft.mode)),
        Input::SwitchMode(mode) if mode == draft.mode => Step::Pending(draft.clone()),
        Input::SwitchMode(mode) => Step::Pending(Draft::new(mode)),
    }
}

/// Session-scoped driver for point placement and measurement completion.
///
/// Single-owner: callers serialize access. Starts in distance mode with no
/// points and never terminates.
pub struct MeasurementController {
    draft: Draft,
    session: MeasurementSession,
    config: MeasureConfig,
    mesh_source: Option<Box<dyn MeshSource>>,
    last_result: Option<String>,
}

impl fmt::Debug for MeasurementController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeasurementController")
            .field("draft", &self.draft)
            .field("session", &self.session)
            .field("config", &self.config)
            .field("mesh_source", &self.mesh_source.is_some())
            .field("last_result", &self.last_result)
            .finish()
    }
}

impl Default for MeasurementController {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementController {
    /// Controller with default settings and an empty session.
    pub fn new() -> Self {
        Self::with_config(MeasureConfig::default())
    }

    /// Controller with `config` and an empty session built from it.
    pub fn with_config(config: MeasureConfig) -> Self {
        Self {
            draft: Draft::default(),
            session: MeasurementSession::from_config(&config),
            config,
            mesh_source: None,
            last_result: None,
        }
    }

    /// Surface that volume measurements read from.
    pub fn set_mesh_source(&mut self, source: impl MeshSource + 'static) {
        self.mesh_source = Some(Box::new(source));
    }

    /// Detach the mesh source; volumes fall back to the point selection.
    pub fn clear_mesh_source(&mut self) {
        self.mesh_source = None;
    }

    /// Active mode.
    pub fn mode(&self) -> MeasureMode {
        self.draft.mode
    }

    /// Uncommitted points.
    pub fn points(&self) -> &[Point3] {
        &self.draft.points
    }

    /// Number of uncommitted points.
    pub fn point_count(&self) -> usize {
        self.draft.points.len()
    }

    /// True when `complete()` would store a measurement.
    pub fn can_complete(&self) -> bool {
        self.draft.can_complete()
    }

    /// Prompt for the next tap.
    pub fn instruction(&self) -> &'static str {
        self.draft.mode.instruction(self.draft.points.len())
    }

    /// Formatted result of the most recent completion.
    pub fn last_result(&self) -> Option<&str> {
        self.last_result.as_deref()
    }

    /// Completed measurements.
    pub fn session(&self) -> &MeasurementSession {
        &self.session
    }

    /// Completed measurements, mutably (unit changes, labels, deletion).
    pub fn session_mut(&mut self) -> &mut MeasurementSession {
        &mut self.session
    }

    /// Active settings.
    pub fn config(&self) -> &MeasureConfig {
        &self.config
    }

    /// Place a point. Returns the new record's id when this point completed
    /// a measurement.
    pub fn add_point(&mut self, point: Point3) -> Option<MeasurementId> {
        self.handle(Input::AddPoint(point))
    }

    /// Complete the current draft. Does nothing (with a warning) when too
    /// few points are placed.
    pub fn complete(&mut self) -> Option<MeasurementId> {
        self.handle(Input::Complete)
    }

    /// Drop the most recent point.
    pub fn undo_last_point(&mut self) {
        self.handle(Input::Undo);
    }

    /// Drop every uncommitted point.
    pub fn clear_points(&mut self) {
        self.handle(Input::Clear);
    }

    /// Change mode, discarding uncommitted points. Same mode is a no-op.
    pub fn switch_mode(&mut self, mode: MeasureMode) {
        self.handle(Input::SwitchMode(mode));
    }

    /// Drop uncommitted points and every stored measurement.
    pub fn reset(&mut self) {
        self.draft = Draft::new(self.draft.mode);
        self.session.clear();
        self.last_result = None;
    }

    /// Feed one input through [`transition`] and execute its outcome.
    pub fn handle(&mut self, input: Input) -> Option<MeasurementId> {
        match transition(&self.draft, input) {
            Step::Pending(draft) => {
                if draft.mode != self.draft.mode {
                    debug!(from = %self.draft.mode, to = %draft.mode, "switch mode");
                }
                self.draft = draft;
                None
            }
            Step::Commit { mode, points } => {
                self.draft = Draft::new(mode);
                Some(self.commit(mode, points))
            }
            Step::Rejected { needed, placed } => {
                warn!(mode = %self.draft.mode, needed, placed, "not enough points to complete");
                None
            }
        }
    }

    fn commit(&mut self, mode: MeasureMode, points: Vec<Point3>) -> MeasurementId {
        let value = match (mode, points.as_slice()) {
            (MeasureMode::Distance, [a, b, ..]) => distance(a, b),
            (MeasureMode::Angle, [vertex, p1, p2, ..]) => angle(vertex, p1, p2),
            (MeasureMode::Area, corners) => polygon_area(corners),
            (MeasureMode::Volume, selection) => self.volume(selection),
            (mode, points) => {
                warn!(%mode, placed = points.len(), "commit with too few points");
                0.0
            }
        };

        let measurement = Measurement::new(
            mode.measurement_type(),
            points,
            value,
            self.session.unit(),
        );
        let id = measurement.id;
        let result = format!(
            "{}: {}",
            measurement.kind,
            self.session.format(&measurement)
        );
        info!(%id, %result, "measurement complete");
        self.last_result = Some(result);
        self.session.add(measurement);
        id
    }

    fn volume(&self, selection: &[Point3]) -> f32 {
        match &self.mesh_source {
            Some(source) => {
                let mesh = source.unified_mesh();
                if !mesh.is_empty() {
                    return match self.config.volume_strategy {
                        VolumeStrategy::BoundingBox => mesh_bounding_box_volume(&mesh),
                        VolumeStrategy::ClosedMesh => mesh_volume(&mesh),
                    };
                }
                warn!("mesh source is empty, using the point selection bounding box");
            }
            None => warn!("no mesh source, using the point selection bounding box"),
        }
        bounding_box_volume(selection)
    }
}
