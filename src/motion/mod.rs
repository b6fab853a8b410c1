//! Incremental physical state of the print head.
//!
//! [`MotionState`] owns the current/previous position, the modal settings
//! that govern how operands are read, the feed rate, the running print time
//! and the position/time histories. Only the [`Document`](crate::Document)
//! mutates it, whether the command came from a direct call or from decoded
//! text, so both paths produce the same state for the same commands.

pub mod coordinates;
pub mod position;

pub use coordinates::{Axes, Coordinates};
pub use position::Position;

use serde::Serialize;

use crate::buffer::GrowableBuffer;
use crate::error::MotionWarning;
use crate::units::{per_second_to_per_minute, CoordinateMode, ExtrusionMode, UnitSystem};

#[derive(Debug, Clone, Default)]
pub struct MotionState {
    current_position: Position,
    previous_position: Position,
    coordinate_mode: CoordinateMode,
    unit_system: UnitSystem,
    extrusion_mode: ExtrusionMode,
    /// Distance per minute in the unit system active when it was set.
    feed_rate: f64,
    /// Minutes.
    elapsed_time: f64,
    history: GrowableBuffer<Position>,
    timestamps: GrowableBuffer<f64>,
    line_count: usize,
}

impl MotionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_position(&self) -> Position {
        self.current_position
    }

    pub fn previous_position(&self) -> Position {
        self.previous_position
    }

    pub fn coordinate_mode(&self) -> CoordinateMode {
        self.coordinate_mode
    }

    pub fn unit_system(&self) -> UnitSystem {
        self.unit_system
    }

    pub fn extrusion_mode(&self) -> ExtrusionMode {
        self.extrusion_mode
    }

    /// Feed rate in distance per minute.
    pub fn feed_rate(&self) -> f64 {
        self.feed_rate
    }

    /// Total print time in minutes.
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    pub fn history(&self) -> &GrowableBuffer<Position> {
        &self.history
    }

    pub fn timestamps(&self) -> &GrowableBuffer<f64> {
        &self.timestamps
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub(crate) fn count_line(&mut self) {
        self.line_count += 1;
    }

    pub fn set_coordinate_mode(&mut self, mode: CoordinateMode) {
        tracing::debug!(?mode, "coordinate mode changed");
        self.coordinate_mode = mode;
    }

    /// Changes how future inputs are labelled and converted. The stored feed
    /// rate and the recorded history are left as they are.
    pub fn set_unit_system(&mut self, system: UnitSystem) {
        tracing::debug!(?system, "unit system changed");
        self.unit_system = system;
    }

    pub fn set_extrusion_mode(&mut self, mode: ExtrusionMode) {
        self.extrusion_mode = mode;
    }

    /// Stores a feed rate given in distance per second; returns the
    /// per-minute value that is kept and emitted.
    pub fn set_feed_rate(&mut self, per_second: f64) -> f64 {
        self.feed_rate = per_second_to_per_minute(per_second);
        tracing::debug!(feed_rate = self.feed_rate, units = %self.unit_system, "feed rate set");
        self.feed_rate
    }

    /// The position a move with `axes` would reach under the current mode.
    ///
    /// Absolute: supplied axes overwrite, omitted axes are kept.
    /// Relative: the full `(dx, dy, dz)` vector is added, omitted axes
    /// contributing zero.
    pub fn resolve_target(&self, axes: Axes) -> Position {
        let current = self.current_position;
        match self.coordinate_mode {
            CoordinateMode::Absolute => Position::new(
                axes.x.unwrap_or(current.x),
                axes.y.unwrap_or(current.y),
                axes.z.unwrap_or(current.z),
            ),
            CoordinateMode::Relative => {
                current
                    + Position::new(
                        axes.x.unwrap_or(0.0),
                        axes.y.unwrap_or(0.0),
                        axes.z.unwrap_or(0.0),
                    )
            }
        }
    }

    /// Records one move and accrues its time.
    ///
    /// With `explicit_time` (minutes) the time is added as given; otherwise
    /// the straight-line distance is divided by the feed rate.
    pub fn apply_motion(&mut self, axes: Axes, explicit_time: Option<f64>) -> Option<MotionWarning> {
        let target = self.resolve_target(axes);
        self.commit(target, explicit_time)
    }

    /// Records a stationary entry lasting `minutes`.
    pub fn apply_dwell(&mut self, minutes: f64) -> Option<MotionWarning> {
        self.commit(self.current_position, Some(minutes))
    }

    /// Sends the selected axes (all three when none are selected) to zero,
    /// independent of the coordinate mode.
    pub fn apply_home(&mut self, axes: Axes) -> Option<MotionWarning> {
        let all = axes.is_empty();
        let current = self.current_position;
        let pick = |selected: Option<f64>, value: f64| {
            if all || selected.is_some() {
                0.0
            } else {
                value
            }
        };
        let target = Position::new(
            pick(axes.x, current.x),
            pick(axes.y, current.y),
            pick(axes.z, current.z),
        );
        self.commit(target, None)
    }

    fn commit(&mut self, target: Position, explicit_time: Option<f64>) -> Option<MotionWarning> {
        let first_motion = self.history.is_empty();

        self.previous_position = self.current_position;
        self.current_position = target;
        self.history.append(target);

        let mut warning = None;
        match explicit_time {
            Some(minutes) => self.elapsed_time += minutes,
            None if self.feed_rate != 0.0 => {
                let distance = self.previous_position.distance(&self.current_position);
                self.elapsed_time += distance / self.feed_rate.abs();
            }
            None => {
                if first_motion {
                    let w = MotionWarning::FeedRateUnset {
                        line: self.line_count,
                    };
                    tracing::warn!(line = self.line_count, "{w}");
                    warning = Some(w);
                }
            }
        }
        self.timestamps.append(self.elapsed_time);

        warning
    }

    /// Serializable copy of the trajectory for plotting collaborators.
    pub fn snapshot(&self) -> MotionSnapshot {
        MotionSnapshot {
            unit_system: self.unit_system,
            coordinate_mode: self.coordinate_mode,
            elapsed_time: self.elapsed_time,
            positions: self.history.as_slice().to_vec(),
            timestamps: self.timestamps.as_slice().to_vec(),
        }
    }
}

/// Timestamped trajectory handed to external viewers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionSnapshot {
    pub unit_system: UnitSystem,
    pub coordinate_mode: CoordinateMode,
    /// Minutes.
    pub elapsed_time: f64,
    pub positions: Vec<Position>,
    /// Minutes since the start of the program, one per position.
    pub timestamps: Vec<f64>,
}
