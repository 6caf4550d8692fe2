//! Waypoint-to-trajectory interpolation.

use nalgebra::Point3;
use tracing::debug;

use robotarm_core::config::{InterpolationMode, TrajectoryConfig};
use robotarm_core::ConfigError;

use crate::spline::CubicSpline;
use crate::waypoint::Waypoint;

/// A path through time-sorted waypoints.
///
/// Duplicate time tags are allowed. Where several waypoints share the
/// queried time, the earliest-sorted one wins.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    waypoints: Vec<Waypoint>,
    mode: InterpolationMode,
    spline: Option<CubicSpline>,
}

impl Trajectory {
    /// Piecewise-linear trajectory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TooFewWaypoints`] for fewer than 2 waypoints and
    /// [`ConfigError::NonFiniteWaypoint`] for NaN or infinite values.
    pub fn new(waypoints: Vec<Waypoint>) -> Result<Self, ConfigError> {
        Self::with_mode(waypoints, InterpolationMode::Linear)
    }

    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn with_mode(
        mut waypoints: Vec<Waypoint>,
        mode: InterpolationMode,
    ) -> Result<Self, ConfigError> {
        if waypoints.len() < 2 {
            return Err(ConfigError::TooFewWaypoints(waypoints.len()));
        }
        if let Some(index) = waypoints.iter().position(|wp| !wp.is_finite()) {
            return Err(ConfigError::NonFiniteWaypoint { index });
        }
        // Stable: equal time tags keep caller order.
        waypoints.sort_by(|a, b| a.time.total_cmp(&b.time));

        let spline = match mode {
            InterpolationMode::Linear => None,
            InterpolationMode::Spline => Some(CubicSpline::fit(&distinct_knots(&waypoints))),
        };
        debug!(waypoints = waypoints.len(), ?mode, "built trajectory");

        Ok(Self {
            waypoints,
            mode,
            spline,
        })
    }

    /// # Errors
    ///
    /// Fails if the config does not validate.
    pub fn from_config(config: &TrajectoryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::with_mode(config.waypoints.iter().map(Waypoint::from).collect(), config.mode)
    }

    /// Waypoints in ascending time order.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub const fn mode(&self) -> InterpolationMode {
        self.mode
    }

    /// `(first, last)` time tag.
    pub fn time_range(&self) -> (f64, f64) {
        (self.first().time, self.last().time)
    }

    fn first(&self) -> &Waypoint {
        &self.waypoints[0]
    }

    fn last(&self) -> &Waypoint {
        &self.waypoints[self.waypoints.len() - 1]
    }

    /// Position at time `t`, clamped to the first/last waypoint outside the
    /// tagged range.
    pub fn position_at(&self, t: f64) -> Point3<f64> {
        match &self.spline {
            Some(spline) => spline.evaluate(t),
            None => self.linear_at(t),
        }
    }

    #[allow(clippy::float_cmp)]
    fn linear_at(&self, t: f64) -> Point3<f64> {
        if t.is_nan() || t <= self.first().time {
            return self.first().position;
        }
        if t > self.last().time {
            return self.last().position;
        }

        // Earliest waypoint with time >= t; exists since t <= last time.
        let next_idx = self.waypoints.partition_point(|wp| wp.time < t);
        let next = &self.waypoints[next_idx];
        if next.time == t {
            return next.position;
        }

        // t > first time, so next_idx >= 1 and last.time < t < next.time.
        let last = &self.waypoints[next_idx - 1];
        let interval = next.time - last.time;
        last.position + (next.position - last.position) * ((t - last.time) / interval)
    }
}

/// One knot per distinct time tag, keeping the earliest-sorted waypoint.
#[allow(clippy::float_cmp)]
fn distinct_knots(sorted: &[Waypoint]) -> Vec<(f64, Point3<f64>)> {
    let mut knots: Vec<(f64, Point3<f64>)> = Vec::with_capacity(sorted.len());
    for wp in sorted {
        if knots.last().is_none_or(|(t, _)| *t != wp.time) {
            knots.push((wp.time, wp.position));
        }
    }
    knots
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
