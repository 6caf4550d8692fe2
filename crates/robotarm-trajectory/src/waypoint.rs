use nalgebra::Point3;

use robotarm_core::config::WaypointSpec;

/// A position the path must pass through at `time`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub position: Point3<f64>,
    pub time: f64,
}

impl Waypoint {
    pub const fn new(position: Point3<f64>, time: f64) -> Self {
        Self { position, time }
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.time.is_finite() && self.position.iter().all(|v| v.is_finite())
    }
}

impl From<&WaypointSpec> for Waypoint {
    fn from(spec: &WaypointSpec) -> Self {
        let [x, y, z] = spec.position;
        Self::new(Point3::new(x, y, z), spec.time)
    }
}
