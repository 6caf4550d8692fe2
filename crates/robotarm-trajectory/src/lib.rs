//! Continuous position queries over time-tagged 3D waypoints.
//!
//! A [`Trajectory`] sorts its waypoints by time and answers
//! [`Trajectory::position_at`] either by linear interpolation between the
//! bounding pair or, in [`InterpolationMode::Spline`], from a natural cubic
//! spline through every waypoint. Queries outside the tagged time range
//! clamp to the first or last waypoint.

pub mod interpolator;
pub mod spline;
pub mod waypoint;

pub use interpolator::Trajectory;
pub use robotarm_core::config::InterpolationMode;
pub use spline::CubicSpline;
pub use waypoint::Waypoint;
