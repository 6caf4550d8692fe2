//! Headless room of robot arms.
//!
//! A [`Room`] owns named [`Chain`](robotarm_ik::Chain)s and the
//! [`Controller`] attached to each. Every tick it runs each controller,
//! reads back joint positions, and optionally records the path of one
//! joint per robot. Rendering is left to the caller.

pub mod controller;
pub mod room;

pub use controller::{Controller, TrackingController};
pub use room::{RobotFrame, Room, Tick};
