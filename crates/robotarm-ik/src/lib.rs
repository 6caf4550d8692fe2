//! Kinematics for DH-parameterized robot arms.
//!
//! Provides the joint chain model, forward kinematics by composing
//! per-joint homogeneous transforms, and an analytic inverse kinematics
//! solver for a two-equal-link elbow manipulator.
//!
//! # Architecture
//!
//! ```text
//! target point ──► ElbowSolver ──► joint angles ──► Chain ──► joint positions
//! ```
//!
//! A [`Chain`] always starts with a base frame and is grown only at its
//! tail. Forward kinematics recomputes the full product from the base on
//! every query.

pub mod chain;
pub mod joint;
pub mod solver;

pub use chain::Chain;
pub use joint::{dh_matrix, Joint, JointKind};
pub use solver::{Azimuth, ElbowSolution, ElbowSolver};
