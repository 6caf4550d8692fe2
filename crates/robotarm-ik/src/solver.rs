//! Analytic inverse kinematics for a two-equal-link elbow manipulator.
//!
//! The arm is a shoulder yaw joint followed by two pitch links of equal
//! length `L` (see [`ElbowSolver::build_chain`]). Targets are given in the
//! shoulder frame. The elbow angle follows from the law of cosines on the
//! isosceles triangle formed by the two links and the reach vector.

use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::{Point3, Vector3};

use robotarm_core::config::ElbowPreference;
use robotarm_core::{DomainError, StructuralError};

use crate::chain::Chain;

/// Shoulder yaw to solve for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Azimuth {
    /// Shoulder faces the target: `θ1 = atan2(y, x)`.
    #[default]
    Front,
    /// Shoulder turned away by π; the arm leans back over the base.
    Back,
}

/// Both elbow configurations reaching one target, as `[θ1, θ2, θ3]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElbowSolution {
    pub elbow_up: [f64; 3],
    pub elbow_down: [f64; 3],
}

impl ElbowSolution {
    pub const fn pick(&self, preference: ElbowPreference) -> [f64; 3] {
        match preference {
            ElbowPreference::Up => self.elbow_up,
            ElbowPreference::Down => self.elbow_down,
        }
    }
}

/// Closed-form solver for an elbow arm with two links of length `L`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElbowSolver {
    link_length: f64,
}

impl ElbowSolver {
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidLinkLength`] unless `link_length` is
    /// finite and positive.
    pub fn new(link_length: f64) -> Result<Self, DomainError> {
        if link_length.is_finite() && link_length > 0.0 {
            Ok(Self { link_length })
        } else {
            Err(DomainError::InvalidLinkLength(link_length))
        }
    }

    pub const fn link_length(&self) -> f64 {
        self.link_length
    }

    /// Maximum distance from the shoulder the arm can reach (`2L`).
    pub fn max_reach(&self) -> f64 {
        2.0 * self.link_length
    }

    /// Build the arm this solver describes: a base at `anchor`, a shoulder
    /// yaw joint, and two revolute pitch links of length `L`.
    ///
    /// # Errors
    ///
    /// Propagates append errors from the chain.
    pub fn build_chain(
        &self,
        anchor: Vector3<f64>,
        theta: f64,
        alpha: f64,
    ) -> Result<Chain, StructuralError> {
        let mut chain = Chain::new(anchor, theta, alpha);
        chain.append_revolute(0.0, FRAC_PI_2)?;
        chain.append_revolute(self.link_length, 0.0)?;
        chain.append_revolute(self.link_length, -FRAC_PI_2)?;
        Ok(chain)
    }

    /// Solve for `target` with the shoulder facing it.
    ///
    /// # Errors
    ///
    /// See [`solve_with_azimuth`](Self::solve_with_azimuth).
    pub fn solve(&self, target: &Point3<f64>) -> Result<ElbowSolution, DomainError> {
        self.solve_with_azimuth(target, Azimuth::Front)
    }

    /// Solve for `target`, expressed in the shoulder frame.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Unreachable`] if the target is farther than
    /// `2L` (or not finite) and [`DomainError::DegenerateReach`] if it sits
    /// on the shoulder origin.
    #[allow(clippy::float_cmp)]
    pub fn solve_with_azimuth(
        &self,
        target: &Point3<f64>,
        azimuth: Azimuth,
    ) -> Result<ElbowSolution, DomainError> {
        let (x, y, z) = (target.x, target.y, target.z);
        let l = self.link_length;

        let planar = x.hypot(y);
        let reach = planar.hypot(z);
        if !reach.is_finite() || reach > self.max_reach() {
            return Err(DomainError::Unreachable {
                reach,
                max_reach: self.max_reach(),
            });
        }
        if reach == 0.0 {
            return Err(DomainError::DegenerateReach);
        }

        let front = y.atan2(x);
        let (theta1, elevation) = match azimuth {
            Azimuth::Front => (front, z.atan2(planar)),
            Azimuth::Back => (front + PI, z.atan2(-planar)),
        };

        // Elbow bend and the shoulder offset from the reach line.
        let bend = PI - acos_clamped((l * l + l * l - reach * reach) / (2.0 * l * l));
        let offset = acos_clamped((l * l - l * l + reach * reach) / (2.0 * reach * l));

        Ok(ElbowSolution {
            elbow_up: [theta1, elevation + offset, -bend],
            elbow_down: [theta1, elevation - offset, bend],
        })
    }
}

fn acos_clamped(cos: f64) -> f64 {
    cos.clamp(-1.0, 1.0).acos()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
