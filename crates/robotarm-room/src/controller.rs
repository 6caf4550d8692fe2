use nalgebra::Point3;

use robotarm_core::config::ElbowPreference;
use robotarm_core::{ArmError, ConfigError};
use robotarm_ik::{Azimuth, Chain, ElbowSolver};
use robotarm_trajectory::Trajectory;

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Decides new joint values for one robot, once per tick.
///
/// Any `FnMut(f64, &mut Chain) -> Result<(), ArmError>` closure is a
/// controller.
pub trait Controller {
    /// Update `chain` for simulation time `time`.
    fn control(&mut self, time: f64, chain: &mut Chain) -> Result<(), ArmError>;

    /// Human-readable name for this controller.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> Controller for F
where
    F: FnMut(f64, &mut Chain) -> Result<(), ArmError>,
{
    fn control(&mut self, time: f64, chain: &mut Chain) -> Result<(), ArmError> {
        self(time, chain)
    }
}

// ---------------------------------------------------------------------------
// TrackingController
// ---------------------------------------------------------------------------

/// Drives an elbow arm's end effector along a [`Trajectory`].
///
/// Each tick: sample the trajectory, move the target into the base frame,
/// solve the elbow, and write the three angles to joints 1..=3. Joints past
/// the elbow are left unchanged.
#[derive(Debug, Clone)]
pub struct TrackingController {
    trajectory: Trajectory,
    solver: ElbowSolver,
    elbow: ElbowPreference,
    azimuth: Azimuth,
}

impl TrackingController {
    pub fn new(trajectory: Trajectory, solver: ElbowSolver, elbow: ElbowPreference) -> Self {
        Self {
            trajectory,
            solver,
            elbow,
            azimuth: Azimuth::Front,
        }
    }

    /// Solve with the shoulder turned by π instead of facing the target.
    #[must_use]
    pub fn with_azimuth(mut self, azimuth: Azimuth) -> Self {
        self.azimuth = azimuth;
        self
    }

    pub const fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Target at `time`, in the frame of `chain`'s base.
    fn local_target(&self, time: f64, chain: &Chain) -> Point3<f64> {
        let room = self.trajectory.position_at(time);
        let local = chain.base().local_inverse() * room.to_homogeneous();
        Point3::new(local.x, local.y, local.z)
    }
}

impl Controller for TrackingController {
    fn control(&mut self, time: f64, chain: &mut Chain) -> Result<(), ArmError> {
        let movable = chain.len() - 1;
        if movable < 3 {
            return Err(ConfigError::JointCountMismatch {
                expected: 3,
                got: movable,
            }
            .into());
        }

        let target = self.local_target(time, chain);
        let angles = self
            .solver
            .solve_with_azimuth(&target, self.azimuth)?
            .pick(self.elbow);

        let mut values = vec![None; movable];
        for (slot, angle) in values.iter_mut().zip(angles) {
            *slot = Some(angle);
        }
        chain.set_all_joint_values(&values)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "TrackingController"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
