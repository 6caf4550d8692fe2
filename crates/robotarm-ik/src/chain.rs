//! Ordered joint chain rooted at a base frame.
//!
//! A [`Chain`] owns its joints contiguously. Index 0 is always the base
//! frame; the predecessor of joint `i` is joint `i - 1`. Joints are only
//! ever appended at the tail, and nothing may follow an end effector.

use nalgebra::{Matrix4, Point3, Vector3};
use tracing::debug;

use robotarm_core::config::{ArmConfig, JointSpec, JointSpecKind};
use robotarm_core::{ArmError, ConfigError, IndexError, StructuralError};

use crate::joint::Joint;

/// A robot arm as an ordered list of joints from base to tail.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    joints: Vec<Joint>,
}

#[allow(clippy::len_without_is_empty)]
impl Chain {
    /// Create a chain holding only a base frame at `anchor`, rotated by
    /// `(theta, alpha)`.
    pub fn new(anchor: Vector3<f64>, theta: f64, alpha: f64) -> Self {
        Self {
            joints: vec![Joint::base(anchor, theta, alpha)],
        }
    }

    /// Build a chain from a complete joint list.
    ///
    /// # Errors
    ///
    /// Returns a [`StructuralError`] if the list does not start with exactly
    /// one base frame, or if an end effector is followed by another joint.
    pub fn from_joints(joints: Vec<Joint>) -> Result<Self, StructuralError> {
        match joints.first() {
            Some(first) if first.is_base() => {}
            _ => return Err(StructuralError::MissingBase),
        }
        for (index, pair) in joints.windows(2).enumerate() {
            if pair[1].is_base() {
                return Err(StructuralError::MisplacedBase { index: index + 1 });
            }
            if !pair[0].accepts_successor() {
                return Err(StructuralError::EndEffectorNotLast { index });
            }
        }
        Ok(Self { joints })
    }

    /// Build a chain from an [`ArmConfig`] by replaying its appends in order.
    ///
    /// # Errors
    ///
    /// Fails if the config is invalid or the joints violate chain structure.
    pub fn from_config(config: &ArmConfig) -> Result<Self, ArmError> {
        config.validate()?;
        let [x, y, z] = config.base_position;
        let [theta, alpha] = config.base_rotation;
        let mut chain = Self::new(Vector3::new(x, y, z), theta, alpha);
        for spec in &config.joints {
            chain.append(joint_from_spec(spec))?;
        }
        debug!(arm = %config.name, joints = chain.len(), "built chain from config");
        Ok(chain)
    }

    /// Attach `joint` after the current tail.
    ///
    /// # Errors
    ///
    /// Returns [`StructuralError::AppendAfterEndEffector`] if the tail is an
    /// end effector, or [`StructuralError::MisplacedBase`] for a second base.
    pub fn append(&mut self, joint: Joint) -> Result<(), StructuralError> {
        if !self.tail().accepts_successor() {
            return Err(StructuralError::AppendAfterEndEffector);
        }
        if joint.is_base() {
            return Err(StructuralError::MisplacedBase {
                index: self.joints.len(),
            });
        }
        debug!(index = self.joints.len(), kind = joint.kind().name(), "appended joint");
        self.joints.push(joint);
        Ok(())
    }

    /// Append a revolute joint with link length `a` and twist `alpha`.
    ///
    /// # Errors
    ///
    /// Fails if the tail is an end effector.
    pub fn append_revolute(&mut self, a: f64, alpha: f64) -> Result<(), StructuralError> {
        self.append(Joint::revolute(0.0, 0.0, a, alpha))
    }

    /// Append a prismatic joint with fixed angle `theta` and twist `alpha`.
    ///
    /// # Errors
    ///
    /// Fails if the tail is an end effector.
    pub fn append_prismatic(&mut self, theta: f64, alpha: f64) -> Result<(), StructuralError> {
        self.append(Joint::prismatic(0.0, theta, 0.0, alpha))
    }

    /// Append a revolute joint with every DH parameter given; `theta` is
    /// the initial joint value.
    ///
    /// # Errors
    ///
    /// Fails if the tail is an end effector.
    pub fn append_revolute_dh(
        &mut self,
        d: f64,
        theta: f64,
        a: f64,
        alpha: f64,
    ) -> Result<(), StructuralError> {
        self.append(Joint::revolute(d, theta, a, alpha))
    }

    /// Append a prismatic joint with every DH parameter given; `d` is the
    /// initial joint value.
    ///
    /// # Errors
    ///
    /// Fails if the tail is an end effector.
    pub fn append_prismatic_dh(
        &mut self,
        d: f64,
        theta: f64,
        a: f64,
        alpha: f64,
    ) -> Result<(), StructuralError> {
        self.append(Joint::prismatic(d, theta, a, alpha))
    }

    /// Terminate the chain with a fixed tool offset.
    ///
    /// # Errors
    ///
    /// Fails if the tail is already an end effector.
    pub fn append_end_effector(
        &mut self,
        d: f64,
        theta: f64,
        a: f64,
        alpha: f64,
    ) -> Result<(), StructuralError> {
        self.append(Joint::end_effector(d, theta, a, alpha))
    }

    /// Number of joints, base included. Always at least 1.
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// All joints, base first.
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// The base frame at index 0.
    pub fn base(&self) -> &Joint {
        &self.joints[0]
    }

    /// Last joint; the base for a chain with nothing appended.
    pub fn tail(&self) -> &Joint {
        &self.joints[self.joints.len() - 1]
    }

    /// Whether the chain is terminated by an end effector.
    pub fn is_closed(&self) -> bool {
        !self.tail().accepts_successor()
    }

    /// Resolve a possibly negative index; `-1` is the tail.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] if the index falls outside the chain.
    pub fn resolve_index(&self, index: isize) -> Result<usize, IndexError> {
        let len = self.joints.len();
        let resolved = if index < 0 {
            len.checked_sub(index.unsigned_abs())
        } else {
            Some(index.unsigned_abs())
        };
        resolved
            .filter(|&i| i < len)
            .ok_or(IndexError { index, len })
    }

    fn check_index(&self, index: usize) -> Result<usize, IndexError> {
        if index < self.joints.len() {
            Ok(index)
        } else {
            Err(IndexError {
                index: isize::try_from(index).unwrap_or(isize::MAX),
                len: self.joints.len(),
            })
        }
    }

    /// # Errors
    ///
    /// Returns [`IndexError`] if `index` is out of range.
    pub fn joint(&self, index: usize) -> Result<&Joint, IndexError> {
        self.check_index(index).map(|i| &self.joints[i])
    }

    /// Current mutable parameter of joint `index` (`None` for base and end
    /// effector).
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] if `index` is out of range.
    pub fn joint_value(&self, index: usize) -> Result<Option<f64>, IndexError> {
        self.joint(index).map(Joint::joint_value)
    }

    /// Joint values for every non-base joint, in chain order.
    pub fn joint_values(&self) -> Vec<Option<f64>> {
        self.joints[1..].iter().map(Joint::joint_value).collect()
    }

    /// # Errors
    ///
    /// Returns [`IndexError`] if `index` is out of range.
    pub fn set_joint_value(&mut self, index: usize, value: f64) -> Result<(), IndexError> {
        let i = self.check_index(index)?;
        self.joints[i].set_joint_value(value);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`IndexError`] if `index` is out of range.
    pub fn change_joint_value(&mut self, index: usize, delta: f64) -> Result<(), IndexError> {
        let i = self.check_index(index)?;
        self.joints[i].change_joint_value(delta);
        Ok(())
    }

    /// Set every non-base joint at once. `None` leaves a joint unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::JointCountMismatch`] unless `values` has exactly
    /// `len() - 1` entries. Nothing is modified on error.
    pub fn set_all_joint_values(&mut self, values: &[Option<f64>]) -> Result<(), ConfigError> {
        self.apply_all(values, Joint::set_joint_value)
    }

    /// Relative counterpart of [`set_all_joint_values`](Self::set_all_joint_values).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::JointCountMismatch`] on a count mismatch.
    pub fn change_all_joint_values(&mut self, deltas: &[Option<f64>]) -> Result<(), ConfigError> {
        self.apply_all(deltas, Joint::change_joint_value)
    }

    fn apply_all(
        &mut self,
        values: &[Option<f64>],
        apply: fn(&mut Joint, f64),
    ) -> Result<(), ConfigError> {
        let expected = self.joints.len() - 1;
        if values.len() != expected {
            return Err(ConfigError::JointCountMismatch {
                expected,
                got: values.len(),
            });
        }
        for (joint, value) in self.joints[1..].iter_mut().zip(values) {
            if let Some(v) = *value {
                apply(joint, v);
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Forward kinematics
    // -----------------------------------------------------------------------

    /// Cumulative transform of joint `index` in room coordinates.
    ///
    /// Recomputed from the base on every call.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] if `index` is out of range.
    pub fn cumulative_transform(&self, index: usize) -> Result<Matrix4<f64>, IndexError> {
        let i = self.check_index(index)?;
        Ok(self.joints[..=i]
            .iter()
            .fold(Matrix4::identity(), |acc, joint| acc * joint.local_transform()))
    }

    /// Cumulative transform with Python-style indexing; `-1` is the tail.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] if `index` is out of range.
    pub fn forward_kinematics(&self, index: isize) -> Result<Matrix4<f64>, IndexError> {
        let i = self.resolve_index(index)?;
        self.cumulative_transform(i)
    }

    /// Cumulative transform of the tail joint.
    pub fn end_effector_transform(&self) -> Matrix4<f64> {
        self.joints
            .iter()
            .fold(Matrix4::identity(), |acc, joint| acc * joint.local_transform())
    }

    /// Cumulative transform of every joint, in chain order.
    pub fn dh_matrices(&self) -> Vec<Matrix4<f64>> {
        self.joints
            .iter()
            .scan(Matrix4::identity(), |acc, joint| {
                *acc *= joint.local_transform();
                Some(*acc)
            })
            .collect()
    }

    /// Room-frame position of every joint, base included.
    pub fn joint_positions(&self) -> Vec<Point3<f64>> {
        self.dh_matrices().iter().map(translation).collect()
    }

    /// Room-frame position of the tail joint.
    pub fn end_effector_position(&self) -> Point3<f64> {
        translation(&self.end_effector_transform())
    }

    /// Product of local inverses from joint `index` through the tail.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] if `index` is out of range.
    pub fn inverse_transform(&self, index: usize) -> Result<Matrix4<f64>, IndexError> {
        let i = self.check_index(index)?;
        Ok(self.joints[i..]
            .iter()
            .fold(Matrix4::identity(), |acc, joint| acc * joint.local_inverse()))
    }
}

fn translation(m: &Matrix4<f64>) -> Point3<f64> {
    Point3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)])
}

fn joint_from_spec(spec: &JointSpec) -> Joint {
    let JointSpec {
        kind,
        d,
        theta,
        a,
        alpha,
    } = *spec;
    match kind {
        JointSpecKind::Revolute => Joint::revolute(d, theta, a, alpha),
        JointSpecKind::Prismatic => Joint::prismatic(d, theta, a, alpha),
        JointSpecKind::EndEffector => Joint::end_effector(d, theta, a, alpha),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
