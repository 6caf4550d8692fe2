//! A single rigid link described by its DH parameters `(d, θ, a, α)`.
//!
//! Revolute joints expose `θ` as their mutable parameter, prismatic joints
//! expose `d`. The base frame and the end effector have no mutable
//! parameter; writes to them are silently ignored.

use nalgebra::{Matrix3, Matrix4, Vector3};

/// Joint variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointKind {
    /// Root of a chain, placed at `anchor` in room coordinates.
    Base { anchor: Vector3<f64> },
    Revolute,
    Prismatic,
    /// Fixed tool offset at the tail of a chain.
    EndEffector,
}

impl JointKind {
    /// Short lowercase name, used in log output.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Base { .. } => "base",
            Self::Revolute => "revolute",
            Self::Prismatic => "prismatic",
            Self::EndEffector => "end_effector",
        }
    }
}

/// A joint in a [`Chain`](crate::Chain).
///
/// Only the mutable parameter can change after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    kind: JointKind,
    d: f64,
    theta: f64,
    a: f64,
    alpha: f64,
}

impl Joint {
    /// Base frame at `anchor`, rotated by `(theta, alpha)`.
    pub fn base(anchor: Vector3<f64>, theta: f64, alpha: f64) -> Self {
        Self {
            kind: JointKind::Base { anchor },
            d: 0.0,
            theta,
            a: 0.0,
            alpha,
        }
    }

    /// Revolute link; `theta` is the mutable parameter.
    pub const fn revolute(d: f64, theta: f64, a: f64, alpha: f64) -> Self {
        Self::link(JointKind::Revolute, d, theta, a, alpha)
    }

    /// Prismatic link; `d` is the mutable parameter.
    pub const fn prismatic(d: f64, theta: f64, a: f64, alpha: f64) -> Self {
        Self::link(JointKind::Prismatic, d, theta, a, alpha)
    }

    /// Fixed tool offset. Nothing may follow it in a chain.
    pub const fn end_effector(d: f64, theta: f64, a: f64, alpha: f64) -> Self {
        Self::link(JointKind::EndEffector, d, theta, a, alpha)
    }

    const fn link(kind: JointKind, d: f64, theta: f64, a: f64, alpha: f64) -> Self {
        Self {
            kind,
            d,
            theta,
            a,
            alpha,
        }
    }

    pub const fn kind(&self) -> JointKind {
        self.kind
    }

    /// Offset along the previous z axis.
    pub const fn d(&self) -> f64 {
        self.d
    }

    /// Angle about the previous z axis.
    pub const fn theta(&self) -> f64 {
        self.theta
    }

    /// Link length along the new x axis.
    pub const fn a(&self) -> f64 {
        self.a
    }

    /// Twist about the new x axis.
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    pub const fn is_base(&self) -> bool {
        matches!(self.kind, JointKind::Base { .. })
    }

    /// Whether another joint may be attached after this one.
    pub const fn accepts_successor(&self) -> bool {
        !matches!(self.kind, JointKind::EndEffector)
    }

    /// Current value of the mutable parameter, if the joint has one.
    pub const fn joint_value(&self) -> Option<f64> {
        match self.kind {
            JointKind::Revolute => Some(self.theta),
            JointKind::Prismatic => Some(self.d),
            JointKind::Base { .. } | JointKind::EndEffector => None,
        }
    }

    fn joint_value_mut(&mut self) -> Option<&mut f64> {
        match self.kind {
            JointKind::Revolute => Some(&mut self.theta),
            JointKind::Prismatic => Some(&mut self.d),
            JointKind::Base { .. } | JointKind::EndEffector => None,
        }
    }

    /// Overwrite the mutable parameter. No-op for base and end effector.
    pub fn set_joint_value(&mut self, value: f64) {
        if let Some(slot) = self.joint_value_mut() {
            *slot = value;
        }
    }

    /// Add `delta` to the mutable parameter. No-op for base and end effector.
    pub fn change_joint_value(&mut self, delta: f64) {
        if let Some(slot) = self.joint_value_mut() {
            *slot += delta;
        }
    }

    /// Transform from the predecessor's frame to this joint's frame.
    ///
    /// The base frame uses its anchor as the translation column instead of
    /// the DH `a`/`d` offsets.
    pub fn local_transform(&self) -> Matrix4<f64> {
        match self.kind {
            JointKind::Base { anchor } => {
                let mut m = dh_matrix(0.0, self.alpha, 0.0, self.theta);
                m.fixed_view_mut::<3, 1>(0, 3).copy_from(&anchor);
                m
            }
            JointKind::Revolute | JointKind::Prismatic | JointKind::EndEffector => {
                dh_matrix(self.a, self.alpha, self.d, self.theta)
            }
        }
    }

    /// Closed-form inverse of [`local_transform`](Self::local_transform):
    /// `[Rᵀ | -Rᵀp]`.
    pub fn local_inverse(&self) -> Matrix4<f64> {
        let m = self.local_transform();
        let rt: Matrix3<f64> = m.fixed_view::<3, 3>(0, 0).transpose();
        let p: Vector3<f64> = m.fixed_view::<3, 1>(0, 3).into_owned();
        let mut inv = Matrix4::identity();
        inv.fixed_view_mut::<3, 3>(0, 0).copy_from(&rt);
        inv.fixed_view_mut::<3, 1>(0, 3).copy_from(&(-(rt * p)));
        inv
    }

    /// Straight-line distance spanned by the link offsets.
    pub fn link_length(&self) -> f64 {
        self.a.hypot(self.d)
    }
}

/// Standard DH homogeneous transform for link parameters `(a, α, d, θ)`.
pub fn dh_matrix(a: f64, alpha: f64, d: f64, theta: f64) -> Matrix4<f64> {
    let (st, ct) = theta.sin_cos();
    let (sa, ca) = alpha.sin_cos();

    Matrix4::new(
        ct,
        -st * ca,
        st * sa,
        a * ct,
        st,
        ct * ca,
        -ct * sa,
        a * st,
        0.0,
        sa,
        ca,
        d,
        0.0,
        0.0,
        0.0,
        1.0,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn dh_matrix_identity_at_zero() {
        assert_relative_eq!(dh_matrix(0.0, 0.0, 0.0, 0.0), Matrix4::identity());
    }

    #[test]
    fn dh_matrix_rotation_and_offset() {
        let m = dh_matrix(0.5, 0.0, 0.2, FRAC_PI_2);
        // Link rotated 90 deg about z: a-offset points along +y.
        assert_relative_eq!(m[(0, 3)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(m[(1, 3)], 0.5, epsilon = 1e-12);
        assert_relative_eq!(m[(2, 3)], 0.2, epsilon = 1e-12);
        assert_relative_eq!(m[(0, 1)], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn revolute_mutates_theta() {
        let mut joint = Joint::revolute(0.1, 0.0, 0.5, 0.0);
        joint.set_joint_value(1.0);
        joint.change_joint_value(0.25);
        assert_relative_eq!(joint.theta(), 1.25);
        assert_relative_eq!(joint.d(), 0.1);
        assert_eq!(joint.joint_value(), Some(1.25));
    }

    #[test]
    fn prismatic_mutates_d() {
        let mut joint = Joint::prismatic(0.0, 0.3, 0.0, 0.0);
        joint.set_joint_value(0.4);
        joint.change_joint_value(-0.1);
        assert_relative_eq!(joint.d(), 0.3);
        assert_relative_eq!(joint.theta(), 0.3);
    }

    #[test]
    fn base_and_end_effector_ignore_writes() {
        let mut base = Joint::base(Vector3::new(1.0, 2.0, 3.0), 0.2, 0.1);
        let mut tool = Joint::end_effector(0.1, 0.0, 0.2, 0.0);
        let (base_before, tool_before) = (base.clone(), tool.clone());

        base.set_joint_value(5.0);
        base.change_joint_value(5.0);
        tool.set_joint_value(5.0);
        tool.change_joint_value(5.0);

        assert_eq!(base, base_before);
        assert_eq!(tool, tool_before);
        assert_eq!(base.joint_value(), None);
        assert_eq!(tool.joint_value(), None);
    }

    #[test]
    fn base_transform_uses_anchor() {
        let base = Joint::base(Vector3::new(1.0, -2.0, 0.5), FRAC_PI_2, 0.0);
        let m = base.local_transform();
        assert_relative_eq!(m[(0, 3)], 1.0);
        assert_relative_eq!(m[(1, 3)], -2.0);
        assert_relative_eq!(m[(2, 3)], 0.5);
        assert_relative_eq!(m[(1, 0)], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn local_inverse_undoes_transform() {
        let joint = Joint::revolute(0.3, 0.7, 0.5, -0.4);
        let product = joint.local_transform() * joint.local_inverse();
        assert_relative_eq!(product, Matrix4::identity(), epsilon = 1e-12);
    }

    #[test]
    fn only_end_effector_refuses_successor() {
        assert!(Joint::base(Vector3::zeros(), 0.0, 0.0).accepts_successor());
        assert!(Joint::revolute(0.0, 0.0, 0.0, 0.0).accepts_successor());
        assert!(Joint::prismatic(0.0, 0.0, 0.0, 0.0).accepts_successor());
        assert!(!Joint::end_effector(0.0, 0.0, 0.0, 0.0).accepts_successor());
    }

    #[test]
    fn link_length_combines_offsets() {
        assert_relative_eq!(Joint::revolute(0.3, 0.0, 0.4, 0.0).link_length(), 0.5);
    }
}
