use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

fn default_arm_name() -> String {
    "DefaultBot".into()
}
const fn default_link_length() -> f64 {
    0.5
}
const fn default_frame_end() -> f64 {
    20.0
}
const fn default_frame_count() -> usize {
    201
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// JointSpec
// ---------------------------------------------------------------------------

/// Joint variant that can be appended after the base frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointSpecKind {
    Revolute,
    Prismatic,
    EndEffector,
}

/// One appended joint, described by its DH parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointSpec {
    pub kind: JointSpecKind,
    #[serde(default)]
    pub d: f64,
    #[serde(default)]
    pub theta: f64,
    #[serde(default)]
    pub a: f64,
    #[serde(default)]
    pub alpha: f64,
}

impl JointSpec {
    fn is_finite(&self) -> bool {
        [self.d, self.theta, self.a, self.alpha]
            .iter()
            .all(|v| v.is_finite())
    }
}

// ---------------------------------------------------------------------------
// ArmConfig
// ---------------------------------------------------------------------------

/// A robot arm: base placement plus the joints appended after it, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmConfig {
    #[serde(default = "default_arm_name")]
    pub name: String,
    /// Anchor position of the base frame in room coordinates.
    #[serde(default)]
    pub base_position: [f64; 3],
    /// Base rotation as `(theta, alpha)`.
    #[serde(default)]
    pub base_rotation: [f64; 2],
    #[serde(default)]
    pub joints: Vec<JointSpec>,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            name: default_arm_name(),
            base_position: [0.0; 3],
            base_rotation: [0.0; 2],
            joints: Vec::new(),
        }
    }
}

impl ArmConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_position.iter().chain(&self.base_rotation).all(|v| v.is_finite()) {
            return Err(invalid(
                format!("{}.base", self.name),
                "base placement must be finite",
            ));
        }
        let last = self.joints.len().saturating_sub(1);
        for (i, joint) in self.joints.iter().enumerate() {
            if !joint.is_finite() {
                return Err(invalid(
                    format!("{}.joints[{i}]", self.name),
                    "DH parameters must be finite",
                ));
            }
            if joint.kind == JointSpecKind::EndEffector && i != last {
                return Err(invalid(
                    format!("{}.joints[{i}]", self.name),
                    "end effector must be the last joint",
                ));
            }
        }
        Ok(())
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = read_toml(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// TrajectoryConfig
// ---------------------------------------------------------------------------

/// How positions between waypoints are produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMode {
    /// Piecewise-linear between the bounding waypoints.
    #[default]
    Linear,
    /// Natural cubic spline through every waypoint.
    Spline,
}

/// A time-tagged position as written in config files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaypointSpec {
    pub position: [f64; 3],
    pub time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryConfig {
    #[serde(default)]
    pub mode: InterpolationMode,
    pub waypoints: Vec<WaypointSpec>,
}

impl TrajectoryConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.waypoints.len() < 2 {
            return Err(ConfigError::TooFewWaypoints(self.waypoints.len()));
        }
        for (index, wp) in self.waypoints.iter().enumerate() {
            if !wp.time.is_finite() || !wp.position.iter().all(|v| v.is_finite()) {
                return Err(ConfigError::NonFiniteWaypoint { index });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SceneConfig
// ---------------------------------------------------------------------------

/// Which of the two elbow solutions a controller applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElbowPreference {
    #[default]
    Up,
    Down,
}

/// Evenly spaced tick times `start..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    #[serde(default)]
    pub start: f64,
    #[serde(default = "default_frame_end")]
    pub end: f64,
    #[serde(default = "default_frame_count")]
    pub count: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: default_frame_end(),
            count: default_frame_count(),
        }
    }
}

/// A room of arms all tracking one trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Length of each of the two equal elbow links.
    #[serde(default = "default_link_length")]
    pub link_length: f64,
    #[serde(default)]
    pub elbow: ElbowPreference,
    #[serde(default)]
    pub frames: FrameConfig,
    /// Joint whose position is traced each tick; negative counts from the tail.
    #[serde(default)]
    pub trace_joint: Option<isize>,
    #[serde(default)]
    pub arms: Vec<ArmConfig>,
    pub trajectory: TrajectoryConfig,
}

impl SceneConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.link_length.is_finite() || self.link_length <= 0.0 {
            return Err(invalid("link_length", "must be finite and > 0"));
        }
        if self.frames.count == 0 {
            return Err(invalid("frames.count", "must be >= 1"));
        }
        if !self.frames.start.is_finite()
            || !self.frames.end.is_finite()
            || self.frames.end < self.frames.start
        {
            return Err(invalid("frames", "end must be >= start and both finite"));
        }
        let mut names = HashSet::new();
        for arm in &self.arms {
            arm.validate()?;
            if !names.insert(arm.name.as_str()) {
                return Err(ConfigError::DuplicateRobot(arm.name.clone()));
            }
        }
        self.trajectory.validate()
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = read_toml(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
