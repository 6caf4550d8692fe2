use thiserror::Error;

/// Top-level error type for robotarm.
#[derive(Debug, Error)]
pub enum ArmError {
    #[error("Structural error: {0}")]
    Structural(#[from] StructuralError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),
}

/// Violations of the chain shape: base first, end effector last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("Cannot append a joint after an end effector")]
    AppendAfterEndEffector,

    #[error("Chain has no base frame")]
    MissingBase,

    #[error("Base frame found at index {index} (only index 0 may be a base)")]
    MisplacedBase { index: usize },

    #[error("End effector at index {index} is not the last joint")]
    EndEffectorNotLast { index: usize },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Joint value count mismatch: expected {expected}, got {got}")]
    JointCountMismatch { expected: usize, got: usize },

    #[error("At least 2 waypoints are required, got {0}")]
    TooFewWaypoints(usize),

    #[error("Waypoint {index} has a non-finite time or position")]
    NonFiniteWaypoint { index: usize },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Robot already in room: {0}")]
    DuplicateRobot(String),

    #[error("No robot named {0}")]
    UnknownRobot(String),
}

/// Inverse-kinematics targets outside the solvable domain.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DomainError {
    #[error("Target exceeds max reach: r={reach} > {max_reach}")]
    Unreachable { reach: f64, max_reach: f64 },

    #[error("Target coincides with the shoulder origin (r=0); azimuth and elevation are undefined")]
    DegenerateReach,

    #[error("Invalid link length: {0} (must be finite and > 0)")]
    InvalidLinkLength(f64),
}

/// Joint index outside `[0, len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Joint index {index} out of range for chain of length {len}")]
pub struct IndexError {
    pub index: isize,
    pub len: usize,
}
