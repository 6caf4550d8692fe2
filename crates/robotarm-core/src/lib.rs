// robotarm-core: error taxonomy and configuration for robotarm kinematics.

pub mod config;
pub mod error;

pub use error::{ArmError, ConfigError, DomainError, IndexError, StructuralError};
