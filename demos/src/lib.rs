//! Shared scene definitions for robotarm examples.

use robotarm_core::config::SceneConfig;
use robotarm_core::ConfigError;

/// Elbow arm (shoulder yaw + two 0.5 m links) tracing a five-waypoint loop.
pub const SIMPLE_ELBOW_SCENE: &str = include_str!("../scenes/simple_elbow.toml");

/// Parse and validate a scene from TOML text.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the text is not a valid scene.
pub fn parse_scene(text: &str) -> Result<SceneConfig, ConfigError> {
    let scene: SceneConfig = toml::from_str(text)?;
    scene.validate()?;
    Ok(scene)
}
