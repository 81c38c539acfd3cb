//! Sandbox configuration
//!
//! Hierarchy:
//! 1. Default values
//! 2. An optional YAML file
//! 3. `POP_*` environment variables (`__` separates nesting)

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::SteppingPolicy;
use crate::error::ConfigError;

/// Classic 35 Hz game tic
pub const DEFAULT_TICK_MS: f64 = 1000.0 / 35.0;
pub const DEFAULT_FRAME_WIDTH: u32 = 320;
pub const DEFAULT_FRAME_HEIGHT: u32 = 240;
pub const DEFAULT_PLAYER_NAME: &str = "Anonymous";

/// Where the input feed dispatches events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputTarget {
    Document,
    #[default]
    Body,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Virtual milliseconds per tick
    pub tick_ms: f64,
    pub frame_width: u32,
    pub frame_height: u32,
    pub input_target: InputTarget,
    /// Keep a still of the first frame past half the input log
    pub still_capture: bool,
    /// Used when the record carries no player name
    pub player_name: String,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
            input_target: InputTarget::Body,
            still_capture: true,
            player_name: DEFAULT_PLAYER_NAME.to_string(),
        }
    }
}

impl SandboxConfig {
    /// Layered figment: defaults, then `path` if given, then environment
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(SandboxConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed("POP_").split("__"))
    }

    /// Load from defaults, an optional YAML file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
        }
        Self::from_figment(Self::figment(path))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        debug!(?config, "sandbox configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tick_ms.is_finite() || self.tick_ms <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tick_ms must be a positive number, got {}",
                self.tick_ms
            )));
        }
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "frame size must be non-zero, got {}x{}",
                self.frame_width, self.frame_height
            )));
        }
        Ok(())
    }

    pub fn stepping(&self) -> SteppingPolicy {
        SteppingPolicy::fixed_ms(self.tick_ms)
    }

    /// Bytes in one RGBA frame
    pub fn frame_len(&self) -> usize {
        self.frame_width as usize * self.frame_height as usize * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_yaml(yaml: &str) -> Result<SandboxConfig, ConfigError> {
        SandboxConfig::from_figment(
            Figment::from(Serialized::defaults(SandboxConfig::default())).merge(Yaml::string(yaml)),
        )
    }

    #[test]
    fn test_default_config_validates() {
        let config = SandboxConfig::default();
        config.validate().expect("default config should validate");
        assert_eq!(config.frame_len(), 320 * 240 * 4);
        assert_eq!(config.player_name, "Anonymous");
    }

    #[test]
    fn test_yaml_overrides_defaults() {
        let config = from_yaml("tick_ms: 10\ninput_target: document\nplayer_name: Ada\n").unwrap();
        assert_eq!(config.tick_ms, 10.0);
        assert_eq!(config.input_target, InputTarget::Document);
        assert_eq!(config.player_name, "Ada");
        assert_eq!(config.frame_width, DEFAULT_FRAME_WIDTH);
        assert_eq!(config.stepping(), SteppingPolicy::FixedStep { step_ns: 10_000_000 });
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(from_yaml("tick_ms: 0"), Err(ConfigError::Invalid(_))));
        assert!(matches!(from_yaml("frame_width: 0"), Err(ConfigError::Invalid(_))));
        assert!(matches!(from_yaml("input_target: window"), Err(ConfigError::Parsing(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = SandboxConfig::load(Some(Path::new("/nonexistent/pop.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
