//! Engine configuration.
//!
//! Loaded from JSON or YAML (chosen by file extension), validated, then
//! overridden from the environment:
//!
//! | Variable                        | Field                     |
//! |---------------------------------|---------------------------|
//! | `RIFFBRIDGE_CHUNK_TIMEOUT_MS`   | `chunk_timeout_ms` (0 disables) |
//! | `RIFFBRIDGE_MAP_GUIDE_BUTTON`   | `mapper.map_guide_button` |
//! | `RIFFBRIDGE_DEBUG_GAMEPAD`      | `mapper.enable_debug_gamepad` |

use std::path::Path;
use std::time::Duration;

use riffbridge_errors::{ResultExt, RiffbridgeError};
use riffbridge_mappers::{BackendKind, MapperOptions};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const ENV_CHUNK_TIMEOUT_MS: &str = "RIFFBRIDGE_CHUNK_TIMEOUT_MS";
pub const ENV_MAP_GUIDE_BUTTON: &str = "RIFFBRIDGE_MAP_GUIDE_BUTTON";
pub const ENV_DEBUG_GAMEPAD: &str = "RIFFBRIDGE_DEBUG_GAMEPAD";

/// Upper bound for the chunk timeout.
const MAX_CHUNK_TIMEOUT_MS: u64 = 60_000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Options handed to every mapper
    pub mapper: MapperOptions,
    /// Discard chunk sequences left open longer than this; `None` keeps them
    /// until replaced
    pub chunk_timeout_ms: Option<u64>,
    /// Kind of virtual controller to emulate
    pub backend: BackendKind,
}

impl EngineConfig {
    /// Load, validate and apply environment overrides.
    ///
    /// # Errors
    ///
    /// I/O failure, a parse error, an unknown extension, or an invalid value.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RiffbridgeError> {
        let path = path.as_ref();
        let operation = format!("loading {}", path.display());
        let content = std::fs::read_to_string(path).with_context(operation.as_str())?;
        let mut config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("yaml" | "yml") => Self::from_yaml(&content),
            other => Err(RiffbridgeError::config(format!(
                "unsupported config extension {other:?}"
            ))),
        }
        .with_context(operation)?;
        config.apply_env_overrides()?;
        debug!(path = %path.display(), ?config, "engine config loaded");
        Ok(config)
    }

    /// # Errors
    ///
    /// Parse error or invalid value.
    pub fn from_json(content: &str) -> Result<Self, RiffbridgeError> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| RiffbridgeError::config(format!("invalid JSON config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Parse error or invalid value.
    pub fn from_yaml(content: &str) -> Result<Self, RiffbridgeError> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| RiffbridgeError::config(format!("invalid YAML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// [`RiffbridgeError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<(), RiffbridgeError> {
        self.mapper.validate()?;
        if let Some(ms) = self.chunk_timeout_ms
            && (ms == 0 || ms > MAX_CHUNK_TIMEOUT_MS)
        {
            return Err(RiffbridgeError::config(format!(
                "chunk_timeout_ms must be within 1..={MAX_CHUNK_TIMEOUT_MS}, got {ms}"
            )));
        }
        Ok(())
    }

    pub fn chunk_timeout(&self) -> Option<Duration> {
        self.chunk_timeout_ms.map(Duration::from_millis)
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// A variable that does not parse, or a resulting invalid config.
    pub fn apply_env_overrides(&mut self) -> Result<(), RiffbridgeError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// A variable that does not parse, or a resulting invalid config.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), RiffbridgeError> {
        if let Some(raw) = lookup(ENV_CHUNK_TIMEOUT_MS) {
            let ms: u64 = raw.trim().parse().map_err(|e| {
                RiffbridgeError::config(format!("{ENV_CHUNK_TIMEOUT_MS}: {raw}: {e}"))
            })?;
            self.chunk_timeout_ms = (ms != 0).then_some(ms);
        }
        if let Some(raw) = lookup(ENV_MAP_GUIDE_BUTTON) {
            self.mapper.map_guide_button = parse_flag(ENV_MAP_GUIDE_BUTTON, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DEBUG_GAMEPAD) {
            self.mapper.enable_debug_gamepad = parse_flag(ENV_DEBUG_GAMEPAD, &raw)?;
        }
        self.validate()
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, RiffbridgeError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(RiffbridgeError::config(format!(
            "{name}: expected a boolean, got {raw}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert!(config.mapper.map_guide_button);
        assert!(!config.mapper.enable_debug_gamepad);
        assert_eq!(config.chunk_timeout(), None);
        assert_eq!(config.backend, BackendKind::Gamepad);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_and_yaml_agree() -> Result<(), RiffbridgeError> {
        let json = EngineConfig::from_json(
            r#"{"backend": "joystick", "chunk_timeout_ms": 250, "mapper": {"enable_debug_gamepad": true}}"#,
        )?;
        let yaml = EngineConfig::from_yaml(
            "backend: joystick\nchunk_timeout_ms: 250\nmapper:\n  enable_debug_gamepad: true\n",
        )?;
        assert_eq!(json, yaml);
        assert_eq!(json.backend, BackendKind::Joystick);
        assert_eq!(json.chunk_timeout(), Some(Duration::from_millis(250)));
        Ok(())
    }

    #[test]
    fn unknown_fields_rejected() {
        assert!(EngineConfig::from_json(r#"{"chunk_timeout": 5}"#).is_err());
        assert!(EngineConfig::from_yaml("mapper:\n  guide: true\n").is_err());
    }

    #[test]
    fn invalid_timeout_rejected() {
        let err = EngineConfig::from_json(r#"{"chunk_timeout_ms": 0}"#);
        assert!(matches!(err, Err(RiffbridgeError::Config(_))));
    }

    #[test]
    fn overrides_apply() -> Result<(), RiffbridgeError> {
        let mut config = EngineConfig::default();
        config.apply_overrides(env(&[
            (ENV_CHUNK_TIMEOUT_MS, "100"),
            (ENV_MAP_GUIDE_BUTTON, "off"),
            (ENV_DEBUG_GAMEPAD, "1"),
        ]))?;
        assert_eq!(config.chunk_timeout_ms, Some(100));
        assert!(!config.mapper.map_guide_button);
        assert!(config.mapper.enable_debug_gamepad);

        config.apply_overrides(env(&[(ENV_CHUNK_TIMEOUT_MS, "0")]))?;
        assert_eq!(config.chunk_timeout_ms, None);
        Ok(())
    }

    #[test]
    fn bad_override_rejected() {
        let mut config = EngineConfig::default();
        let result = config.apply_overrides(env(&[(ENV_DEBUG_GAMEPAD, "maybe")]));
        assert!(matches!(result, Err(RiffbridgeError::Config(_))));
    }

    #[test]
    fn load_by_extension() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("riffbridge.yaml");
        let mut file = std::fs::File::create(&path)?;
        writeln!(file, "backend: joystick")?;
        drop(file);
        let config = EngineConfig::load(&path)?;
        assert_eq!(config.backend, BackendKind::Joystick);

        let toml = dir.path().join("riffbridge.toml");
        std::fs::write(&toml, "backend = 'joystick'")?;
        assert!(EngineConfig::load(&toml).is_err());
        Ok(())
    }
}
