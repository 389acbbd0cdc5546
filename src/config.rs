//! Compiler configuration and stored pattern definitions.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::EnginePreference;
use crate::error::{Error, Result};

/// Environment variable overriding the configured engine preference.
pub const ENGINE_ENV_VAR: &str = "KODEGEN_REGEX_ENGINE";

/// Compiler settings, typically read from a JSON config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Engine preference: `auto`, `linear` (`re2`) or `backtracking` (`standard`)
    pub engine: EnginePreference,
}

impl CompilerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| Error::Config {
            message: format!("invalid compiler config: {err}"),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|err| Error::Config {
            message: format!("failed to read {}: {err}", path.display()),
        })?;
        Self::from_json(&json)
    }

    /// Defaults with [`ENGINE_ENV_VAR`] applied.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_override(std::env::var(ENGINE_ENV_VAR).ok())
    }

    /// Apply an engine override, as read from the environment.
    ///
    /// Empty values are ignored.
    pub fn with_env_override(mut self, value: Option<String>) -> Result<Self> {
        if let Some(value) = value
            && !value.trim().is_empty()
        {
            self.engine = value.parse()?;
        }
        Ok(self)
    }
}

/// A pattern as stored by detection pipelines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDef {
    #[serde(default)]
    pub id: String,
    pub pattern: String,
    /// Flag names such as `IGNORECASE`; see [`crate::Flags::from_names`]
    #[serde(default)]
    pub flags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_auto() {
        let config = CompilerConfig::from_json("{}").unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(config.engine, EnginePreference::Auto);
    }

    #[test]
    fn legacy_engine_names_parse() {
        let config = CompilerConfig::from_json(r#"{"engine": "standard"}"#)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(config.engine, EnginePreference::Backtracking);
    }

    #[test]
    fn bad_json_is_config_error() {
        assert!(matches!(
            CompilerConfig::from_json(r#"{"engine": "pcre"}"#),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn env_override_wins_and_blank_is_ignored() {
        let base = CompilerConfig {
            engine: EnginePreference::Linear,
        };
        let overridden = base
            .clone()
            .with_env_override(Some("backtracking".to_string()))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(overridden.engine, EnginePreference::Backtracking);

        let untouched = base
            .clone()
            .with_env_override(Some("  ".to_string()))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(untouched, base);
    }

    #[test]
    fn env_override_rejects_unknown_names() {
        let result = CompilerConfig::default().with_env_override(Some("fast".to_string()));
        assert!(matches!(result, Err(Error::UnknownEngine(name)) if name == "fast"));
    }

    #[test]
    fn pattern_def_defaults_id_and_flags() {
        let def: PatternDef = serde_json::from_str(r#"{"pattern": "\\d+"}"#)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(def.pattern, r"\d+");
        assert!(def.id.is_empty());
        assert!(def.flags.is_empty());
    }
}
