//! `uifix.toml` settings.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use uifix_core::{normalize_limit, RepairConfig};
use uifix_openai::OpenAiConfig;
use uifix_runner::{DiscoveryConfig, RunnerConfig};

/// Settings file looked up in the workspace root.
pub const SETTINGS_FILE: &str = "uifix.toml";

/// Everything configurable from `uifix.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub runner: RunnerConfig,
    pub discovery: DiscoveryConfig,
    pub generation: GenerationSettings,
    pub openai: OpenAiConfig,
}

/// `[generation]` section.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationSettings {
    /// Non-positive or absent means no limit.
    pub max_generated_tests: Option<f64>,
    pub test_dir: String,
    pub fallback_destination: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        let repair = RepairConfig::default();
        Self {
            max_generated_tests: None,
            test_dir: repair.test_dir,
            fallback_destination: repair.fallback_destination,
        }
    }
}

impl Settings {
    /// Load `<root>/uifix.toml` if present, then apply environment
    /// overrides.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(SETTINGS_FILE);
        let settings = if path.is_file() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Self::from_toml(&raw).with_context(|| format!("Invalid {}", path.display()))?
        } else {
            Self::default()
        };
        Ok(settings.with_env_overrides())
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    fn with_env_overrides(mut self) -> Self {
        self.openai = self.openai.with_env_overrides();
        self
    }

    /// Orchestrator config, with `max_override` (from the command line)
    /// taking precedence over the file.
    pub fn repair_config(&self, max_override: Option<f64>) -> RepairConfig {
        RepairConfig {
            test_dir: self.generation.test_dir.clone(),
            fallback_destination: self.generation.fallback_destination.clone(),
            max_generated_tests: normalize_limit(
                max_override.or(self.generation.max_generated_tests),
            ),
        }
    }
}
