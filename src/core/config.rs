//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.assist-panel/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::panel::{Stage, Tip, TipVariant};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PanelConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
    #[serde(default)]
    pub lmstudio: LmStudioConfig,
    #[serde(default)]
    pub tip: TipConfig,
    #[serde(default)]
    pub stages: Vec<Stage>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OpenRouterConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LmStudioConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TipConfig {
    pub text: Option<String>,
    pub variant: Option<TipVariant>,
    pub dismissible: Option<bool>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_PROVIDER: &str = "lmstudio";
pub const DEFAULT_MODEL: &str = "qwen2.5-7b-instruct";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_LMSTUDIO_BASE_URL: &str = "http://localhost:1234/v1";
pub const DEFAULT_TIP: &str =
    "Enter sends, Shift+Enter adds a line, Ctrl+O attaches files, Ctrl+T hides this tip.";

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful planning assistant. \
    Be direct, be honest about uncertainty, and prefer clarity over hedging.";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub provider: String,
    pub model_name: String,
    pub system_prompt: String,
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub lmstudio_base_url: String,
    pub tip: Option<Tip>,
    pub stages: Vec<Stage>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.assist-panel/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".assist-panel").join("config.toml"))
}

/// Load config from `~/.assist-panel/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `PanelConfig::default()`.
pub fn load_config() -> Result<PanelConfig, ConfigError> {
    let Some(path) = config_path() else {
        warn!("Could not determine home directory, using default config");
        return Ok(PanelConfig::default());
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(PanelConfig::default());
    }

    load_config_from(&path)
}

/// Parse a config file at an explicit path.
pub fn load_config_from(path: &Path) -> Result<PanelConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: PanelConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r##"# Assistant Panel Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# provider = "lmstudio"              # "lmstudio" or "openrouter"
# model = "qwen2.5-7b-instruct"
# system_prompt = "You are a helpful planning assistant."

# [openrouter]
# api_key = "sk-or-..."              # Or set OPENROUTER_API_KEY env var
# base_url = "https://openrouter.ai/api/v1"

# [lmstudio]
# base_url = "http://localhost:1234/v1"

# [tip]
# text = "Ask about any stage to get suggestions."
# variant = "info"                   # "info", "success" or "warning"
# dismissible = true

# [[stages]]
# title = "Discovery"
# description = "Understand the problem space."
# accent_color = "#33aa77"
#
# [[stages.activities]]
# name = "Stakeholder interviews"
# description = "Talk to the people affected."
# impact = "High"
"##;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_provider` and `cli_model` are from CLI flags (None = not specified).
pub fn resolve(
    config: &PanelConfig,
    cli_provider: Option<&str>,
    cli_model: Option<&str>,
) -> ResolvedConfig {
    resolve_with_env(config, cli_provider, cli_model, |key| std::env::var(key).ok())
}

/// Resolution with an injectable environment lookup.
fn resolve_with_env(
    config: &PanelConfig,
    cli_provider: Option<&str>,
    cli_model: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Provider: CLI → env → config → default
    let provider = cli_provider
        .map(str::to_string)
        .or_else(|| env("ASSIST_PANEL_PROVIDER"))
        .or_else(|| config.general.provider.clone())
        .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());

    // Model: CLI → env → config → default
    let model_name = cli_model
        .map(str::to_string)
        .or_else(|| env("ASSIST_PANEL_MODEL"))
        .or_else(|| config.general.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let system_prompt = config
        .general
        .system_prompt
        .clone()
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

    let openrouter_api_key = env("OPENROUTER_API_KEY").or_else(|| config.openrouter.api_key.clone());

    let openrouter_base_url = env("OPENROUTER_BASE_URL")
        .or_else(|| config.openrouter.base_url.clone())
        .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string());

    let lmstudio_base_url = env("LM_STUDIO_BASE_URL")
        .or_else(|| config.lmstudio.base_url.clone())
        .unwrap_or_else(|| DEFAULT_LMSTUDIO_BASE_URL.to_string());

    ResolvedConfig {
        provider,
        model_name,
        system_prompt,
        openrouter_api_key,
        openrouter_base_url,
        lmstudio_base_url,
        tip: resolve_tip(&config.tip),
        stages: config.stages.clone(),
    }
}

/// An empty tip text hides the banner entirely.
fn resolve_tip(tip: &TipConfig) -> Option<Tip> {
    let text = tip.text.clone().unwrap_or_else(|| DEFAULT_TIP.to_string());
    if text.trim().is_empty() {
        return None;
    }
    Some(Tip {
        text,
        variant: tip.variant.unwrap_or_default(),
        dismissible: tip.dismissible.unwrap_or(true),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn resolve_uses_defaults_when_empty() {
        let resolved = resolve_with_env(&PanelConfig::default(), None, None, no_env);
        assert_eq!(resolved.provider, DEFAULT_PROVIDER);
        assert_eq!(resolved.model_name, DEFAULT_MODEL);
        assert_eq!(resolved.lmstudio_base_url, DEFAULT_LMSTUDIO_BASE_URL);
        assert!(resolved.openrouter_api_key.is_none());
        assert!(resolved.system_prompt.starts_with("You are a helpful"));
        assert!(resolved.stages.is_empty());

        let tip = resolved.tip.expect("default tip");
        assert_eq!(tip.text, DEFAULT_TIP);
        assert_eq!(tip.variant, TipVariant::Info);
        assert!(tip.dismissible);
    }

    #[test]
    fn env_overrides_config_and_cli_overrides_env() {
        let config = PanelConfig {
            general: GeneralConfig {
                provider: Some("lmstudio".into()),
                model: Some("from-config".into()),
                system_prompt: None,
            },
            ..Default::default()
        };
        let env = |key: &str| match key {
            "ASSIST_PANEL_PROVIDER" => Some("openrouter".to_string()),
            "ASSIST_PANEL_MODEL" => Some("from-env".to_string()),
            _ => None,
        };

        let resolved = resolve_with_env(&config, None, None, env);
        assert_eq!(resolved.provider, "openrouter");
        assert_eq!(resolved.model_name, "from-env");

        let resolved = resolve_with_env(&config, Some("lmstudio"), Some("from-cli"), env);
        assert_eq!(resolved.provider, "lmstudio");
        assert_eq!(resolved.model_name, "from-cli");
    }

    #[test]
    fn api_key_env_beats_config() {
        let config = PanelConfig {
            openrouter: OpenRouterConfig {
                api_key: Some("sk-config".into()),
                base_url: None,
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, None, None, |key| {
            (key == "OPENROUTER_API_KEY").then(|| "sk-env".to_string())
        });
        assert_eq!(resolved.openrouter_api_key.as_deref(), Some("sk-env"));
    }

    #[test]
    fn empty_tip_text_hides_banner() {
        let config = PanelConfig {
            tip: TipConfig {
                text: Some("  ".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(resolve_with_env(&config, None, None, no_env).tip.is_none());
    }

    #[test]
    fn full_toml_parses() {
        let toml_str = r##"
[general]
provider = "openrouter"
model = "anthropic/claude-sonnet-4"

[openrouter]
api_key = "sk-test-123"

[lmstudio]
base_url = "http://192.168.1.100:1234/v1"

[tip]
text = "Stages are read-only."
variant = "warning"
dismissible = false

[[stages]]
title = "Discovery"
description = "Understand the problem."
accent_color = "#33aa77"

[[stages.activities]]
name = "Interviews"
description = "Talk to users."
impact = "High"

[[stages.activities]]
name = "Survey"

[[stages]]
title = "Delivery"
"##;
        let config: PanelConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.provider.as_deref(), Some("openrouter"));
        assert_eq!(config.openrouter.api_key.as_deref(), Some("sk-test-123"));
        assert_eq!(config.tip.variant, Some(TipVariant::Warning));
        assert_eq!(config.tip.dismissible, Some(false));
        assert_eq!(config.stages.len(), 2);
        assert_eq!(config.stages[0].activities.len(), 2);
        assert_eq!(config.stages[0].activities[0].impact.as_deref(), Some("High"));
        assert!(config.stages[1].activities.is_empty());
    }

    #[test]
    fn sparse_toml_parses() {
        let config: PanelConfig = toml::from_str("[general]\nmodel = \"my-model\"\n").unwrap();
        assert_eq!(config.general.model.as_deref(), Some("my-model"));
        assert!(config.general.provider.is_none());
        assert!(config.tip.text.is_none());
        assert!(config.stages.is_empty());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let path = std::env::temp_dir().join(format!(
            "assist-panel-bad-config-{}.toml",
            std::process::id()
        ));
        fs::write(&path, "[general\nmodel = ").unwrap();

        let result = load_config_from(&path);
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
