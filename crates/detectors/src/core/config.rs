use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::category::SmellCategory;

/// Top-level analysis configuration. Loadable from YAML or environment
/// variables; everything has a sensible default so `AnalysisConfig::default()`
/// is a working setup (given an API key in the environment).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub provider: ProviderConfig,

    #[serde(default = "default_categories")]
    pub enabled_categories: Vec<SmellCategory>,

    #[serde(default)]
    pub execution: ExecutionMode,

    #[serde(default)]
    pub validation: ValidationPolicy,

    #[serde(default)]
    pub limits: InputLimits,

    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    #[serde(default = "default_request_deadline_secs")]
    pub request_deadline_secs: u64,

    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    /// Any OpenAI-compatible chat-completions endpoint. The production
    /// deployment points `base_url` at OpenRouter.
    #[serde(rename = "openai")]
    OpenAi {
        model: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        api_key: Option<String>, // falls back to OPENAI_API_KEY
        #[serde(skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
        #[serde(default = "default_temperature")]
        temperature: f32,
        #[serde(default = "default_max_tokens")]
        max_tokens: u32,
    },
}

/// How detector calls are scheduled. Both modes produce the same logical
/// result set; they differ only in pacing and wall-clock shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Bounded fan-out: at most `max_in_flight` detector calls at once.
    Concurrent {
        #[serde(default = "default_max_in_flight")]
        max_in_flight: usize,
    },
    /// One call at a time with a minimum delay between successive calls,
    /// for endpoints with tight rate limits.
    Sequential {
        #[serde(default = "default_pacing_ms")]
        pacing_ms: u64,
    },
}

impl Default for ExecutionMode {
    fn default() -> Self {
        Self::Concurrent {
            max_in_flight: default_max_in_flight(),
        }
    }
}

/// The validator's behavior when a candidate carries no numeric evidence and
/// none can be extracted from its description. The default is permissive
/// (accept), trading precision for recall; flipping the flag rejects instead.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ValidationPolicy {
    #[serde(default)]
    pub strict_on_unknown: bool,
}

/// Input ceilings enforced before any parsing or detector call. Requests
/// over either bound are rejected outright with an explicit status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InputLimits {
    #[serde(default = "default_max_source_bytes")]
    pub max_source_bytes: usize,

    #[serde(default = "default_max_source_lines")]
    pub max_source_lines: usize,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_source_bytes: default_max_source_bytes(),
            max_source_lines: default_max_source_lines(),
        }
    }
}

fn default_categories() -> Vec<SmellCategory> {
    SmellCategory::all().to_vec()
}
fn default_call_timeout_secs() -> u64 {
    60
}
fn default_request_deadline_secs() -> u64 {
    300
}
fn default_retry_attempts() -> u32 {
    3
}
fn default_temperature() -> f32 {
    0.0
}
fn default_max_tokens() -> u32 {
    4000
}
fn default_max_in_flight() -> usize {
    4
}
fn default_pacing_ms() -> u64 {
    500
}
fn default_max_source_bytes() -> usize {
    256 * 1024
}
fn default_max_source_lines() -> usize {
    5_000
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::OpenAi {
                model: "gpt-4o-mini".to_string(),
                api_key: None,
                base_url: None,
                temperature: default_temperature(),
                max_tokens: default_max_tokens(),
            },
            enabled_categories: default_categories(),
            execution: ExecutionMode::default(),
            validation: ValidationPolicy::default(),
            limits: InputLimits::default(),
            call_timeout_secs: default_call_timeout_secs(),
            request_deadline_secs: default_request_deadline_secs(),
            retry_attempts: default_retry_attempts(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(model) = std::env::var("NIOI_MODEL") {
            let ProviderConfig::OpenAi { model: ref mut m, .. } = config.provider;
            *m = model;
        }

        if let Ok(base) = std::env::var("NIOI_BASE_URL") {
            let ProviderConfig::OpenAi { ref mut base_url, .. } = config.provider;
            *base_url = Some(base);
        }

        if let Ok(categories) = std::env::var("NIOI_CATEGORIES") {
            config.enabled_categories = categories
                .split(',')
                .filter_map(|s| SmellCategory::from_id(s.trim()))
                .collect();
        }

        if let Ok(timeout) = std::env::var("NIOI_CALL_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                config.call_timeout_secs = t;
            }
        }

        if let Ok(pacing) = std::env::var("NIOI_PACING_MS") {
            if let Ok(ms) = pacing.parse() {
                config.execution = ExecutionMode::Sequential { pacing_ms: ms };
            }
        }

        Ok(config)
    }

    pub fn save_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.enabled_categories.len(), SmellCategory::all().len());
        assert!(matches!(
            config.execution,
            ExecutionMode::Concurrent { max_in_flight: 4 }
        ));
        assert!(!config.validation.strict_on_unknown);
    }

    #[test]
    fn test_config_yaml_round_trip() {
        let config = AnalysisConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: AnalysisConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.enabled_categories, config.enabled_categories);
        assert_eq!(parsed.call_timeout_secs, config.call_timeout_secs);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
provider:
  type: openai
  model: gpt-4o
execution:
  mode: sequential
"#;
        let config: AnalysisConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            config.execution,
            ExecutionMode::Sequential { pacing_ms: 500 }
        ));
        assert_eq!(config.call_timeout_secs, 60);
    }
}
