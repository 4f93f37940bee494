//! Architect configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main Architect configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Plan storage configuration
    pub storage: StorageConfig,

    /// Slack front-end configuration
    pub slack: SlackConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that the model API key is available so startup fails fast
    /// with a clear message instead of on the first request.
    pub fn validate(&self) -> Result<()> {
        self.llm.get_api_key()?;
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .architect.yml
        let local_config = PathBuf::from(".architect.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/architect/architect.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("architect").join("architect.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are swallowed here; the full load reports them once logging works.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => {
                let mut paths = vec![PathBuf::from(".architect.yml")];
                if let Some(dir) = dirs::config_dir() {
                    paths.push(dir.join("architect").join("architect.yml"));
                }
                paths
            }
        };

        candidates
            .iter()
            .find(|p| p.exists())
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|content| serde_yaml::from_str::<Config>(&content).ok())
            .and_then(|config| config.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("gemini" or "openai")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL; provider default when absent
    #[serde(rename = "base-url")]
    pub base_url: Option<String>,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Bound on one plan request, retries included, in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: None,
            max_tokens: 8192,
            timeout_ms: 30_000,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.api_key_env
            )),
        }
    }

    /// Base URL, falling back to the provider's public endpoint
    pub fn resolved_base_url(&self) -> String {
        if let Some(url) = &self.base_url {
            return url.trim_end_matches('/').to_string();
        }
        match self.provider.as_str() {
            "openai" => "https://api.openai.com".to_string(),
            _ => "https://generativelanguage.googleapis.com".to_string(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Plan storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding plan records
    #[serde(rename = "plans-dir")]
    pub plans_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/architect/plans on Linux)
        let plans_dir = dirs::data_dir()
            .map(|d| d.join("architect").join("plans"))
            .unwrap_or_else(|| PathBuf::from("plans"))
            .to_string_lossy()
            .into_owned();

        Self { plans_dir }
    }
}

impl StorageConfig {
    /// Plans directory with a leading `~/` expanded
    pub fn expanded_plans_dir(&self) -> PathBuf {
        match self.plans_dir.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.plans_dir)),
            None => PathBuf::from(&self.plans_dir),
        }
    }
}

/// Slack front-end configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Environment variable containing the bot token
    #[serde(rename = "bot-token-env")]
    pub bot_token_env: String,

    /// Slack Web API base URL
    #[serde(rename = "api-base-url")]
    pub api_base_url: String,

    /// Whether plans requested by mention are saved
    #[serde(rename = "persist-mentions")]
    pub persist_mentions: bool,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            bot_token_env: "SLACK_BOT_TOKEN".to_string(),
            api_base_url: "https://slack.com/api".to_string(),
            persist_mentions: false,
        }
    }
}

impl SlackConfig {
    /// Read the bot token from the configured environment variable
    pub fn get_bot_token(&self) -> Result<String> {
        match std::env::var(&self.bot_token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(eyre::eyre!(
                "Slack bot token not found. Set the {} environment variable.",
                self.bot_token_env
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.timeout_ms, 30_000);
        assert!(!config.slack.persist_mentions);
        assert!(config.storage.plans_dir.ends_with("plans"));
    }

    #[test]
    fn test_llm_config_defaults() {
        let config = LlmConfig::default();

        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.resolved_base_url(), "https://generativelanguage.googleapis.com");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_openai_base_url_default() {
        let config = LlmConfig {
            provider: "openai".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolved_base_url(), "https://api.openai.com");

        let config = LlmConfig {
            base_url: Some("http://localhost:8080/".to_string()),
            ..config
        };
        assert_eq!(config.resolved_base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: DEBUG
llm:
  provider: openai
  model: gpt-4o
  api-key-env: MY_API_KEY
  base-url: https://api.example.com
  max-tokens: 4096
  timeout-ms: 60000

storage:
  plans-dir: /tmp/plans

slack:
  bot-token-env: MY_BOT_TOKEN
  persist-mentions: true
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("DEBUG"));
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.api_key_env, "MY_API_KEY");
        assert_eq!(config.llm.max_tokens, 4096);
        assert_eq!(config.llm.timeout_ms, 60_000);
        assert_eq!(config.storage.expanded_plans_dir(), PathBuf::from("/tmp/plans"));
        assert_eq!(config.slack.bot_token_env, "MY_BOT_TOKEN");
        assert_eq!(config.slack.api_base_url, "https://slack.com/api");
        assert!(config.slack.persist_mentions);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: gemini-2.5-pro
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "gemini-2.5-pro");
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.api_key_env, "GEMINI_API_KEY");
        assert!(config.log_level.is_none());
        assert!(!config.slack.persist_mentions);
    }

    #[test]
    fn test_load_from_explicit_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("architect.yml");
        fs::write(&path, "log-level: WARN\nstorage:\n  plans-dir: ./saved\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.storage.plans_dir, "./saved");
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("WARN"));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let path = PathBuf::from("/nonexistent/architect.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    #[serial]
    fn test_get_api_key_from_env() {
        let config = LlmConfig {
            api_key_env: "ARCHITECT_TEST_API_KEY".to_string(),
            ..Default::default()
        };

        unsafe { std::env::remove_var("ARCHITECT_TEST_API_KEY") };
        assert!(config.get_api_key().is_err());
        assert!(
            Config {
                llm: config.clone(),
                ..Default::default()
            }
            .validate()
            .is_err()
        );

        unsafe { std::env::set_var("ARCHITECT_TEST_API_KEY", "secret") };
        assert_eq!(config.get_api_key().unwrap(), "secret");

        unsafe { std::env::remove_var("ARCHITECT_TEST_API_KEY") };
    }

    #[test]
    #[serial]
    fn test_get_bot_token_rejects_blank() {
        let config = SlackConfig {
            bot_token_env: "ARCHITECT_TEST_BOT_TOKEN".to_string(),
            ..Default::default()
        };

        unsafe { std::env::set_var("ARCHITECT_TEST_BOT_TOKEN", "  ") };
        assert!(config.get_bot_token().is_err());

        unsafe { std::env::set_var("ARCHITECT_TEST_BOT_TOKEN", "xoxb-1") };
        assert_eq!(config.get_bot_token().unwrap(), "xoxb-1");

        unsafe { std::env::remove_var("ARCHITECT_TEST_BOT_TOKEN") };
    }
}
