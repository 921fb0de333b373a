use std::path::PathBuf;
use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use anyhow::{Result, Context};
use chrono::{FixedOffset, Local, Offset};
use tracing::warn;

use crate::core::diary::DEFAULT_DIARY_CAPACITY;
use crate::core::history::DEFAULT_HISTORY_CAPACITY;
use crate::core::relationship::{DEFAULT_MILESTONE_INTERVAL, DEFAULT_REMINDER_AFTER_HOURS};
use crate::transport::{AIConfig, AIProvider};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub data_dir: PathBuf,
    pub default_provider: String,
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub relationship: RelationshipConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Level for the rotated log file
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub default_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Tunables of the relationship core
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipConfig {
    pub diary_capacity: usize,
    pub history_capacity: usize,
    /// Diary milestone every N messages, 0 disables
    pub milestone_interval: u64,
    /// Hours of silence before the companion reaches out, 0 disables
    pub reminder_after_hours: i64,
    pub score_companion_messages: bool,
    /// History lines spliced into each prompt
    pub prompt_history_lines: usize,
    /// Offset for calendar-date decisions; system local offset when unset
    pub utc_offset_minutes: Option<i32>,
}

impl Default for RelationshipConfig {
    fn default() -> Self {
        RelationshipConfig {
            diary_capacity: DEFAULT_DIARY_CAPACITY,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            milestone_interval: DEFAULT_MILESTONE_INTERVAL,
            reminder_after_hours: DEFAULT_REMINDER_AFTER_HOURS,
            score_companion_messages: false,
            prompt_history_lines: 10,
            utc_offset_minutes: None,
        }
    }
}

impl RelationshipConfig {
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .and_then(|m| FixedOffset::east_opt(m * 60))
            .unwrap_or_else(|| Local::now().offset().fix())
    }

    pub fn reminder_after(&self) -> Option<chrono::Duration> {
        (self.reminder_after_hours > 0).then(|| chrono::Duration::hours(self.reminder_after_hours))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub tick_secs: u64,
    pub special_date_interval_mins: i64,
    pub reminder_interval_mins: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            tick_secs: 60,
            special_date_interval_mins: 60,
            reminder_interval_mins: 30,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("aicompanion")
        });

        std::fs::create_dir_all(&data_dir)
            .context("Failed to create data directory")?;

        let config_path = data_dir.join("config.json");

        if config_path.exists() {
            let config_str = std::fs::read_to_string(&config_path)
                .context("Failed to read config.json")?;

            if config_str.trim().is_empty() {
                warn!("config file is empty, recreating defaults");
            } else {
                match serde_json::from_str::<Config>(&config_str) {
                    Ok(mut config) => {
                        config.data_dir = data_dir;
                        config.apply_env_keys();
                        return Ok(config);
                    }
                    Err(e) => {
                        // keep the broken file around instead of silently overwriting it
                        let backup = data_dir.join("config.json.bak");
                        warn!(error = %e, backup = %backup.display(), "failed to parse config.json, restoring defaults");
                        std::fs::copy(&config_path, &backup)
                            .context("Failed to back up config.json")?;
                    }
                }
            }
        }

        let mut config = Self::default_config(data_dir);
        config.save()?;
        config.apply_env_keys();

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = self.data_dir.join("config.json");
        let json_str = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(&config_path, json_str)
            .context("Failed to write config.json")?;
        Ok(())
    }

    fn default_config(data_dir: PathBuf) -> Self {
        let mut providers = HashMap::new();

        providers.insert("gemini".to_string(), ProviderConfig {
            default_model: "gemini-1.5-flash".to_string(),
            host: None,
            api_key: None,
            temperature: Some(0.9),
        });

        providers.insert("openai".to_string(), ProviderConfig {
            default_model: "gpt-4o-mini".to_string(),
            host: None,
            api_key: None,
            temperature: Some(0.8),
        });

        providers.insert("ollama".to_string(), ProviderConfig {
            default_model: "qwen2.5".to_string(),
            host: Some("http://localhost:11434".to_string()),
            api_key: None,
            temperature: None,
        });

        Config {
            data_dir,
            default_provider: "gemini".to_string(),
            providers,
            relationship: RelationshipConfig::default(),
            scheduler: SchedulerConfig::default(),
            log_level: default_log_level(),
        }
    }

    /// Fill empty API keys from the environment
    fn apply_env_keys(&mut self) {
        for (name, var) in [("gemini", "GEMINI_API_KEY"), ("openai", "OPENAI_API_KEY")] {
            if let Some(provider) = self.providers.get_mut(name) {
                if provider.api_key.as_ref().map_or(true, |key| key.is_empty()) {
                    provider.api_key = std::env::var(var).ok();
                }
            }
        }
    }

    pub fn get_provider(&self, provider_name: &str) -> Option<&ProviderConfig> {
        self.providers.get(provider_name)
    }

    pub fn get_ai_config(&self, provider: Option<String>, model: Option<String>) -> Result<AIConfig> {
        let provider_name = provider.as_deref().unwrap_or(&self.default_provider);
        let provider_config = self.get_provider(provider_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown provider: {}", provider_name))?;

        let ai_provider: AIProvider = provider_name.parse()?;
        let model_name = model.unwrap_or_else(|| provider_config.default_model.clone());

        Ok(AIConfig {
            provider: ai_provider,
            model: model_name,
            api_key: provider_config.api_key.clone(),
            base_url: provider_config.host.clone(),
            max_tokens: Some(1024),
            temperature: provider_config.temperature,
        })
    }

    pub fn database_file(&self) -> PathBuf {
        self.data_dir.join("companion.db")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(Some(dir.path().to_path_buf())).unwrap();

        assert!(dir.path().join("config.json").exists());
        assert_eq!(config.default_provider, "gemini");
        assert_eq!(config.relationship.diary_capacity, 50);
        assert_eq!(config.relationship.history_capacity, 100);
        assert!(!config.relationship.score_companion_messages);
        assert_eq!(config.database_file(), dir.path().join("companion.db"));
        assert_eq!(config.log_dir(), dir.path().join("logs"));
    }

    #[test]
    fn test_reload_keeps_edits() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new(Some(dir.path().to_path_buf())).unwrap();
        config.relationship.diary_capacity = 20;
        config.default_provider = "ollama".to_string();
        config.save().unwrap();

        let reloaded = Config::new(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(reloaded.relationship.diary_capacity, 20);
        assert_eq!(reloaded.default_provider, "ollama");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"default_provider": "ollama", "providers": {"ollama": {"default_model": "llama3"}},
                "relationship": {"milestone_interval": 10}}"#,
        )
        .unwrap();

        let config = Config::new(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(config.relationship.milestone_interval, 10);
        assert_eq!(config.relationship.diary_capacity, 50);
        assert_eq!(config.scheduler.tick_secs, 60);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_broken_file_is_backed_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{ not json").unwrap();

        let config = Config::new(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(config.default_provider, "gemini");
        assert!(dir.path().join("config.json.bak").exists());
    }

    #[test]
    fn test_ai_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(Some(dir.path().to_path_buf())).unwrap();

        let ai = config.get_ai_config(Some("ollama".to_string()), None).unwrap();
        assert_eq!(ai.provider, AIProvider::Ollama);
        assert_eq!(ai.model, "qwen2.5");

        let ai = config.get_ai_config(None, Some("gemini-pro".to_string())).unwrap();
        assert_eq!(ai.provider, AIProvider::Gemini);
        assert_eq!(ai.model, "gemini-pro");

        assert!(config.get_ai_config(Some("nope".to_string()), None).is_err());
    }

    #[test]
    fn test_reminder_and_offset() {
        let mut relationship = RelationshipConfig::default();
        assert_eq!(relationship.reminder_after(), Some(chrono::Duration::hours(24)));
        relationship.reminder_after_hours = 0;
        assert_eq!(relationship.reminder_after(), None);

        relationship.utc_offset_minutes = Some(420);
        assert_eq!(relationship.utc_offset().local_minus_utc(), 7 * 3600);
    }
}
