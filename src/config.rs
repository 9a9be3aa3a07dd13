//! Explicit exam configuration.
//!
//! Nothing is persisted implicitly: callers decide when to [`ExamConfig::load`] and [`ExamConfig::save`].

use smart_default::SmartDefault;

/// Problems with user input, found before any provider is contacted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("API key is required")]
    MissingApiKey,
    #[error("Topic is required")]
    MissingTopic,
}

#[derive(Debug, Clone, PartialEq, Eq, SmartDefault)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExamConfig {
    pub topic: String,
    pub api_key: String,
    #[default = 10]
    pub mcq_count: u32,
    #[default = 5]
    pub short_answer_count: u32,
    /// Model the exam body is requested from
    #[default = "gemini-2.5-flash"]
    pub model: String,
    #[default = "gemma-3-1b-it"]
    pub title_model: String,
}

impl ExamConfig {
    pub fn new(topic: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Question counts are unsigned, so only the key and the topic can be wrong
    pub fn validate(&self) -> Result<(), InputError> {
        if self.api_key.trim().is_empty() {
            return Err(InputError::MissingApiKey);
        }
        if self.topic.trim().is_empty() {
            return Err(InputError::MissingTopic);
        }
        Ok(())
    }

    pub fn total_questions(&self) -> u32 {
        self.mcq_count + self.short_answer_count
    }
}

#[cfg(feature = "serde")]
pub use persistence::ConfigError;

#[cfg(feature = "serde")]
mod persistence {
    use std::{fs, path::Path};

    use tracing::debug;

    use super::ExamConfig;
    use crate::gen::html::Style;

    #[derive(Debug, derive_more::From, thiserror::Error)]
    pub enum ConfigError {
        #[error("Could not access config file: {}", .0)]
        Io(std::io::Error),
        #[error("Config file is malformed: {}", .0)]
        Json(serde_json::Error),
    }

    fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        let content = fs::read_to_string(path)?;
        debug!("Read {} bytes of json from {}", content.len(), path.display());
        Ok(serde_json::from_str(&content)?)
    }

    fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(value)?;
        fs::write(path, content)?;
        debug!("Wrote json to {}", path.display());
        Ok(())
    }

    impl ExamConfig {
        /// Missing fields fall back to their defaults
        pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
            read_json(path.as_ref())
        }

        pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
            write_json(path.as_ref(), self)
        }
    }

    impl Style {
        pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
            read_json(path.as_ref())
        }

        pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
            write_json(path.as_ref(), self)
        }
    }
}
