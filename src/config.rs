use crate::error::AppError;
use std::env;

pub const DEFAULT_CHUNK_SIZE: usize = 2000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
pub const DEFAULT_TOP_K: usize = 4;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
pub const DEFAULT_SESSION_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub chat_model: String,
    pub embedding_model: String,
    pub api_url: Option<String>,
    pub temperature: f32,
    pub embedding_batch_size: usize,
}

impl ProviderConfig {
    pub fn from_env(provider: &str) -> Self {
        let prefix = provider.to_uppercase();

        let chat_model = env::var(format!("{}_CHAT_MODEL", prefix))
            .unwrap_or_else(|_| match provider {
                "openai" => "gpt-3.5-turbo".to_string(),
                _ => String::new(),
            });

        let embedding_model = env::var(format!("{}_EMBEDDING_MODEL", prefix))
            .unwrap_or_else(|_| match provider {
                "openai" => "text-embedding-ada-002".to_string(),
                _ => String::new(),
            });

        // Base URL override, e.g. for an OpenAI-compatible gateway
        let api_url = env::var(format!("{}_API_URL", prefix))
            .ok()
            .filter(|url| !url.trim().is_empty());

        // Answers should stay close to the filing text
        let temperature = env::var(format!("{}_TEMPERATURE", prefix))
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(0.3);

        let embedding_batch_size = env::var(format!("{}_EMBEDDING_BATCH", prefix))
            .ok()
            .and_then(|b| b.parse().ok())
            .filter(|b: &usize| *b > 0)
            .unwrap_or(20);

        Self {
            chat_model,
            embedding_model,
            api_url,
            temperature,
            embedding_batch_size,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub provider: ProviderConfig,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub max_upload_bytes: usize,
    pub session_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: ProviderConfig::from_env("openai"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            session_capacity: DEFAULT_SESSION_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Reads the configuration from the process environment. Call
    /// `dotenv().ok()` first to pick up a local `.env` file.
    pub fn from_env() -> Result<Self, AppError> {
        let config = Self {
            api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            provider: ProviderConfig::from_env("openai"),
            chunk_size: env_usize("FILING_CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            chunk_overlap: env_usize("FILING_CHUNK_OVERLAP", DEFAULT_CHUNK_OVERLAP)?,
            top_k: env_usize("FILING_TOP_K", DEFAULT_TOP_K)?,
            max_upload_bytes: env_usize("FILING_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            session_capacity: env_usize("FILING_SESSION_CAPACITY", DEFAULT_SESSION_CAPACITY)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        if api_key.is_some() {
            self.api_key = api_key;
        }
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.chunk_size == 0 {
            return Err(AppError::Config("FILING_CHUNK_SIZE must be positive".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(AppError::Config("FILING_TOP_K must be positive".to_string()));
        }
        if self.session_capacity == 0 {
            return Err(AppError::Config("FILING_SESSION_CAPACITY must be positive".to_string()));
        }
        Ok(())
    }
}

fn env_usize(key: &str, default: usize) -> Result<usize, AppError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a non-negative integer, got '{}'", key, value))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_size, 2000);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.top_k, 4);
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk_size() {
        let config = AppConfig {
            chunk_size: 100,
            chunk_overlap: 100,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn cli_api_key_overrides_only_when_given() {
        let config = AppConfig {
            api_key: Some("from-env".to_string()),
            ..AppConfig::default()
        };
        let kept = config.clone().with_api_key(None);
        assert_eq!(kept.api_key.as_deref(), Some("from-env"));
        let replaced = config.with_api_key(Some("from-cli".to_string()));
        assert_eq!(replaced.api_key.as_deref(), Some("from-cli"));
    }
}
