pub mod local;
pub mod openai;
pub mod traits;

use crate::config::AppConfig;
use crate::error::AppError;
use std::str::FromStr;
use std::sync::Arc;

pub use local::LocalProvider;
pub use openai::{OpenAIProvider, DEFAULT_SYSTEM_MESSAGE};
pub use traits::CompletionProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    OpenAI,
    Local,
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAI),
            "local" | "offline" => Ok(ProviderKind::Local),
            other => Err(AppError::Config(format!(
                "Unknown provider '{}'. Available providers: openai, local",
                other
            ))),
        }
    }
}

/// Builds the provider used for embeddings and answers. A missing OpenAI
/// key is not fatal: extraction still works, only Q&A is disabled.
pub fn create_provider(
    kind: ProviderKind,
    config: &AppConfig,
) -> Result<Arc<dyn CompletionProvider>, AppError> {
    match kind {
        ProviderKind::Local => Ok(Arc::new(LocalProvider::new())),
        ProviderKind::OpenAI => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                AppError::QaUnavailable(
                    "OPENAI_API_KEY is not set; provide it via --api-key or the environment"
                        .to_string(),
                )
            })?;
            Ok(Arc::new(OpenAIProvider::new(
                api_key,
                DEFAULT_SYSTEM_MESSAGE.to_string(),
                &config.provider,
            )))
        }
    }
}
