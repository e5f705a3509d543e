use crate::config::ProviderConfig;
use crate::providers::traits::CompletionProvider;
use anyhow::{anyhow, Result};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
        CreateEmbeddingRequestArgs, EmbeddingInput,
    },
    Client,
};
use async_trait::async_trait;

pub const DEFAULT_SYSTEM_MESSAGE: &str =
    "You are a financial analyst answering questions about SEC Form 10-K and 10-Q filings.";

#[derive(Clone)]
pub struct OpenAIProvider {
    system_message: String,
    client: Client<OpenAIConfig>,
    chat_model: String,
    embedding_model: String,
    temperature: f32,
}

impl OpenAIProvider {
    pub fn new(api_key: String, system_message: String, config: &ProviderConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(api_url) = &config.api_url {
            openai_config = openai_config.with_api_base(api_url);
        }

        Self {
            system_message,
            client: Client::with_config(openai_config),
            chat_model: config.chat_model.clone(),
            embedding_model: config.embedding_model.clone(),
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.chat_model)
            .temperature(self.temperature)
            .messages(vec![
                ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(self.system_message.clone())
                        .build()?,
                ),
                ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(prompt.to_string())
                        .build()?,
                ),
            ])
            .build()?;

        let response = self.client.chat().create(request).await?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow!("No response content"))
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.embedding_model)
            .input(EmbeddingInput::String(text.to_string()))
            .build()?;

        let response = self.client.embeddings().create(request).await?;

        if let Some(embedding) = response.data.into_iter().next() {
            Ok(embedding.embedding)
        } else {
            Err(anyhow!("No embedding returned from OpenAI"))
        }
    }

    async fn generate_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.embedding_model)
            .input(EmbeddingInput::StringArray(texts.to_vec()))
            .build()?;

        let response = self.client.embeddings().create(request).await?;
        if response.data.len() != texts.len() {
            return Err(anyhow!(
                "Expected {} embeddings from OpenAI, got {}",
                texts.len(),
                response.data.len()
            ));
        }

        let mut data = response.data;
        data.sort_by_key(|embedding| embedding.index);
        Ok(data.into_iter().map(|embedding| embedding.embedding).collect())
    }

    async fn get_model_info(&self) -> Result<String> {
        Ok(format!("{} + {}", self.chat_model, self.embedding_model))
    }

    fn get_system_message(&self) -> String {
        self.system_message.clone()
    }

    fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync> {
        Box::new(self.clone())
    }
}
