use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>>;

    /// One embedding per input, in input order.
    async fn generate_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.generate_embedding(text).await?);
        }
        Ok(embeddings)
    }

    async fn get_model_info(&self) -> Result<String>;

    fn get_system_message(&self) -> String;

    fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync>;
}

impl Clone for Box<dyn CompletionProvider + Send + Sync> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
