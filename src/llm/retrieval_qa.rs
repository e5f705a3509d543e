use crate::document::TextChunk;
use crate::error::AppError;
use crate::llm::vector_store::VectorIndex;
use crate::providers::traits::CompletionProvider;
use serde::Serialize;
use std::sync::Arc;

const STUFF_PROMPT: &str = "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.";

#[derive(Debug, Clone, Serialize)]
pub struct SourceDocument {
    pub page: u32,
    pub text: String,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct QaAnswer {
    pub question: String,
    pub answer: String,
    pub sources: Vec<SourceDocument>,
}

/// Answers questions by "stuffing" the best matching chunks into a single
/// prompt.
#[derive(Clone)]
pub struct RetrievalQa {
    index: VectorIndex,
    provider: Arc<dyn CompletionProvider>,
    top_k: usize,
}

impl RetrievalQa {
    pub async fn build(
        chunks: Vec<TextChunk>,
        provider: Arc<dyn CompletionProvider>,
        top_k: usize,
        batch_size: usize,
    ) -> Result<Self, AppError> {
        let index = VectorIndex::build(chunks, provider.as_ref(), batch_size).await?;
        Ok(Self::new(index, provider, top_k))
    }

    pub fn new(index: VectorIndex, provider: Arc<dyn CompletionProvider>, top_k: usize) -> Self {
        Self {
            index,
            provider,
            top_k: top_k.max(1),
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }

    pub async fn ask(&self, question: &str) -> Result<QaAnswer, AppError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::EmptyQuery);
        }

        let embedding = self.provider.generate_embedding(question).await?;
        let hits = self.index.search(&embedding, self.top_k);
        log::info!("Retrieved {} chunk(s) for question '{}'", hits.len(), question);

        let context = hits
            .iter()
            .map(|hit| hit.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let prompt = build_prompt(&context, question);

        let answer = self.provider.complete(&prompt).await?;

        Ok(QaAnswer {
            question: question.to_string(),
            answer: answer.trim().to_string(),
            sources: hits
                .into_iter()
                .map(|hit| SourceDocument {
                    page: hit.chunk.page_number,
                    text: hit.chunk.text,
                    score: hit.score,
                })
                .collect(),
        })
    }
}

pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "{}\n\n{}\n\nQuestion: {}\nHelpful Answer:",
        STUFF_PROMPT, context, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{CharacterTextSplitter, PdfDocument};
    use crate::document::test_support::sample_filing_pdf;
    use crate::providers::LocalProvider;
    use anyhow::Result;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Clone, Default)]
    struct RecordingProvider {
        prompts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl CompletionProvider for RecordingProvider {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().push(prompt.to_string());
            Ok("  recorded answer \n".to_string())
        }

        async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
            Ok(crate::providers::local::hashed_embedding(text))
        }

        async fn get_model_info(&self) -> Result<String> {
            Ok("recording".to_string())
        }

        fn get_system_message(&self) -> String {
            String::new()
        }

        fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync> {
            Box::new(self.clone())
        }
    }

    async fn sample_qa(provider: Arc<dyn CompletionProvider>) -> RetrievalQa {
        let bytes = sample_filing_pdf();
        let document = PdfDocument::from_bytes(&bytes).unwrap();
        let splitter = CharacterTextSplitter::new("\n", 2000, 200).unwrap();
        RetrievalQa::build(splitter.split_pages(document.pages()), provider, 4, 20)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn empty_question_is_rejected() {
        let qa = sample_qa(Arc::new(LocalProvider::new())).await;
        assert!(matches!(qa.ask("   ").await, Err(AppError::EmptyQuery)));
    }

    #[tokio::test]
    async fn prompt_stuffs_retrieved_context() {
        let provider = RecordingProvider::default();
        let prompts = provider.prompts.clone();
        let qa = sample_qa(Arc::new(provider)).await;

        let answer = qa.ask("What was net cash provided by operating activities?").await.unwrap();
        assert_eq!(answer.answer, "recorded answer");
        assert!(!answer.sources.is_empty());
        assert!(answer.sources.len() <= 4);
        assert_eq!(answer.sources[0].page, 4);

        let prompts = prompts.lock();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with("Use the following pieces of context"));
        assert!(prompts[0].contains("Net cash provided by operating activities 1,289 2,721"));
        assert!(prompts[0].ends_with(
            "Question: What was net cash provided by operating activities?\nHelpful Answer:"
        ));
    }

    #[tokio::test]
    async fn local_provider_answers_from_the_filing() {
        let qa = sample_qa(Arc::new(LocalProvider::new())).await;
        assert_eq!(qa.chunk_count(), 5);
        let answer = qa.ask("What were total current liabilities?").await.unwrap();
        assert_eq!(answer.answer, "Total current liabilities 20,066 23,042");
        assert_eq!(answer.sources[0].page, 3);
    }

    #[tokio::test]
    async fn empty_index_still_answers() {
        let qa = RetrievalQa::new(VectorIndex::default(), Arc::new(LocalProvider::new()), 4);
        let answer = qa.ask("What is the revenue?").await.unwrap();
        assert!(answer.sources.is_empty());
        assert_eq!(answer.answer, "I don't know.");
    }
}
