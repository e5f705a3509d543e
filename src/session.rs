use crate::config::AppConfig;
use crate::document::{CharacterTextSplitter, PdfDocument};
use crate::error::AppError;
use crate::filing::FilingReport;
use crate::llm::{QaAnswer, RetrievalQa};
use crate::providers::traits::CompletionProvider;
use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use uuid::Uuid;

/// Everything known about one upload. Lives only in memory.
pub struct FilingSession {
    pub id: Uuid,
    pub file_name: String,
    pub report: FilingReport,
    pub qa: Option<RetrievalQa>,
    pub qa_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FilingSession {
    pub fn qa_enabled(&self) -> bool {
        self.qa.is_some()
    }

    pub async fn ask(&self, question: &str) -> Result<QaAnswer, AppError> {
        match &self.qa {
            Some(qa) => qa.ask(question).await,
            None => Err(AppError::QaUnavailable(
                self.qa_error
                    .clone()
                    .unwrap_or_else(|| "no index was built for this document".to_string()),
            )),
        }
    }
}

pub struct SessionStore {
    sessions: Mutex<LruCache<Uuid, Arc<FilingSession>>>,
}

impl SessionStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn insert(&self, session: FilingSession) -> Arc<FilingSession> {
        let session = Arc::new(session);
        if let Some((evicted, _)) = self.sessions.lock().push(session.id, session.clone()) {
            if evicted != session.id {
                log::info!("Evicted filing session {}", evicted);
            }
        }
        session
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<FilingSession>> {
        self.sessions.lock().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Runs the upload pipeline: text and tables first, then the Q&A index.
pub struct FilingAnalyzer {
    config: AppConfig,
    provider: Option<Arc<dyn CompletionProvider>>,
    qa_disabled_reason: Option<String>,
}

impl FilingAnalyzer {
    pub fn new(config: AppConfig, provider: Result<Arc<dyn CompletionProvider>, AppError>) -> Self {
        let (provider, qa_disabled_reason) = match provider {
            Ok(provider) => (Some(provider), None),
            Err(e) => {
                log::warn!("Question answering disabled: {}", e);
                (None, Some(e.to_string()))
            }
        };
        Self {
            config,
            provider,
            qa_disabled_reason,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn analyze_upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<FilingSession, AppError> {
        log::info!("Analyzing upload {} ({} bytes)", file_name, bytes.len());

        let name = file_name.to_string();
        let (document, report) = tokio::task::spawn_blocking(move || {
            let document = PdfDocument::from_bytes(&bytes)?;
            let report = FilingReport::from_document(&name, &document);
            Ok::<_, AppError>((document, report))
        })
        .await
        .map_err(|e| AppError::Extraction(format!("extraction task failed: {}", e)))??;

        let (qa, qa_error) = match &self.provider {
            Some(provider) => match self.build_qa(&document, provider.clone()).await {
                Ok(qa) => (Some(qa), None),
                Err(e) => {
                    log::error!("An error occurred while building the Q&A index: {}", e);
                    (None, Some(e.to_string()))
                }
            },
            None => (None, self.qa_disabled_reason.clone()),
        };

        Ok(FilingSession {
            id: Uuid::new_v4(),
            file_name: file_name.to_string(),
            report,
            qa,
            qa_error,
            created_at: Utc::now(),
        })
    }

    async fn build_qa(
        &self,
        document: &PdfDocument,
        provider: Arc<dyn CompletionProvider>,
    ) -> Result<RetrievalQa, AppError> {
        let splitter =
            CharacterTextSplitter::new("\n", self.config.chunk_size, self.config.chunk_overlap)?;
        let chunks = splitter.split_pages(document.pages());
        RetrievalQa::build(
            chunks,
            provider,
            self.config.top_k,
            self.config.provider.embedding_batch_size,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::test_support::{build_pdf, sample_filing_pdf};
    use crate::providers::LocalProvider;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    #[derive(Clone)]
    struct FailingProvider;

    #[async_trait]
    impl CompletionProvider for FailingProvider {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(anyhow!("service unavailable"))
        }

        async fn generate_embedding(&self, _text: &str) -> Result<Vec<f32>> {
            Err(anyhow!("service unavailable"))
        }

        async fn get_model_info(&self) -> Result<String> {
            Err(anyhow!("service unavailable"))
        }

        fn get_system_message(&self) -> String {
            String::new()
        }

        fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync> {
            Box::new(self.clone())
        }
    }

    fn local_analyzer() -> FilingAnalyzer {
        FilingAnalyzer::new(AppConfig::default(), Ok(Arc::new(LocalProvider::new())))
    }

    #[tokio::test]
    async fn upload_builds_report_and_index() {
        let session = local_analyzer()
            .analyze_upload("hpe.pdf", sample_filing_pdf())
            .await
            .unwrap();
        assert!(!session.report.company_display().is_empty());
        assert_eq!(session.file_name, "hpe.pdf");
        assert_eq!(session.report.file_name, "hpe.pdf");
        assert!(session.qa_enabled());
        assert!(session.qa_error.is_none());

        let answer = session.ask("total current assets").await.unwrap();
        assert_eq!(answer.answer, "Total current assets 19,896 20,689");
    }

    #[tokio::test]
    async fn non_pdf_upload_fails() {
        let result = local_analyzer().analyze_upload("notes.txt", b"hello".to_vec()).await;
        assert!(matches!(result, Err(AppError::UnsupportedFormat(_))));
    }

    #[tokio::test]
    async fn blank_pdf_upload_is_an_extraction_error() {
        let result = local_analyzer().analyze_upload("blank.pdf", build_pdf(&[&[]])).await;
        assert!(matches!(
            result,
            Err(AppError::Extraction(ref message)) if message == "document contains no extractable text"
        ));
    }

    #[tokio::test]
    async fn provider_failure_keeps_extracted_fields() {
        let analyzer = FilingAnalyzer::new(AppConfig::default(), Ok(Arc::new(FailingProvider)));
        let session = analyzer.analyze_upload("hpe.pdf", sample_filing_pdf()).await.unwrap();

        assert_eq!(session.report.statements.len(), 3);
        assert!(!session.qa_enabled());
        assert!(session.qa_error.as_deref().unwrap().contains("service unavailable"));
        assert!(matches!(session.ask("revenue?").await, Err(AppError::QaUnavailable(_))));
    }

    #[tokio::test]
    async fn missing_provider_reports_reason() {
        let analyzer = FilingAnalyzer::new(
            AppConfig::default(),
            Err(AppError::QaUnavailable("OPENAI_API_KEY is not set".to_string())),
        );
        let session = analyzer.analyze_upload("hpe.pdf", sample_filing_pdf()).await.unwrap();
        assert!(session.qa_error.as_deref().unwrap().contains("OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn store_evicts_least_recently_used() {
        let analyzer = local_analyzer();
        let store = SessionStore::new(2);
        let first = store.insert(analyzer.analyze_upload("a.pdf", sample_filing_pdf()).await.unwrap());
        let second = store.insert(analyzer.analyze_upload("b.pdf", sample_filing_pdf()).await.unwrap());

        // touch the first so the second becomes least recently used
        assert!(store.get(&first.id).is_some());
        let third = store.insert(analyzer.analyze_upload("c.pdf", sample_filing_pdf()).await.unwrap());

        assert_eq!(store.len(), 2);
        assert!(store.get(&first.id).is_some());
        assert!(store.get(&second.id).is_none());
        assert!(store.get(&third.id).is_some());
    }
}
