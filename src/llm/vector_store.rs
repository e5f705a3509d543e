use crate::document::TextChunk;
use crate::providers::traits::CompletionProvider;
use anyhow::{Error, Result};
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk: TextChunk,
    pub score: f32,
}

#[derive(Debug, Clone)]
struct IndexedChunk {
    chunk: TextChunk,
    embedding: Vec<f32>,
}

/// In-memory embedding index over one filing's chunks.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<IndexedChunk>,
}

impl VectorIndex {
    pub async fn build(
        chunks: Vec<TextChunk>,
        provider: &dyn CompletionProvider,
        batch_size: usize,
    ) -> Result<Self> {
        if chunks.is_empty() {
            return Ok(Self::default());
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let batch_size = batch_size.max(1);

        let results = futures::future::join_all(
            texts
                .chunks(batch_size)
                .map(|batch| provider.generate_embeddings(batch)),
        )
        .await;

        let mut embeddings = Vec::with_capacity(texts.len());
        for result in results {
            embeddings.extend(result.map_err(|e| Error::msg(format!("Failed to embed chunks: {}", e)))?);
        }
        if embeddings.len() != chunks.len() {
            return Err(Error::msg(format!(
                "Embedded {} of {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
            .collect::<Vec<_>>();

        log::info!("Indexed {} chunks", entries.len());
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top `limit` chunks by cosine similarity; earlier chunks win ties.
    pub fn search(&self, query: &[f32], limit: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(query, &entry.embedding),
            })
            .collect();

        // sort_by is stable, so equal scores keep document order
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(limit);
        scored
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::local::{hashed_embedding, LocalProvider};

    fn chunk(index: usize, page: u32, text: &str) -> TextChunk {
        TextChunk {
            text: text.to_string(),
            page_number: page,
            chunk_index: index,
        }
    }

    #[test]
    fn cosine_handles_degenerate_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]) - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn most_similar_chunk_comes_first() {
        let chunks = vec![
            chunk(0, 1, "Hewlett Packard Enterprise Company quarterly report cover"),
            chunk(1, 3, "Total current assets 19,896 Total current liabilities 20,066"),
            chunk(2, 4, "Net cash provided by operating activities 1,289"),
        ];
        let index = VectorIndex::build(chunks, &LocalProvider::new(), 2).await.unwrap();
        assert_eq!(index.len(), 3);

        let results = index.search(&hashed_embedding("total current liabilities"), 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.page_number, 3);
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn empty_index_returns_nothing() {
        let index = VectorIndex::build(Vec::new(), &LocalProvider::new(), 20).await.unwrap();
        assert!(index.is_empty());
        assert!(index.search(&hashed_embedding("revenue"), 4).is_empty());
    }

    #[tokio::test]
    async fn ties_keep_document_order() {
        let chunks = vec![chunk(0, 1, "alpha"), chunk(1, 2, "alpha"), chunk(2, 3, "beta")];
        let index = VectorIndex::build(chunks, &LocalProvider::new(), 20).await.unwrap();
        let results = index.search(&hashed_embedding("alpha"), 3);
        assert_eq!(results[0].chunk.chunk_index, 0);
        assert_eq!(results[1].chunk.chunk_index, 1);
    }
}
