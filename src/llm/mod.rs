pub mod retrieval_qa;
pub mod vector_store;

pub use retrieval_qa::{QaAnswer, RetrievalQa, SourceDocument};
pub use vector_store::{ScoredChunk, VectorIndex};
