pub mod openai;

pub use openai::{OpenAIProvider, DEFAULT_SYSTEM_MESSAGE};
