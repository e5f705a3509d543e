use crate::providers::traits::CompletionProvider;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

pub const LOCAL_EMBEDDING_DIM: usize = 256;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "by", "did", "do", "does", "for", "from", "how", "in",
    "is", "it", "of", "on", "or", "the", "to", "was", "were", "what", "when", "which", "who", "with",
];

/// Offline provider: hashed bag-of-words embeddings and extractive
/// answers picked from the prompt's context. Runs without network access.
#[derive(Clone, Default)]
pub struct LocalProvider;

impl LocalProvider {
    pub fn new() -> Self {
        Self
    }
}

fn terms(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
}

pub fn hashed_embedding(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; LOCAL_EMBEDDING_DIM];
    for term in terms(text) {
        let mut hasher = DefaultHasher::new();
        term.hash(&mut hasher);
        let bucket = (hasher.finish() % LOCAL_EMBEDDING_DIM as u64) as usize;
        vector[bucket] += 1.0;
    }
    vector
}

/// Best context line for the question at the end of a "stuff" prompt.
fn extractive_answer(prompt: &str) -> String {
    let (context, question) = match prompt.rfind("\nQuestion:") {
        Some(index) => (&prompt[..index], &prompt[index + "\nQuestion:".len()..]),
        None => (prompt, prompt),
    };
    let question = question.split("\nHelpful Answer:").next().unwrap_or(question);
    let wanted: HashSet<String> = terms(question).collect();

    let best = context
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let overlap = terms(line).collect::<HashSet<_>>().intersection(&wanted).count();
            (overlap, line)
        })
        .filter(|(overlap, _)| *overlap > 0)
        // max_by_key keeps the last maximum; reverse so earlier lines win ties
        .rev()
        .max_by_key(|(overlap, _)| *overlap);

    match best {
        Some((_, line)) => line.to_string(),
        None => "I don't know.".to_string(),
    }
}

#[async_trait]
impl CompletionProvider for LocalProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        Ok(extractive_answer(prompt))
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        Ok(hashed_embedding(text))
    }

    async fn get_model_info(&self) -> Result<String> {
        Ok("local extractive".to_string())
    }

    fn get_system_message(&self) -> String {
        String::new()
    }

    fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync> {
        Box::new(self.clone())
    }
}
