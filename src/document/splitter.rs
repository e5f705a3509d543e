use crate::document::PageText;
use crate::error::AppError;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextChunk {
    pub text: String,
    pub page_number: u32,
    pub chunk_index: usize,
}

/// Splits on a single separator and greedily re-joins the pieces into
/// chunks of at most `chunk_size` characters, carrying up to
/// `chunk_overlap` characters of trailing pieces into the next chunk.
#[derive(Debug, Clone)]
pub struct CharacterTextSplitter {
    separator: String,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl CharacterTextSplitter {
    pub fn new(separator: &str, chunk_size: usize, chunk_overlap: usize) -> Result<Self, AppError> {
        if chunk_size == 0 {
            return Err(AppError::Config("chunk size must be positive".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(AppError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            separator: separator.to_string(),
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        let pieces: Vec<&str> = if self.separator.is_empty() {
            vec![text]
        } else {
            text.split(self.separator.as_str())
                .filter(|piece| !piece.is_empty())
                .collect()
        };
        self.merge_pieces(&pieces)
    }

    /// Chunks every page, numbering chunks across the whole document.
    pub fn split_pages(&self, pages: &[PageText]) -> Vec<TextChunk> {
        let mut chunks = Vec::new();
        for page in pages {
            for text in self.split_text(&page.text) {
                chunks.push(TextChunk {
                    text,
                    page_number: page.number,
                    chunk_index: chunks.len(),
                });
            }
        }
        chunks
    }

    fn merge_pieces(&self, pieces: &[&str]) -> Vec<String> {
        let separator_len = self.separator.chars().count();
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut total = 0usize;

        for piece in pieces {
            let piece_len = piece.chars().count();
            let joiner = if current.is_empty() { 0 } else { separator_len };

            if total + piece_len + joiner > self.chunk_size {
                if total > self.chunk_size {
                    log::warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total,
                        self.chunk_size
                    );
                }
                if !current.is_empty() {
                    if let Some(chunk) = self.join(&current) {
                        chunks.push(chunk);
                    }
                    // Drop leading pieces until what remains fits as overlap
                    // and leaves room for the incoming piece.
                    while total > self.chunk_overlap
                        || (total > 0
                            && total
                                + piece_len
                                + if current.is_empty() { 0 } else { separator_len }
                                > self.chunk_size)
                    {
                        let first_len = current[0].chars().count();
                        total -= first_len + if current.len() > 1 { separator_len } else { 0 };
                        current.remove(0);
                    }
                }
            }

            current.push(piece);
            total += piece_len + if current.len() > 1 { separator_len } else { 0 };
        }

        if let Some(chunk) = self.join(&current) {
            chunks.push(chunk);
        }
        chunks
    }

    fn join(&self, pieces: &[&str]) -> Option<String> {
        let joined = pieces.join(&self.separator);
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_overlap_not_smaller_than_chunk_size() {
        assert!(CharacterTextSplitter::new("\n", 10, 10).is_err());
        assert!(CharacterTextSplitter::new("\n", 0, 0).is_err());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let splitter = CharacterTextSplitter::new("\n", 2000, 200).unwrap();
        let chunks = splitter.split_text("line one\nline two\n\nline three\n");
        assert_eq!(chunks, vec!["line one\nline two\nline three"]);
    }

    #[test]
    fn merges_pieces_up_to_chunk_size_with_overlap() {
        let splitter = CharacterTextSplitter::new("\n", 11, 5).unwrap();
        let chunks = splitter.split_text("aaaa\nbbbb\ncccc\ndddd");
        assert_eq!(chunks, vec!["aaaa\nbbbb", "bbbb\ncccc", "cccc\ndddd"]);
    }

    #[test]
    fn chunks_respect_size_unless_a_piece_is_oversized() {
        let text = (0..200)
            .map(|i| format!("Row {} of the consolidated statement", i))
            .collect::<Vec<_>>()
            .join("\n");
        let splitter = CharacterTextSplitter::new("\n", 300, 60).unwrap();
        let chunks = splitter.split_text(&text);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 300));

        let long_line = "x".repeat(50);
        let splitter = CharacterTextSplitter::new("\n", 20, 5).unwrap();
        let chunks = splitter.split_text(&format!("short\n{}\ntail", long_line));
        assert!(chunks.contains(&long_line));
    }

    #[test]
    fn consecutive_chunks_share_trailing_lines() {
        let text = (0..40).map(|i| format!("line-{:02}", i)).collect::<Vec<_>>().join("\n");
        let splitter = CharacterTextSplitter::new("\n", 80, 20).unwrap();
        let chunks = splitter.split_text(&text);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let last_line_of_first = pair[0].lines().last().unwrap();
            assert!(pair[1].lines().any(|line| line == last_line_of_first));
            let first_line_of_second = pair[1].lines().next().unwrap();
            assert!(pair[0].lines().any(|line| line == first_line_of_second));
        }
    }

    #[test]
    fn split_pages_keeps_page_numbers() {
        let pages = vec![
            PageText { number: 1, text: "cover page".to_string() },
            PageText { number: 2, text: String::new() },
            PageText { number: 3, text: "balance sheet".to_string() },
        ];
        let splitter = CharacterTextSplitter::new("\n", 2000, 200).unwrap();
        let chunks = splitter.split_pages(&pages);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].page_number, 1);
        assert_eq!(chunks[1].page_number, 3);
        assert_eq!(chunks[1].chunk_index, 1);
    }
}
