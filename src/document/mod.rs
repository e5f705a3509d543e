mod pdf;
mod splitter;

pub use pdf::{PageText, PdfDocument};
pub use splitter::{CharacterTextSplitter, TextChunk};

#[cfg(test)]
pub(crate) use pdf::test_support;
