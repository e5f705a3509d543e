use crate::error::AppError;
use lopdf::Document;
use serde::Serialize;

const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Clone, Serialize)]
pub struct PageText {
    /// 1-based, as printed in the filing's page footer
    pub number: u32,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct PdfDocument {
    pages: Vec<PageText>,
}

impl PdfDocument {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AppError> {
        if bytes.is_empty() {
            return Err(AppError::UnsupportedFormat("uploaded file is empty".to_string()));
        }
        if !looks_like_pdf(bytes) {
            return Err(AppError::UnsupportedFormat("file is not a PDF document".to_string()));
        }

        let document = Document::load_mem(bytes)?;
        let mut pages = Vec::new();
        for number in document.get_pages().keys().copied() {
            let text = match document.extract_text(&[number]) {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("Failed to extract text from page {}: {}", number, e);
                    String::new()
                }
            };
            pages.push(PageText { number, text });
        }

        if pages.iter().all(|page| page.text.trim().is_empty()) {
            log::info!("lopdf produced no text, falling back to pdf-extract");
            let text = pdf_extract::extract_text_from_mem(bytes)
                .map_err(|e| AppError::Extraction(e.to_string()))?;
            if text.trim().is_empty() {
                return Err(AppError::Extraction(
                    "document contains no extractable text".to_string(),
                ));
            }
            pages = vec![PageText { number: 1, text }];
        }

        log::info!("Extracted text from {} page(s)", pages.len());
        Ok(Self { pages })
    }

    pub fn from_pages(pages: Vec<PageText>) -> Self {
        Self { pages }
    }

    pub fn pages(&self) -> &[PageText] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn full_text(&self) -> String {
        let mut text = String::new();
        for page in &self.pages {
            text.push_str(&page.text);
            if !page.text.ends_with('\n') {
                text.push('\n');
            }
        }
        text
    }
}

fn looks_like_pdf(bytes: &[u8]) -> bool {
    // Some generators emit a few bytes of junk before the header
    let head = &bytes[..bytes.len().min(1024)];
    head.windows(PDF_MAGIC.len()).any(|window| window == PDF_MAGIC)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn rejects_empty_and_non_pdf_input() {
        assert!(matches!(
            PdfDocument::from_bytes(b""),
            Err(AppError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            PdfDocument::from_bytes(b"PK\x03\x04 definitely a zip"),
            Err(AppError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn truncated_pdf_is_an_extraction_error() {
        let result = PdfDocument::from_bytes(b"%PDF-1.5\n%garbage");
        assert!(matches!(result, Err(AppError::Extraction(_))));
    }

    #[test]
    fn textless_pdf_falls_through_to_pdf_extract() {
        let bytes = build_pdf(&[&[]]);
        match PdfDocument::from_bytes(&bytes) {
            Err(AppError::Extraction(message)) => {
                assert_eq!(message, "document contains no extractable text")
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(document) => panic!("expected no text, got {} page(s)", document.page_count()),
        }
    }

    #[test]
    fn extracts_text_per_page() {
        let bytes = sample_filing_pdf();
        let document = PdfDocument::from_bytes(&bytes).unwrap();

        assert_eq!(document.page_count(), 5);
        assert_eq!(document.pages()[0].number, 1);
        assert!(document.pages()[0].text.contains("HEWLETT PACKARD ENTERPRISE COMPANY"));
        assert!(document.pages()[2].text.contains("Total current assets"));

        let full = document.full_text();
        assert!(full.contains("FORM 10-Q"));
        assert!(full.contains("Net cash used in investing activities"));
    }

    #[test]
    fn full_text_separates_pages() {
        let document = PdfDocument::from_pages(vec![
            PageText { number: 1, text: "first".to_string() },
            PageText { number: 2, text: "second\n".to_string() },
        ]);
        assert_eq!(document.full_text(), "first\nsecond\n");
    }
}
