pub mod company;
pub mod period;
pub mod statements;

use crate::document::PdfDocument;
use serde::Serialize;

pub use company::{extract_company_names, primary_company_name};
pub use period::{detect_form_type, extract_period, FormType, PeriodKind, ReportingPeriod};
pub use statements::{
    extract_key_statements, ExtractedTable, FinancialStatement, StatementKind, StatementRow,
};

pub const NO_COMPANY_MESSAGE: &str = "No company names found in the document.";
pub const UNKNOWN_COMPANY: &str = "Unknown";
pub const NO_PERIOD_MESSAGE: &str = "No specific dates found in the document.";
pub const NO_TABLES_MESSAGE: &str = "No tables matching the specified keywords extracted.";

/// Key points extracted from one uploaded filing.
#[derive(Debug, Clone, Serialize)]
pub struct FilingReport {
    pub file_name: String,
    pub page_count: usize,
    pub form_type: FormType,
    pub company_name: Option<String>,
    pub company_candidates: Vec<String>,
    pub period: Option<ReportingPeriod>,
    pub statements: Vec<FinancialStatement>,
}

impl FilingReport {
    pub fn from_document(file_name: &str, document: &PdfDocument) -> Self {
        let text = document.full_text();
        let company_candidates = extract_company_names(&text);
        let company_name = primary_company_name(&company_candidates);
        let period = extract_period(&text);
        let statements = extract_key_statements(document.pages());

        log::info!(
            "Analyzed {}: company={:?}, period={:?}, statements={}",
            file_name,
            company_name,
            period.as_ref().map(|p| p.phrase.as_str()),
            statements.len()
        );

        Self {
            file_name: file_name.to_string(),
            page_count: document.page_count(),
            form_type: detect_form_type(&text),
            company_name,
            company_candidates,
            period,
            statements,
        }
    }

    pub fn company_display(&self) -> &str {
        match &self.company_name {
            Some(name) => name,
            None if self.company_candidates.is_empty() => NO_COMPANY_MESSAGE,
            None => UNKNOWN_COMPANY,
        }
    }

    pub fn period_display(&self) -> &str {
        self.period
            .as_ref()
            .map(|p| p.phrase.as_str())
            .unwrap_or(NO_PERIOD_MESSAGE)
    }
}

/// Capitalises the first letter of every run of letters and lower-cases
/// the rest, so `"10-q"` becomes `"10-Q"` and `"INC."` becomes `"Inc."`.
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                result.extend(ch.to_lowercase());
            } else {
                result.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(ch);
            previous_is_letter = false;
        }
    }
    result
}
