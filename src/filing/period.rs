use crate::filing::title_case;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt;

lazy_static! {
    // Matched against lower-cased text.
    static ref PERIOD_ENDED: Regex = Regex::new(
        r"for\s+the\s+(?:(?:quarterly|fiscal)\s+period|(fiscal)\s+year)\s+ended:?\s*([a-z]+)\s+(\d{1,2}),\s*(\d{4})"
    )
    .expect("period pattern");
    static ref FORM_MARKER: Regex = Regex::new(r"(?i)\bform\s+10-?(k|q)\b").expect("form pattern");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PeriodKind {
    Quarterly,
    Annual,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportingPeriod {
    pub phrase: String,
    pub kind: PeriodKind,
    pub ended_on: NaiveDate,
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.phrase)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormType {
    #[serde(rename = "10-K")]
    TenK,
    #[serde(rename = "10-Q")]
    TenQ,
    Unknown,
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormType::TenK => write!(f, "Form 10-K (Annual Report)"),
            FormType::TenQ => write!(f, "Form 10-Q (Quarterly Report)"),
            FormType::Unknown => write!(f, "Unknown form type"),
        }
    }
}

/// First "for the ... period/year ended <date>" phrase in the filing.
pub fn extract_period(text: &str) -> Option<ReportingPeriod> {
    let lowered = text.to_lowercase();
    for capture in PERIOD_ENDED.captures_iter(&lowered) {
        let (Some(whole), Some(month), Some(day), Some(year)) =
            (capture.get(0), capture.get(2), capture.get(3), capture.get(4))
        else {
            continue;
        };
        let Some(ended_on) = parse_date(month.as_str(), day.as_str(), year.as_str()) else {
            log::debug!("Skipping unparseable period date in '{}'", whole.as_str());
            continue;
        };
        let kind = if capture.get(1).is_some() {
            PeriodKind::Annual
        } else {
            PeriodKind::Quarterly
        };
        let phrase = whole.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
        return Some(ReportingPeriod {
            phrase: title_case(&phrase),
            kind,
            ended_on,
        });
    }
    None
}

pub fn detect_form_type(text: &str) -> FormType {
    match FORM_MARKER
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
        .as_deref()
    {
        Some("k") => FormType::TenK,
        Some("q") => FormType::TenQ,
        _ => FormType::Unknown,
    }
}

fn parse_date(month: &str, day: &str, year: &str) -> Option<NaiveDate> {
    // %B also accepts the three-letter abbreviation
    NaiveDate::parse_from_str(&format!("{} {} {}", title_case(month), day, year), "%B %d %Y").ok()
}
