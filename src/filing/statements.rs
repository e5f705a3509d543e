use crate::document::PageText;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Rows with at least one value needed before a page counts as a table.
pub const MIN_VALUE_ROWS: usize = 3;

lazy_static! {
    static ref VALUE_TOKEN: Regex =
        Regex::new(r"^\(?\$?\(?\d(?:[\d,]*\d)?(?:\.\d+)?\)?%?\)?$").expect("value pattern");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatementKind {
    Earnings,
    BalanceSheet,
    CashFlows,
}

impl StatementKind {
    pub const ALL: [StatementKind; 3] = [
        StatementKind::Earnings,
        StatementKind::BalanceSheet,
        StatementKind::CashFlows,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            StatementKind::Earnings => "Consolidated Statements of Earnings",
            StatementKind::BalanceSheet => "Consolidated Balance Sheets",
            StatementKind::CashFlows => "Consolidated Statements of Cash Flows",
        }
    }

    /// Line items that only ever appear on this statement.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            StatementKind::Earnings => &[
                "earnings before provision for taxes",
                "income before provision for income taxes",
                "income before income taxes",
            ],
            StatementKind::BalanceSheet => &["total current assets", "total current liabilities"],
            StatementKind::CashFlows => &[
                "net cash provided by operating activities",
                "net cash used in investing activities",
            ],
        }
    }

    fn matches(&self, lowered_text: &str) -> bool {
        self.keywords().iter().any(|keyword| lowered_text.contains(keyword))
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementRow {
    pub label: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractedTable {
    pub page: u32,
    pub rows: Vec<StatementRow>,
}

impl ExtractedTable {
    pub fn value_rows(&self) -> usize {
        self.rows.iter().filter(|row| !row.values.is_empty()).count()
    }

    /// Widest row, used to pad the rendered grid.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|row| row.values.len()).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FinancialStatement {
    pub kind: StatementKind,
    pub title: String,
    pub table: ExtractedTable,
}

pub fn parse_row(line: &str) -> Option<StatementRow> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    let first_value = tokens.iter().position(|token| is_value(token));
    let (label_tokens, value_tokens) = match first_value {
        Some(index) => tokens.split_at(index),
        None => (&tokens[..], &[][..]),
    };

    let label = label_tokens
        .iter()
        .filter(|token| **token != "$")
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let values = value_tokens
        .iter()
        .filter(|token| is_value(token))
        .map(|token| token.trim_start_matches('$').to_string())
        .collect();

    Some(StatementRow { label, values })
}

fn is_value(token: &str) -> bool {
    matches!(token, "—" | "–" | "-") || VALUE_TOKEN.is_match(token)
}

/// Every page with enough numeric rows to be a statement table.
pub fn extract_tables(pages: &[PageText]) -> Vec<ExtractedTable> {
    pages
        .iter()
        .filter_map(|page| {
            let rows: Vec<StatementRow> = page.text.lines().filter_map(parse_row).collect();
            let table = ExtractedTable { page: page.number, rows };
            (table.value_rows() >= MIN_VALUE_ROWS).then_some(table)
        })
        .collect()
}

/// Earnings, balance sheet and cash flows, first matching page each, in
/// that order. Statements that cannot be found are left out.
pub fn extract_key_statements(pages: &[PageText]) -> Vec<FinancialStatement> {
    let tables = extract_tables(pages);
    let mut statements = Vec::new();

    for kind in StatementKind::ALL {
        let found = tables.iter().find(|table| {
            pages
                .iter()
                .find(|page| page.number == table.page)
                .map(|page| kind.matches(&page.text.to_lowercase()))
                .unwrap_or(false)
        });
        match found {
            Some(table) => {
                log::info!("Found {} on page {}", kind, table.page);
                statements.push(FinancialStatement {
                    kind,
                    title: kind.title().to_string(),
                    table: table.clone(),
                });
            }
            None => log::info!("No table matched the {} keywords", kind),
        }
    }

    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: u32, lines: &[&str]) -> PageText {
        PageText {
            number,
            text: lines.join("\n"),
        }
    }

    #[test]
    fn parses_label_and_values() {
        let row = parse_row("Net revenue $ 6,979 $ 7,000").unwrap();
        assert_eq!(row.label, "Net revenue");
        assert_eq!(row.values, vec!["6,979", "7,000"]);

        let row = parse_row("Provision for taxes (93) (83)").unwrap();
        assert_eq!(row.values, vec!["(93)", "(83)"]);

        let row = parse_row("Restructuring charges — 12").unwrap();
        assert_eq!(row.label, "Restructuring charges");
        assert_eq!(row.values, vec!["—", "12"]);
    }

    #[test]
    fn dates_in_column_headers_keep_the_day() {
        let row = parse_row("Three months ended July 31, 2023 2022").unwrap();
        assert_eq!(row.label, "Three months ended July 31,");
        assert_eq!(row.values, vec!["2023", "2022"]);
    }

    #[test]
    fn header_lines_have_no_values() {
        let row = parse_row("Consolidated Condensed Balance Sheets").unwrap();
        assert!(row.values.is_empty());
        assert!(parse_row("   ").is_none());
    }

    #[test]
    fn words_with_digits_stay_in_the_label() {
        let row = parse_row("Series A-1 notes due 2030 1,200").unwrap();
        assert_eq!(row.label, "Series A-1 notes due");
        assert_eq!(row.values, vec!["2030", "1,200"]);
    }

    #[test]
    fn pages_without_enough_numbers_are_not_tables() {
        let pages = vec![
            page(1, &["Narrative text", "Revenue grew 5 percent", "Nothing else"]),
            page(2, &["Total current assets 10 20", "Total assets 30 40", "Debt 1 2"]),
        ];
        let tables = extract_tables(&pages);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].page, 2);
        assert_eq!(tables[0].column_count(), 2);
    }

    #[test]
    fn statements_are_ordered_by_kind_not_page() {
        let pages = vec![
            page(3, &[
                "Net cash provided by operating activities 1,289 2,721",
                "Net cash used in investing activities (2,337) (2,139)",
                "Net change in cash (1,130) (1,214)",
            ]),
            page(5, &[
                "Cash 3,012 4,163",
                "Total current assets 19,896 20,689",
                "Total current liabilities 20,066 23,042",
            ]),
            page(7, &[
                "Net revenue 6,979 7,000",
                "Earnings before provision for taxes 557 392",
                "Net earnings 464 409",
            ]),
        ];
        let statements = extract_key_statements(&pages);
        let kinds: Vec<_> = statements.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![StatementKind::Earnings, StatementKind::BalanceSheet, StatementKind::CashFlows]
        );
        assert_eq!(statements[0].table.page, 7);
        assert_eq!(statements[1].title, "Consolidated Balance Sheets");
    }

    #[test]
    fn missing_statements_are_skipped() {
        let pages = vec![page(1, &["Segment A 1 2", "Segment B 3 4", "Segment C 5 6"])];
        assert!(extract_key_statements(&pages).is_empty());
    }
}
