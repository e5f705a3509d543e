use crate::filing::{FilingReport, FinancialStatement, NO_TABLES_MESSAGE};
use crate::llm::QaAnswer;
use crate::session::{FilingAnalyzer, FilingSession};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

pub async fn load(file_path: &str, analyzer: &FilingAnalyzer) -> Result<FilingSession, String> {
    let path = Path::new(file_path);
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", file_path, e))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| file_path.to_string());

    println!("📄 Analyzing document: {}", file_path.bright_yellow());

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Extracting text, tables and building the Q&A index");
    pb.enable_steady_tick(Duration::from_millis(120));

    let result = analyzer.analyze_upload(&file_name, bytes).await;
    pb.finish_and_clear();

    let session = result.map_err(|e| format!("An error occurred: {}", e))?;
    if let Some(reason) = &session.qa_error {
        println!("{}", format!("⚠️ Q&A disabled: {}", reason).yellow());
    }
    Ok(session)
}

pub fn print_report(report: &FilingReport) {
    println!("\n{}", "Key Points on Document Uploaded:".bold());
    println!("  {} {}", "File:".bright_cyan(), report.file_name);
    println!("  {} {}", "Form:".bright_cyan(), report.form_type);
    println!("  {} {}", "Company Name:".bright_cyan(), report.company_display().bright_green());
    println!("  {} {}", "Period Ending:".bright_cyan(), report.period_display().bright_green());

    if report.statements.is_empty() {
        println!("  {}", NO_TABLES_MESSAGE.yellow());
    } else {
        let titles = report
            .statements
            .iter()
            .map(|s| format!("{} (page {})", s.title, s.table.page))
            .collect::<Vec<_>>()
            .join(", ");
        println!("  {} {}", "Statements:".bright_cyan(), titles);
    }
    println!();
}

pub fn print_statement(statement: &FinancialStatement) {
    println!("\n{} {}", statement.title.bold(), format!("(page {})", statement.table.page).dimmed());

    let label_width = statement
        .table
        .rows
        .iter()
        .map(|row| row.label.chars().count())
        .max()
        .unwrap_or(0)
        .min(60);

    for row in &statement.table.rows {
        let values = row
            .values
            .iter()
            .map(|value| format!("{:>12}", value))
            .collect::<String>();
        println!("  {:<width$}{}", row.label, values, width = label_width);
    }
}

pub fn print_tables(report: &FilingReport) {
    if report.statements.is_empty() {
        println!("{}", NO_TABLES_MESSAGE.yellow());
        return;
    }
    for statement in &report.statements {
        print_statement(statement);
    }
    println!();
}

pub fn print_answer(answer: &QaAnswer, show_sources: bool) {
    println!("\n💬 {} {}", "Answer:".bold(), answer.answer.bright_green());
    if show_sources {
        println!("\n{}", "Source Documents:".bold());
        for source in &answer.sources {
            println!("{}", format!("── page {} (score {:.2})", source.page, source.score).dimmed());
            println!("{}", source.text);
        }
    }
    println!();
}
