use crate::filing::{FilingReport, FinancialStatement, NO_TABLES_MESSAGE};
use crate::llm::QaAnswer;
use crate::session::FilingSession;
use std::fmt::Write;

const TITLE: &str = "Financial Statement Analysis of Form 10-K &amp; 10-Q Reports";

const STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex}\
aside{width:300px;background:#f0f2f6;padding:1.5rem;min-height:100vh;box-sizing:border-box}\
main{flex:1;padding:2rem;max-width:1000px}\
details{border:1px solid #ddd;border-radius:6px;padding:.5rem 1rem;margin:1rem 0}\
summary{font-weight:bold;cursor:pointer}\
table{border-collapse:collapse;margin:.5rem 0 1.5rem}\
td,th{border:1px solid #ddd;padding:.25rem .5rem;font-size:.9rem}\
td.num{text-align:right}\
.error{background:#fde8e8;color:#9b1c1c;padding:.75rem;border-radius:6px}\
.answer{background:#e8f5e9;padding:.75rem;border-radius:6px}\
.source{font-size:.85rem;white-space:pre-wrap;background:#fafafa;padding:.5rem}";

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn sidebar() -> &'static str {
    "<aside>\
<h3>Basic Information:</h3>\
<p>1. Form 10-K is an Annual Report &amp; Audited Financial Statements which is filed every Fiscal Year</p>\
<p>2. Form 10-Q is a Quarterly Report &amp; Unaudited Financial Statements filed every Fiscal Quarter</p>\
<p>3. Both Forms are filed by Public Co. to US SEC about their Financial Performance</p>\
<hr>\
<h3>About Model:</h3>\
<p>As you upload Financial Statements, model identifies Company Name, Period Ending and extracts 3 important Financials i.e.,</p>\
<p>i) Earnings Statement</p><p>ii) Balance Sheet</p><p>iii) Cash Flow Statement</p>\
</aside>"
}

fn upload_form() -> &'static str {
    "<form action=\"/upload\" method=\"post\" enctype=\"multipart/form-data\">\
<p>Kindly upload PDF format of Financial Statements</p>\
<input type=\"file\" name=\"file\" accept=\"application/pdf,.pdf\" required> \
<button type=\"submit\">Analyze</button>\
</form>"
}

fn layout(body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Filing Analyst</title>\
<style>{}</style></head><body>{}<main><h1>{}</h1>{}</main></body></html>",
        STYLE,
        sidebar(),
        TITLE,
        body
    )
}

fn error_block(message: &str) -> String {
    format!("<p class=\"error\">An error occurred: {}</p>", escape(message))
}

pub fn index_page(error: Option<&str>) -> String {
    let mut body = String::new();
    if let Some(message) = error {
        body.push_str(&error_block(message));
    }
    body.push_str(upload_form());
    layout(&body)
}

fn statement_table(statement: &FinancialStatement) -> String {
    let columns = statement.table.column_count();
    let mut html = format!(
        "<h3>{}</h3><p><small>Page {}</small></p><table>",
        escape(&statement.title),
        statement.table.page
    );
    for row in &statement.table.rows {
        html.push_str("<tr><td>");
        html.push_str(&escape(&row.label));
        html.push_str("</td>");
        for i in 0..columns {
            let value = row.values.get(i).map(String::as_str).unwrap_or("");
            let _ = write!(html, "<td class=\"num\">{}</td>", escape(value));
        }
        html.push_str("</tr>");
    }
    html.push_str("</table>");
    html
}

fn report_section(report: &FilingReport) -> String {
    let mut html = String::from("<hr><h2>Key Points on Document Uploaded:</h2>");

    let _ = write!(
        html,
        "<details open><summary>Company Name &amp; Period Ending</summary>\
<ul><li>{}</li><li>{}</li><li>{}</li></ul>\
<p><small>{} ({} pages)</small></p></details>",
        escape(report.company_display()),
        escape(report.period_display()),
        escape(&report.form_type.to_string()),
        escape(&report.file_name),
        report.page_count
    );

    html.push_str("<details open><summary>Key Financial Statements</summary>");
    if report.statements.is_empty() {
        let _ = write!(html, "<p>{}</p>", NO_TABLES_MESSAGE);
    } else {
        for statement in &report.statements {
            html.push_str(&statement_table(statement));
        }
    }
    html.push_str("</details>");
    html
}

fn qa_section(session: &FilingSession, query: &str, answer: Option<&QaAnswer>, error: Option<&str>) -> String {
    let mut html = String::from("<details open><summary>Q &amp; A with uploaded Financial Statement</summary>");

    if !session.qa_enabled() {
        let reason = session.qa_error.as_deref().unwrap_or("index unavailable");
        let _ = write!(
            html,
            "<p class=\"error\">An error occurred while executing QA Section: {}</p></details>",
            escape(reason)
        );
        return html;
    }

    let _ = write!(
        html,
        "<form action=\"/ask\" method=\"post\">\
<input type=\"hidden\" name=\"session_id\" value=\"{}\">\
<label>Ask a question about the financial report<br>\
<input type=\"text\" name=\"query\" value=\"{}\" size=\"80\" maxlength=\"1000\"></label> \
<button type=\"submit\">Ask</button></form>",
        session.id,
        escape(query)
    );

    if let Some(message) = error {
        html.push_str(&error_block(message));
    }

    if let Some(answer) = answer {
        let _ = write!(html, "<p class=\"answer\">Answer: {}</p>", escape(&answer.answer));
        html.push_str("<p>Source Documents:</p>");
        for source in &answer.sources {
            let _ = write!(
                html,
                "<div class=\"source\"><strong>Page {} (score {:.2})</strong>\n{}</div>",
                source.page,
                source.score,
                escape(&source.text)
            );
        }
    }

    html.push_str("</details>");
    html
}

pub fn session_page(
    session: &FilingSession,
    query: &str,
    answer: Option<&QaAnswer>,
    error: Option<&str>,
) -> String {
    let mut body = String::from(upload_form());
    body.push_str(&report_section(&session.report));
    body.push_str(&qa_section(session, query, answer, error));
    layout(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#39;x&#39;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
    }

    #[test]
    fn index_page_shows_form_and_error() {
        let page = index_page(Some("file is not a PDF document"));
        assert!(page.contains("enctype=\"multipart/form-data\""));
        assert!(page.contains("An error occurred: file is not a PDF document"));
        assert!(page.contains("About Model:"));
    }
}
