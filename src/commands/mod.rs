use crate::session::{FilingAnalyzer, FilingSession};

mod document;
mod system;

pub use system::print_help;

pub struct CommandHandler {
    analyzer: FilingAnalyzer,
    session: Option<FilingSession>,
    show_sources: bool,
}

impl CommandHandler {
    pub fn new(analyzer: FilingAnalyzer) -> Self {
        Self {
            analyzer,
            session: None,
            show_sources: false,
        }
    }

    pub fn session(&self) -> Option<&FilingSession> {
        self.session.as_ref()
    }

    /// Returns `Ok(true)` when the user asked to leave.
    pub async fn handle_command(&mut self, input: &str) -> Result<bool, String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(false);
        }

        match input.to_lowercase().as_str() {
            "help" | "exit" | "quit" => return system::handle_command(input),
            "report" => {
                document::print_report(&self.loaded()?.report);
                return Ok(false);
            }
            "tables" => {
                document::print_tables(&self.loaded()?.report);
                return Ok(false);
            }
            "sources" => {
                self.show_sources = !self.show_sources;
                println!(
                    "Source documents will {}be shown",
                    if self.show_sources { "" } else { "not " }
                );
                return Ok(false);
            }
            "load" => return Err("Missing file path. Usage: load <file_path>".to_string()),
            _ => {}
        }

        if let Some(path) = strip_command(input, "load") {
            self.load(path).await?;
            return Ok(false);
        }

        let question = strip_command(input, "ask").unwrap_or(input);
        self.ask(question).await?;
        Ok(false)
    }

    pub async fn load(&mut self, file_path: &str) -> Result<(), String> {
        let session = document::load(file_path, &self.analyzer).await?;
        document::print_report(&session.report);
        self.session = Some(session);
        Ok(())
    }

    async fn ask(&self, question: &str) -> Result<(), String> {
        let session = self.loaded()?;
        let answer = session
            .ask(question)
            .await
            .map_err(|e| format!("An error occurred while executing QA Section: {}", e))?;
        document::print_answer(&answer, self.show_sources);
        Ok(())
    }

    fn loaded(&self) -> Result<&FilingSession, String> {
        self.session
            .as_ref()
            .ok_or_else(|| "No document loaded. Use: load <file_path>".to_string())
    }
}

/// Argument after a case-insensitive command word, if `input` starts with it.
fn strip_command<'a>(input: &'a str, command: &str) -> Option<&'a str> {
    let (word, rest) = input.split_once(char::is_whitespace)?;
    word.eq_ignore_ascii_case(command).then(|| rest.trim())
}
