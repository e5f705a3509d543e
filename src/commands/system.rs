use colored::Colorize;

pub fn print_help() {
    println!("\n{}", "📊 Financial Statement Analysis of Form 10-K & 10-Q Reports".bold());
    println!();
    println!("📄 Document Commands:");
    println!("  load <file_path>   - Extract company, period and key statements from a PDF");
    println!("  report             - Show the key points of the loaded filing again");
    println!("  tables             - Print the extracted financial statements");
    println!();
    println!("💬 Q&A Commands:");
    println!("  ask <question>     - Ask a question about the loaded filing");
    println!("  <question>         - Anything else is treated as a question");
    println!("  sources            - Toggle printing of source documents");
    println!();
    println!("⚙️ System Commands:");
    println!("  help  - Show this help menu");
    println!("  exit  - Exit the program");
    println!();
}

/// `true` when the REPL should stop.
pub fn handle_command(input: &str) -> Result<bool, String> {
    match input.to_lowercase().as_str() {
        "help" => {
            print_help();
            Ok(false)
        }
        "exit" | "quit" => {
            println!("👋 Goodbye!");
            Ok(true)
        }
        _ => Err("Unknown system command. Type 'help' for available commands.".to_string()),
    }
}
