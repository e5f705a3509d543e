use clap::Parser;
use colored::Colorize;
use dotenv::dotenv;
use filing_analyst::api;
use filing_analyst::commands::CommandHandler;
use filing_analyst::config::AppConfig;
use filing_analyst::providers::{create_provider, ProviderKind};
use filing_analyst::session::{FilingAnalyzer, SessionStore};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// OpenAI API key; falls back to OPENAI_API_KEY
    #[arg(short, long)]
    api_key: Option<String>,

    /// Answer provider: openai or local
    #[arg(long, default_value = "openai")]
    provider: String,

    /// Serve the upload form instead of the terminal REPL
    #[arg(long)]
    api: bool,

    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(long, default_value = "3000")]
    port: u16,

    /// Filing to load when the REPL starts
    #[arg(long)]
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    colored::control::set_override(true);

    // Load environment variables
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = AppConfig::from_env()?.with_api_key(args.api_key.clone());
    let kind: ProviderKind = args.provider.parse()?;
    let analyzer = FilingAnalyzer::new(config.clone(), create_provider(kind, &config));

    if args.api {
        run_api_server(&args, analyzer, config).await
    } else {
        run_cli_mode(&args, analyzer).await
    }
}

async fn run_cli_mode(
    args: &Args,
    analyzer: FilingAnalyzer,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut command_handler = CommandHandler::new(analyzer);
    command_handler.handle_command("help").await?;

    if let Some(file) = &args.file {
        if let Err(e) = command_handler.load(&file.to_string_lossy()).await {
            println!("{}", e.red());
        }
    }

    let mut rl = Editor::<(), DefaultHistory>::new()?;

    loop {
        match rl.readline("👤 ") {
            Ok(line) => {
                let input = line.trim();
                let _ = rl.add_history_entry(input);

                match command_handler.handle_command(input).await {
                    Ok(true) => break,
                    Ok(false) => {}
                    Err(e) => println!("{}", e.red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}

async fn run_api_server(
    args: &Args,
    analyzer: FilingAnalyzer,
    config: AppConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|e| format!("Invalid listen address {}:{}: {}", args.host, args.port, e))?;

    let app = api::create_api(analyzer, SessionStore::new(config.session_capacity));

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    log::info!("Upload form available at http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    Ok(())
}
