pub mod api;
pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod filing;
pub mod llm;
pub mod providers;
pub mod session;

// Re-export commonly used items
pub use config::AppConfig;
pub use error::AppError;
pub use filing::FilingReport;
pub use session::{FilingAnalyzer, FilingSession, SessionStore};
