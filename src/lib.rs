// filechat - ask questions about a CSV, text or PDF file from the terminal

pub mod config;
pub mod llm;
pub mod loader;
pub mod session;
pub mod tui;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use session::{Session, SessionController};
pub use types::{AppError, AppResult};
