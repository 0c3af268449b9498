// Shared kernel used by every module

pub mod config; // Environment-driven service configuration
pub mod errors; // Shared error types
pub mod utils; // Logging helpers

// Re-exports for convenience
pub use config::AppConfig;
pub use errors::{AppError, AppResult, ToolError};
