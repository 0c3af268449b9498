pub mod app_error;
pub mod tool_error;

pub use app_error::{AppError, AppResult};
pub use tool_error::ToolError;
