pub mod database;
pub mod errors;
pub mod logging;
pub mod pagination;

// Re-exports for convenience
pub use database::Database;
pub use errors::{AppError, AppResult};
