pub mod config;
pub mod error;
pub mod identity;
pub mod api;
pub mod listing;

pub use config::AdminConfig;
pub use error::{AppError, AppResult};
