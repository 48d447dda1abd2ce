//! Error types shared across the HTTP boundary

pub mod app_error;

pub use app_error::{AppError, AppResult};
