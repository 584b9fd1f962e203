//! Utility modules — errors, logging, time, validation, shared types.

pub mod error;
pub mod logger;
pub mod result;
pub mod time;
pub mod types;
pub mod validation;

pub use error::{ok, ok_with_message, ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
