//! Server-level errors — startup and transport failures that happen before
//! (or outside) request handling, where there is no `AppError` to return.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("database error: {0}")]
    Database(#[from] shared::error::AppError),

    #[error("bind error: {0}")]
    Bind(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, ServerError>;
