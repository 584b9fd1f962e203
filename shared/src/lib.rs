//! Types shared between the edge server and the printer driver crate:
//! the unified error system, the fixed-scale money type, and small
//! cross-cutting utilities.

pub mod error;
pub mod money;
pub mod types;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Unified error system re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use money::Money;
