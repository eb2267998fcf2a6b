//! Shared types for Brigade
//!
//! Wire models, error codes, response structures and small utilities used
//! by the server and any Rust client.

pub mod error;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use response::{PageQuery, PaginatedResponse, Pagination};
