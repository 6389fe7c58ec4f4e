//! Backend API: device authentication, event upload, schedule and
//! sound file retrieval.

mod client;
mod error;
mod types;

pub use client::{ApiClient, DEFAULT_TIMEOUT};
pub use error::{is_permanent_error, ApiError};
pub use types::{FileDetails, FileInfo, FileResponse};
