//! Request and response types shared by the handlers

pub mod error;
pub mod json;
pub mod path;

pub use error::{ApiError, ApiErrorBody, ApiErrorType, SERVER_ERROR_MESSAGE};
pub use json::Json;
pub use path::Path;
