//! Utility modules for common functionality
//!
//! Logging, progress reporting and date pattern translation used
//! throughout the application.

pub mod date_format;
pub mod logger;
pub mod progress;
