//! # Error Types
//!
//! This module defines error types used throughout the imprint library.

use thiserror::Error;

/// Main error type for imprint operations
#[derive(Debug, Error)]
pub enum ImprintError {
    /// Asset fetch errors (network, HTTP status)
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Image decoding or processing error
    #[error("Image error: {0}")]
    Image(String),

    /// Barcode/QR symbol generation error
    #[error("Symbol error: {0}")]
    Symbol(String),

    /// Invalid input (malformed element config, bad font data)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
