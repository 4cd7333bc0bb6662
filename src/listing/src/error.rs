//! Error types for the listing controllers

use thiserror::Error;

/// Caller contract violations
///
/// Running out of items is not an error; it shows up as `has_more == false`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ListingError {
    /// Page size must be at least one
    #[error("Invalid page size: {0}")]
    InvalidPageSize(usize),

    /// Scroll threshold must be a finite, non-negative pixel distance
    #[error("Invalid scroll threshold: {0}")]
    InvalidThreshold(f64),
}

/// Result type for listing operations
pub type Result<T> = std::result::Result<T, ListingError>;
