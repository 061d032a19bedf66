//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `RgError` as one variant
//! via `#[from]`.

use thiserror::Error;

/// The base error type for `rg-core`.
#[derive(Debug, Error)]
pub enum RgError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `rg-core`.
pub type RgResult<T> = Result<T, RgError>;
