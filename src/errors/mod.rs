//! Centralized error handling for the aggregator
//!
//! This module provides the error types shared across all application layers
//! and keeps error reporting consistent between the pipeline, the policy
//! store, and the web surface.
//!
//! # Error Categories
//!
//! - **Configuration Errors**: unusable merge policy (no sources, bad config)
//! - **Validation Errors**: input validation on the configuration API
//! - **HTTP Errors**: upstream playlist fetch failures; recovered per source
//!   (the source contributes an empty document) and never fatal to a run
//! - **Override Errors**: malformed per-request override parameters; these
//!   are recovered locally (the override is dropped with a warning) and never
//!   surface to the caller
//!
//! # Usage
//!
//! ```rust
//! use m3u_aggregator::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Ok("success".to_string())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for override-parsing Results
pub type OverrideResult<T> = Result<T, OverrideError>;
