//! Common types and utilities shared across Phantom crates.
//!
//! Kept small so every crate in the workspace can depend on it.
//!
//! # Overview
//!
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`PhantomError`] and [`Result`]: shared error handling for binaries and adapters
//!
//! # Examples
//!
//! ```rust
//! use phantom_common::{PhantomError, Result};
//!
//! fn connect(ready: bool) -> Result<()> {
//!     if ready { Ok(()) } else { Err(PhantomError::Timeout) }
//! }
//!
//! assert!(matches!(connect(false), Err(PhantomError::Timeout)));
//! ```

pub mod observability;

/// Error types used across the Phantom workspace.
#[derive(thiserror::Error, Debug)]
pub enum PhantomError {
    /// A driver (WebDriver session, network, ...) reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation exceeded the configured timeout.
    #[error("Timeout occurred")]
    Timeout,
}

/// Convenient alias for results that use [`PhantomError`].
pub type Result<T> = std::result::Result<T, PhantomError>;
