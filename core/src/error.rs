//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Only conditions that stop a whole generation run live here. Problems with a
//! single route or schema are reported as [`crate::report::Anomaly`] values.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The manifest could not be parsed.
    /// Ignored for `From<String>` to avoid conflict with General.
    #[from(ignore)]
    #[display("Manifest Error: {_0}")]
    Manifest(String),

    /// The manifest carries no route table at all.
    #[from(ignore)]
    #[display("Manifest Error: route table is missing")]
    MissingRouteTable,

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
