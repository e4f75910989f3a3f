//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! `AppError` covers host and infrastructure failures only (unreadable files,
//! malformed manifests, broken registries). Schema violations found while
//! compiling declarations are never errors here, they are collected as
//! [`Diagnostic`](crate::diagnostics::Diagnostic)s instead.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Wrapper for JSON (de)serialization errors.
    #[display("JSON Error: {_0}")]
    Json(serde_json::Error),

    /// Wrapper for YAML (de)serialization errors.
    #[display("YAML Error: {_0}")]
    Yaml(serde_yaml::Error),

    /// Source or type syntax that could not be understood.
    #[from(ignore)]
    #[display("Parse Error: {_0}")]
    Parse(String),

    /// Inconsistent type registry (duplicate or missing declarations).
    #[from(ignore)]
    #[display("Registry Error: {_0}")]
    Registry(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
