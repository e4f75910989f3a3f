//! # Diagnostics
//!
//! Structured reports of schema violations, tied to the declaration (and
//! optionally the member) they concern. A compile pass collects these
//! instead of aborting.

use crate::error::AppError;
use crate::model::DeclId;
use serde::Serialize;
use std::fmt;

/// Severity of a diagnostic. Every violation is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Fails the build step.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Marker kinds, as named in messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Content-type marker on a declaration.
    ContentType,
    /// Field marker on a member.
    Field,
    /// Space marker on a declaration.
    Space,
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::ContentType => f.write_str("@ContentType"),
            Marker::Field => f.write_str("@Field"),
            Marker::Space => f.write_str("@Space"),
        }
    }
}

/// One reported violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Always [`Severity::Error`].
    pub severity: Severity,
    /// Offending declaration.
    pub declaration: DeclId,
    /// Offending member, when the violation is member-specific.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    /// Human-readable message naming the declaration.
    pub message: String,
}

impl Diagnostic {
    /// An error on a declaration.
    pub fn error(declaration: &DeclId, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            declaration: declaration.clone(),
            member: None,
            message: message.into(),
        }
    }

    /// An error on one member of a declaration.
    pub fn member_error(declaration: &DeclId, member: &str, message: impl Into<String>) -> Self {
        Self {
            member: Some(member.to_string()),
            ..Self::error(declaration, message)
        }
    }

    /// An unexpected failure while processing a declaration.
    pub fn internal(declaration: &DeclId, marker: Marker, cause: &AppError) -> Self {
        Self::error(
            declaration,
            format!(
                "Unable to parse {} declaration. ({}): {}",
                marker, declaration, cause
            ),
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let decl = DeclId::new("app::Cat");
        let diag = Diagnostic::member_error(&decl, "name", "bad things. (app::Cat.name)");
        assert_eq!(diag.to_string(), "error: bad things. (app::Cat.name)");
        assert_eq!(diag.member.as_deref(), Some("name"));
    }

    #[test]
    fn test_internal_names_declaration_and_cause() {
        let decl = DeclId::new("app::Cat");
        let cause = AppError::Registry("type `app::Cat` is not declared".into());
        let diag = Diagnostic::internal(&decl, Marker::ContentType, &cause);
        assert_eq!(
            diag.message,
            "Unable to parse @ContentType declaration. (app::Cat): \
             Registry Error: type `app::Cat` is not declared"
        );
    }
}
