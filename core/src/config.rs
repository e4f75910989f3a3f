//! # Compiler Options
//!
//! Knobs of a compile pass. Defaults match what a build integration wants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do with a space that includes a content type which has no schema
/// (it failed extraction or was never marked).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedModelPolicy {
    /// Emit a diagnostic at the space naming the unresolved reference.
    #[default]
    Report,
    /// Drop the space without a diagnostic of its own.
    Skip,
}

impl fmt::Display for UnresolvedModelPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedModelPolicy::Report => f.write_str("report"),
            UnresolvedModelPolicy::Skip => f.write_str("skip"),
        }
    }
}

impl FromStr for UnresolvedModelPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "report" => Ok(UnresolvedModelPolicy::Report),
            "skip" => Ok(UnresolvedModelPolicy::Skip),
            other => Err(format!("unknown unresolved-model policy `{}`", other)),
        }
    }
}

/// Options for [`Compiler`](crate::driver::Compiler).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerOptions {
    /// Handling of spaces with unresolved model references.
    #[serde(default)]
    pub unresolved_models: UnresolvedModelPolicy,
}

impl CompilerOptions {
    /// Builder-style policy override.
    pub fn with_unresolved_models(mut self, policy: UnresolvedModelPolicy) -> Self {
        self.unresolved_models = policy;
        self
    }
}
