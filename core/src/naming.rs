//! # Naming Scheme
//!
//! Deterministic storage names for remote identifiers and the names of the
//! helper types the emitter generates.

use crate::model::DeclId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Prefix of content-type table names.
pub const ENTRY_PREFIX: &str = "entry_";

/// Prefix of space database names.
pub const SPACE_PREFIX: &str = "space_";

/// Suffix of generated content-type helpers.
pub const SUFFIX_MODEL: &str = "$$ModelHelper";

/// Suffix of generated space helpers.
pub const SUFFIX_SPACE: &str = "$$SpaceHelper";

/// Lowercase hex SHA-256 of `id`: 64 characters from `[0-9a-f]`.
pub fn hash_for_id(id: &str) -> String {
    hex::encode(Sha256::digest(id.as_bytes()))
}

/// Table name for a content type.
pub fn storage_name(remote_id: &str) -> String {
    format!("{}{}", ENTRY_PREFIX, hash_for_id(remote_id))
}

/// Database name for a space.
pub fn storage_database_name(remote_id: &str) -> String {
    format!("{}{}", SPACE_PREFIX, hash_for_id(remote_id))
}

/// Name of a generated helper type, placed next to its declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneratedTypeName {
    /// Module the helper is generated into.
    pub module: String,
    /// Helper type name.
    pub name: String,
}

impl GeneratedTypeName {
    /// `Outer$Inner$$ModelHelper` style name for `decl`.
    ///
    /// `$` never occurs in a Rust identifier, so distinct nestings cannot
    /// produce the same name.
    pub fn for_declaration(decl: &DeclId, enclosing: &[String], suffix: &str) -> Self {
        let mut parts: Vec<&str> = enclosing.iter().map(String::as_str).collect();
        parts.push(decl.simple_name());
        Self {
            module: decl.module().to_string(),
            name: format!("{}{}", parts.join("$"), suffix),
        }
    }
}

impl fmt::Display for GeneratedTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.module.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}::{}", self.module, self.name)
        }
    }
}
