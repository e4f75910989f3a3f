//! # Data Models
//!
//! Intermediate representation of parsed Rust source, before names are
//! resolved across modules.

use crate::model::TypeRef;
use indexmap::IndexMap;

/// Parsed `#[space(...)]` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceMarker {
    /// Remote space id.
    pub remote_id: String,
    /// Included models, as written.
    pub models: Vec<TypeRef>,
    /// Schema version, 1 when omitted.
    pub db_version: u32,
}

/// A struct member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedField {
    /// Member name.
    pub name: String,
    /// Member type, as written.
    pub ty: TypeRef,
    /// `#[field]` value, `Some("")` for a bare marker.
    pub marker: Option<String>,
}

/// A struct, with its markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStruct {
    /// Struct name.
    pub name: String,
    /// `#[content_type(...)]` value.
    pub content_type: Option<String>,
    /// `#[space(...)]` marker.
    pub space: Option<SpaceMarker>,
    /// Record fields; empty for tuple and unit structs.
    pub fields: Vec<ParsedField>,
}

/// A trait and its supertraits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTrait {
    /// Trait name.
    pub name: String,
    /// Supertrait bounds, as written.
    pub supertraits: Vec<TypeRef>,
}

/// `impl Trait for SelfTy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedImpl {
    /// Implemented trait, as written.
    pub trait_ty: TypeRef,
    /// Implementing type, as written.
    pub self_ty: TypeRef,
}

/// Items of one module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedModule {
    /// Qualified module path (`crate::models`).
    pub path: String,
    /// `use` imports: local name -> imported path.
    pub imports: IndexMap<String, String>,
    /// Structs in source order.
    pub structs: Vec<ParsedStruct>,
    /// Traits in source order.
    pub traits: Vec<ParsedTrait>,
    /// Trait impls in source order.
    pub impls: Vec<ParsedImpl>,
}

impl ParsedModule {
    /// Empty module at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}
