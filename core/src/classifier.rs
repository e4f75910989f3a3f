#![deny(missing_docs)]

//! # Type Classifier
//!
//! Structural subtyping over the [`TypeRegistry`]. Answers "does this type
//! have capability X" by walking supertypes and implemented interfaces, with
//! argument-erased matching for generic targets (`Vec<?>`).
//!
//! The classifier never fails: unknown types, raw generics and odd arities
//! simply do not match, and each declared type is visited at most once per
//! query. Reporting bad types is the caller's job.

use crate::model::{TypeRef, TypeRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The capability every content type must have.
pub const RESOURCE: &str = "vault::Resource";

/// The capability marking binary/media resources.
pub const ASSET: &str = "vault::Asset";

/// The string type.
pub const STRING: &str = "String";

/// Paths that denote the single-parameter sequence container.
pub const LIST_TYPES: [&str; 3] = ["Vec", "std::vec::Vec", "alloc::vec::Vec"];

const STRING_TYPES: [&str; 4] = [STRING, "std::string::String", "alloc::string::String", "str"];

/// What a link field points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkTarget {
    /// Any resource that is not an asset.
    Entry,
    /// An asset (binary/media) resource.
    Asset,
}

/// Capability checks against one registry.
#[derive(Debug, Clone, Copy)]
pub struct TypeClassifier<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> TypeClassifier<'a> {
    /// Classifier over `registry`.
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// The registry types are resolved against.
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    /// Whether `ty` satisfies `target`, directly or through its supertypes.
    ///
    /// `target` is either a plain path (`vault::Resource`) or an erased
    /// generic form (`Vec<?>`) that matches any use of that type with the
    /// same arity.
    pub fn is_subtype_of(&self, ty: &TypeRef, target: &str) -> bool {
        self.walk(ty, target, &mut HashSet::new())
    }

    fn walk(&self, ty: &TypeRef, target: &str, visited: &mut HashSet<&'a str>) -> bool {
        if Self::matches_erased(ty, target) {
            return true;
        }
        let Some(decl) = self.registry.get(&ty.name) else {
            return false;
        };
        if !visited.insert(decl.path.as_str()) {
            return false;
        }
        if let Some(superclass) = &decl.superclass {
            if self.walk(superclass, target, visited) {
                return true;
            }
        }
        decl.interfaces
            .iter()
            .any(|interface| self.walk(interface, target, visited))
    }

    /// Name and arity match, ignoring argument identity.
    pub fn matches_erased(ty: &TypeRef, target: &str) -> bool {
        if ty.to_string() == target {
            return true;
        }
        !ty.args.is_empty() && ty.erased() == target
    }

    /// Whether the declared type denotes the sequence container.
    ///
    /// A raw `Vec` counts, so callers can report the missing element type.
    pub fn is_list_member(&self, ty: &TypeRef) -> bool {
        LIST_TYPES.contains(&ty.name.as_str())
    }

    /// Element type of a list use, `None` when the type parameter is absent.
    pub fn list_element<'t>(&self, ty: &'t TypeRef) -> Option<&'t TypeRef> {
        if !self.is_list_member(ty) {
            return None;
        }
        ty.args.first()
    }

    /// Whether `ty` is string-like.
    pub fn is_string(&self, ty: &TypeRef) -> bool {
        STRING_TYPES
            .iter()
            .any(|target| self.is_subtype_of(ty, target))
    }

    /// Whether `ty` is a resource.
    pub fn is_resource(&self, ty: &TypeRef) -> bool {
        self.is_subtype_of(ty, RESOURCE)
    }

    /// Lists may only hold strings or resources.
    pub fn is_valid_list_element(&self, ty: &TypeRef) -> bool {
        self.is_string(ty) || self.is_resource(ty)
    }

    /// `Asset` for assets, `Entry` for other resources, `None` for everything else.
    pub fn classify_link(&self, ty: &TypeRef) -> Option<LinkTarget> {
        if !self.is_resource(ty) {
            return None;
        }
        if self.is_subtype_of(ty, ASSET) {
            Some(LinkTarget::Asset)
        } else {
            Some(LinkTarget::Entry)
        }
    }
}
