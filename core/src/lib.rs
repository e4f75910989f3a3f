#![deny(missing_docs)]

//! # Vault Core
//!
//! Build-time schema compiler. Reads content-type and space declarations,
//! validates them, and produces the schema set persistence code is
//! generated from.

/// Shared error types.
pub mod error;

/// Declaration model (types, markers, manifests).
pub mod model;

/// Structural subtyping and capability checks.
pub mod classifier;

/// Storage and helper naming.
pub mod naming;

/// Scalar type table.
pub mod scalar;

/// Validated schema model.
pub mod schema;

/// Diagnostics reported by a compile pass.
pub mod diagnostics;

/// Compiler options.
pub mod config;

/// Content-type extraction.
pub mod extractor;

/// Space assembly.
pub mod space;

/// Compile driver.
pub mod driver;

/// Emitter seam.
pub mod emit;

/// Rust source front end.
pub mod parser;

pub use classifier::{LinkTarget, TypeClassifier};
pub use config::{CompilerOptions, UnresolvedModelPolicy};
pub use diagnostics::{Diagnostic, Severity};
pub use driver::{CompileOutput, Compiler};
pub use emit::{JsonEmitter, SchemaEmitter};
pub use error::{AppError, AppResult};
pub use model::{
    ContentTypeDecl, DeclId, Declaration, DeclarationSet, FieldDecl, SpaceDecl, TypeDecl, TypeRef,
    TypeRegistry,
};
pub use naming::hash_for_id;
pub use parser::{parse_source, SourceSet};
pub use schema::{ContentTypeSchema, FieldKind, FieldSchema, ListElement, Schema, SpaceSchema};
