#![deny(missing_docs)]

//! # Compile Driver
//!
//! Runs one batch pass over a [`DeclarationSet`]:
//!
//! 1. Extract every content type. Each declaration is independent.
//! 2. Assemble every space against the complete extraction result.
//! 3. Hand the merged schema set to an emitter, one schema at a time.
//!
//! A failing declaration only costs its own schema and whatever depends on
//! it; the pass always runs to completion.

use crate::classifier::TypeClassifier;
use crate::config::CompilerOptions;
use crate::diagnostics::Diagnostic;
use crate::emit::SchemaEmitter;
use crate::extractor::ContentTypeExtractor;
use crate::model::{DeclId, DeclarationSet};
use crate::schema::{Schema, SpaceSchema};
use crate::space::{ResolvedContentTypes, SpaceAssembler};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of one compile pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompileOutput {
    /// Extracted content types in discovery order.
    pub content_types: ResolvedContentTypes,
    /// Assembled spaces in discovery order.
    pub spaces: IndexMap<DeclId, SpaceSchema>,
    /// Every violation found, in processing order.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileOutput {
    /// Whether the pass produced no diagnostics.
    pub fn is_success(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// All schemas: content types first, then spaces.
    pub fn schemas(&self) -> impl Iterator<Item = (&DeclId, Schema<'_>)> {
        let content_types = self
            .content_types
            .iter()
            .map(|(id, schema)| (id, Schema::ContentType(schema.as_ref())));
        let spaces = self
            .spaces
            .iter()
            .map(|(id, schema)| (id, Schema::Space(schema)));
        content_types.chain(spaces)
    }

    /// Diagnostics reported against one declaration.
    pub fn diagnostics_for<'a>(&'a self, id: &'a DeclId) -> impl Iterator<Item = &'a Diagnostic> {
        self.diagnostics.iter().filter(move |d| &d.declaration == id)
    }
}

/// The schema compiler.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    /// Compiler with the given options.
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    /// Options in effect.
    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Runs extraction and assembly over `set`.
    pub fn compile(&self, set: &DeclarationSet) -> CompileOutput {
        let mut output = CompileOutput::default();

        let extractor = ContentTypeExtractor::new(TypeClassifier::new(&set.types));
        for decl in set.content_types() {
            match extractor.extract(decl) {
                Ok(schema) => {
                    output.content_types.insert(decl.id.clone(), Arc::new(schema));
                }
                Err(diagnostics) => output.diagnostics.extend(diagnostics),
            }
        }

        // Spaces only ever see the finished extraction map
        let assembler = SpaceAssembler::new(&self.options);
        for decl in set.spaces() {
            match assembler.assemble(decl, &output.content_types) {
                Ok(schema) => {
                    output.spaces.insert(decl.id.clone(), schema);
                }
                Err(diagnostics) => output.diagnostics.extend(diagnostics),
            }
        }

        info!(
            content_types = output.content_types.len(),
            spaces = output.spaces.len(),
            diagnostics = output.diagnostics.len(),
            "compile pass finished"
        );
        output
    }

    /// Forwards every schema in `output` to `emitter`.
    ///
    /// A failing emit becomes a diagnostic on that declaration; the
    /// remaining schemas are still emitted.
    pub fn emit_all<E: SchemaEmitter + ?Sized>(&self, output: &mut CompileOutput, emitter: &mut E) {
        let mut failures = Vec::new();
        for (id, schema) in output.schemas() {
            debug!(declaration = %id, "emitting schema");
            if let Err(e) = emitter.emit(id, schema) {
                failures.push(Diagnostic::error(
                    id,
                    format!("Failed writing schema for \"{}\", message: {}", id, e),
                ));
            }
        }
        output.diagnostics.extend(failures);
    }
}
