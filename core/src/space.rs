//! # Space Assembler
//!
//! Validates one space declaration against the content types extracted
//! earlier in the pass and builds its [`SpaceSchema`].

use crate::config::{CompilerOptions, UnresolvedModelPolicy};
use crate::diagnostics::{Diagnostic, Marker};
use crate::model::{DeclId, SpaceDecl};
use crate::naming::{storage_database_name, GeneratedTypeName, SUFFIX_SPACE};
use crate::schema::{ContentTypeSchema, SpaceSchema};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Extracted content types keyed by declaration, the single source of truth
/// for space references.
pub type ResolvedContentTypes = IndexMap<DeclId, Arc<ContentTypeSchema>>;

/// Turns space declarations into schemas.
#[derive(Debug, Clone, Copy)]
pub struct SpaceAssembler<'a> {
    options: &'a CompilerOptions,
}

impl<'a> SpaceAssembler<'a> {
    /// Assembler honoring `options`.
    pub fn new(options: &'a CompilerOptions) -> Self {
        Self { options }
    }

    /// Validates `decl` against `resolved`.
    ///
    /// An `Err` with no diagnostics means the space was dropped silently
    /// because of an unresolved model under [`UnresolvedModelPolicy::Skip`].
    pub fn assemble(
        &self,
        decl: &SpaceDecl,
        resolved: &ResolvedContentTypes,
    ) -> Result<SpaceSchema, Vec<Diagnostic>> {
        let id = &decl.id;
        debug!(declaration = %id, remote_id = %decl.remote_id, "assembling space");

        if decl.remote_id.is_empty() {
            return Err(vec![Diagnostic::error(
                id,
                format!("{} id may not be empty. ({})", Marker::Space, id),
            )]);
        }

        if decl.models.is_empty() {
            return Err(vec![Diagnostic::error(
                id,
                format!("{} models must not be empty. ({})", Marker::Space, id),
            )]);
        }

        let mut seen = HashSet::new();
        let mut included_models = Vec::with_capacity(decl.models.len());
        for model in &decl.models {
            let Some(schema) = resolved.get(model) else {
                warn!(
                    space = %id,
                    model = %model,
                    "space references a content type without schema"
                );
                return Err(match self.options.unresolved_models {
                    UnresolvedModelPolicy::Skip => Vec::new(),
                    UnresolvedModelPolicy::Report => vec![Diagnostic::error(
                        id,
                        format!(
                            "{} references unresolved content type \"{}\". ({})",
                            Marker::Space,
                            model,
                            id
                        ),
                    )],
                });
            };

            if !seen.insert(schema.remote_id.as_str()) {
                return Err(vec![Diagnostic::error(
                    id,
                    format!(
                        "{} includes multiple models with the same id \"{}\". ({})",
                        Marker::Space,
                        schema.remote_id,
                        id
                    ),
                )]);
            }
            included_models.push(Arc::clone(schema));
        }

        Ok(SpaceSchema {
            declaration: id.clone(),
            remote_id: decl.remote_id.clone(),
            generated_type: GeneratedTypeName::for_declaration(id, &[], SUFFIX_SPACE),
            storage_database_name: storage_database_name(&decl.remote_id),
            schema_version: decl.db_version,
            included_models,
        })
    }
}
