#![deny(missing_docs)]

//! # Schema Model
//!
//! Validated output of a compile pass. Built once, never mutated; spaces
//! share their content types through `Arc`.

use crate::classifier::LinkTarget;
use crate::model::{DeclId, TypeRef};
use crate::naming::GeneratedTypeName;
use crate::scalar::StorageType;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// Element kind of a list field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListElement {
    /// Strings, stored inline.
    String,
    /// Links, resolved as relations by the emitter.
    Link(LinkTarget),
}

/// Classification of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// A column of a scalar type.
    Scalar {
        /// Column type.
        storage_type: StorageType,
    },
    /// A sequence of strings or links.
    List {
        /// Declared element type.
        element_type: TypeRef,
        /// What the elements are.
        element: ListElement,
        /// Only string lists get a column type.
        storage_type: Option<StorageType>,
    },
    /// A reference to another resource.
    Link {
        /// Entry or asset.
        target: LinkTarget,
    },
}

/// One field of a content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    /// Remote field id.
    pub id: String,
    /// Host member the accessors are generated for.
    pub member_name: String,
    /// Declared member type.
    pub declared_type: TypeRef,
    /// Classification.
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldSchema {
    /// Column type, if the field is stored in a column of its own.
    pub fn storage_type(&self) -> Option<StorageType> {
        match &self.kind {
            FieldKind::Scalar { storage_type } => Some(*storage_type),
            FieldKind::List { storage_type, .. } => *storage_type,
            FieldKind::Link { .. } => None,
        }
    }

    /// Link target for link fields and link lists.
    pub fn link_target(&self) -> Option<LinkTarget> {
        match &self.kind {
            FieldKind::Link { target } => Some(*target),
            FieldKind::List {
                element: ListElement::Link(target),
                ..
            } => Some(*target),
            _ => None,
        }
    }
}

/// A validated content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentTypeSchema {
    /// Declaration this schema was extracted from.
    pub declaration: DeclId,
    /// Remote content-type id.
    pub remote_id: String,
    /// Generated helper type.
    pub generated_type: GeneratedTypeName,
    /// `entry_<hash>`.
    pub storage_name: String,
    /// Fields keyed by remote id, in declaration order.
    pub fields: IndexMap<String, FieldSchema>,
}

impl ContentTypeSchema {
    /// Field with the given remote id.
    pub fn field(&self, id: &str) -> Option<&FieldSchema> {
        self.fields.get(id)
    }
}

fn serialize_model_refs<S>(
    models: &[Arc<ContentTypeSchema>],
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(models.iter().map(|m| &m.declaration))
}

/// A validated space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpaceSchema {
    /// Declaration this schema was assembled from.
    pub declaration: DeclId,
    /// Remote space id.
    pub remote_id: String,
    /// Generated helper type.
    pub generated_type: GeneratedTypeName,
    /// `space_<hash>`.
    pub storage_database_name: String,
    /// Caller-supplied schema version.
    pub schema_version: u32,
    /// Included content types, in declared order.
    #[serde(serialize_with = "serialize_model_refs")]
    pub included_models: Vec<Arc<ContentTypeSchema>>,
}

impl SpaceSchema {
    /// Included content type with the given remote id.
    pub fn model(&self, remote_id: &str) -> Option<&ContentTypeSchema> {
        self.included_models
            .iter()
            .map(Arc::as_ref)
            .find(|m| m.remote_id == remote_id)
    }
}

/// Either kind of schema, as handed to the emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "schema", rename_all = "snake_case")]
pub enum Schema<'a> {
    /// A content type.
    ContentType(&'a ContentTypeSchema),
    /// A space.
    Space(&'a SpaceSchema),
}

impl<'a> Schema<'a> {
    /// Remote id of the underlying schema.
    pub fn remote_id(&self) -> &'a str {
        match self {
            Schema::ContentType(c) => &c.remote_id,
            Schema::Space(s) => &s.remote_id,
        }
    }
}
