#![deny(missing_docs)]

//! # Schema Emitters
//!
//! The seam between the compiler and code emission. The compiler hands over
//! each validated schema once; what gets generated from it is up to the
//! emitter.

use crate::error::AppResult;
use crate::model::DeclId;
use crate::schema::Schema;
use serde_json::{Map, Value};

/// Receives validated schemas, one declaration at a time.
pub trait SchemaEmitter {
    /// Emits the artifacts for one declaration.
    ///
    /// # Arguments
    ///
    /// * `target` - The declaration the schema belongs to.
    /// * `schema` - The validated schema.
    fn emit(&mut self, target: &DeclId, schema: Schema<'_>) -> AppResult<()>;
}

/// Collects schemas into one JSON document keyed by declaration path.
#[derive(Debug, Default, Clone)]
pub struct JsonEmitter {
    document: Map<String, Value>,
}

impl JsonEmitter {
    /// Empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of emitted schemas.
    pub fn len(&self) -> usize {
        self.document.len()
    }

    /// Whether nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    /// The collected document.
    pub fn into_document(self) -> Value {
        Value::Object(self.document)
    }
}

impl SchemaEmitter for JsonEmitter {
    fn emit(&mut self, target: &DeclId, schema: Schema<'_>) -> AppResult<()> {
        let value = serde_json::to_value(schema)?;
        self.document.insert(target.to_string(), value);
        Ok(())
    }
}
