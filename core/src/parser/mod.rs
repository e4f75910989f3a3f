#![deny(missing_docs)]

//! # Parser Module
//!
//! Rust source front end. Reads marker attributes and trait impls with the
//! rust-analyzer syntax library and produces the [`DeclarationSet`] the
//! compiler works on.
//!
//! ```text
//! use vault::Resource;
//!
//! #[content_type("cat")]
//! pub struct Cat {
//!     #[field]
//!     pub name: String,
//! }
//!
//! impl Resource for Cat {}
//!
//! #[space("demo", models = [Cat], db_version = 2)]
//! pub struct Demo;
//! ```
//!
//! [`DeclarationSet`]: crate::model::DeclarationSet

pub mod attributes;
pub mod extractors;
pub mod models;
pub mod resolve;

pub use extractors::parse_module;
pub use models::{ParsedField, ParsedImpl, ParsedModule, ParsedStruct, ParsedTrait, SpaceMarker};
pub use resolve::{module_path_for, parse_source, SourceSet};
