//! # Attribute Operations
//!
//! internal logic for reading the `#[content_type]`, `#[field]` and
//! `#[space]` marker attributes.

use crate::error::{AppError, AppResult};
use crate::model::TypeRef;
use crate::parser::models::SpaceMarker;
use ra_ap_syntax::ast::{self};
use ra_ap_syntax::{AstNode, SyntaxNode};
use regex::Regex;
use std::sync::OnceLock;

/// Markers found on a single node.
#[derive(Default, Debug, PartialEq, Eq)]
pub struct MarkerInfo {
    /// `#[content_type("id")]` value.
    pub content_type: Option<String>,
    /// `#[field("id")]` value, `Some("")` for a bare `#[field]`.
    pub field: Option<String>,
    /// `#[space(...)]` contents.
    pub space: Option<SpaceMarker>,
}

/// Reads the marker attributes attached to `node`.
pub fn extract_markers(node: &SyntaxNode) -> AppResult<MarkerInfo> {
    let mut info = MarkerInfo::default();

    for attr in node.children().filter_map(ast::Attr::cast) {
        let Some(meta) = attr.meta() else {
            continue;
        };
        let Some(path) = meta.path() else {
            continue;
        };
        let ident = path.to_string();
        let content = meta
            .token_tree()
            .map(|tt| tt.to_string())
            .unwrap_or_default();

        match ident.strip_prefix("vault::").unwrap_or(&ident) {
            "content_type" => info.content_type = Some(leading_id(&content)),
            "field" => info.field = Some(leading_id(&content)),
            "space" => info.space = Some(parse_space(&content)?),
            _ => {}
        }
    }

    Ok(info)
}

/// The id of a marker: its first string literal or an `id = "..."` pair.
fn leading_id(content: &str) -> String {
    static LEADING_RE: OnceLock<Regex> = OnceLock::new();
    let leading_re =
        LEADING_RE.get_or_init(|| Regex::new(r#"^\(\s*"([^"]*)""#).expect("Invalid regex"));

    static ID_RE: OnceLock<Regex> = OnceLock::new();
    let id_re = ID_RE.get_or_init(|| Regex::new(r#"\bid\s*=\s*"([^"]*)""#).expect("Invalid regex"));

    leading_re
        .captures(content)
        .or_else(|| id_re.captures(content))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn parse_space(content: &str) -> AppResult<SpaceMarker> {
    static MODELS_RE: OnceLock<Regex> = OnceLock::new();
    let models_re = MODELS_RE
        .get_or_init(|| Regex::new(r#"\bmodels\s*=\s*\[([^\]]*)\]"#).expect("Invalid regex"));

    static VERSION_RE: OnceLock<Regex> = OnceLock::new();
    let version_re = VERSION_RE
        .get_or_init(|| Regex::new(r#"\bdb_version\s*=\s*([^,)]+)"#).expect("Invalid regex"));

    let mut models = Vec::new();
    if let Some(list) = models_re.captures(content).and_then(|caps| caps.get(1)) {
        for item in list.as_str().split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let model = TypeRef::parse(item).map_err(|e| {
                AppError::Parse(format!("invalid model `{}` in #[space]: {}", item, e))
            })?;
            models.push(model);
        }
    }

    let db_version = match version_re.captures(content).and_then(|caps| caps.get(1)) {
        Some(raw) => {
            let raw = raw.as_str().trim();
            raw.replace('_', "").parse::<u32>().map_err(|_| {
                AppError::Parse(format!("invalid db_version `{}` in #[space]", raw))
            })?
        }
        None => 1,
    };

    Ok(SpaceMarker {
        remote_id: leading_id(content),
        models,
        db_version,
    })
}
