#![deny(missing_docs)]

//! # Declaration Model
//!
//! The closed, fully-known set of declarations a compile pass works on:
//! type uses ([`TypeRef`]), the types known to the host ([`TypeRegistry`]),
//! and the marked declarations ([`Declaration`]) in discovery order.
//!
//! Everything here is produced either by the Rust source front end
//! ([`crate::parser`]) or deserialized from a JSON/YAML manifest.

use crate::classifier::{ASSET, RESOURCE, STRING};
use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use ra_ap_edition::Edition;
use ra_ap_syntax::ast::{self, HasGenericArgs};
use ra_ap_syntax::{AstNode, SourceFile};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Identity of a declaration: its fully-qualified path (`crate::models::Cat`).
///
/// Kept distinct from remote ids so the two can never be mixed up when
/// resolving space references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclId(String);

impl DeclId {
    /// Wraps a fully-qualified path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The qualified path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment (`Cat` for `crate::models::Cat`).
    pub fn simple_name(&self) -> &str {
        self.0.rsplit("::").next().unwrap_or(&self.0)
    }

    /// Everything before the last segment, empty for unqualified paths.
    pub fn module(&self) -> &str {
        match self.0.rfind("::") {
            Some(pos) => &self.0[..pos],
            None => "",
        }
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeclId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A (possibly generic) use of a type, e.g. `Vec<crate::models::Cat>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeRef {
    /// Path of the type without generic arguments.
    pub name: String,
    /// Generic arguments in declaration order.
    pub args: Vec<TypeRef>,
}

impl TypeRef {
    /// A non-generic type use.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A generic type use.
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Parses Rust type syntax (`Vec<String>`, `&str`, `crate::a::B<C>`).
    ///
    /// References and parentheses are looked through; lifetimes are dropped.
    pub fn parse(input: &str) -> AppResult<TypeRef> {
        Self::from_ast(&Self::parse_syntax(input)?)
    }

    /// Like [`parse`](Self::parse), but well-formed types that are not paths
    /// (tuples, arrays, `fn` pointers) are kept whole as an opaque name.
    ///
    /// This is how the source front end records such members, so manifests
    /// written from a parsed tree load back unchanged.
    pub fn parse_opaque(input: &str) -> AppResult<TypeRef> {
        let root = Self::parse_syntax(input)?;
        Ok(Self::from_ast(&root).unwrap_or_else(|_| TypeRef::new(input)))
    }

    fn parse_syntax(input: &str) -> AppResult<ast::Type> {
        // Wrap in a type alias so the parser sees a complete item
        let code = format!("type _Wrapper = {};", input);
        let parse = SourceFile::parse(&code, Edition::Edition2021);
        if !parse.errors().is_empty() {
            return Err(AppError::Parse(format!(
                "Failed to parse type string: {}",
                input
            )));
        }
        let file = parse.tree();

        let type_alias = file
            .syntax()
            .descendants()
            .find_map(ast::TypeAlias::cast)
            .ok_or_else(|| AppError::Parse(format!("Failed to parse type string: {}", input)))?;

        type_alias
            .ty()
            .ok_or_else(|| AppError::Parse(format!("Invalid type syntax: {}", input)))
    }

    /// Converts an AST type node.
    pub(crate) fn from_ast(ty: &ast::Type) -> AppResult<TypeRef> {
        match ty {
            ast::Type::PathType(path_type) => {
                let path = path_type
                    .path()
                    .ok_or_else(|| AppError::Parse("Empty path".into()))?;
                let name = path_to_string(&path)?;
                let mut args = Vec::new();
                if let Some(list) = path.segment().and_then(|s| s.generic_arg_list()) {
                    for arg in list.generic_args() {
                        match arg {
                            ast::GenericArg::TypeArg(type_arg) => {
                                let inner = type_arg.ty().ok_or_else(|| {
                                    AppError::Parse("Invalid generic type".into())
                                })?;
                                args.push(Self::from_ast(&inner)?);
                            }
                            ast::GenericArg::LifetimeArg(_) => {}
                            other => {
                                return Err(AppError::Parse(format!(
                                    "Unsupported generic argument: {}",
                                    other.syntax().text()
                                )))
                            }
                        }
                    }
                }
                Ok(TypeRef { name, args })
            }
            ast::Type::RefType(ref_type) => {
                let inner = ref_type
                    .ty()
                    .ok_or_else(|| AppError::Parse("Invalid reference".into()))?;
                Self::from_ast(&inner)
            }
            ast::Type::ParenType(paren) => {
                let inner = paren
                    .ty()
                    .ok_or_else(|| AppError::Parse("Invalid parenthesized type".into()))?;
                Self::from_ast(&inner)
            }
            _ => Err(AppError::Parse(format!(
                "Unsupported type structure: {}",
                ty.syntax().text()
            ))),
        }
    }

    /// Last segment of the type path.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit("::").next().unwrap_or(&self.name)
    }

    /// Argument-erased form: `HashMap<?, ?>` for generic uses, the bare name otherwise.
    pub fn erased(&self) -> String {
        if self.args.is_empty() {
            return self.name.clone();
        }
        let wildcards = vec!["?"; self.args.len()];
        format!("{}<{}>", self.name, wildcards.join(", "))
    }

    /// Applies `f` to this type's name and, recursively, to every argument.
    pub fn map_names(&self, f: &impl Fn(&str) -> String) -> TypeRef {
        TypeRef {
            name: f(&self.name),
            args: self.args.iter().map(|a| a.map_names(f)).collect(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", arg)?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for TypeRef {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TypeRef::parse_opaque(&value)
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

/// Renders an AST path as `a::b::C`, ignoring generic arguments on qualifiers.
pub(crate) fn path_to_string(path: &ast::Path) -> AppResult<String> {
    let segment = path
        .segment()
        .ok_or_else(|| AppError::Parse("Empty segment".into()))?;
    let name = segment
        .name_ref()
        .ok_or_else(|| AppError::Parse(format!("No type name in `{}`", path.syntax().text())))?
        .text()
        .to_string();
    match path.qualifier() {
        Some(qualifier) => Ok(format!("{}::{}", path_to_string(&qualifier)?, name)),
        None => Ok(name),
    }
}

/// One type known to the host: a struct, a capability trait, or a builtin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Fully-qualified path.
    pub path: String,
    /// Declared supertype, if the host type system has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<TypeRef>,
    /// Implemented capability interfaces (traits).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<TypeRef>,
}

impl TypeDecl {
    /// A declaration with no supertypes.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            superclass: None,
            interfaces: Vec::new(),
        }
    }

    /// Builder-style supertype.
    pub fn extends(mut self, superclass: TypeRef) -> Self {
        self.superclass = Some(superclass);
        self
    }

    /// Builder-style interface.
    pub fn implements(mut self, interface: TypeRef) -> Self {
        self.interfaces.push(interface);
        self
    }
}

/// The closed set of types visible to a compile pass, keyed by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TypeDecl>", into = "Vec<TypeDecl>")]
pub struct TypeRegistry {
    types: IndexMap<String, TypeDecl>,
}

impl TypeRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the capability and string types.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.ensure_builtins();
        registry
    }

    /// Adds the builtin types that are not declared yet.
    pub fn ensure_builtins(&mut self) {
        let builtins = [
            TypeDecl::new(RESOURCE),
            TypeDecl::new(ASSET).implements(TypeRef::new(RESOURCE)),
            TypeDecl::new(STRING),
        ];
        for decl in builtins {
            self.types.entry(decl.path.clone()).or_insert(decl);
        }
    }

    /// Registers a type; paths must be unique.
    pub fn insert(&mut self, decl: TypeDecl) -> AppResult<()> {
        if self.types.contains_key(&decl.path) {
            return Err(AppError::Registry(format!(
                "type `{}` is declared more than once",
                decl.path
            )));
        }
        self.types.insert(decl.path.clone(), decl);
        Ok(())
    }

    /// Rejects a type that reaches itself through its supertypes or
    /// interfaces (`impl Cat for Cat {}`, `trait A: A {}`).
    pub fn check_acyclic(&self) -> AppResult<()> {
        let mut done = HashSet::new();
        let mut chain = Vec::new();
        for decl in self.types.values() {
            self.visit(decl, &mut chain, &mut done)?;
        }
        Ok(())
    }

    fn visit<'s>(
        &'s self,
        decl: &'s TypeDecl,
        chain: &mut Vec<&'s str>,
        done: &mut HashSet<&'s str>,
    ) -> AppResult<()> {
        let path = decl.path.as_str();
        if done.contains(path) {
            return Ok(());
        }
        if let Some(start) = chain.iter().position(|p| *p == path) {
            let mut cycle = chain[start..].to_vec();
            cycle.push(path);
            return Err(AppError::Registry(format!(
                "type `{}` is its own supertype: {}",
                path,
                cycle.join(" -> ")
            )));
        }

        chain.push(path);
        for parent in decl.superclass.iter().chain(&decl.interfaces) {
            if let Some(next) = self.types.get(&parent.name) {
                self.visit(next, chain, done)?;
            }
        }
        chain.pop();
        done.insert(path);
        Ok(())
    }

    /// Looks up a type by path.
    pub fn get(&self, path: &str) -> Option<&TypeDecl> {
        self.types.get(path)
    }

    pub(crate) fn get_mut(&mut self, path: &str) -> Option<&mut TypeDecl> {
        self.types.get_mut(path)
    }

    /// Like [`get`](Self::get), but a missing type is an error.
    pub fn require(&self, path: &str) -> AppResult<&TypeDecl> {
        self.get(path)
            .ok_or_else(|| AppError::Registry(format!("type `{}` is not declared", path)))
    }

    /// Whether a type is declared.
    pub fn contains(&self, path: &str) -> bool {
        self.types.contains_key(path)
    }

    /// Declared types in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDecl> {
        self.types.values()
    }

    /// Number of declared types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no type is declared.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TryFrom<Vec<TypeDecl>> for TypeRegistry {
    type Error = AppError;

    fn try_from(value: Vec<TypeDecl>) -> Result<Self, Self::Error> {
        let mut registry = TypeRegistry::new();
        for decl in value {
            registry.insert(decl)?;
        }
        Ok(registry)
    }
}

impl From<TypeRegistry> for Vec<TypeDecl> {
    fn from(value: TypeRegistry) -> Self {
        value.types.into_values().collect()
    }
}

/// One member of a content-type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Host member identifier.
    pub member_name: String,
    /// Field marker: `None` when unmarked, `Some("")` when the id is left blank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    /// Declared member type.
    pub ty: TypeRef,
}

impl FieldDecl {
    /// A member carrying a field marker.
    pub fn marked(member_name: impl Into<String>, id: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            member_name: member_name.into(),
            marker: Some(id.into()),
            ty,
        }
    }

    /// A member without a field marker.
    pub fn unmarked(member_name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            member_name: member_name.into(),
            marker: None,
            ty,
        }
    }
}

/// A declaration carrying the content-type marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTypeDecl {
    /// Declaration identity.
    pub id: DeclId,
    /// Simple names of enclosing types, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enclosing: Vec<String>,
    /// Marker value.
    pub remote_id: String,
    /// Members in declaration order, marked or not.
    #[serde(default)]
    pub members: Vec<FieldDecl>,
}

fn default_db_version() -> u32 {
    1
}

/// A declaration carrying the space marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceDecl {
    /// Declaration identity.
    pub id: DeclId,
    /// Marker value.
    pub remote_id: String,
    /// Schema version handed to the persistence layer.
    #[serde(default = "default_db_version")]
    pub db_version: u32,
    /// Included content-type declarations.
    #[serde(default)]
    pub models: Vec<DeclId>,
}

/// A marked declaration, one variant per marker kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "marker", rename_all = "snake_case")]
pub enum Declaration {
    /// `@ContentType`.
    ContentType(ContentTypeDecl),
    /// `@Space`.
    Space(SpaceDecl),
}

impl Declaration {
    /// Identity of the marked declaration.
    pub fn id(&self) -> &DeclId {
        match self {
            Declaration::ContentType(d) => &d.id,
            Declaration::Space(d) => &d.id,
        }
    }
}

/// Everything one compile pass sees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationSet {
    /// Known types.
    #[serde(default)]
    pub types: TypeRegistry,
    /// Marked declarations in discovery order.
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl DeclarationSet {
    /// An empty set over the given registry.
    pub fn new(types: TypeRegistry) -> Self {
        Self {
            types,
            declarations: Vec::new(),
        }
    }

    /// Appends a declaration.
    pub fn push(&mut self, declaration: Declaration) {
        self.declarations.push(declaration);
    }

    /// Content-type declarations in discovery order.
    pub fn content_types(&self) -> impl Iterator<Item = &ContentTypeDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::ContentType(c) => Some(c),
            Declaration::Space(_) => None,
        })
    }

    /// Space declarations in discovery order.
    pub fn spaces(&self) -> impl Iterator<Item = &SpaceDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Space(s) => Some(s),
            Declaration::ContentType(_) => None,
        })
    }

    /// Rejects a declaration that carries the same marker twice.
    pub fn validate(&self) -> AppResult<()> {
        let mut content_types = HashSet::new();
        let mut spaces = HashSet::new();
        for decl in &self.declarations {
            let fresh = match decl {
                Declaration::ContentType(c) => content_types.insert(&c.id),
                Declaration::Space(s) => spaces.insert(&s.id),
            };
            if !fresh {
                return Err(AppError::Registry(format!(
                    "declaration `{}` is listed more than once",
                    decl.id()
                )));
            }
        }
        Ok(())
    }

    /// Parses a JSON manifest.
    pub fn from_json_str(input: &str) -> AppResult<Self> {
        let set: DeclarationSet = serde_json::from_str(input)?;
        set.finish()
    }

    /// Parses a YAML manifest.
    pub fn from_yaml_str(input: &str) -> AppResult<Self> {
        let set: DeclarationSet = serde_yaml::from_str(input)?;
        set.finish()
    }

    /// Loads a manifest, choosing the format by extension (`.yaml`/`.yml`, else JSON).
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    fn finish(mut self) -> AppResult<Self> {
        self.types.ensure_builtins();
        self.types.check_acyclic()?;
        self.validate()?;
        Ok(self)
    }
}
