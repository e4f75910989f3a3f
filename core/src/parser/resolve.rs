//! # Name Resolution
//!
//! Turns parsed modules into a [`DeclarationSet`]: qualifies every type name
//! against the module it appears in, builds the [`TypeRegistry`] from
//! structs, traits and trait impls, and lists the marked declarations in
//! source order.

use crate::error::{AppError, AppResult};
use crate::model::{
    ContentTypeDecl, DeclId, Declaration, DeclarationSet, FieldDecl, SpaceDecl, TypeDecl, TypeRef,
    TypeRegistry,
};
use crate::parser::extractors::parse_module;
use crate::parser::models::ParsedModule;
use std::collections::HashSet;
use std::path::{Component, Path};
use tracing::debug;

/// Module path of `file` relative to the source `root`.
///
/// `lib.rs`, `main.rs` and `mod.rs` name their directory:
/// `src/lib.rs` is `crate`, `src/models/mod.rs` and `src/models.rs` are
/// `crate::models`.
pub fn module_path_for(root: &Path, file: &Path) -> AppResult<String> {
    let relative = file.strip_prefix(root).map_err(|_| {
        AppError::General(format!("{:?} is not under source root {:?}", file, root))
    })?;

    let mut parts = vec!["crate".to_string()];
    for component in relative.with_extension("").components() {
        match component {
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .ok_or_else(|| AppError::General(format!("non UTF-8 path {:?}", file)))?;
                parts.push(part.to_string());
            }
            _ => {
                return Err(AppError::General(format!(
                    "unexpected path component in {:?}",
                    relative
                )))
            }
        }
    }

    if let Some(last) = parts.last() {
        let is_root_file = parts.len() == 2 && (last == "lib" || last == "main");
        if is_root_file || (parts.len() > 1 && last == "mod") {
            parts.pop();
        }
    }
    Ok(parts.join("::"))
}

/// Parsed modules awaiting resolution.
#[derive(Debug, Default)]
pub struct SourceSet {
    modules: Vec<ParsedModule>,
}

impl SourceSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `code` as the module at `module_path`.
    pub fn add_source(&mut self, module_path: &str, code: &str) -> AppResult<()> {
        let modules = parse_module(module_path, code)?;
        self.modules.extend(modules);
        Ok(())
    }

    /// Reads and parses `file`, deriving its module path from `root`.
    pub fn add_file(&mut self, root: &Path, file: &Path) -> AppResult<()> {
        let module_path = module_path_for(root, file)?;
        let code = std::fs::read_to_string(file)?;
        debug!(file = %file.display(), module = %module_path, "parsing source file");
        self.add_source(&module_path, &code)
    }

    /// Number of parsed modules, inline ones included.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether nothing was parsed.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Resolves names across all parsed modules.
    pub fn into_declarations(self) -> AppResult<DeclarationSet> {
        let mut declared = HashSet::new();
        for module in &self.modules {
            for name in module
                .structs
                .iter()
                .map(|s| &s.name)
                .chain(module.traits.iter().map(|t| &t.name))
            {
                declared.insert(format!("{}::{}", module.path, name));
            }
        }

        let mut types = TypeRegistry::with_builtins();
        for module in &self.modules {
            let resolver = Resolver::new(module, &declared);
            for s in &module.structs {
                types.insert(TypeDecl::new(format!("{}::{}", module.path, s.name)))?;
            }
            for t in &module.traits {
                let mut decl = TypeDecl::new(format!("{}::{}", module.path, t.name));
                decl.interfaces = t.supertraits.iter().map(|b| resolver.resolve(b)).collect();
                types.insert(decl)?;
            }
        }

        // Impls may live in another module than their self type
        for module in &self.modules {
            let resolver = Resolver::new(module, &declared);
            for imp in &module.impls {
                let self_ty = resolver.resolve(&imp.self_ty);
                if let Some(decl) = types.get_mut(&self_ty.name) {
                    decl.interfaces.push(resolver.resolve(&imp.trait_ty));
                }
            }
        }

        types.check_acyclic()?;

        let mut set = DeclarationSet::new(types);
        for module in &self.modules {
            let resolver = Resolver::new(module, &declared);
            for s in &module.structs {
                let id = DeclId::new(format!("{}::{}", module.path, s.name));
                if let Some(remote_id) = &s.content_type {
                    set.push(Declaration::ContentType(ContentTypeDecl {
                        id: id.clone(),
                        enclosing: Vec::new(),
                        remote_id: remote_id.clone(),
                        members: s
                            .fields
                            .iter()
                            .map(|f| FieldDecl {
                                member_name: f.name.clone(),
                                marker: f.marker.clone(),
                                ty: resolver.resolve(&f.ty),
                            })
                            .collect(),
                    }));
                }
                if let Some(space) = &s.space {
                    set.push(Declaration::Space(SpaceDecl {
                        id: id.clone(),
                        remote_id: space.remote_id.clone(),
                        db_version: space.db_version,
                        models: space
                            .models
                            .iter()
                            .map(|m| DeclId::new(resolver.resolve(m).name))
                            .collect(),
                    }));
                }
            }
        }

        set.validate()?;
        Ok(set)
    }
}

/// Parses a single source file as module `crate`.
pub fn parse_source(code: &str) -> AppResult<DeclarationSet> {
    let mut sources = SourceSet::new();
    sources.add_source("crate", code)?;
    sources.into_declarations()
}

struct Resolver<'a> {
    module: &'a ParsedModule,
    declared: &'a HashSet<String>,
}

impl<'a> Resolver<'a> {
    fn new(module: &'a ParsedModule, declared: &'a HashSet<String>) -> Self {
        Self { module, declared }
    }

    fn resolve(&self, ty: &TypeRef) -> TypeRef {
        ty.map_names(&|name| self.resolve_name(name))
    }

    fn resolve_name(&self, name: &str) -> String {
        let (head, rest) = match name.split_once("::") {
            Some((head, rest)) => (head, Some(rest)),
            None => (name, None),
        };

        let base = match head {
            "crate" => return name.to_string(),
            "self" => self.module.path.clone(),
            "super" => parent(&self.module.path).to_string(),
            _ => {
                if let Some(imported) = self.module.imports.get(head) {
                    self.absolute(imported)
                } else {
                    let local = format!("{}::{}", self.module.path, head);
                    if rest.is_none() && !self.declared.contains(&local) {
                        return name.to_string();
                    }
                    if rest.is_some() && !self.is_local_module(&local) {
                        return name.to_string();
                    }
                    local
                }
            }
        };

        match rest {
            Some(rest) => format!("{}::{}", base, rest),
            None => base,
        }
    }

    /// Imports may themselves be written relative to the module.
    fn absolute(&self, path: &str) -> String {
        if let Some(rest) = path.strip_prefix("self::") {
            format!("{}::{}", self.module.path, rest)
        } else if let Some(rest) = path.strip_prefix("super::") {
            format!("{}::{}", parent(&self.module.path), rest)
        } else {
            path.to_string()
        }
    }

    fn is_local_module(&self, path: &str) -> bool {
        let prefix = format!("{}::", path);
        self.declared.iter().any(|d| d.starts_with(&prefix))
    }
}

fn parent(path: &str) -> &str {
    match path.rfind("::") {
        Some(pos) => &path[..pos],
        None => path,
    }
}
