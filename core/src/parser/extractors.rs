//! # Extraction Logic
//!
//! Walks a Rust source file and collects the items the compiler cares
//! about: structs with their markers, traits, trait impls and imports.
//! Inline `mod` blocks become modules of their own.

use crate::error::{AppError, AppResult};
use crate::model::{path_to_string, TypeRef};
use crate::parser::attributes::extract_markers;
use crate::parser::models::{ParsedField, ParsedImpl, ParsedModule, ParsedStruct, ParsedTrait};
use ra_ap_edition::Edition;
use ra_ap_syntax::ast::{self, HasModuleItem, HasName, HasTypeBounds};
use ra_ap_syntax::{AstNode, SourceFile};
use tracing::warn;

/// Parses `code` as the module at `module_path`.
///
/// Returns the module itself followed by its inline submodules.
pub fn parse_module(module_path: &str, code: &str) -> AppResult<Vec<ParsedModule>> {
    let parse = SourceFile::parse(code, Edition::Edition2021);
    let errors = parse.errors();
    if !errors.is_empty() {
        warn!(module = module_path, errors = errors.len(), "source has syntax errors");
    }
    let file = parse.tree();

    let mut modules = Vec::new();
    collect_items(module_path, file.items(), &mut modules)?;
    Ok(modules)
}

fn collect_items(
    module_path: &str,
    items: impl Iterator<Item = ast::Item>,
    out: &mut Vec<ParsedModule>,
) -> AppResult<()> {
    let mut module = ParsedModule::new(module_path);
    let mut nested = Vec::new();

    for item in items {
        match item {
            ast::Item::Struct(struct_def) => {
                if let Some(parsed) = parse_struct(&struct_def, module_path)? {
                    module.structs.push(parsed);
                }
            }
            ast::Item::Trait(trait_def) => {
                if let Some(name) = trait_def.name() {
                    let supertraits = trait_def
                        .type_bound_list()
                        .map(|list| {
                            list.bounds()
                                .filter_map(|bound| bound.ty())
                                .filter_map(|ty| TypeRef::from_ast(&ty).ok())
                                .collect()
                        })
                        .unwrap_or_default();
                    module.traits.push(ParsedTrait {
                        name: name.text().to_string(),
                        supertraits,
                    });
                }
            }
            ast::Item::Impl(impl_def) => {
                // Inherent impls carry no capability
                if let (Some(trait_ty), Some(self_ty)) = (impl_def.trait_(), impl_def.self_ty()) {
                    if let (Ok(trait_ty), Ok(self_ty)) =
                        (TypeRef::from_ast(&trait_ty), TypeRef::from_ast(&self_ty))
                    {
                        module.impls.push(ParsedImpl { trait_ty, self_ty });
                    }
                }
            }
            ast::Item::Use(use_def) => {
                if let Some(tree) = use_def.use_tree() {
                    collect_use_tree(&tree, None, &mut module)?;
                }
            }
            ast::Item::Module(mod_def) => {
                if let (Some(name), Some(list)) = (mod_def.name(), mod_def.item_list()) {
                    nested.push((format!("{}::{}", module_path, name.text()), list));
                }
            }
            _ => {}
        }
    }

    out.push(module);
    for (path, list) in nested {
        collect_items(&path, list.items(), out)?;
    }
    Ok(())
}

fn parse_struct(struct_def: &ast::Struct, module_path: &str) -> AppResult<Option<ParsedStruct>> {
    let Some(name) = struct_def.name() else {
        return Ok(None);
    };
    let name = name.text().to_string();
    let markers = extract_markers(struct_def.syntax())
        .map_err(|e| AppError::Parse(format!("{}::{}: {}", module_path, name, e)))?;

    let mut fields = Vec::new();
    if let Some(ast::FieldList::RecordFieldList(list)) = struct_def.field_list() {
        for field in list.fields() {
            let (Some(fname), Some(ty)) = (field.name(), field.ty()) else {
                continue;
            };
            let field_markers = extract_markers(field.syntax())?;
            // Unsupported shapes still reach the extractor, which reports them
            let ty = TypeRef::from_ast(&ty)
                .unwrap_or_else(|_| TypeRef::new(ty.syntax().text().to_string()));
            fields.push(ParsedField {
                name: fname.text().to_string(),
                ty,
                marker: field_markers.field,
            });
        }
    }

    Ok(Some(ParsedStruct {
        name,
        content_type: markers.content_type,
        space: markers.space,
        fields,
    }))
}

fn collect_use_tree(
    tree: &ast::UseTree,
    prefix: Option<&str>,
    module: &mut ParsedModule,
) -> AppResult<()> {
    let own = tree.path().map(|p| path_to_string(&p)).transpose()?;
    let full = match (prefix, own) {
        (Some(prefix), Some(own)) => format!("{}::{}", prefix, own),
        (Some(prefix), None) => prefix.to_string(),
        (None, Some(own)) => own,
        (None, None) => return Ok(()),
    };

    if let Some(list) = tree.use_tree_list() {
        for child in list.use_trees() {
            collect_use_tree(&child, Some(&full), module)?;
        }
        return Ok(());
    }

    // Glob imports cannot be resolved without the target module
    if tree.star_token().is_some() {
        return Ok(());
    }

    // `use a::b::{self}` imports `b`
    let full = full.strip_suffix("::self").map(str::to_string).unwrap_or(full);
    let local = match tree.rename() {
        Some(rename) => match rename.name() {
            Some(name) => name.text().to_string(),
            None => return Ok(()),
        },
        None => full.rsplit("::").next().unwrap_or(&full).to_string(),
    };
    module.imports.insert(local, full);
    Ok(())
}
