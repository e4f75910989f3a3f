//! # Content-Type Extractor
//!
//! Validates one content-type declaration and builds its
//! [`ContentTypeSchema`]. The first violation aborts that declaration only.

use crate::classifier::{LinkTarget, TypeClassifier, RESOURCE};
use crate::diagnostics::{Diagnostic, Marker};
use crate::model::{ContentTypeDecl, DeclId, FieldDecl, TypeRef};
use crate::naming::{storage_name, GeneratedTypeName, SUFFIX_MODEL};
use crate::scalar::{ScalarTypeTable, StorageType};
use crate::schema::{ContentTypeSchema, FieldKind, FieldSchema, ListElement};
use indexmap::IndexMap;
use tracing::debug;

/// Turns content-type declarations into schemas.
#[derive(Debug, Clone, Copy)]
pub struct ContentTypeExtractor<'a> {
    classifier: TypeClassifier<'a>,
    scalars: &'static ScalarTypeTable,
}

impl<'a> ContentTypeExtractor<'a> {
    /// Extractor resolving types through `classifier`.
    pub fn new(classifier: TypeClassifier<'a>) -> Self {
        Self {
            classifier,
            scalars: ScalarTypeTable::global(),
        }
    }

    /// Validates `decl`; on failure returns the diagnostics explaining why.
    pub fn extract(&self, decl: &ContentTypeDecl) -> Result<ContentTypeSchema, Vec<Diagnostic>> {
        debug!(declaration = %decl.id, remote_id = %decl.remote_id, "extracting content type");
        self.try_extract(decl).map_err(|diagnostic| vec![diagnostic])
    }

    fn try_extract(&self, decl: &ContentTypeDecl) -> Result<ContentTypeSchema, Diagnostic> {
        let id = &decl.id;
        if decl.remote_id.is_empty() {
            return Err(Diagnostic::error(
                id,
                format!("{} id may not be empty. ({})", Marker::ContentType, id),
            ));
        }

        self.classifier
            .registry()
            .require(id.as_str())
            .map_err(|e| Diagnostic::internal(id, Marker::ContentType, &e))?;

        if !self.classifier.is_resource(&TypeRef::new(id.as_str())) {
            return Err(Diagnostic::error(
                id,
                format!(
                    "Types annotated with {} must implement \"{}\". ({})",
                    Marker::ContentType,
                    RESOURCE,
                    id
                ),
            ));
        }

        let mut fields: IndexMap<String, FieldSchema> = IndexMap::new();
        for member in &decl.members {
            let Some(marker) = &member.marker else {
                continue;
            };
            let field_id = if marker.is_empty() {
                member.member_name.clone()
            } else {
                marker.clone()
            };

            if field_id.is_empty() {
                return Err(Diagnostic::member_error(
                    id,
                    &member.member_name,
                    format!("{} id may not be empty. ({})", Marker::Field, id),
                ));
            }

            if fields.contains_key(&field_id) {
                return Err(Diagnostic::member_error(
                    id,
                    &member.member_name,
                    format!(
                        "{} for the same id (\"{}\") was used multiple times in the same type. ({})",
                        Marker::Field,
                        field_id,
                        id
                    ),
                ));
            }

            let kind = self.classify_field(id, member)?;
            fields.insert(
                field_id.clone(),
                FieldSchema {
                    id: field_id,
                    member_name: member.member_name.clone(),
                    declared_type: member.ty.clone(),
                    kind,
                },
            );
        }

        Ok(ContentTypeSchema {
            declaration: id.clone(),
            remote_id: decl.remote_id.clone(),
            generated_type: GeneratedTypeName::for_declaration(id, &decl.enclosing, SUFFIX_MODEL),
            storage_name: storage_name(&decl.remote_id),
            fields,
        })
    }

    fn classify_field(&self, id: &DeclId, member: &FieldDecl) -> Result<FieldKind, Diagnostic> {
        let ty = &member.ty;
        let member_name = member.member_name.as_str();

        if self.classifier.is_list_member(ty) {
            let Some(element_type) = self.classifier.list_element(ty) else {
                return Err(Diagnostic::member_error(
                    id,
                    member_name,
                    format!(
                        "List fields must have a type parameter specified. ({}.{})",
                        id, member_name
                    ),
                ));
            };

            if !self.classifier.is_valid_list_element(element_type) {
                return Err(Diagnostic::member_error(
                    id,
                    member_name,
                    format!(
                        "Invalid list type \"{}\" specified. ({}.{})",
                        element_type, id, member_name
                    ),
                ));
            }

            // Link lists have no column of their own
            let (element, storage_type) = if self.classifier.is_string(element_type) {
                (ListElement::String, Some(StorageType::StringList))
            } else {
                let target = self
                    .classifier
                    .classify_link(element_type)
                    .unwrap_or(LinkTarget::Entry);
                (ListElement::Link(target), None)
            };

            return Ok(FieldKind::List {
                element_type: element_type.clone(),
                element,
                storage_type,
            });
        }

        if let Some(target) = self.classifier.classify_link(ty) {
            return Ok(FieldKind::Link { target });
        }

        match self.scalars.lookup(ty) {
            Some(storage_type) => Ok(FieldKind::Scalar { storage_type }),
            None => Err(Diagnostic::member_error(
                id,
                member_name,
                format!(
                    "{} specified for unsupported type (\"{}\"). ({}.{})",
                    Marker::Field,
                    ty,
                    id,
                    member_name
                ),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ASSET;
    use crate::model::{TypeDecl, TypeRegistry};
    use crate::naming::hash_for_id;
    use pretty_assertions::assert_eq;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::with_builtins();
        for path in ["app::Cat", "app::Dog"] {
            registry
                .insert(TypeDecl::new(path).implements(TypeRef::new(RESOURCE)))
                .unwrap();
        }
        registry.insert(TypeDecl::new("app::Plain")).unwrap();
        registry
    }

    fn cat(members: Vec<FieldDecl>) -> ContentTypeDecl {
        ContentTypeDecl {
            id: DeclId::new("app::Cat"),
            enclosing: Vec::new(),
            remote_id: "cat".into(),
            members,
        }
    }

    fn ty(s: &str) -> TypeRef {
        TypeRef::parse(s).unwrap()
    }

    fn extract_one(decl: &ContentTypeDecl) -> Result<ContentTypeSchema, Vec<Diagnostic>> {
        let registry = registry();
        ContentTypeExtractor::new(TypeClassifier::new(&registry)).extract(decl)
    }

    fn single_error(decl: &ContentTypeDecl) -> Diagnostic {
        let mut errors = extract_one(decl).expect_err("should fail");
        assert_eq!(errors.len(), 1);
        errors.remove(0)
    }

    #[test]
    fn test_minimal_cat() {
        let schema = extract_one(&cat(vec![FieldDecl::marked("name", "name", ty("String"))]))
            .expect("valid");
        assert_eq!(schema.remote_id, "cat");
        assert_eq!(schema.storage_name, format!("entry_{}", hash_for_id("cat")));
        assert_eq!(schema.generated_type.name, "Cat$$ModelHelper");
        assert_eq!(schema.fields.len(), 1);
        let name = schema.field("name").unwrap();
        assert_eq!(name.member_name, "name");
        assert_eq!(
            name.kind,
            FieldKind::Scalar {
                storage_type: StorageType::Text
            }
        );
    }

    #[test]
    fn test_empty_remote_id() {
        let mut decl = cat(vec![FieldDecl::marked("name", "", ty("u64"))]);
        decl.remote_id.clear();
        let diag = single_error(&decl);
        assert_eq!(diag.message, "@ContentType id may not be empty. (app::Cat)");
        assert_eq!(diag.declaration, DeclId::new("app::Cat"));
    }

    #[test]
    fn test_must_be_resource() {
        let decl = ContentTypeDecl {
            id: DeclId::new("app::Plain"),
            ..cat(Vec::new())
        };
        let diag = single_error(&decl);
        assert_eq!(
            diag.message,
            "Types annotated with @ContentType must implement \"vault::Resource\". (app::Plain)"
        );
    }

    #[test]
    fn test_unregistered_declaration_is_internal_failure() {
        let decl = ContentTypeDecl {
            id: DeclId::new("app::Ghost"),
            ..cat(Vec::new())
        };
        let diag = single_error(&decl);
        assert!(diag
            .message
            .starts_with("Unable to parse @ContentType declaration. (app::Ghost)"));
    }

    #[test]
    fn test_duplicate_field_ids() {
        // explicit id clashes with a defaulted one
        let decl = cat(vec![
            FieldDecl::marked("name", "", ty("String")),
            FieldDecl::marked("title", "name", ty("String")),
        ]);
        let diag = single_error(&decl);
        assert_eq!(
            diag.message,
            "@Field for the same id (\"name\") was used multiple times in the same type. (app::Cat)"
        );
        assert_eq!(diag.member.as_deref(), Some("title"));
    }

    #[test]
    fn test_unmarked_members_are_ignored() {
        let decl = cat(vec![
            FieldDecl::unmarked("cache", ty("Vec<u8>")),
            FieldDecl::marked("age", "", ty("i32")),
        ]);
        let schema = extract_one(&decl).unwrap();
        assert_eq!(schema.fields.keys().collect::<Vec<_>>(), vec!["age"]);
    }

    #[test]
    fn test_list_without_type_parameter() {
        let decl = cat(vec![FieldDecl::marked("tags", "", ty("Vec"))]);
        let diag = single_error(&decl);
        assert_eq!(
            diag.message,
            "List fields must have a type parameter specified. (app::Cat.tags)"
        );
    }

    #[test]
    fn test_invalid_list_type() {
        let decl = cat(vec![FieldDecl::marked("scores", "", ty("Vec<i32>"))]);
        let diag = single_error(&decl);
        assert_eq!(
            diag.message,
            "Invalid list type \"i32\" specified. (app::Cat.scores)"
        );
    }

    #[test]
    fn test_list_kinds() {
        let decl = cat(vec![
            FieldDecl::marked("tags", "", ty("Vec<String>")),
            FieldDecl::marked("friends", "", ty("Vec<app::Dog>")),
            FieldDecl::marked("photos", "", ty(&format!("Vec<{}>", ASSET))),
        ]);
        let schema = extract_one(&decl).unwrap();

        let tags = schema.field("tags").unwrap();
        assert_eq!(tags.storage_type(), Some(StorageType::StringList));

        let friends = schema.field("friends").unwrap();
        assert_eq!(friends.storage_type(), None);
        assert_eq!(friends.link_target(), Some(LinkTarget::Entry));

        let photos = schema.field("photos").unwrap();
        assert_eq!(photos.link_target(), Some(LinkTarget::Asset));
    }

    #[test]
    fn test_borrowed_str_list_is_string_list() {
        let decl = cat(vec![
            FieldDecl::marked("name", "", ty("&'a str")),
            FieldDecl::marked("tags", "", ty("Vec<&'a str>")),
        ]);
        let schema = extract_one(&decl).unwrap();
        assert_eq!(
            schema.field("name").unwrap().storage_type(),
            Some(StorageType::Text)
        );
        assert_eq!(
            schema.field("tags").unwrap().kind,
            FieldKind::List {
                element_type: TypeRef::new("str"),
                element: ListElement::String,
                storage_type: Some(StorageType::StringList),
            }
        );
    }

    #[test]
    fn test_empty_field_id() {
        let decl = cat(vec![
            FieldDecl::marked("name", "", ty("String")),
            FieldDecl::marked("", "", ty("String")),
        ]);
        let diag = single_error(&decl);
        assert_eq!(diag.message, "@Field id may not be empty. (app::Cat)");

        // an explicit id rescues an unnamed member
        let decl = cat(vec![FieldDecl::marked("", "title", ty("String"))]);
        assert!(extract_one(&decl).unwrap().field("title").is_some());
    }

    #[test]
    fn test_link_fields() {
        let decl = cat(vec![
            FieldDecl::marked("bestFriend", "", ty("app::Dog")),
            FieldDecl::marked("image", "", ty(ASSET)),
        ]);
        let schema = extract_one(&decl).unwrap();
        assert_eq!(
            schema.field("bestFriend").unwrap().kind,
            FieldKind::Link {
                target: LinkTarget::Entry
            }
        );
        assert_eq!(
            schema.field("image").unwrap().kind,
            FieldKind::Link {
                target: LinkTarget::Asset
            }
        );
    }

    #[test]
    fn test_unsupported_scalar() {
        let decl = cat(vec![FieldDecl::marked("plain", "", ty("app::Plain"))]);
        let diag = single_error(&decl);
        assert_eq!(
            diag.message,
            "@Field specified for unsupported type (\"app::Plain\"). (app::Cat.plain)"
        );
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let decl = cat(vec![
            FieldDecl::marked("name", "", ty("String")),
            FieldDecl::marked("likes", "", ty("Vec<String>")),
        ]);
        assert_eq!(extract_one(&decl).unwrap(), extract_one(&decl).unwrap());
    }
}
