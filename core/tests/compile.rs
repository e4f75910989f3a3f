use pretty_assertions::assert_eq;
use vault_core::scalar::StorageType;
use vault_core::{
    hash_for_id, parse_source, Compiler, CompilerOptions, DeclId, DeclarationSet, FieldKind,
    JsonEmitter, LinkTarget, ListElement, UnresolvedModelPolicy,
};

const PETS: &str = r#"
use vault::{Asset, Resource};

#[content_type("cat")]
pub struct Cat {
    #[field("name")]
    pub name: String,
    #[field]
    pub likes: Vec<String>,
    #[field("bestFriend")]
    pub best_friend: Dog,
    #[field]
    pub image: Asset,
    #[field]
    pub birthday: chrono::NaiveDate,
    pub scratch: Vec<u8>,
}
impl Resource for Cat {}

#[content_type("dog")]
pub struct Dog {
    #[field]
    pub lives: i32,
    #[field]
    pub pack: Vec<Dog>,
}
impl Resource for Dog {}

#[space("cfexampleapi", models = [Cat, Dog], db_version = 4)]
pub struct DemoSpace;
"#;

fn compile(code: &str) -> vault_core::CompileOutput {
    let set = parse_source(code).expect("source should parse");
    Compiler::default().compile(&set)
}

fn messages(output: &vault_core::CompileOutput) -> Vec<String> {
    output.diagnostics.iter().map(|d| d.message.clone()).collect()
}

#[test]
fn test_minimal_cat_end_to_end() {
    let output = compile(
        r#"
        use vault::Resource;
        #[content_type("cat")]
        struct Cat {
            #[field("name")]
            name: String,
        }
        impl Resource for Cat {}
        "#,
    );
    assert!(output.is_success(), "{:?}", output.diagnostics);

    let cat = &output.content_types[&DeclId::new("crate::Cat")];
    assert_eq!(cat.remote_id, "cat");
    assert_eq!(cat.storage_name, format!("entry_{}", hash_for_id("cat")));
    assert_eq!(cat.fields.len(), 1);
    assert_eq!(cat.fields["name"].id, "name");
    assert_eq!(
        cat.fields["name"].kind,
        FieldKind::Scalar {
            storage_type: StorageType::Text
        }
    );
}

#[test]
fn test_full_space() {
    let output = compile(PETS);
    assert!(output.is_success(), "{:?}", output.diagnostics);

    let cat = &output.content_types[&DeclId::new("crate::Cat")];
    let ids: Vec<_> = cat.fields.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["name", "likes", "bestFriend", "image", "birthday"]);
    assert_eq!(cat.fields["bestFriend"].link_target(), Some(LinkTarget::Entry));
    assert_eq!(cat.fields["image"].link_target(), Some(LinkTarget::Asset));
    assert_eq!(
        cat.fields["birthday"].storage_type(),
        Some(StorageType::Date)
    );

    let dog = &output.content_types[&DeclId::new("crate::Dog")];
    match &dog.fields["pack"].kind {
        FieldKind::List {
            element,
            storage_type,
            ..
        } => {
            assert_eq!(*element, ListElement::Link(LinkTarget::Entry));
            assert_eq!(*storage_type, None);
        }
        other => panic!("expected list, got {:?}", other),
    }

    let space = &output.spaces[&DeclId::new("crate::DemoSpace")];
    assert_eq!(space.schema_version, 4);
    assert_eq!(
        space.storage_database_name,
        format!("space_{}", hash_for_id("cfexampleapi"))
    );
    let included: Vec<_> = space
        .included_models
        .iter()
        .map(|m| m.remote_id.as_str())
        .collect();
    assert_eq!(included, vec!["cat", "dog"]);
}

#[test]
fn test_recompile_is_identical() {
    let set = parse_source(PETS).unwrap();
    let compiler = Compiler::default();
    let first = serde_json::to_string(&compiler.compile(&set)).unwrap();
    let second = serde_json::to_string(&compiler.compile(&set)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_empty_content_type_id() {
    let output = compile(
        r#"
        use vault::Resource;
        #[content_type("")]
        struct Cat {}
        impl Resource for Cat {}
        "#,
    );
    assert!(output.content_types.is_empty());
    assert_eq!(
        messages(&output),
        vec!["@ContentType id may not be empty. (crate::Cat)"]
    );
}

#[test]
fn test_content_type_must_be_resource() {
    let output = compile(
        r#"
        #[content_type("cid")]
        struct Test {}
        "#,
    );
    assert_eq!(
        messages(&output),
        vec!["Types annotated with @ContentType must implement \"vault::Resource\". (crate::Test)"]
    );
}

#[test]
fn test_duplicate_field_ids() {
    let output = compile(
        r#"
        use vault::Resource;
        #[content_type("cat")]
        struct Cat {
            #[field]
            name: String,
            #[field("name")]
            nickname: String,
        }
        impl Resource for Cat {}
        "#,
    );
    assert!(output.content_types.is_empty());
    assert_eq!(output.diagnostics.len(), 1);
    assert!(output.diagnostics[0].message.contains("(\"name\")"));
}

#[test]
fn test_list_errors() {
    let output = compile(
        r#"
        use vault::Resource;
        #[content_type("a")]
        struct A {
            #[field]
            raw: Vec,
        }
        impl Resource for A {}

        #[content_type("b")]
        struct B {
            #[field]
            numbers: Vec<i64>,
        }
        impl Resource for B {}
        "#,
    );
    assert_eq!(
        messages(&output),
        vec![
            "List fields must have a type parameter specified. (crate::A.raw)",
            "Invalid list type \"i64\" specified. (crate::B.numbers)",
        ]
    );
}

#[test]
fn test_unsupported_member_type() {
    let output = compile(
        r#"
        use vault::Resource;
        #[content_type("a")]
        struct A {
            #[field]
            big: u64,
        }
        impl Resource for A {}
        "#,
    );
    assert_eq!(
        messages(&output),
        vec!["@Field specified for unsupported type (\"u64\"). (crate::A.big)"]
    );
}

#[test]
fn test_duplicate_models_in_space() {
    let output = compile(
        r#"
        use vault::Resource;
        #[content_type("cat")]
        struct Cat {}
        impl Resource for Cat {}
        #[content_type("cat")]
        struct OtherCat {}
        impl Resource for OtherCat {}

        #[space("demo", models = [Cat, OtherCat])]
        struct Demo;
        "#,
    );
    assert!(output.spaces.is_empty());
    assert_eq!(
        messages(&output),
        vec!["@Space includes multiple models with the same id \"cat\". (crate::Demo)"]
    );
}

#[test]
fn test_empty_space_id_yields_one_diagnostic() {
    for models in ["", "models = []", "models = [Cat]", "models = [Cat, Cat, Missing]"] {
        let code = format!(
            r#"
            use vault::Resource;
            #[content_type("cat")]
            struct Cat {{}}
            impl Resource for Cat {{}}
            #[space("", {models})]
            struct Demo;
            "#
        );
        let output = compile(&code);
        assert!(output.spaces.is_empty());
        assert_eq!(
            messages(&output),
            vec!["@Space id may not be empty. (crate::Demo)"],
            "{models}"
        );
    }
}

#[test]
fn test_unresolved_model_policies() {
    let code = r#"
        use vault::Resource;
        #[content_type("")]
        struct Cat {}
        impl Resource for Cat {}
        #[space("demo", models = [Cat])]
        struct Demo;
    "#;
    let set = parse_source(code).unwrap();

    let reported = Compiler::default().compile(&set);
    assert_eq!(reported.diagnostics.len(), 2);
    assert_eq!(
        reported.diagnostics[1].declaration,
        DeclId::new("crate::Demo")
    );

    let options = CompilerOptions::default().with_unresolved_models(UnresolvedModelPolicy::Skip);
    let skipped = Compiler::new(options).compile(&set);
    assert_eq!(skipped.diagnostics.len(), 1);
    assert!(skipped.spaces.is_empty());
}

#[test]
fn test_manifest_and_source_agree() {
    let from_source = parse_source(PETS).unwrap();
    let json = serde_json::to_string(&from_source).unwrap();
    let from_manifest = DeclarationSet::from_json_str(&json).unwrap();
    assert_eq!(from_source, from_manifest);

    let compiler = Compiler::default();
    let mut output = compiler.compile(&from_manifest);
    let mut emitter = JsonEmitter::new();
    compiler.emit_all(&mut output, &mut emitter);
    assert!(output.is_success());
    let doc = emitter.into_document();
    assert_eq!(doc["crate::DemoSpace"]["included_models"][0], "crate::Cat");
    assert_eq!(doc["crate::Cat"]["generated_type"]["name"], "Cat$$ModelHelper");
}

#[test]
fn test_borrowed_str_members() {
    let output = compile(
        r#"
        use vault::Resource;
        #[content_type("cat")]
        pub struct Cat<'a> {
            #[field]
            name: &'a str,
            #[field]
            tags: Vec<&'a str>,
        }
        impl<'a> Resource for Cat<'a> {}
        "#,
    );
    assert!(output.is_success(), "{:?}", output.diagnostics);
    let cat = &output.content_types[&DeclId::new("crate::Cat")];
    assert_eq!(cat.fields["name"].storage_type(), Some(StorageType::Text));
    assert_eq!(
        cat.fields["tags"].storage_type(),
        Some(StorageType::StringList)
    );
}

#[test]
fn test_self_implementing_type_fails_to_load() {
    let err = parse_source(
        r#"
        #[content_type("cat")]
        pub struct Cat {
            #[field]
            name: String,
        }
        impl Cat for Cat {}
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, vault_core::AppError::Registry(_)));

    let manifest = r#"{
        "types": [
            {"path": "app::A", "superclass": "app::B"},
            {"path": "app::B", "interfaces": ["app::A", "vault::Resource"]}
        ],
        "declarations": [
            {"marker": "content_type", "id": "app::A", "remote_id": "a", "members": []}
        ]
    }"#;
    assert!(DeclarationSet::from_json_str(manifest).is_err());
}
