use mongo_indexer::{
    FieldDescriptor, IndexDirection, IndexedModel, Indexer, ModelShape, parse_model_indexes, plan_registered,
    registry::{find_model, models_for_collection},
};
use serde::{Deserialize, Serialize};

#[derive(IndexedModel, Serialize, Deserialize, Default)]
#[mongo_index(collection = "users")]
struct User {
    #[mongo_index(key = "_id")]
    id: String,
    #[mongo_index(key = "email,omitempty", spec = "unique,asc,name=email_idx")]
    email: String,
    #[serde(rename = "createdAt")]
    #[mongo_index(spec = "desc,ttl=3600")]
    created_at: i64,
    nickname: Option<String>,
}

#[derive(IndexedModel, Serialize, Default)]
struct AuditEntry {
    #[serde(rename(serialize = "kind", deserialize = "type"))]
    #[mongo_index(spec = "sparse")]
    r#type: String,
    #[serde(default)]
    #[mongo_index(spec = r#"partial={"level":{"$gte":3}},asc"#)]
    level: i32,
}

#[derive(IndexedModel, Default)]
#[mongo_index(collection = "users")]
struct UserProjection {
    #[mongo_index(key = "email", spec = "unique")]
    email: String,
}

#[derive(IndexedModel)]
struct Marker;

#[derive(IndexedModel, Default)]
struct Wrapper<T: Default> {
    #[mongo_index(spec = "asc")]
    inner: T,
}

#[test]
fn descriptor_lists_fields_in_declaration_order() {
    let descriptor = User::default().model_descriptor();
    assert_eq!(descriptor.name, "User");
    assert_eq!(descriptor.shape, ModelShape::Record);
    assert_eq!(
        descriptor.fields,
        vec![
            FieldDescriptor::new("id").key("_id"),
            FieldDescriptor::new("email")
                .key("email,omitempty")
                .index("unique,asc,name=email_idx"),
            FieldDescriptor::new("created_at").key("createdAt").index("desc,ttl=3600"),
            FieldDescriptor::new("nickname"),
        ]
    );
}

#[test]
fn derived_model_compiles_to_specifications() {
    let specs = parse_model_indexes(&User::default()).unwrap();
    assert_eq!(specs.len(), 2);

    assert_eq!(specs[0].key, "email");
    assert!(specs[0].options.unique);
    assert_eq!(specs[0].options.name.as_deref(), Some("email_idx"));

    assert_eq!(specs[1].key, "createdAt");
    assert_eq!(specs[1].direction(), IndexDirection::Descending);
    assert_eq!(specs[1].options.ttl_seconds, Some(3600));
    assert_eq!(specs[1].index_name(), "createdAt_-1");
}

#[test]
fn serde_rename_and_raw_identifiers() {
    let specs = parse_model_indexes(&AuditEntry::default()).unwrap();
    assert_eq!(specs[0].key, "kind");
    assert!(specs[0].options.sparse);

    assert_eq!(specs[1].key, "level");
    let filter = specs[1].options.partial_filter.as_ref().unwrap();
    assert_eq!(filter["level"]["$gte"], 3);
}

#[test]
fn unit_structs_have_no_indexes() {
    assert!(parse_model_indexes(&Marker).unwrap().is_empty());
}

#[test]
fn generic_structs_implement_the_trait() {
    let wrapper = Wrapper::<u8>::default();
    let specs = parse_model_indexes(&wrapper).unwrap();
    assert_eq!(specs[0].key, "inner");
    assert_eq!(wrapper.model_descriptor().name, "Wrapper");
}

#[test]
fn registry_contains_non_generic_models() {
    let user = find_model("User").expect("User registered");
    assert_eq!(user.collection, "users");
    assert_eq!((user.describe)(), User::default().model_descriptor());

    let audit = find_model("AuditEntry").expect("AuditEntry registered");
    assert_eq!(audit.collection, "audit_entries");

    assert_eq!(find_model("Marker").map(|m| m.collection), Some("markers"));
    assert!(find_model("Wrapper").is_none());

    let models: Vec<_> = models_for_collection("users").iter().map(|m| m.model).collect();
    assert_eq!(models, vec!["User", "UserProjection"]);
}

#[test]
fn plan_registered_is_sorted() {
    let planned = plan_registered(&Indexer::new());
    let order: Vec<_> = planned.iter().map(|p| (p.collection, p.model)).collect();
    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);

    let user = planned.iter().find(|p| p.model == "User").unwrap();
    assert_eq!(user.specs.as_ref().unwrap().len(), 2);
}
