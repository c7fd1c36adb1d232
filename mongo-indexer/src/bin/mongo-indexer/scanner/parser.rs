//! Rust source file parser using syn to extract IndexedModel definitions.

use anyhow::{Context, Result};
use std::path::Path;
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Expr, Fields, Item, ItemStruct, LitStr, Meta, Token};

use mongo_indexer::FieldDescriptor;

use super::schema::ScannedModel;

const ATTRIBUTE: &str = "mongo_index";

/// Parse a Rust file and extract all IndexedModel definitions.
///
/// # Arguments
/// * `path` - Absolute path to the Rust source file
/// * `relative_path` - Path relative to project root for display
pub fn parse_model_file(path: &Path, relative_path: &str) -> Result<Vec<ScannedModel>> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    parse_model_source(&content, relative_path)
        .with_context(|| format!("Failed to parse models in {}", path.display()))
}

pub(super) fn parse_model_source(content: &str, relative_path: &str) -> Result<Vec<ScannedModel>> {
    let syntax = syn::parse_file(content)?;
    let lines: Vec<&str> = content.lines().collect();

    let mut models = Vec::new();
    collect_items(&syntax.items, &lines, relative_path, &mut models)?;
    Ok(models)
}

/// Walk items, descending into inline `mod { ... }` blocks.
fn collect_items(items: &[Item], lines: &[&str], relative_path: &str, out: &mut Vec<ScannedModel>) -> Result<()> {
    for item in items {
        match item {
            Item::Struct(item_struct) if has_indexed_model_derive(&item_struct.attrs) => {
                // Text search uses the identifier as written, `r#` included.
                let line_num = find_struct_line(lines, &item_struct.ident.to_string()).unwrap_or(1);
                out.push(parse_struct(item_struct, relative_path, line_num)?);
            }
            Item::Mod(item_mod) => {
                if let Some((_, nested)) = &item_mod.content {
                    collect_items(nested, lines, relative_path, out)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Find the line number where a struct is defined
fn find_struct_line(lines: &[&str], struct_name: &str) -> Option<usize> {
    let pattern = format!("struct {struct_name}");
    lines
        .iter()
        .position(|line| {
            line.find(&pattern).is_some_and(|at| {
                // Reject prefixes like `struct UserProfile` when looking for `User`
                line[at + pattern.len()..]
                    .chars()
                    .next()
                    .is_none_or(|ch| !ch.is_alphanumeric() && ch != '_')
            })
        })
        .map(|i| i + 1)
}

/// Check if attributes include derive(IndexedModel)
fn has_indexed_model_derive(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("derive")
            && matches!(&attr.meta, Meta::List(list) if list.tokens.to_string().contains("IndexedModel"))
    })
}

/// Parse a struct definition into a ScannedModel.
///
/// Rejects the same attribute mistakes the derive rejects at compile time.
fn parse_struct(item: &ItemStruct, relative_path: &str, line: usize) -> Result<ScannedModel> {
    let name = item.ident.unraw().to_string();
    let mut model = ScannedModel::new(&name, relative_path.to_string(), line);

    for attr in item.attrs.iter().filter(|attr| attr.path().is_ident(ATTRIBUTE)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(meta.error("collection name must not be empty"));
                }
                model.collection = value.value();
                Ok(())
            } else if meta.path.is_ident("key") || meta.path.is_ident("spec") {
                Err(meta.error("`key` and `spec` belong on fields, not on the struct"))
            } else {
                Err(meta.error("unknown #[mongo_index] option, expected `collection`"))
            }
        })
        .with_context(|| format!("Invalid #[mongo_index] on struct {name}"))?;
    }

    match &item.fields {
        Fields::Named(fields) => {
            for field in &fields.named {
                let Some(ident) = &field.ident else { continue };
                let field_name = ident.unraw().to_string();
                let descriptor_field = parse_field_attrs(&field.attrs, FieldDescriptor::new(&field_name))
                    .with_context(|| format!("Invalid attributes on {name}.{field_name}"))?;
                model.descriptor.push_field(descriptor_field);
            }
        }
        Fields::Unit => {}
        Fields::Unnamed(_) => anyhow::bail!("IndexedModel requires named fields: {name}"),
    }

    Ok(model)
}

/// Read `#[mongo_index(key, spec)]` and the `#[serde(rename)]` fallback.
fn parse_field_attrs(attrs: &[Attribute], mut field: FieldDescriptor) -> syn::Result<FieldDescriptor> {
    let mut serde_rename = None;

    for attr in attrs {
        if attr.path().is_ident(ATTRIBUTE) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("key") {
                    if field.key.is_some() {
                        return Err(meta.error("duplicate `key` in #[mongo_index(...)]"));
                    }
                    let value: LitStr = meta.value()?.parse()?;
                    if value.value().split(',').next().is_none_or(str::is_empty) {
                        return Err(meta.error("`key` must start with a non-empty storage key"));
                    }
                    field.key = Some(value.value());
                } else if meta.path.is_ident("spec") {
                    if field.index.is_some() {
                        return Err(meta.error("duplicate `spec` in #[mongo_index(...)]"));
                    }
                    let value: LitStr = meta.value()?.parse()?;
                    field.index = Some(value.value());
                } else if meta.path.is_ident("collection") {
                    return Err(meta.error("`collection` belongs on the struct, not on a field"));
                } else {
                    return Err(meta.error("unknown #[mongo_index] field option, expected `key` or `spec`"));
                }
                Ok(())
            })?;
        } else if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
                    let value: LitStr = meta.value()?.parse()?;
                    serde_rename = Some(value.value());
                    Ok(())
                } else if meta.path.is_ident("rename") {
                    meta.parse_nested_meta(|inner| {
                        if inner.path.is_ident("serialize") {
                            let value: LitStr = inner.value()?.parse()?;
                            serde_rename = Some(value.value());
                            Ok(())
                        } else {
                            skip_meta_value(&inner)
                        }
                    })
                } else {
                    skip_meta_value(&meta)
                }
            })?;
        }
    }

    if field.key.is_none() {
        field.key = serde_rename;
    }
    Ok(field)
}

fn skip_meta_value(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        let _: Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        let _: proc_macro2::TokenStream = content.parse()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
use mongo_indexer::IndexedModel;
use serde::Serialize;

#[derive(Debug, Serialize, IndexedModel)]
#[mongo_index(collection = "accounts")]
pub struct UserProfile {
    #[mongo_index(key = "_id")]
    pub id: String,
    #[mongo_index(key = "email,omitempty", spec = "unique,asc,name=email_idx")]
    pub email: String,
    #[serde(rename = "createdAt")]
    #[mongo_index(spec = "desc,ttl=3600")]
    pub created_at: i64,
    pub nickname: String,
}

pub struct NotAModel {
    pub value: i32,
}

mod nested {
    #[derive(mongo_indexer::IndexedModel)]
    struct AuditEntry {
        #[serde(default, rename(serialize = "kind", deserialize = "type"))]
        #[mongo_index(spec = "sparse")]
        r#type: String,
    }
}
"#;

    #[test]
    fn test_parses_models_and_nested_modules() {
        let models = parse_model_source(SOURCE, "src/models.rs").unwrap();
        assert_eq!(models.len(), 2);

        let profile = &models[0];
        assert_eq!(profile.name(), "UserProfile");
        assert_eq!(profile.collection, "accounts");
        assert_eq!(profile.source_line, 7);
        assert_eq!(profile.descriptor.fields.len(), 4);
        assert_eq!(profile.descriptor.fields[1].key.as_deref(), Some("email,omitempty"));
        assert_eq!(profile.descriptor.fields[1].index.as_deref(), Some("unique,asc,name=email_idx"));
        assert_eq!(profile.descriptor.fields[2].storage_key(), "createdAt");
        assert_eq!(profile.descriptor.fields[3].index_tag(), None);

        let audit = &models[1];
        assert_eq!(audit.name(), "AuditEntry");
        assert_eq!(audit.collection, "audit_entries");
        assert_eq!(audit.descriptor.fields[0].name, "type");
        assert_eq!(audit.descriptor.fields[0].storage_key(), "kind");
    }

    #[test]
    fn test_explicit_key_beats_serde_rename() {
        let source = r#"
#[derive(IndexedModel)]
struct Item {
    #[serde(rename = "sku_code")]
    #[mongo_index(key = "sku", spec = "unique")]
    sku: String,
}
"#;
        let models = parse_model_source(source, "src/item.rs").unwrap();
        assert_eq!(models[0].descriptor.fields[0].storage_key(), "sku");
    }

    #[test]
    fn test_find_struct_line_matches_whole_name() {
        let lines = vec!["struct UserProfile {", "}", "struct User {"];
        assert_eq!(find_struct_line(&lines, "User"), Some(3));
        assert_eq!(find_struct_line(&lines, "Missing"), None);
    }

    #[test]
    fn test_raw_struct_names_are_unraw() {
        let source = r#"
#[derive(IndexedModel)]
struct r#Match {
    #[mongo_index(spec = "asc")]
    r#ref: String,
}
"#;
        let models = parse_model_source(source, "src/match.rs").unwrap();
        assert_eq!(models[0].name(), "Match");
        assert_eq!(models[0].collection, "matches");
        assert_eq!(models[0].source_line, 3);
        assert_eq!(models[0].descriptor.fields[0].name, "ref");
    }

    #[test]
    fn test_rejects_attributes_the_derive_rejects() {
        let cases = [
            ("#[mongo_index(key = \"a\", key = \"b\")] a: String,", "duplicate `key`"),
            ("#[mongo_index(spec = \"asc\")] #[mongo_index(spec = \"desc\")] a: String,", "duplicate `spec`"),
            ("#[mongo_index(unique)] a: String,", "unknown #[mongo_index] field option"),
            ("#[mongo_index(collection = \"x\")] a: String,", "belongs on the struct"),
            ("#[mongo_index(key = \",omitempty\")] a: String,", "non-empty storage key"),
        ];
        for (field, expected) in cases {
            let source = format!("#[derive(IndexedModel)]\nstruct Bad {{\n    {field}\n}}\n");
            let err = parse_model_source(&source, "src/bad.rs").unwrap_err();
            assert!(format!("{err:#}").contains(expected), "{field}: {err:#}");
        }
    }

    #[test]
    fn test_rejects_invalid_container_attributes() {
        for (attr, expected) in [
            ("#[mongo_index(collection = \"\")]", "must not be empty"),
            ("#[mongo_index(spec = \"asc\")]", "belong on fields"),
            ("#[mongo_index(database = \"x\")]", "expected `collection`"),
        ] {
            let source = format!("#[derive(IndexedModel)]\n{attr}\nstruct Bad {{ a: String }}\n");
            let err = parse_model_source(&source, "src/bad.rs").unwrap_err();
            assert!(format!("{err:#}").contains(expected), "{attr}: {err:#}");
        }

        let tuple = "#[derive(IndexedModel)]\nstruct Pair(String, String);\n";
        assert!(parse_model_source(tuple, "src/pair.rs").is_err());
    }

    #[test]
    fn test_invalid_source_is_an_error() {
        assert!(parse_model_source("struct {", "src/broken.rs").is_err());
    }
}
