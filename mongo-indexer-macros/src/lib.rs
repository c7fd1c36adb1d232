use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{
    Attribute, Data, DeriveInput, Error, Expr, Field, Fields, Generics, Ident, LitStr, Result, Token, parenthesized,
    parse_macro_input, spanned::Spanned,
};

mod parsed;

use parsed::ParsedModel;

/// Derive `mongo_indexer::IndexedModel` from `#[mongo_index(...)]` attributes.
///
/// Field options:
/// - `key = "email,omitempty"`: storage-key annotation; the first comma
///   segment is the key. Falls back to `#[serde(rename = "...")]`, then to the
///   lower-cased field name.
/// - `spec = "unique,asc,name=email_idx"`: index annotation. Fields without it
///   are not indexed.
///
/// Container option:
/// - `collection = "users"`: collection used by the model registry. Defaults
///   to the pluralized snake_case struct name.
///
/// ```text
/// #[derive(IndexedModel)]
/// #[mongo_index(collection = "users")]
/// struct User {
///     #[mongo_index(key = "_id")]
///     id: String,
///     #[mongo_index(key = "email,omitempty", spec = "unique,asc,name=email_idx")]
///     email: String,
/// }
/// ```
#[proc_macro_derive(IndexedModel, attributes(mongo_index))]
pub fn derive_indexed_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match ParsedModel::from_input(&input) {
        Ok(parsed) => parsed.emit().into(),
        Err(err) => err.to_compile_error().into(),
    }
}
