#[allow(unused_imports)]
use super::*;

pub(crate) struct ParsedField {
    pub name: String,
    /// Raw storage-key annotation from `key = "..."` or `#[serde(rename = "...")]`.
    pub key: Option<String>,
    /// Raw index annotation from `spec = "..."`.
    pub spec: Option<String>,
}

impl ParsedField {
    pub(crate) fn from_field(field: &Field) -> Result<Self> {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "IndexedModel requires named fields"))?;
        let name = ident.unraw().to_string();

        let mut key: Option<LitStr> = None;
        let mut spec: Option<LitStr> = None;
        let mut serde_rename: Option<String> = None;

        for attr in &field.attrs {
            if attr.path().is_ident(ATTRIBUTE) {
                Self::parse_field_attr(attr, &mut key, &mut spec)?;
            } else if attr.path().is_ident("serde") {
                Self::parse_serde_attr(attr, &mut serde_rename)?;
            }
        }

        Ok(Self {
            name,
            key: key.map(|lit| lit.value()).or(serde_rename),
            spec: spec.map(|lit| lit.value()),
        })
    }

    fn parse_field_attr(attr: &Attribute, key: &mut Option<LitStr>, spec: &mut Option<LitStr>) -> Result<()> {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("key") {
                if key.is_some() {
                    return Err(meta.error("duplicate `key` in #[mongo_index(...)]"));
                }
                let value: LitStr = meta.value()?.parse()?;
                if value.value().split(',').next().is_none_or(str::is_empty) {
                    return Err(Error::new(value.span(), "`key` must start with a non-empty storage key"));
                }
                *key = Some(value);
            } else if meta.path.is_ident("spec") {
                if spec.is_some() {
                    return Err(meta.error("duplicate `spec` in #[mongo_index(...)]"));
                }
                *spec = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("collection") {
                return Err(meta.error("`collection` belongs on the struct, not on a field"));
            } else {
                return Err(meta.error("unknown #[mongo_index] field option, expected `key` or `spec`"));
            }
            Ok(())
        })
    }

    /// Only `rename` is read; everything else serde accepts is skipped.
    fn parse_serde_attr(attr: &Attribute, rename: &mut Option<String>) -> Result<()> {
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("rename") {
                return skip_meta_value(&meta);
            }
            if meta.input.peek(Token![=]) {
                let value: LitStr = meta.value()?.parse()?;
                *rename = Some(value.value());
            } else {
                // rename(serialize = "...", deserialize = "...")
                meta.parse_nested_meta(|inner| {
                    if inner.path.is_ident("serialize") {
                        let value: LitStr = inner.value()?.parse()?;
                        *rename = Some(value.value());
                        Ok(())
                    } else {
                        skip_meta_value(&inner)
                    }
                })?;
            }
            Ok(())
        })
    }

    pub(crate) fn to_descriptor_tokens(&self) -> TokenStream2 {
        let name = LitStr::new(&self.name, Span::call_site());
        let key = option_tokens(self.key.as_deref());
        let index = option_tokens(self.spec.as_deref());
        quote! {
            ::mongo_indexer::FieldDescriptor {
                name: ::std::string::String::from(#name),
                key: #key,
                index: #index,
            }
        }
    }
}

fn option_tokens(value: Option<&str>) -> TokenStream2 {
    match value {
        Some(value) => {
            let lit = LitStr::new(value, Span::call_site());
            quote! { ::std::option::Option::Some(::std::string::String::from(#lit)) }
        }
        None => quote! { ::std::option::Option::None },
    }
}
