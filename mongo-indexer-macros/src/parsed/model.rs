#[allow(unused_imports)]
use super::*;

pub(crate) struct ParsedModel {
    name: Ident,
    generics: Generics,
    collection: String,
    fields: Vec<ParsedField>,
}

impl ParsedModel {
    pub(crate) fn from_input(input: &DeriveInput) -> Result<Self> {
        let mut collection: Option<String> = None;

        for attr in &input.attrs {
            if attr.path().is_ident(ATTRIBUTE) {
                Self::parse_container_attr(attr, &mut collection)?;
            }
        }

        let fields = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => {
                    let mut parsed = Vec::new();
                    for field in &named.named {
                        parsed.push(ParsedField::from_field(field)?);
                    }
                    parsed
                }
                Fields::Unit => Vec::new(),
                Fields::Unnamed(_) => {
                    return Err(Error::new(input.ident.span(), "IndexedModel requires named fields"));
                }
            },
            _ => return Err(Error::new(input.ident.span(), "IndexedModel can only be derived for structs")),
        };

        let name = input.ident.clone();
        let collection = collection.unwrap_or_else(|| pluralize(&to_snake_case(&name.unraw().to_string())));

        Ok(Self {
            name,
            generics: input.generics.clone(),
            collection,
            fields,
        })
    }

    fn parse_container_attr(attr: &Attribute, collection: &mut Option<String>) -> Result<()> {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(Error::new(value.span(), "collection name must not be empty"));
                }
                *collection = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("key") || meta.path.is_ident("spec") {
                Err(meta.error("`key` and `spec` belong on fields, not on the struct"))
            } else {
                Err(meta.error("unknown #[mongo_index] option, expected `collection`"))
            }
        })
    }

    pub(crate) fn emit(&self) -> TokenStream2 {
        let name = &self.name;
        let (impl_generics, ty_generics, where_clause) = self.generics.split_for_impl();
        let model_lit = LitStr::new(&name.unraw().to_string(), Span::call_site());
        let collection_lit = LitStr::new(&self.collection, Span::call_site());
        let field_inits = self.fields.iter().map(ParsedField::to_descriptor_tokens);

        // Generic models cannot be submitted to the inventory.
        let registration = if self.generics.params.is_empty() {
            quote! {
                ::mongo_indexer::inventory::submit! {
                    ::mongo_indexer::ModelRegistration {
                        model: #model_lit,
                        collection: #collection_lit,
                        describe,
                    }
                }
            }
        } else {
            TokenStream2::new()
        };

        quote! {
            const _: () = {
                fn describe() -> ::mongo_indexer::ModelDescriptor {
                    ::mongo_indexer::ModelDescriptor::record(#model_lit)
                        #(.field(#field_inits))*
                }

                impl #impl_generics ::mongo_indexer::IndexedModel for #name #ty_generics #where_clause {
                    fn model_descriptor(&self) -> ::mongo_indexer::ModelDescriptor {
                        describe()
                    }
                }

                #registration
            };
        }
    }
}
