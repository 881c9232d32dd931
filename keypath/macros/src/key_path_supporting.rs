use crate::CRATE;
use proc_macro2::{Literal, TokenStream, TokenTree};
use quote::quote;
use syn::{parse_quote, spanned::Spanned, Attribute, Data, DeriveInput, Error, Fields, Ident, LitStr};

const KEYPATH_ATTR_PATH: &str = "keypath";
const SKIP_ATTR_PATH: &str = "skip";
const RENAME_ATTR_PATH: &str = "rename";
const OPAQUE_ATTR_PATH: &str = "opaque";
const COMPUTED_ATTR_PATH: &str = "computed";

enum FieldIdent {
    Named(Ident),
    Unnamed(usize),
}

#[derive(Default)]
struct FieldAttrs {
    /// `true` if this field is not a member.
    skip: bool,
    rename: Option<LitStr>,
    opaque: bool,
}

struct Field {
    ident: FieldIdent,
    attrs: FieldAttrs,
}

impl Field {
    fn parse_ast(field: &syn::Field, index: usize) -> Result<Self, Error> {
        let ident = match field.ident.as_ref() {
            Some(ident) => FieldIdent::Named(ident.clone()),
            None => FieldIdent::Unnamed(index),
        };

        let mut attrs = FieldAttrs::default();
        for attr in field.attrs.iter().filter(|attr| attr.path().is_ident(KEYPATH_ATTR_PATH)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident(SKIP_ATTR_PATH) {
                    if attrs.skip {
                        return Err(meta.error("duplicate attribute"));
                    }
                    attrs.skip = true;
                } else if meta.path.is_ident(OPAQUE_ATTR_PATH) {
                    if attrs.opaque {
                        return Err(meta.error("duplicate attribute"));
                    }
                    attrs.opaque = true;
                } else if meta.path.is_ident(RENAME_ATTR_PATH) {
                    if attrs.rename.is_some() {
                        return Err(meta.error("duplicate attribute"));
                    }
                    attrs.rename = Some(meta.value()?.parse()?);
                } else {
                    return Err(meta.error("unknown attribute, expected `skip`, `rename` or `opaque`"));
                }
                Ok(())
            })?;
        }

        if attrs.skip && (attrs.opaque || attrs.rename.is_some()) {
            return Err(Error::new(field.span(), "`skip` cannot be combined with other attributes"));
        }

        Ok(Field { ident, attrs })
    }

    /// Name of the member.
    fn member_name(&self) -> String {
        if let Some(ref rename) = self.attrs.rename {
            return rename.value();
        }
        match self.ident {
            FieldIdent::Named(ref ident) => ident.to_string().trim_start_matches("r#").to_owned(),
            FieldIdent::Unnamed(index) => index.to_string(),
        }
    }

    fn ident_tokens(&self) -> TokenTree {
        match self.ident {
            FieldIdent::Named(ref ident) => ident.clone().into(),
            FieldIdent::Unnamed(index) => Literal::usize_unsuffixed(index).into(),
        }
    }
}

/// Parses `#[keypath(computed(a, b))]` on the struct.
fn parse_computed_members(attrs: &[Attribute]) -> Result<Vec<Ident>, Error> {
    let mut computed = Vec::new();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident(KEYPATH_ATTR_PATH)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(COMPUTED_ATTR_PATH) {
                meta.parse_nested_meta(|method| {
                    let ident = method
                        .path
                        .get_ident()
                        .cloned()
                        .ok_or_else(|| method.error("expected a method name"))?;
                    computed.push(ident);
                    Ok(())
                })
            } else {
                Err(meta.error("unknown attribute, expected `computed`"))
            }
        })?;
    }
    Ok(computed)
}

fn derive(input: DeriveInput) -> Result<TokenStream, Error> {
    // filter out enums and unions
    let fields = match input.data {
        Data::Struct(ref s) => &s.fields,
        Data::Enum(_) | Data::Union(_) => {
            return Err(Error::new(
                input.span(),
                "`KeyPathSupporting` can only be derived on structs",
            ));
        }
    };

    let fields = match fields {
        Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
        Fields::Unnamed(unnamed) => unnamed.unnamed.iter().collect::<Vec<_>>(),
        Fields::Unit => {
            return Err(Error::new(
                input.span(),
                "`KeyPathSupporting` cannot be derived on unit structs",
            ));
        }
    };

    let fields = fields
        .into_iter()
        .enumerate()
        .map(|(i, field)| Field::parse_ast(field, i))
        .collect::<Result<Vec<_>, _>>()?;
    let computed = parse_computed_members(&input.attrs)?;

    let mut names: Vec<String> = Vec::new();
    let mut arms = Vec::new();

    for field in fields.iter().filter(|field| !field.attrs.skip) {
        let name = field.member_name();
        let access = field.ident_tokens();
        let read = if field.attrs.opaque {
            quote! { #CRATE::Value::opaque(::std::sync::Arc::clone(&self.#access)) }
        } else {
            quote! { #CRATE::ToValue::to_value(&self.#access) }
        };
        arms.push(quote! {
            #name => ::std::result::Result::Ok(#read),
        });
        names.push(name);
    }

    for method in computed.iter() {
        let name = method.to_string().trim_start_matches("r#").to_owned();
        arms.push(quote! {
            #name => self.#method().map(|value| #CRATE::ToValue::to_value(&value)),
        });
        names.push(name);
    }

    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Err(Error::new(
                input.ident.span(),
                format!("more than one member named `{name}`"),
            ));
        }
    }

    // objects are shared across threads and outlive any borrow
    let mut generics = input.generics.clone();
    let type_params: Vec<Ident> = generics.type_params().map(|param| param.ident.clone()).collect();
    let predicates = &mut generics.make_where_clause().predicates;
    for param in type_params {
        predicates.push(parse_quote!(#param: ::std::marker::Send + ::std::marker::Sync + 'static));
    }

    let ident = &input.ident;
    let (impl_generics, type_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #CRATE::KeyPathSupporting for #ident #type_generics #where_clause {
            fn read_member(&self, key: &str) -> #CRATE::Result<#CRATE::Value> {
                match key {
                    #(#arms)*
                    _ => ::std::result::Result::Err(#CRATE::Error::missing_member::<Self>(key)),
                }
            }

            fn member_names(&self) -> &'static [&'static str] {
                &[#(#names),*]
            }
        }
    })
}

pub(crate) fn derive_key_path_supporting_impl(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match derive(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
