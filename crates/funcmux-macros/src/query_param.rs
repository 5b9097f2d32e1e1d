//! `#[derive(QueryParam)]` implementation.
//!
//! Accepts a newtype (tuple or single named field) over `String` or a
//! primitive integer and generates an `Input` impl that reads the value from
//! the query-parameter source the classifier assigns to it.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Type, parse_macro_input};

use crate::common::{QUERY_SUFFIX, core_path};

const INTEGERS: &[&str] = &[
    "i8", "i16", "i32", "i64", "isize", "u8", "u16", "u32", "u64", "usize",
];

enum Kind {
    Str,
    Int,
}

pub fn derive_query_param_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;
    let name_str = name.to_string();
    if !name_str.ends_with(QUERY_SUFFIX) {
        return Err(syn::Error::new_spanned(
            name,
            format!("QueryParam types must be named `*{QUERY_SUFFIX}`"),
        ));
    }
    if name_str.len() == QUERY_SUFFIX.len() {
        return Err(syn::Error::new_spanned(
            name,
            format!("`{QUERY_SUFFIX}` alone does not name a parameter; add a prefix"),
        ));
    }
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "QueryParam types cannot be generic",
        ));
    }

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "QueryParam can only be derived for newtype structs",
        ));
    };

    let (field_ty, construct) = match &data.fields {
        Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
            (&fields.unnamed[0].ty, quote! { Self })
        }
        Fields::Named(fields) if fields.named.len() == 1 => {
            let field = &fields.named[0];
            let ident = &field.ident;
            (&field.ty, quote! { |value| Self { #ident: value } })
        }
        _ => {
            return Err(syn::Error::new_spanned(
                &data.fields,
                "QueryParam types must have exactly one field",
            ));
        }
    };

    let core = core_path();
    let (shape, decode) = match kind_of(field_ty)? {
        Kind::Str => (
            quote! { #core::Shape::Str },
            quote! { #core::convert::query_text::<Self>(source).map(#construct) },
        ),
        Kind::Int => (
            quote! { #core::Shape::Int },
            quote! { #core::convert::query_int::<Self, #field_ty>(source).map(#construct) },
        ),
    };

    Ok(quote! {
        impl #core::Input for #name {
            fn describe() -> #core::TypeDesc {
                #core::TypeDesc::new(#name_str, #shape)
            }

            fn decode(source: #core::InputSource<'_>) -> ::core::result::Result<Self, #core::BoxError> {
                #decode
            }
        }
    })
}

fn kind_of(ty: &Type) -> Result<Kind, syn::Error> {
    if let Type::Path(path) = ty {
        if path.qself.is_none() {
            if let Some(last) = path.path.segments.last() {
                if last.arguments.is_empty() {
                    let ident = last.ident.to_string();
                    if ident == "String" {
                        return Ok(Kind::Str);
                    }
                    if INTEGERS.contains(&ident.as_str()) {
                        return Ok(Kind::Int);
                    }
                }
            }
        }
    }
    Err(syn::Error::new_spanned(
        ty,
        "QueryParam field must be `String` or a primitive integer type",
    ))
}
