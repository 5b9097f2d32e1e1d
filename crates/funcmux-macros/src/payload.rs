//! `#[derive(Payload)]` implementation.
//!
//! # Supported Attributes
//!
//! - `#[payload(decode)]` - only generate `Input` (request body)
//! - `#[payload(encode)]` - only generate `Output`/`Outputs` (response body)
//!
//! Without an attribute both directions are generated.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, parse_macro_input};

use crate::common::{core_path, reject_query_suffix, serde_path, with_self_bound};

#[derive(Debug, Clone, Copy)]
struct Directions {
    decode: bool,
    encode: bool,
}

pub fn derive_payload_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    reject_query_suffix(input, "Payload")?;
    if let Data::Union(_) = &input.data {
        return Err(syn::Error::new_spanned(
            input,
            "Payload cannot be derived for unions",
        ));
    }

    let directions = parse_directions(&input.attrs)?;
    let name = &input.ident;
    let core = core_path();
    let serde = serde_path();
    let shape = match &input.data {
        Data::Enum(_) => quote! { #core::Shape::Any },
        _ => quote! { #core::Shape::Struct },
    };

    let mut tokens = TokenStream2::new();

    if directions.decode {
        let generics = with_self_bound(
            &input.generics,
            &quote! { #serde::de::DeserializeOwned + ::core::marker::Send + 'static },
        );
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
        tokens.extend(quote! {
            impl #impl_generics #core::Input for #name #ty_generics #where_clause {
                fn describe() -> #core::TypeDesc {
                    #core::TypeDesc::new(#core::short_type_name::<Self>(), #shape)
                }

                fn decode(source: #core::InputSource<'_>) -> ::core::result::Result<Self, #core::BoxError> {
                    #core::convert::decode_json(source)
                }
            }
        });
    }

    if directions.encode {
        let generics = with_self_bound(
            &input.generics,
            &quote! { #serde::Serialize + ::core::marker::Send + 'static },
        );
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
        tokens.extend(quote! {
            impl #impl_generics #core::Output for #name #ty_generics #where_clause {
                fn describe() -> #core::TypeDesc {
                    #core::TypeDesc::new(#core::short_type_name::<Self>(), #shape)
                }

                fn into_slot(self, _role: #core::OutputRole) -> #core::OutputSlot {
                    #core::OutputSlot::Render(::std::boxed::Box::new(#core::convert::JsonBody(self)))
                }
            }

            impl #impl_generics #core::Outputs for #name #ty_generics #where_clause {
                fn describe() -> ::std::vec::Vec<#core::TypeDesc> {
                    #core::convert::single_describe::<Self>()
                }

                fn into_slots(self, roles: &[#core::OutputRole]) -> ::std::vec::Vec<#core::OutputSlot> {
                    #core::convert::single_slot(self, roles)
                }
            }
        });
    }

    Ok(tokens)
}

fn parse_directions(attrs: &[Attribute]) -> Result<Directions, syn::Error> {
    let mut decode = false;
    let mut encode = false;
    for attr in attrs {
        if !attr.path().is_ident("payload") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("decode") {
                decode = true;
                Ok(())
            } else if meta.path.is_ident("encode") {
                encode = true;
                Ok(())
            } else {
                Err(meta.error("expected `decode` or `encode`"))
            }
        })?;
    }

    if !decode && !encode {
        return Ok(Directions {
            decode: true,
            encode: true,
        });
    }
    Ok(Directions { decode, encode })
}
