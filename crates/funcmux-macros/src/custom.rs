//! `#[derive(Extractor)]` and `#[derive(Responder)]`.
//!
//! Both derives only wire the type into classification; the behavior lives
//! in the user's `FromRequest` / `ToResponse` impl.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, parse_macro_input};

use crate::common::{core_path, reject_query_suffix, with_self_bound};

pub fn derive_extractor_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_extractor(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

pub fn derive_responder_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_responder(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn shape(input: &DeriveInput, core: &TokenStream2) -> TokenStream2 {
    match &input.data {
        Data::Enum(_) => quote! { #core::Shape::Any },
        _ => quote! { #core::Shape::Struct },
    }
}

fn expand_extractor(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    reject_query_suffix(input, "Extractor")?;

    let name = &input.ident;
    let core = core_path();
    let shape = shape(input, &core);
    let generics = with_self_bound(&input.generics, &quote! { #core::FromRequest });
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #core::Input for #name #ty_generics #where_clause {
            fn describe() -> #core::TypeDesc {
                #core::TypeDesc::extractor(#core::short_type_name::<Self>(), #shape)
            }

            fn decode(source: #core::InputSource<'_>) -> ::core::result::Result<Self, #core::BoxError> {
                #core::convert::extract::<Self>(source)
            }
        }
    })
}

fn expand_responder(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    reject_query_suffix(input, "Responder")?;

    let name = &input.ident;
    let core = core_path();
    let shape = shape(input, &core);
    let generics = with_self_bound(&input.generics, &quote! { #core::ToResponse });
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #core::Output for #name #ty_generics #where_clause {
            fn describe() -> #core::TypeDesc {
                #core::TypeDesc::responder(#core::short_type_name::<Self>(), #shape)
            }

            fn into_slot(self, _role: #core::OutputRole) -> #core::OutputSlot {
                #core::OutputSlot::Render(::std::boxed::Box::new(#core::convert::Rendered(self)))
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
    })
}
