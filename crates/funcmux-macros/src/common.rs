//! Helpers shared by the derives.

use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, Generics, WherePredicate, parse_quote};

/// Suffix marking a query parameter type.
pub const QUERY_SUFFIX: &str = "QueryParam";

/// Path to the core crate as re-exported by the facade.
pub fn core_path() -> TokenStream2 {
    quote! { ::funcmux::core }
}

/// Path to serde as re-exported by the facade.
pub fn serde_path() -> TokenStream2 {
    quote! { ::funcmux::__serde }
}

/// Types named `*QueryParam` are reserved for `#[derive(QueryParam)]`.
pub fn reject_query_suffix(input: &DeriveInput, derive: &str) -> Result<(), syn::Error> {
    if input.ident.to_string().ends_with(QUERY_SUFFIX) {
        return Err(syn::Error::new_spanned(
            &input.ident,
            format!(
                "{derive} cannot be derived for a type named `*{QUERY_SUFFIX}`; \
                 such types are classified as query parameters, use #[derive(QueryParam)]"
            ),
        ));
    }
    Ok(())
}

/// Clone `generics` with `Self: <bounds>` added to the where clause.
pub fn with_self_bound(generics: &Generics, bounds: &TokenStream2) -> Generics {
    let mut generics = generics.clone();
    let predicate: WherePredicate = parse_quote! { Self: #bounds };
    generics.make_where_clause().predicates.push(predicate);
    generics
}
