//! The `#[callback]` attribute.
//!
//! Keeps the annotated function as written and submits a
//! `NamedCallback` pointing at a generated shim, so the function can be
//! resolved by name when a snapshot is loaded.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{FnArg, Ident, ItemFn, LitStr, Token, parse::Parse};

/// Arguments for the `#[callback]` macro.
pub(crate) struct CallbackArgs {
    /// Explicit registration name.
    pub name: Option<LitStr>,
}

impl Parse for CallbackArgs {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let mut name = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "name" => {
                    let lit: LitStr = input.parse()?;
                    if !is_valid_name(&lit.value()) {
                        return Err(syn::Error::new(
                            lit.span(),
                            "callback name must be a `::`-separated path of identifiers",
                        ));
                    }
                    name = Some(lit);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(CallbackArgs { name })
    }
}

fn is_valid_name(name: &str) -> bool {
    let starts = |c: char| c == '_' || c.is_ascii_alphabetic() || !c.is_ascii();
    !name.is_empty()
        && name.split("::").all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(first) if starts(first))
                && chars.all(|c| starts(c) || c.is_ascii_digit())
        })
}

pub(crate) fn expand(args: CallbackArgs, input: ItemFn) -> syn::Result<TokenStream> {
    let sig = &input.sig;
    let fn_name = &sig.ident;

    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "callback functions must not be async",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "callback functions must not be generic",
        ));
    }
    if let Some(receiver) = sig.inputs.iter().find(|arg| matches!(arg, FnArg::Receiver(_))) {
        return Err(syn::Error::new_spanned(
            receiver,
            "callback functions cannot take self",
        ));
    }
    if sig.inputs.len() != 2 {
        return Err(syn::Error::new_spanned(
            &sig.inputs,
            "callback functions take (event: &str, payload: &Payload)",
        ));
    }

    let registered_name = match &args.name {
        Some(lit) => quote! { #lit },
        None => quote! { ::core::concat!(::core::module_path!(), "::", ::core::stringify!(#fn_name)) },
    };
    let shim = format_ident!("__waypost_callback_{}", fn_name);

    Ok(quote! {
        #input

        #[doc(hidden)]
        #[allow(non_snake_case)]
        fn #shim(
            event: &str,
            payload: &::waypost::Payload,
        ) -> ::core::result::Result<(), ::waypost::BoxError> {
            ::waypost::IntoListenerResult::into_listener_result(#fn_name(event, payload))
        }

        ::waypost::inventory::submit! {
            ::waypost::events::NamedCallback::new(#registered_name, #shim)
        }
    })
}
