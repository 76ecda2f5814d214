//! Procedural macros for testkit-mock
//!
//! This crate provides the `#[testkit_mock::template]` attribute, which
//! derives `testkit_mock::Mockable` from an inherent `impl` block.
//!
//! # Example
//!
//! ```rust,ignore
//! use testkit_mock::prelude::*;
//!
//! struct MyObject;
//!
//! #[testkit_mock::template]
//! impl MyObject {
//!     fn greeting(&self) -> &'static str { "hello" }
//!     fn farewell(&self) -> &'static str { "goodbye" }
//! }
//!
//! let m = mock_of::<MyObject>();
//! m.invoke("greeting", args![]).unwrap();
//! verify(&m).method("greeting").with(matchers![]).unwrap();
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input, Ident, ImplItem, ItemImpl, Lit, Token, Type,
};

/// Configuration options for the template attribute.
#[derive(Default)]
struct TemplateConfig {
    /// Type name reported by the template (default: the impl's type name)
    name: Option<String>,
}

impl Parse for TemplateConfig {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut config = TemplateConfig::default();

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "name" => {
                    let lit: Lit = input.parse()?;
                    match lit {
                        Lit::Str(s) => config.name = Some(s.value()),
                        other => {
                            return Err(syn::Error::new_spanned(other, "name must be a string"));
                        }
                    }
                }
                _ => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {ident}"),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(config)
    }
}

/// Names of the methods that take a `self` receiver, in declaration order.
fn receiver_methods(input: &ItemImpl) -> Vec<String> {
    input
        .items
        .iter()
        .filter_map(|item| match item {
            ImplItem::Fn(method) if method.sig.receiver().is_some() => {
                Some(method.sig.ident.to_string())
            }
            _ => None,
        })
        .collect()
}

/// The last path segment of the impl's self type.
fn type_name(ty: &Type) -> Option<String> {
    if let Type::Path(type_path) = ty {
        type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
    } else {
        None
    }
}

/// Derive `Mockable` from an inherent `impl` block.
///
/// Every method with a `self` receiver becomes a template method; associated
/// functions such as constructors are skipped. The block itself is emitted
/// unchanged.
///
/// ```rust,ignore
/// #[testkit_mock::template]
/// impl MyObject {
///     fn new() -> Self { MyObject }              // skipped
///     fn greeting(&self) -> String { .. }        // "greeting"
/// }
///
/// #[testkit_mock::template(name = "Greeter")]
/// impl GreeterImpl {
///     fn wave(&self) {}
/// }
/// ```
///
/// # Configuration Options
///
/// - `name = "..."` - Type name used in descriptions such as `instance of Greeter`
#[proc_macro_attribute]
pub fn template(attr: TokenStream, item: TokenStream) -> TokenStream {
    let config = parse_macro_input!(attr as TemplateConfig);
    let input = parse_macro_input!(item as ItemImpl);

    expand_template(config, input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_template(config: TemplateConfig, input: ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[template] must be applied to an inherent impl block",
        ));
    }

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[template] does not support generic impl blocks",
        ));
    }

    let self_ty = &input.self_ty;
    let name = match config.name.or_else(|| type_name(self_ty)) {
        Some(name) => name,
        None => {
            return Err(syn::Error::new_spanned(
                self_ty,
                "cannot infer a type name; use #[template(name = \"...\")]",
            ));
        }
    };
    let methods = receiver_methods(&input);

    Ok(quote! {
        #input

        impl ::testkit_mock::Mockable for #self_ty {
            fn template() -> ::testkit_mock::Template {
                ::testkit_mock::Template::builder_for::<Self>(#name)
                    #(.method(#methods))*
                    .build()
            }
        }
    })
}
