/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */
#![forbid(unsafe_code)]

//! Courier Macro Library
//!
//! Procedural macros for declaring payload types carried inside brokered messages.
//!
//! ```ignore
//! // Payload routed in-process only
//! #[courier_message]
//! pub struct Ping;
//!
//! // Payload that also needs serde support
//! #[courier_message(serde)]
//! pub struct PriceQuery {
//!     pub symbol: String,
//! }
//! ```

use proc_macro::TokenStream;

use quote::quote;
use syn::{parse_macro_input, DeriveInput};

fn has_derive(input: &DeriveInput, trait_name: &str) -> bool {
    input.attrs.iter().any(|attr| {
        if attr.path().is_ident("derive") {
            let mut found = false;
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident(trait_name) {
                    found = true;
                }
                Ok(())
            });
            found
        } else {
            false
        }
    })
}

/// Options parsed from `#[courier_message(...)]`.
#[derive(Default)]
struct MessageOptions {
    /// Derive `serde::Serialize` and `serde::Deserialize` as well.
    serde: bool,
}

impl MessageOptions {
    fn parse(attr: &TokenStream) -> Self {
        let mut options = Self::default();
        let attr_string = attr.to_string();
        for part in attr_string.split(',') {
            if part.trim() == "serde" {
                options.serde = true;
            }
        }
        options
    }
}

/// Declares a type as a payload that can travel inside a `BrokeredMessage`.
///
/// Payloads must be `Clone + Debug + Send + Sync + 'static` so that they satisfy the
/// blanket `CourierMessage` implementation. This attribute adds the missing derives and
/// a compile-time assertion on the thread-safety bounds.
///
/// # Basic Usage
///
/// ```ignore
/// use courier_macro::courier_message;
///
/// #[courier_message]
/// pub struct Pong {
///     pub sequence: u64,
/// }
/// ```
///
/// This expands to:
/// - `#[derive(Clone, Debug)]` (only the traits not already present)
/// - A compile-time assertion that the type is `Send + Sync + 'static`
///
/// # Serde
///
/// `#[courier_message(serde)]` also derives `serde::Serialize` and
/// `serde::Deserialize`. The calling crate must depend on `serde`.
#[proc_macro_attribute]
pub fn courier_message(attr: TokenStream, item: TokenStream) -> TokenStream {
    let options = MessageOptions::parse(&attr);
    let input = parse_macro_input!(item as DeriveInput);

    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let derives = {
        let mut traits = Vec::new();
        if !has_derive(&input, "Clone") {
            traits.push(quote!(Clone));
        }
        if !has_derive(&input, "Debug") {
            traits.push(quote!(Debug));
        }
        if options.serde {
            if !has_derive(&input, "Serialize") {
                traits.push(quote!(serde::Serialize));
            }
            if !has_derive(&input, "Deserialize") {
                traits.push(quote!(serde::Deserialize));
            }
        }
        if traits.is_empty() {
            quote!()
        } else {
            quote!(#[derive(#(#traits),*)])
        }
    };

    let assert_ident = quote::format_ident!("_AssertCourierMessage_{}", name);

    let expanded = quote! {
        #derives
        #input

        #[doc(hidden)]
        #[allow(dead_code, non_camel_case_types, non_snake_case, clippy::needless_lifetimes)]
        const _: () = {
            fn #assert_ident #impl_generics () #where_clause {
                fn assert_bounds<T: Send + Sync + 'static>() {}
                assert_bounds::<#name #ty_generics>();
            }
        };
    };

    TokenStream::from(expanded)
}
