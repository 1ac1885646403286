//! Derive macros for Travel Desk client actions
//!
//! Slice actions are tagged unions in which most variants belong to one phase
//! of a request: the dispatch that raises a loading flag, and the fulfilled or
//! rejected outcome that settles it. This crate derives the phase bookkeeping
//! from attributes instead of hand-written `match` blocks.
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Generates request-phase helpers for action enums
//!
//! # Example
//!
//! ```ignore
//! use travel_desk_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum ChatAction {
//!     #[pending]
//!     FetchConversations,
//!
//!     #[fulfilled]
//!     ConversationsFetched { conversations: Vec<Conversation> },
//!
//!     #[rejected]
//!     ConversationsFailed { message: Option<String> },
//!
//!     ClearError,
//! }
//!
//! assert!(ChatAction::FetchConversations.is_pending());
//! assert_eq!(ChatAction::ClearError.phase(), None);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, parse_macro_input};

/// Phase attributes, in the order they are reported
const PHASES: [(&str, &str); 3] = [
    ("pending", "Pending"),
    ("fulfilled", "Fulfilled"),
    ("rejected", "Rejected"),
];

/// Derive macro for Action enums
///
/// Generates helper methods for action enums:
/// - `phase()` - The request phase of this variant, `None` for local actions
/// - `is_pending()` - Returns true if this variant starts a request
/// - `is_settled()` - Returns true if this variant is a fulfilled or rejected outcome
/// - `name()` - The variant name, for logging
///
/// # Attributes
///
/// - `#[pending]` - Mark a variant as a request dispatch
/// - `#[fulfilled]` - Mark a variant as a successful response
/// - `#[rejected]` - Mark a variant as a failed response
///
/// Unmarked variants are local actions (clear error, set current, logout).
///
/// # Panics
///
/// This macro will produce a compile error (not a runtime panic) if:
/// - Applied to a non-enum type
/// - A variant carries more than one phase attribute
///
/// # Example
///
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// enum PaymentAction {
///     #[pending]
///     CreateOrder { booking_id: String },
///
///     #[fulfilled]
///     OrderCreated { order: PaymentOrder },
///
///     #[rejected]
///     OrderFailed { message: Option<String> },
/// }
///
/// let action = PaymentAction::CreateOrder { booking_id: "b-1".into() };
/// assert!(action.is_pending());
/// assert!(!action.is_settled());
/// ```
#[proc_macro_derive(Action, attributes(pending, fulfilled, rejected))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(&input, "#[derive(Action)] can only be used on enums")
            .to_compile_error()
            .into();
    };

    let mut phase_arms = Vec::new();
    let mut name_arms = Vec::new();

    for variant in &data_enum.variants {
        let variant_name = &variant.ident;
        let pattern = match &variant.fields {
            Fields::Named(_) => quote! { Self::#variant_name { .. } },
            Fields::Unnamed(_) => quote! { Self::#variant_name(..) },
            Fields::Unit => quote! { Self::#variant_name },
        };

        let marked: Vec<&str> = PHASES
            .iter()
            .filter(|(attr, _)| has_attribute(&variant.attrs, attr))
            .map(|(_, phase)| *phase)
            .collect();

        match marked.as_slice() {
            [] => {},
            [phase] => {
                let phase = Ident::new(phase, variant_name.span());
                phase_arms.push(quote! {
                    #pattern => ::core::option::Option::Some(
                        ::travel_desk_core::request::Phase::#phase
                    ),
                });
            },
            _ => {
                return syn::Error::new_spanned(
                    variant,
                    "Variant can carry only one of #[pending], #[fulfilled] or #[rejected]",
                )
                .to_compile_error()
                .into();
            },
        }

        let label = variant_name.to_string();
        name_arms.push(quote! { #pattern => #label, });
    }

    let expanded = quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            /// The request phase this action represents, `None` for local actions
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn phase(&self) -> ::core::option::Option<::travel_desk_core::request::Phase> {
                match self {
                    #(#phase_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            /// Returns true if this action starts a request
            #[must_use]
            pub const fn is_pending(&self) -> bool {
                matches!(self.phase(), ::core::option::Option::Some(::travel_desk_core::request::Phase::Pending))
            }

            /// Returns true if this action settles a request (fulfilled or rejected)
            #[must_use]
            pub const fn is_settled(&self) -> bool {
                match self.phase() {
                    ::core::option::Option::Some(phase) => phase.is_settled(),
                    ::core::option::Option::None => false,
                }
            }

            /// The variant name, for logging
            #[must_use]
            pub const fn name(&self) -> &'static str {
                match self {
                    #(#name_arms)*
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}
