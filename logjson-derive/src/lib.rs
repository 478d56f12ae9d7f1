//! Derive macro for `logjson`.
//!
//! This crate generates the runtime type description behind
//! `#[derive(Loggable)]`. It:
//! - reads `#[log(...)]` container, field and variant attributes
//! - emits a `logjson::Loggable` implementation with one accessor per field
//!
//! It does **not** render anything. Plans are compiled and cached by the main
//! `logjson` crate at runtime.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[allow(unused_extern_crates)]
extern crate proc_macro;

use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use syn::{Data, DataUnion, DeriveInput, Result, parse_macro_input, parse_quote, spanned::Spanned};

mod container;
mod derive_enum;
mod derive_struct;
mod field;
mod generics;
use container::{Capability, parse_container_options};
use derive_enum::derive_enum;
use derive_struct::derive_struct;
use generics::add_loggable_bounds;

/// Derives `logjson::Loggable` for structs and enums.
///
/// # Container Attributes
///
/// - `#[log(marshaler)]`: render through the type's `LogMarshaler` impl.
/// - `#[log(serialize)]`: render through the type's `serde::Serialize` impl.
/// - `#[log(error)]`: render the type's `std::error::Error` display text.
/// - `#[log(field_rules)]`: consult the type's `FieldRules` impl for fields
///   without a directive of their own.
///
/// With one of the first three, fields are not described at all.
///
/// # Field Attributes
///
/// - **No annotation**: the field is rendered under its declared name. Its
///   type must implement `Loggable`. Private fields are rendered like public
///   ones, as with `serde`.
/// - `#[log(omit)]`: the field is never rendered. Its type need not implement
///   `Loggable`.
/// - `#[log(digest)]` (alias `#[log(md5)]`): text, or optional text, is
///   replaced by `"<byte length>;<md5 hex>"`.
/// - `#[log(rename = "name")]`: output name. Without it,
///   `#[serde(rename = "name")]` is honored.
/// - `#[log(omitempty)]`: skip the field when its value is empty.
/// - `#[log(flatten)]`: promote the fields of a nested struct.
///
/// # Variant Attributes
///
/// - `#[log(rename = "name")]`, with the same `serde` fallback.
///
/// Tuple struct fields are named `"0"`, `"1"`, ...; a tuple struct with a
/// single field renders as that field. Unions and types with lifetime
/// parameters are rejected at compile time.
#[proc_macro_derive(Loggable, attributes(log))]
pub fn derive_loggable(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Output of the struct and enum derivations.
struct DeriveOutput {
    /// Expression building the type's `Kind`.
    kind: TokenStream,
    /// Type parameters that need a `Loggable` bound.
    used_generics: Vec<Ident>,
}

fn expand(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        attrs,
        ..
    } = input;

    if let Data::Union(data) = &data {
        return Err(union_error(data));
    }
    if let Some(lifetime) = generics.lifetimes().next() {
        return Err(syn::Error::new(
            lifetime.span(),
            "`Loggable` cannot be derived for types with lifetime parameters",
        ));
    }

    let root = crate_root();
    let container = parse_container_options(&attrs)?;
    let loggable = quote! { #root::Loggable };

    if let Some(capability) = container.capability {
        let (builder, bound) = match capability {
            Capability::Marshaler => (
                quote! { with_log_marshaler(#root::reflect::log_marshaler_of::<Self>) },
                quote! { #root::LogMarshaler },
            ),
            Capability::Serialize => (
                quote! { with_json_marshaler(#root::reflect::json_marshaler_of::<Self>) },
                quote! { #root::__private::Serialize },
            ),
            Capability::Error => (
                quote! { with_error(#root::reflect::error_of::<Self>) },
                quote! { ::std::error::Error },
            ),
        };
        let mut generics = add_loggable_bounds(generics, &[], &loggable);
        if generics.type_params().next().is_some() {
            generics
                .make_where_clause()
                .predicates
                .push(parse_quote!(Self: #bound));
        }
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
        return Ok(quote! {
            impl #impl_generics #loggable for #ident #ty_generics #where_clause {
                fn type_info() -> #root::reflect::TypeInfo {
                    #root::reflect::TypeInfo::of::<Self>(#root::reflect::Kind::Unsupported)
                        .#builder
                }
            }
        });
    }

    let DeriveOutput {
        kind,
        used_generics,
    } = match data {
        Data::Struct(data) => derive_struct(&root, data, &generics, &container)?,
        Data::Enum(data) => derive_enum(&root, data, &generics, &container)?,
        Data::Union(data) => return Err(union_error(&data)),
    };

    let generics = add_loggable_bounds(generics, &used_generics, &loggable);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics #loggable for #ident #ty_generics #where_clause {
            fn type_info() -> #root::reflect::TypeInfo {
                #root::reflect::TypeInfo::of::<Self>(#kind)
            }
        }
    })
}

fn union_error(data: &DataUnion) -> syn::Error {
    syn::Error::new(
        data.union_token.span(),
        "`Loggable` cannot be derived for unions",
    )
}

/// Path to the `logjson` crate as seen from the deriving crate.
///
/// `logjson` declares `extern crate self as logjson`, so `::logjson` also
/// resolves inside the crate itself.
fn crate_root() -> TokenStream {
    match crate_name("logjson") {
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            quote! { ::#ident }
        }
        Ok(FoundCrate::Itself) | Err(_) => quote! { ::logjson },
    }
}
