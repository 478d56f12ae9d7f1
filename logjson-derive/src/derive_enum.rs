//! Enum-specific `Loggable` derivation.
//!
//! Unit variants render as their name; variants with fields render as a
//! single-member object `{"Variant": {...}}`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DataEnum, Fields, Member, Result};

use crate::{
    DeriveOutput,
    container::ContainerOptions,
    derive_struct::{field_info, field_rules, member_name},
    field::{parse_field_options, parse_variant_options},
};

pub(crate) fn derive_enum(
    root: &TokenStream,
    data: DataEnum,
    generics: &syn::Generics,
    container: &ContainerOptions,
) -> Result<DeriveOutput> {
    let mut arms = Vec::new();
    let mut variants = Vec::new();
    let mut used_generics = Vec::new();

    for (position, variant) in data.variants.into_iter().enumerate() {
        let ident = &variant.ident;
        let options = parse_variant_options(&variant.attrs)?;
        let name = options.rename.map_or_else(
            || syn::ext::IdentExt::unraw(ident).to_string(),
            |rename| rename.value(),
        );
        arms.push(quote! { Self::#ident { .. } => #position });

        if let Fields::Unit = variant.fields {
            variants.push(quote! { #root::reflect::VariantInfo::unit(#name) });
            continue;
        }

        let mut infos = Vec::new();
        for (index, field) in variant.fields.iter().enumerate() {
            let field_options = parse_field_options(&field.attrs)?;
            let member = match &field.ident {
                Some(field_ident) => Member::Named(field_ident.clone()),
                None => Member::Unnamed(index.into()),
            };
            let getter = quote! {
                |value| match value.downcast_ref::<Self>() {
                    Some(Self::#ident { #member: field, .. }) => {
                        Some(#root::reflect::erase(field))
                    }
                    _ => None,
                }
            };
            infos.push(field_info(
                root,
                &member_name(&member),
                &field.ty,
                getter,
                &field_options,
                generics,
                &mut used_generics,
            ));
        }
        variants.push(quote! {
            #root::reflect::VariantInfo::new(#name, ::std::vec![#(#infos),*])
        });
    }

    let index = if arms.is_empty() {
        quote! { match *this {} }
    } else {
        quote! { match this { #(#arms),* } }
    };
    let rules = field_rules(root, container);
    Ok(DeriveOutput {
        kind: quote! {
            #root::reflect::Kind::Enum(
                #root::reflect::EnumInfo::new(
                    |value| value.downcast_ref::<Self>().map(|this| #index),
                    || ::std::vec![#(#variants),*],
                )
                #rules
            )
        },
        used_generics,
    })
}
