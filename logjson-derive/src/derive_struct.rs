//! Struct-specific `Loggable` derivation.
//!
//! Structs with named fields, tuple structs and unit structs all render as
//! objects; tuple fields are keyed by position. A newtype (a tuple struct
//! with exactly one field) is transparent: it renders as its field.

use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::{DataStruct, Fields, Member, Result, spanned::Spanned};

use crate::{
    DeriveOutput,
    container::ContainerOptions,
    field::{FieldOptions, Rule, parse_field_options},
    generics::collect_generics_from_type,
};

/// Description of one field, shared with enum variants.
pub(crate) fn field_info(
    root: &TokenStream,
    name: &str,
    ty: &syn::Type,
    getter: TokenStream,
    options: &FieldOptions,
    generics: &syn::Generics,
    used_generics: &mut Vec<Ident>,
) -> TokenStream {
    let rename = options
        .rename
        .as_ref()
        .map(|rename| quote! { .rename(#rename) });
    if options.rule == Some(Rule::Omit) {
        return quote! { #root::reflect::FieldInfo::omitted(#name) #rename };
    }

    collect_generics_from_type(ty, generics, used_generics);
    let digest = (options.rule == Some(Rule::Digest))
        .then(|| quote! { .rule(#root::LogRule::Digest) });
    let omit_empty = options.omit_empty.then(|| quote! { .omit_empty() });
    let flatten = options.flatten.then(|| quote! { .flatten() });
    quote! {
        #root::reflect::FieldInfo::new(
            #name,
            <#ty as #root::Loggable>::type_info,
            #getter,
        )
        #rename #digest #omit_empty #flatten
    }
}

pub(crate) fn field_rules(root: &TokenStream, container: &ContainerOptions) -> Option<TokenStream> {
    container
        .field_rules
        .then(|| quote! { .with_field_rules(<Self as #root::FieldRules>::field_rule) })
}

pub(crate) fn derive_struct(
    root: &TokenStream,
    data: DataStruct,
    generics: &syn::Generics,
    container: &ContainerOptions,
) -> Result<DeriveOutput> {
    match data.fields {
        Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
            let field = &fields.unnamed[0];
            if field.attrs.iter().any(|attr| attr.path().is_ident("log")) {
                return Err(syn::Error::new(
                    field.span(),
                    "#[log(...)] is not supported on the field of a newtype; \
                     the newtype renders as its field",
                ));
            }
            derive_newtype(root, &field.ty, generics)
        }
        fields => derive_fields(root, fields, generics, container),
    }
}

fn derive_newtype(
    root: &TokenStream,
    ty: &syn::Type,
    generics: &syn::Generics,
) -> Result<DeriveOutput> {
    let mut used_generics = Vec::new();
    collect_generics_from_type(ty, generics, &mut used_generics);
    Ok(DeriveOutput {
        kind: quote! {
            #root::reflect::Kind::Pointer(
                #root::reflect::PointerInfo::new(
                    <#ty as #root::Loggable>::type_info,
                    |value, visit| match value.downcast_ref::<Self>() {
                        Some(this) => {
                            visit(#root::reflect::erase(&this.0));
                            true
                        }
                        None => false,
                    },
                )
                .inline(),
            )
        },
        used_generics,
    })
}

fn derive_fields(
    root: &TokenStream,
    fields: Fields,
    generics: &syn::Generics,
    container: &ContainerOptions,
) -> Result<DeriveOutput> {
    let mut infos = Vec::new();
    let mut used_generics = Vec::new();

    for (index, field) in fields.into_iter().enumerate() {
        let options = parse_field_options(&field.attrs)?;
        let member: Member = match field.ident {
            Some(ident) => Member::Named(ident),
            None => Member::Unnamed(index.into()),
        };
        let name = member_name(&member);
        let getter = quote! {
            |value| value
                .downcast_ref::<Self>()
                .map(|this| #root::reflect::erase(&this.#member))
        };
        infos.push(field_info(
            root,
            &name,
            &field.ty,
            getter,
            &options,
            generics,
            &mut used_generics,
        ));
    }

    let rules = field_rules(root, container);
    Ok(DeriveOutput {
        kind: quote! {
            #root::reflect::Kind::Struct(
                #root::reflect::StructInfo::new(|| ::std::vec![#(#infos),*]) #rules
            )
        },
        used_generics,
    })
}

/// Declared name of a field, without any raw identifier prefix.
pub(crate) fn member_name(member: &Member) -> String {
    match member {
        Member::Named(ident) => syn::ext::IdentExt::unraw(ident).to_string(),
        Member::Unnamed(index) => index.index.to_string(),
    }
}
