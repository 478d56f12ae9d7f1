//! Generic parameter handling and trait bound management.
//!
//! Every type parameter gets a `'static` bound, since descriptions are keyed
//! by `TypeId`. Parameters that appear in a described field type additionally
//! get a `Loggable` bound.
//!
//! `PhantomData<T>` is skipped when collecting: it renders as `null` whatever
//! `T` is, so
//!
//! ```ignore
//! struct TypedId<T> {
//!     id: String,
//!     _marker: PhantomData<T>,
//! }
//! ```
//!
//! is loggable for any `T: 'static`. Omitted fields are skipped the same way.

use proc_macro2::TokenStream;
use syn::{Ident, parse_quote};

fn push_if_generic(ident: &Ident, generics: &syn::Generics, result: &mut Vec<Ident>) {
    if generics.type_params().any(|param| param.ident == *ident)
        && !result.iter().any(|g| g == ident)
    {
        result.push(ident.clone());
    }
}

fn visit_type_param_bound(
    bound: &syn::TypeParamBound,
    generics: &syn::Generics,
    result: &mut Vec<Ident>,
) {
    if let syn::TypeParamBound::Trait(trait_bound) = bound {
        visit_path(&trait_bound.path, generics, result);
    }
}

fn visit_path_arguments(
    args: &syn::PathArguments,
    generics: &syn::Generics,
    result: &mut Vec<Ident>,
) {
    match args {
        syn::PathArguments::AngleBracketed(args) => {
            for arg in &args.args {
                match arg {
                    syn::GenericArgument::Type(inner_ty) => visit_type(inner_ty, generics, result),
                    syn::GenericArgument::AssocType(assoc) => {
                        visit_type(&assoc.ty, generics, result);
                    }
                    _ => {}
                }
            }
        }
        syn::PathArguments::Parenthesized(args) => {
            for input in &args.inputs {
                visit_type(input, generics, result);
            }
            if let syn::ReturnType::Type(_, output) = &args.output {
                visit_type(output, generics, result);
            }
        }
        syn::PathArguments::None => {}
    }
}

fn visit_path(path: &syn::Path, generics: &syn::Generics, result: &mut Vec<Ident>) {
    if path
        .segments
        .last()
        .is_some_and(|segment| segment.ident == "PhantomData")
    {
        return;
    }

    for segment in &path.segments {
        push_if_generic(&segment.ident, generics, result);
        visit_path_arguments(&segment.arguments, generics, result);
    }
}

fn visit_type(ty: &syn::Type, generics: &syn::Generics, result: &mut Vec<Ident>) {
    match ty {
        syn::Type::Path(type_path) => {
            if let Some(qself) = &type_path.qself {
                visit_type(&qself.ty, generics, result);
            }
            visit_path(&type_path.path, generics, result);
        }
        syn::Type::Reference(reference) => visit_type(&reference.elem, generics, result),
        syn::Type::Slice(slice) => visit_type(&slice.elem, generics, result),
        syn::Type::Array(array) => visit_type(&array.elem, generics, result),
        syn::Type::Tuple(tuple) => {
            for elem in &tuple.elems {
                visit_type(elem, generics, result);
            }
        }
        syn::Type::Paren(paren) => visit_type(&paren.elem, generics, result),
        syn::Type::Group(group) => visit_type(&group.elem, generics, result),
        syn::Type::TraitObject(obj) => {
            for bound in &obj.bounds {
                visit_type_param_bound(bound, generics, result);
            }
        }
        _ => {}
    }
}

/// Collects the type parameters of `generics` mentioned by `ty`.
pub(crate) fn collect_generics_from_type(
    ty: &syn::Type,
    generics: &syn::Generics,
    result: &mut Vec<Ident>,
) {
    visit_type(ty, generics, result);
}

/// Adds `'static` to every type parameter and `loggable` to the used ones.
pub(crate) fn add_loggable_bounds(
    mut generics: syn::Generics,
    used_generics: &[Ident],
    loggable: &TokenStream,
) -> syn::Generics {
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!('static));
        if used_generics.iter().any(|g| g == &param.ident) {
            param.bounds.push(parse_quote!(#loggable));
        }
    }
    generics
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use super::*;

    fn used(generics: &syn::Generics, ty: &syn::Type) -> Vec<String> {
        let mut result = Vec::new();
        collect_generics_from_type(ty, generics, &mut result);
        result.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn nested_parameters_are_collected_once() {
        let generics: syn::Generics = parse_quote!(<K, V, U>);
        let ty: syn::Type = parse_quote!(HashMap<K, Vec<(V, K)>>);
        assert_eq!(used(&generics, &ty), ["K", "V"]);
    }

    #[test]
    fn phantom_data_is_skipped() {
        let generics: syn::Generics = parse_quote!(<T>);
        let ty: syn::Type = parse_quote!(::std::marker::PhantomData<T>);
        assert!(used(&generics, &ty).is_empty());
    }

    #[test]
    fn bounds_are_added() {
        let generics: syn::Generics = parse_quote!(<T, M>);
        let bounded = add_loggable_bounds(
            generics,
            &[parse_quote!(T)],
            &quote!(::logjson::Loggable),
        );
        let bounds: Vec<usize> = bounded
            .type_params()
            .map(|param| param.bounds.len())
            .collect();
        assert_eq!(bounds, [2, 1]);
    }
}
