//! Parsing of container-level `#[log(...)]` attributes.

use syn::{Attribute, Result};

/// Renders the whole type through one capability instead of its fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Capability {
    /// `#[log(marshaler)]`: the type implements `LogMarshaler`.
    Marshaler,
    /// `#[log(serialize)]`: the type implements `serde::Serialize`.
    Serialize,
    /// `#[log(error)]`: the type implements `std::error::Error`.
    Error,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct ContainerOptions {
    pub(crate) capability: Option<Capability>,
    /// `#[log(field_rules)]`: consult the type's `FieldRules` impl.
    pub(crate) field_rules: bool,
}

pub(crate) fn parse_container_options(attrs: &[Attribute]) -> Result<ContainerOptions> {
    let mut options = ContainerOptions::default();
    for attr in attrs {
        if !attr.path().is_ident("log") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            let capability = if meta.path.is_ident("marshaler") {
                Capability::Marshaler
            } else if meta.path.is_ident("serialize") {
                Capability::Serialize
            } else if meta.path.is_ident("error") {
                Capability::Error
            } else if meta.path.is_ident("field_rules") {
                options.field_rules = true;
                return Ok(());
            } else {
                return Err(meta.error(
                    "unknown container attribute; expected `marshaler`, `serialize`, \
                     `error` or `field_rules`",
                ));
            };
            if options.capability.replace(capability).is_some() {
                return Err(meta.error("only one of `marshaler`, `serialize` and `error` is allowed"));
            }
            Ok(())
        })?;
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::DeriveInput;

    use super::*;

    fn parse_attrs(tokens: proc_macro2::TokenStream) -> Vec<Attribute> {
        let input: DeriveInput = syn::parse2(quote! {
            #tokens
            struct Dummy;
        })
        .expect("should parse as DeriveInput");
        input.attrs
    }

    #[test]
    fn no_attribute_is_structural() {
        let options = parse_container_options(&parse_attrs(quote! {})).unwrap();
        assert_eq!(options.capability, None);
        assert!(!options.field_rules);
    }

    #[test]
    fn capability_and_field_rules() {
        let attrs = parse_attrs(quote! { #[log(serialize, field_rules)] });
        let options = parse_container_options(&attrs).unwrap();
        assert_eq!(options.capability, Some(Capability::Serialize));
        assert!(options.field_rules);
    }

    #[test]
    fn other_attributes_are_ignored() {
        let attrs = parse_attrs(quote! { #[derive(Debug)] #[serde(rename_all = "camelCase")] });
        assert!(parse_container_options(&attrs).is_ok());
    }

    #[test]
    fn two_capabilities_are_rejected() {
        let attrs = parse_attrs(quote! { #[log(error)] #[log(marshaler)] });
        let err = parse_container_options(&attrs).unwrap_err();
        assert!(err.to_string().contains("only one of"));
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        let attrs = parse_attrs(quote! { #[log(transparent)] });
        let err = parse_container_options(&attrs).unwrap_err();
        assert!(err.to_string().contains("unknown container attribute"));
    }
}
