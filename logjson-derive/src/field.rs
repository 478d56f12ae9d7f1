//! Parsing of field and variant `#[log(...)]` attributes.
//!
//! | Attribute                | Effect                                        |
//! |--------------------------|-----------------------------------------------|
//! | `#[log(omit)]`           | Field is never rendered                       |
//! | `#[log(digest)]`, `md5`  | Text is replaced by `"<len>;<md5 hex>"`       |
//! | `#[log(rename = "x")]`   | Output name (falls back to `#[serde(rename)]`) |
//! | `#[log(omitempty)]`      | Skipped when the value is empty               |
//! | `#[log(flatten)]`        | Nested struct fields are promoted             |

use syn::{
    Attribute, Expr, ExprLit, Lit, LitStr, Meta, Result, Token, punctuated::Punctuated,
    spanned::Spanned,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Rule {
    Omit,
    Digest,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct FieldOptions {
    pub(crate) rule: Option<Rule>,
    pub(crate) rename: Option<LitStr>,
    pub(crate) omit_empty: bool,
    pub(crate) flatten: bool,
}

fn set_rule(target: &mut Option<Rule>, next: Rule, meta: &syn::meta::ParseNestedMeta<'_>) -> Result<()> {
    if target.replace(next).is_some() {
        return Err(meta.error("only one of `omit`, `digest` and `md5` is allowed"));
    }
    Ok(())
}

pub(crate) fn parse_field_options(attrs: &[Attribute]) -> Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in attrs {
        if !attr.path().is_ident("log") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("omit") {
                set_rule(&mut options.rule, Rule::Omit, &meta)
            } else if meta.path.is_ident("digest") || meta.path.is_ident("md5") {
                set_rule(&mut options.rule, Rule::Digest, &meta)
            } else if meta.path.is_ident("rename") {
                options.rename = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("omitempty") {
                options.omit_empty = true;
                Ok(())
            } else if meta.path.is_ident("flatten") {
                options.flatten = true;
                Ok(())
            } else {
                Err(meta.error(
                    "unknown field attribute; expected `omit`, `digest`, `md5`, \
                     `rename = \"...\"`, `omitempty` or `flatten`",
                ))
            }
        })?;
    }

    if options.rule == Some(Rule::Omit) && options.flatten {
        return Err(syn::Error::new(
            attrs_span(attrs),
            "`omit` and `flatten` cannot be combined",
        ));
    }
    if options.rename.is_none() {
        options.rename = serde_rename(attrs);
    }
    Ok(options)
}

#[derive(Clone, Debug, Default)]
pub(crate) struct VariantOptions {
    pub(crate) rename: Option<LitStr>,
}

pub(crate) fn parse_variant_options(attrs: &[Attribute]) -> Result<VariantOptions> {
    let mut options = VariantOptions::default();
    for attr in attrs {
        if !attr.path().is_ident("log") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                options.rename = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unknown variant attribute; expected `rename = \"...\"`"))
            }
        })?;
    }
    if options.rename.is_none() {
        options.rename = serde_rename(attrs);
    }
    Ok(options)
}

fn attrs_span(attrs: &[Attribute]) -> proc_macro2::Span {
    attrs
        .iter()
        .find(|attr| attr.path().is_ident("log"))
        .map_or_else(proc_macro2::Span::call_site, Spanned::span)
}

/// `#[serde(rename = "...")]`, if present. Anything serde itself would reject
/// is left for serde to report.
fn serde_rename(attrs: &[Attribute]) -> Option<LitStr> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("serde"))
        .filter_map(|attr| {
            attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
                .ok()
        })
        .flatten()
        .find_map(|meta| match meta {
            Meta::NameValue(pair) if pair.path.is_ident("rename") => match pair.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(name),
                    ..
                }) => Some(name),
                _ => None,
            },
            _ => None,
        })
}
