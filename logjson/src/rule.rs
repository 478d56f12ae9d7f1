//! Field redaction rules and their resolution.
//!
//! A field can be dropped from the output ([`LogRule::Omit`]) or replaced by a
//! correlation digest ([`LogRule::Digest`]). Rules come from three sources,
//! consulted in order until one matches:
//!
//! 1. the field's own `#[log(omit)]` / `#[log(digest)]` directive;
//! 2. the declaring type's [`FieldRules`](crate::FieldRules) impl;
//! 3. the rules registered at runtime with
//!    [`LogJson::add_log_rule`](crate::LogJson::add_log_rule).
//!
//! Every source is keyed by the field's output name.

use std::{fmt, str::FromStr};

use md5::{Digest, Md5};

use crate::{Error, reflect::FieldRuleFn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogRule {
    /// Leave the field out.
    Omit,
    /// Replace a text field with `"<byte length>;<md5 hex>"`.
    Digest,
}

impl FromStr for LogRule {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "omit" => Ok(Self::Omit),
            "digest" | "md5" => Ok(Self::Digest),
            other => Err(Error::InvalidRule(other.to_string())),
        }
    }
}

impl fmt::Display for LogRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Omit => f.write_str("omit"),
            Self::Digest => f.write_str("digest"),
        }
    }
}

/// Picks the effective rule for one field. `runtime` is only consulted when
/// neither the field nor its type decided.
pub(crate) fn resolve(
    field: Option<LogRule>,
    type_rules: Option<FieldRuleFn>,
    name: &str,
    runtime: impl FnOnce(&str) -> Option<LogRule>,
) -> Option<LogRule> {
    field
        .or_else(|| type_rules.and_then(|rules| rules(name)))
        .or_else(|| runtime(name))
}

/// `"<byte length>;<lowercase hex md5>"`.
pub(crate) fn digest(text: &str) -> String {
    format!("{};{:x}", text.len(), Md5::digest(text.as_bytes()))
}
