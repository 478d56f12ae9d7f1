//! Reflection-driven JSON rendering for log records.
//!
//! This crate turns arbitrary values into compact, single-line JSON suitable
//! for structured logs. Unlike a general purpose serializer it is built around
//! the needs of logging:
//! - **Redaction**: fields can be omitted or replaced by an MD5 digest, through
//!   `#[log(...)]` directives, a type's [`FieldRules`], or runtime rules.
//! - **Robustness**: reference cycles, unsupported map keys, locked cells and
//!   non-finite floats all render as valid JSON instead of failing.
//! - **Throughput**: each type is compiled once into a cached encoding plan.
//!
//! What this crate does:
//! - describes types at runtime (`#[derive(Loggable)]`, [`impl_loggable!`])
//! - compiles and caches encoding plans per type
//! - provides integrations behind feature flags (`slog`, `tracing`)
//!
//! What it does not do:
//! - deserialize, or render anything other than compact JSON
//! - configure a logging framework
//!
//! ```
//! use logjson::Loggable;
//!
//! #[derive(Loggable)]
//! struct Account {
//!     id: u64,
//!     #[log(omit)]
//!     password: String,
//!     #[log(digest)]
//!     email: String,
//!     #[log(omitempty)]
//!     tags: Vec<String>,
//! }
//!
//! let account = Account {
//!     id: 7,
//!     password: "hunter2".into(),
//!     email: "hello".into(),
//!     tags: Vec::new(),
//! };
//! assert_eq!(
//!     logjson::marshal_to_string(&account),
//!     r#"{"id":7,"email":"5;5d41402abc4b2a76b9719d911017c592"}"#,
//! );
//! ```
//!
//! The `Loggable` derive macro lives in `logjson-derive` and is re-exported
//! from this crate.

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
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else,
    clippy::type_complexity,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

pub use logjson_derive::Loggable;

#[allow(unused_extern_crates)]
extern crate self as logjson;

mod compile;
mod config;
mod cycle;
mod display;
mod encoder;
mod error;
mod location;
mod log_json;
mod macros;
mod plan;
pub mod reflect;
mod rule;
#[cfg(feature = "slog")]
pub mod slog;
#[cfg(feature = "tracing")]
pub mod tracing;

pub use config::{Config, MAX_CYCLE_DETECTION_DEPTH};
pub use display::{Json, LogJsonExt};
pub use encoder::Encoder;
pub use error::{Error, Result};
pub use location::caller_path;
pub use log_json::LogJson;
pub use reflect::{FieldRules, LogMarshaler, LogValue, Loggable};
pub use rule::LogRule;

/// Renders `value` as compact JSON through the global instance.
pub fn marshal<T: LogValue + ?Sized>(value: &T) -> Vec<u8> {
    LogJson::global().marshal(value)
}

/// Like [`marshal`], as a `String`.
pub fn marshal_to_string<T: LogValue + ?Sized>(value: &T) -> String {
    match String::from_utf8(marshal(value)) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}

/// Registers a rule on the global instance. See [`LogJson::add_log_rule`].
pub fn add_log_rule(field: impl Into<String>, rule: LogRule) {
    LogJson::global().add_log_rule(field, rule);
}

#[doc(hidden)]
pub mod __private {
    pub use serde::Serialize;
}
