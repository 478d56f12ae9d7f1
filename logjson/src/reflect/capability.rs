//! Self-rendering capabilities.
//!
//! A capability overrides the structural kind of a type. Precedence, highest
//! first: [`LogMarshaler`], JSON (`serde::Serialize`), error display text.

use std::{any::Any, error::Error, fmt};

use serde::Serialize;
use serde_json::value::RawValue;

use crate::encoder::Encoder;

/// A type that writes its own log representation.
///
/// Implementations should write exactly one JSON value. Writing nothing
/// renders `null`, and containers left open are closed afterwards. Extra
/// values are written as is and change the surrounding structure.
pub trait LogMarshaler {
    fn marshal_log_json(&self, encoder: &mut Encoder);
}

pub type LogMarshalerFn = fn(&dyn Any) -> Option<&dyn LogMarshaler>;
pub type JsonMarshalerFn = fn(&dyn Any) -> Option<serde_json::Result<Box<RawValue>>>;
pub type ErrorFn = fn(&dyn Any) -> Option<&(dyn Error + 'static)>;

#[derive(Clone, Copy, Default)]
pub struct Capabilities {
    pub(crate) log_marshaler: Option<LogMarshalerFn>,
    pub(crate) json_marshaler: Option<JsonMarshalerFn>,
    pub(crate) error: Option<ErrorFn>,
}

impl Capabilities {
    pub fn is_empty(&self) -> bool {
        self.log_marshaler.is_none() && self.json_marshaler.is_none() && self.error.is_none()
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("log_marshaler", &self.log_marshaler.is_some())
            .field("json_marshaler", &self.json_marshaler.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

fn as_log_marshaler<T: LogMarshaler>(value: &T) -> &dyn LogMarshaler {
    value
}

fn as_error<T: Error + 'static>(value: &T) -> &(dyn Error + 'static) {
    value
}

/// [`LogMarshalerFn`] for `T`.
pub fn log_marshaler_of<T: LogMarshaler + Any>(value: &dyn Any) -> Option<&dyn LogMarshaler> {
    value.downcast_ref::<T>().map(as_log_marshaler)
}

/// [`JsonMarshalerFn`] for `T`. Rendered straight to text so member order is
/// whatever the `Serialize` impl produces.
pub fn json_marshaler_of<T: Serialize + Any>(
    value: &dyn Any,
) -> Option<serde_json::Result<Box<RawValue>>> {
    value
        .downcast_ref::<T>()
        .map(serde_json::value::to_raw_value)
}

/// [`ErrorFn`] for `T`.
pub fn error_of<T: Error + Any>(value: &dyn Any) -> Option<&(dyn Error + 'static)> {
    value.downcast_ref::<T>().map(as_error)
}
