//! Adapters for emitting log JSON through `tracing`.
//!
//! Values are recorded as display values: the JSON document becomes the
//! field's text. Rendering is deferred until a subscriber actually formats the
//! field.
//!
//! ```ignore
//! use logjson::tracing::TracingJsonExt;
//!
//! tracing::info!(user = user.tracing_json(), "login");
//! ```

use tracing::field::{DisplayValue, display};

use crate::{
    display::{Json, LogJsonExt},
    log_json::LogJson,
    reflect::LogValue,
};

pub trait TracingJsonExt: LogValue {
    /// Wraps `self` as a `tracing` display value rendered by the global
    /// instance.
    fn tracing_json(&self) -> DisplayValue<Json<'_, Self>> {
        display(self.log_json())
    }

    fn tracing_json_with<'a>(&'a self, json: &'a LogJson) -> DisplayValue<Json<'a, Self>> {
        display(self.log_json_with(json))
    }
}

impl<T: LogValue + ?Sized> TracingJsonExt for T {}
