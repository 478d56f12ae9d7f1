//! Display formatting of rendered values.
//!
//! - [`Json`]: `Display` wrapper that renders a value on demand
//! - [`LogJsonExt`]: extension trait producing [`Json`] wrappers

use std::fmt;

use crate::{log_json::LogJson, reflect::LogValue};

// =============================================================================
// Json - Display wrapper for rendered values
// =============================================================================

/// Formats the wrapped value as its log JSON.
///
/// Nothing is rendered until the wrapper is formatted, so it is cheap to pass
/// to a logging macro whose level may be disabled.
pub struct Json<'a, T: ?Sized> {
    value: &'a T,
    json: &'a LogJson,
}

impl<T: LogValue + ?Sized> Json<'_, T> {
    pub(crate) fn render(&self) -> Vec<u8> {
        self.json.marshal(self.value)
    }
}

impl<T: LogValue + ?Sized> fmt::Display for Json<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.render()))
    }
}

impl<T: LogValue + ?Sized> fmt::Debug for Json<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// =============================================================================
// LogJsonExt - Extension trait
// =============================================================================

/// ```
/// use logjson::{LogJsonExt, Loggable};
///
/// #[derive(Loggable)]
/// struct Request {
///     path: String,
///     #[log(digest)]
///     session: String,
/// }
///
/// let request = Request { path: "/".into(), session: "hello".into() };
/// assert_eq!(
///     request.log_json().to_string(),
///     r#"{"path":"/","session":"5;5d41402abc4b2a76b9719d911017c592"}"#,
/// );
/// ```
pub trait LogJsonExt: LogValue {
    /// Wraps `self` for display through the global instance.
    fn log_json(&self) -> Json<'_, Self> {
        self.log_json_with(LogJson::global())
    }

    /// Wraps `self` for display through a specific instance.
    fn log_json_with<'a>(&'a self, json: &'a LogJson) -> Json<'a, Self> {
        Json { value: self, json }
    }
}

impl<T: LogValue + ?Sized> LogJsonExt for T {}
