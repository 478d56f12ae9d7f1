/// Implements [`Loggable`](crate::Loggable) for a type that renders through a
/// single capability.
///
/// Use it for foreign types, or for types where the derive does not fit:
///
/// - `marshaler`: the type implements [`LogMarshaler`](crate::LogMarshaler)
/// - `serialize`: the type implements `serde::Serialize`
/// - `error`: the type implements `std::error::Error`; renders its display text
/// - `unsupported`: always renders `null`
///
/// ```
/// #[derive(Debug, serde::Serialize)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// logjson::impl_loggable!(Point => serialize);
///
/// assert_eq!(logjson::marshal_to_string(&Point { x: 1, y: 2 }), r#"{"x":1,"y":2}"#);
/// ```
#[macro_export]
macro_rules! impl_loggable {
    ($ty:ty => marshaler) => {
        impl $crate::Loggable for $ty {
            fn type_info() -> $crate::reflect::TypeInfo {
                $crate::reflect::TypeInfo::of::<Self>($crate::reflect::Kind::Unsupported)
                    .with_log_marshaler($crate::reflect::log_marshaler_of::<Self>)
            }
        }
    };
    ($ty:ty => serialize) => {
        impl $crate::Loggable for $ty {
            fn type_info() -> $crate::reflect::TypeInfo {
                $crate::reflect::TypeInfo::of::<Self>($crate::reflect::Kind::Unsupported)
                    .with_json_marshaler($crate::reflect::json_marshaler_of::<Self>)
            }
        }
    };
    ($ty:ty => error) => {
        impl $crate::Loggable for $ty {
            fn type_info() -> $crate::reflect::TypeInfo {
                $crate::reflect::TypeInfo::of::<Self>($crate::reflect::Kind::Unsupported)
                    .with_error($crate::reflect::error_of::<Self>)
            }
        }
    };
    ($ty:ty => unsupported) => {
        impl $crate::Loggable for $ty {
            fn type_info() -> $crate::reflect::TypeInfo {
                $crate::reflect::TypeInfo::of::<Self>($crate::reflect::Kind::Unsupported)
            }
        }
    };
}
