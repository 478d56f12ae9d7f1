//! Scalars and string types.

use std::{any::Any, borrow::Cow, marker::PhantomData, rc::Rc, sync::Arc};

use crate::reflect::{Kind, Loggable, TypeInfo};

// =============================================================================
// Numbers
// =============================================================================

macro_rules! signed {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Loggable for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::of::<Self>(Kind::Int(|value| {
                        value
                            .downcast_ref::<$ty>()
                            .and_then(|v| i64::try_from(*v).ok())
                    }))
                }
            }
        )*
    };
}

macro_rules! unsigned {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Loggable for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::of::<Self>(Kind::Uint(|value| {
                        value
                            .downcast_ref::<$ty>()
                            .and_then(|v| u64::try_from(*v).ok())
                    }))
                }
            }
        )*
    };
}

signed!(i8, i16, i32, i64, isize);
unsigned!(u8, u16, u32, u64, usize);

impl Loggable for f32 {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Float(|value| {
            value.downcast_ref::<f32>().map(|v| f64::from(*v))
        }))
    }
}

impl Loggable for f64 {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Float(|value| value.downcast_ref::<f64>().copied()))
    }
}

impl Loggable for bool {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Bool(|value| value.downcast_ref::<bool>().copied()))
    }
}

impl Loggable for char {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Char(|value| value.downcast_ref::<char>().copied()))
    }
}

// =============================================================================
// Strings
// =============================================================================

impl Loggable for String {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Str(|value| {
            value.downcast_ref::<String>().map(String::as_str)
        }))
    }
}

impl Loggable for &'static str {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Str(|value| {
            value.downcast_ref::<&'static str>().copied()
        }))
    }
}

macro_rules! owned_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Loggable for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::of::<Self>(Kind::Str(|value| {
                        value.downcast_ref::<$ty>().map(|text| &**text)
                    }))
                }
            }
        )*
    };
}

owned_str!(Box<str>, Rc<str>, Arc<str>, Cow<'static, str>);

// =============================================================================
// Markers
// =============================================================================

impl Loggable for () {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Unsupported)
    }
}

impl<T: ?Sized + Any> Loggable for PhantomData<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Unsupported)
    }
}
