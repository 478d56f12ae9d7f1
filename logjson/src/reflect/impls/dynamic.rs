//! Trait objects, std errors and `serde_json::Value`.

use std::{
    any::Any,
    error::Error,
    rc::Rc,
    sync::{Arc, mpsc},
};

use crate::reflect::{Kind, LogValue, Loggable, TypeInfo};

// =============================================================================
// `dyn LogValue` containers
// =============================================================================

macro_rules! dynamic {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Loggable for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::of::<Self>(Kind::Dynamic(|value| {
                        value.downcast_ref::<$ty>().map(|inner| -> &dyn LogValue { &**inner })
                    }))
                }
            }
        )*
    };
}

dynamic!(
    Box<dyn LogValue>,
    Box<dyn LogValue + Send + Sync>,
    Rc<dyn LogValue>,
    Arc<dyn LogValue>,
    Arc<dyn LogValue + Send + Sync>,
);

// =============================================================================
// Errors
// =============================================================================

fn boxed_error(value: &dyn Any) -> Option<&(dyn Error + 'static)> {
    value.downcast_ref::<Box<dyn Error>>().map(|error| &**error)
}

fn boxed_shared_error(value: &dyn Any) -> Option<&(dyn Error + 'static)> {
    let error = value.downcast_ref::<Box<dyn Error + Send + Sync>>()?;
    Some(&**error)
}

impl Loggable for Box<dyn Error> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Unsupported).with_error(boxed_error)
    }
}

impl Loggable for Box<dyn Error + Send + Sync> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Unsupported).with_error(boxed_shared_error)
    }
}

crate::impl_loggable!(std::io::Error => error);
crate::impl_loggable!(std::fmt::Error => error);
crate::impl_loggable!(std::num::ParseIntError => error);
crate::impl_loggable!(std::num::ParseFloatError => error);
crate::impl_loggable!(std::str::Utf8Error => error);
crate::impl_loggable!(std::string::FromUtf8Error => error);
crate::impl_loggable!(crate::Error => error);

// =============================================================================
// Foreign types
// =============================================================================

crate::impl_loggable!(serde_json::Value => serialize);

impl<T: 'static> Loggable for mpsc::Sender<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Unsupported)
    }
}

impl<T: 'static> Loggable for mpsc::Receiver<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Unsupported)
    }
}
