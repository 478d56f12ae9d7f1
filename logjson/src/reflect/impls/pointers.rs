//! Smart pointers, references, `Option`, cells and locks.
//!
//! All of these render their target inline. Heap pointers and cells report
//! the pointee address so self-referential graphs can be cut; `Option` has no
//! identity of its own.

use std::{
    any::Any,
    cell::{Cell, RefCell},
    ptr,
    rc::Rc,
    sync::{Arc, Mutex, RwLock, TryLockError},
};

use crate::reflect::{Kind, Loggable, PointerInfo, TypeInfo};

// =============================================================================
// Owning pointers and references
// =============================================================================

impl<T: Loggable> Loggable for Box<T> {
    fn type_info() -> TypeInfo {
        let pointer = PointerInfo::new(T::type_info, |value, visit| {
            value.downcast_ref::<Box<T>>().is_some_and(|boxed| {
                visit(&**boxed);
                true
            })
        })
        .with_address(|value| {
            value
                .downcast_ref::<Box<T>>()
                .map_or(0, |boxed| ptr::from_ref(&**boxed).addr())
        });
        TypeInfo::of::<Self>(Kind::Pointer(pointer))
    }
}

impl<T: Loggable> Loggable for Rc<T> {
    fn type_info() -> TypeInfo {
        let pointer = PointerInfo::new(T::type_info, |value, visit| {
            value.downcast_ref::<Rc<T>>().is_some_and(|shared| {
                visit(&**shared);
                true
            })
        })
        .with_address(|value| {
            value
                .downcast_ref::<Rc<T>>()
                .map_or(0, |shared| Rc::as_ptr(shared).addr())
        });
        TypeInfo::of::<Self>(Kind::Pointer(pointer))
    }
}

impl<T: Loggable> Loggable for Arc<T> {
    fn type_info() -> TypeInfo {
        let pointer = PointerInfo::new(T::type_info, |value, visit| {
            value.downcast_ref::<Arc<T>>().is_some_and(|shared| {
                visit(&**shared);
                true
            })
        })
        .with_address(|value| {
            value
                .downcast_ref::<Arc<T>>()
                .map_or(0, |shared| Arc::as_ptr(shared).addr())
        });
        TypeInfo::of::<Self>(Kind::Pointer(pointer))
    }
}

impl<T: Loggable> Loggable for &'static T {
    fn type_info() -> TypeInfo {
        let pointer = PointerInfo::new(T::type_info, |value, visit| {
            value.downcast_ref::<&'static T>().is_some_and(|target| {
                visit(*target);
                true
            })
        })
        .with_address(|value| {
            value
                .downcast_ref::<&'static T>()
                .map_or(0, |target| ptr::from_ref(*target).addr())
        });
        TypeInfo::of::<Self>(Kind::Pointer(pointer))
    }
}

impl<T: Loggable> Loggable for Option<T> {
    fn type_info() -> TypeInfo {
        let pointer = PointerInfo::new(T::type_info, |value, visit| {
            match value.downcast_ref::<Option<T>>() {
                Some(Some(inner)) => {
                    visit(inner);
                    true
                }
                _ => false,
            }
        })
        .with_null_check(|value| {
            value
                .downcast_ref::<Option<T>>()
                .is_none_or(Option::is_none)
        });
        TypeInfo::of::<Self>(Kind::Pointer(pointer))
    }
}

// =============================================================================
// Cells and locks
// =============================================================================
//
// Cells never block: a value that is exclusively borrowed or locked while the
// record is rendered shows up as `null`.

impl<T: Loggable> Loggable for RefCell<T> {
    fn type_info() -> TypeInfo {
        let pointer = PointerInfo::new(T::type_info, |value, visit| {
            let Some(cell) = value.downcast_ref::<RefCell<T>>() else {
                return false;
            };
            match cell.try_borrow() {
                Ok(guard) => {
                    visit(&*guard);
                    true
                }
                Err(_) => false,
            }
        })
        .with_address(|value| {
            value
                .downcast_ref::<RefCell<T>>()
                .map_or(0, |cell| cell.as_ptr().addr())
        });
        TypeInfo::of::<Self>(Kind::Pointer(pointer))
    }
}

impl<T: Loggable + Copy> Loggable for Cell<T> {
    fn type_info() -> TypeInfo {
        let pointer = PointerInfo::new(T::type_info, |value, visit| {
            value.downcast_ref::<Cell<T>>().is_some_and(|cell| {
                visit(&cell.get());
                true
            })
        })
        .inline();
        TypeInfo::of::<Self>(Kind::Pointer(pointer))
    }
}

impl<T: Loggable> Loggable for Mutex<T> {
    fn type_info() -> TypeInfo {
        let pointer = PointerInfo::new(T::type_info, |value, visit| {
            let Some(mutex) = value.downcast_ref::<Mutex<T>>() else {
                return false;
            };
            match mutex.try_lock() {
                Ok(guard) => {
                    visit(&*guard);
                    true
                }
                Err(TryLockError::Poisoned(poisoned)) => {
                    visit(&*poisoned.into_inner());
                    true
                }
                Err(TryLockError::WouldBlock) => false,
            }
        })
        .with_address(|value| {
            value
                .downcast_ref::<Mutex<T>>()
                .map_or(0, |mutex| ptr::from_ref(mutex).addr())
        });
        TypeInfo::of::<Self>(Kind::Pointer(pointer))
    }
}

impl<T: Loggable> Loggable for RwLock<T> {
    fn type_info() -> TypeInfo {
        let pointer = PointerInfo::new(T::type_info, |value, visit| {
            let Some(lock) = value.downcast_ref::<RwLock<T>>() else {
                return false;
            };
            match lock.try_read() {
                Ok(guard) => {
                    visit(&*guard);
                    true
                }
                Err(TryLockError::Poisoned(poisoned)) => {
                    visit(&*poisoned.into_inner());
                    true
                }
                Err(TryLockError::WouldBlock) => false,
            }
        })
        .with_address(|value| {
            value
                .downcast_ref::<RwLock<T>>()
                .map_or(0, |lock| ptr::from_ref(lock).addr())
        });
        TypeInfo::of::<Self>(Kind::Pointer(pointer))
    }
}

impl<T: Loggable> Loggable for parking_lot::Mutex<T> {
    fn type_info() -> TypeInfo {
        let pointer = PointerInfo::new(T::type_info, |value, visit| {
            value
                .downcast_ref::<parking_lot::Mutex<T>>()
                .and_then(|mutex| mutex.try_lock())
                .is_some_and(|guard| {
                    visit(&*guard);
                    true
                })
        })
        .with_address(|value| {
            value
                .downcast_ref::<parking_lot::Mutex<T>>()
                .map_or(0, |mutex| ptr::from_ref(mutex).addr())
        });
        TypeInfo::of::<Self>(Kind::Pointer(pointer))
    }
}

impl<T: Loggable> Loggable for parking_lot::RwLock<T> {
    fn type_info() -> TypeInfo {
        let pointer = PointerInfo::new(T::type_info, |value, visit| {
            value
                .downcast_ref::<parking_lot::RwLock<T>>()
                .and_then(|lock| lock.try_read())
                .is_some_and(|guard| {
                    visit(&*guard);
                    true
                })
        })
        .with_address(|value| {
            value
                .downcast_ref::<parking_lot::RwLock<T>>()
                .map_or(0, |lock| ptr::from_ref(lock).addr())
        });
        TypeInfo::of::<Self>(Kind::Pointer(pointer))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::RefCell,
        rc::Rc,
        sync::{Arc, Mutex},
    };

    use crate::marshal_to_string as render;

    #[test]
    fn pointers_inline_their_target() {
        assert_eq!(render(&Box::new(3_u8)), "3");
        assert_eq!(render(&Rc::new("x".to_string())), r#""x""#);
        assert_eq!(render(&Arc::new(Some(true))), "true");
    }

    #[test]
    fn none_renders_null() {
        assert_eq!(render(&None::<String>), "null");
        assert_eq!(render(&Some(Some(1_i32))), "1");
    }

    #[test]
    fn mutably_borrowed_cell_renders_null() {
        let cell = RefCell::new(5_u32);
        assert_eq!(render(&cell), "5");
        let _guard = cell.borrow_mut();
        assert_eq!(render(&cell), "null");
    }

    #[test]
    fn locked_mutex_renders_null() {
        let mutex = Mutex::new("held".to_string());
        assert_eq!(render(&mutex), r#""held""#);
        let _guard = mutex.lock().unwrap();
        assert_eq!(render(&mutex), "null");
    }
}
