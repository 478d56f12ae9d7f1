//! Sequences, sets, arrays and maps.

use std::{
    any::Any,
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
    hash::BuildHasher,
    ptr,
};

use crate::reflect::{Kind, Loggable, MapInfo, SeqInfo, TypeInfo, erase};

fn address_of<C: Any>(value: &dyn Any) -> usize {
    value
        .downcast_ref::<C>()
        .map_or(0, |container| ptr::from_ref(container).addr())
}

// =============================================================================
// Sequences
// =============================================================================

impl<T: Loggable> Loggable for Vec<T> {
    fn type_info() -> TypeInfo {
        let seq = SeqInfo::new(
            T::type_info,
            |value| value.downcast_ref::<Vec<T>>().map_or(0, Vec::len),
            |value, visit| {
                if let Some(items) = value.downcast_ref::<Vec<T>>() {
                    items.iter().for_each(|item| visit(item));
                }
            },
            |value| {
                value
                    .downcast_ref::<Vec<T>>()
                    .map_or(0, |items| items.as_ptr().addr())
            },
        )
        .with_bytes(|value| value.downcast_ref::<Vec<u8>>().map(Vec::as_slice));
        TypeInfo::of::<Self>(Kind::Seq(seq))
    }
}

impl<T: Loggable> Loggable for Box<[T]> {
    fn type_info() -> TypeInfo {
        let seq = SeqInfo::new(
            T::type_info,
            |value| value.downcast_ref::<Box<[T]>>().map_or(0, |items| items.len()),
            |value, visit| {
                if let Some(items) = value.downcast_ref::<Box<[T]>>() {
                    items.iter().for_each(|item| visit(item));
                }
            },
            |value| {
                value
                    .downcast_ref::<Box<[T]>>()
                    .map_or(0, |items| items.as_ptr().addr())
            },
        )
        .with_bytes(|value| value.downcast_ref::<Box<[u8]>>().map(|bytes| &**bytes));
        TypeInfo::of::<Self>(Kind::Seq(seq))
    }
}

impl<T: Loggable> Loggable for &'static [T] {
    fn type_info() -> TypeInfo {
        let seq = SeqInfo::new(
            T::type_info,
            |value| value.downcast_ref::<&'static [T]>().map_or(0, |items| items.len()),
            |value, visit| {
                if let Some(items) = value.downcast_ref::<&'static [T]>() {
                    items.iter().for_each(|item| visit(item));
                }
            },
            |value| {
                value
                    .downcast_ref::<&'static [T]>()
                    .map_or(0, |items| items.as_ptr().addr())
            },
        )
        .with_bytes(|value| value.downcast_ref::<&'static [u8]>().copied());
        TypeInfo::of::<Self>(Kind::Seq(seq))
    }
}

impl<T: Loggable> Loggable for VecDeque<T> {
    fn type_info() -> TypeInfo {
        let seq = SeqInfo::new(
            T::type_info,
            |value| value.downcast_ref::<VecDeque<T>>().map_or(0, VecDeque::len),
            |value, visit| {
                if let Some(items) = value.downcast_ref::<VecDeque<T>>() {
                    items.iter().for_each(|item| visit(item));
                }
            },
            address_of::<VecDeque<T>>,
        );
        TypeInfo::of::<Self>(Kind::Seq(seq))
    }
}

impl<T: Loggable, S: BuildHasher + 'static> Loggable for HashSet<T, S> {
    fn type_info() -> TypeInfo {
        let seq = SeqInfo::new(
            T::type_info,
            |value| value.downcast_ref::<HashSet<T, S>>().map_or(0, HashSet::len),
            |value, visit| {
                if let Some(items) = value.downcast_ref::<HashSet<T, S>>() {
                    items.iter().for_each(|item| visit(item));
                }
            },
            address_of::<HashSet<T, S>>,
        );
        TypeInfo::of::<Self>(Kind::Seq(seq))
    }
}

impl<T: Loggable> Loggable for BTreeSet<T> {
    fn type_info() -> TypeInfo {
        let seq = SeqInfo::new(
            T::type_info,
            |value| value.downcast_ref::<BTreeSet<T>>().map_or(0, BTreeSet::len),
            |value, visit| {
                if let Some(items) = value.downcast_ref::<BTreeSet<T>>() {
                    items.iter().for_each(|item| visit(item));
                }
            },
            address_of::<BTreeSet<T>>,
        );
        TypeInfo::of::<Self>(Kind::Seq(seq))
    }
}

impl<T: Loggable, const N: usize> Loggable for [T; N] {
    fn type_info() -> TypeInfo {
        let array = SeqInfo::new(
            T::type_info,
            |_| N,
            |value, visit| {
                if let Some(items) = value.downcast_ref::<[T; N]>() {
                    items.iter().for_each(|item| visit(item));
                }
            },
            address_of::<[T; N]>,
        );
        TypeInfo::of::<Self>(Kind::Array(array))
    }
}

// =============================================================================
// Maps
// =============================================================================

impl<K: Loggable, V: Loggable, S: BuildHasher + 'static> Loggable for HashMap<K, V, S> {
    fn type_info() -> TypeInfo {
        let map = MapInfo::new(
            K::type_info,
            V::type_info,
            |value| value.downcast_ref::<HashMap<K, V, S>>().map_or(0, HashMap::len),
            |value, visit| {
                if let Some(entries) = value.downcast_ref::<HashMap<K, V, S>>() {
                    for (key, item) in entries {
                        visit(erase(key), erase(item));
                    }
                }
            },
            address_of::<HashMap<K, V, S>>,
        );
        TypeInfo::of::<Self>(Kind::Map(map))
    }
}

impl<K: Loggable, V: Loggable> Loggable for BTreeMap<K, V> {
    fn type_info() -> TypeInfo {
        let map = MapInfo::new(
            K::type_info,
            V::type_info,
            |value| value.downcast_ref::<BTreeMap<K, V>>().map_or(0, BTreeMap::len),
            |value, visit| {
                if let Some(entries) = value.downcast_ref::<BTreeMap<K, V>>() {
                    for (key, item) in entries {
                        visit(erase(key), erase(item));
                    }
                }
            },
            address_of::<BTreeMap<K, V>>,
        );
        TypeInfo::of::<Self>(Kind::Map(map))
    }
}
