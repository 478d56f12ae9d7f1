//! `Loggable` for std types.
//!
//! - `scalars`: booleans, numbers, `char`, string types, markers
//! - `collections`: sequences, sets, arrays, maps
//! - `pointers`: `Box`, `Rc`, `Arc`, `Option`, references, cells and locks
//! - `dynamic`: trait objects, std errors, `serde_json::Value`

mod collections;
mod dynamic;
mod pointers;
mod scalars;
