//! Per-call cycle detection.
//!
//! Only containers on the current path are recorded: entering one that is
//! already on the path means the value graph loops back on itself. Shared but
//! acyclic substructure is rendered every time it is reached.

use std::{any::TypeId, collections::HashSet};

/// Identity of a container on the encoding path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Identity {
    type_id: TypeId,
    address: usize,
    /// Non-zero only for dynamically sized sequences, which can share a
    /// buffer address with a shorter view of themselves.
    len: usize,
}

impl Identity {
    pub(crate) fn new(type_id: TypeId, address: usize, len: usize) -> Self {
        Self {
            type_id,
            address,
            len,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct CycleDetector {
    path: HashSet<Identity>,
}

impl CycleDetector {
    /// Records `identity` on the path. Returns `false` if it is already there.
    pub(crate) fn enter(&mut self, identity: Identity) -> bool {
        self.path.insert(identity)
    }

    pub(crate) fn leave(&mut self, identity: &Identity) {
        self.path.remove(identity);
    }
}
