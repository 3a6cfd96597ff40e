//! Worklist of reachable types.

use std::collections::{HashSet, VecDeque};

use crate::types::TypeHandle;

/// Tracks which types have been reached from the roots and visited.
///
/// Every reachable type is visited exactly once, whatever the number of
/// paths leading to it, so each field thunk is forced once per compile.
#[derive(Debug, Default)]
pub(crate) struct TypeRegistry {
    /// Types that have been fully visited.
    resolved: HashSet<TypeHandle>,
    /// Types currently being visited.
    resolving: HashSet<TypeHandle>,
    /// Types queued for a visit.
    pending: VecDeque<TypeHandle>,
    /// Visit order, for deterministic registration.
    order: Vec<TypeHandle>,
}

impl TypeRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Checks if a type has been visited or is being visited.
    pub(crate) fn is_known(&self, handle: TypeHandle) -> bool {
        self.resolved.contains(&handle) || self.resolving.contains(&handle)
    }

    /// Queues a type if it is neither known nor already queued.
    pub(crate) fn queue_if_needed(&mut self, handle: TypeHandle) {
        if !self.is_known(handle) && !self.pending.contains(&handle) {
            self.pending.push_back(handle);
        }
    }

    /// Gets the next type to visit.
    pub(crate) fn pop_pending(&mut self) -> Option<TypeHandle> {
        self.pending.pop_front()
    }

    pub(crate) fn start_resolving(&mut self, handle: TypeHandle) {
        self.resolving.insert(handle);
    }

    pub(crate) fn finish_resolving(&mut self, handle: TypeHandle) {
        self.resolving.remove(&handle);
        if self.resolved.insert(handle) {
            self.order.push(handle);
        }
    }

    /// Visited types in visit order.
    pub(crate) fn order(&self) -> &[TypeHandle] {
        &self.order
    }
}
