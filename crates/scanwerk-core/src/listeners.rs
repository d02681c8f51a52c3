// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Observer sets for zero-argument change notifications.
//
// Listeners are compared by identity (`Rc::ptr_eq`), so registering the same
// handle twice is a no-op. There are no weak references: a caller that wants
// to stop being notified must deregister.

use std::rc::Rc;

/// A registered zero-argument callback.
pub type Listener = Rc<dyn Fn()>;

/// Identity-based set of listeners, invoked synchronously on the owner's thread.
#[derive(Default, Clone)]
pub struct ListenerSet {
    listeners: Vec<Listener>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`. Returns `false` if that exact handle was already present.
    pub fn add(&mut self, listener: Listener) -> bool {
        if self.contains(&listener) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Deregister `listener`. Removing an unknown handle is a no-op returning `false`.
    pub fn remove(&mut self, listener: &Listener) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !Rc::ptr_eq(l, listener));
        self.listeners.len() != before
    }

    pub fn contains(&self, listener: &Listener) -> bool {
        self.listeners.iter().any(|l| Rc::ptr_eq(l, listener))
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Invoke every listener once.
    pub fn notify(&self) {
        // Snapshot so a listener can't invalidate the iteration.
        let snapshot = self.listeners.clone();
        for listener in snapshot {
            listener();
        }
    }
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.listeners.len())
            .finish()
    }
}
