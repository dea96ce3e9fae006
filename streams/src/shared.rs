// Copyright 2023. The Shuriken Project
//
// Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
// following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
// disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
// following disclaimer in the documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
// products derived from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
// INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
// WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
// USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! Ownership primitives for combinator state.
//!
//! A combinator usually has two halves that need to see the same state: the subscriber it hands to its upstream and
//! the subscription it hands to its downstream. Giving both halves strong ownership of each other would create a
//! reference cycle, because the upstream subscription transitively owns the subscriber chain. Instead the state lives
//! in a [`StateCell`] that the subscription half owns strongly and the subscriber half reaches through a
//! [`WeakStateCell`]. When the subscription is dropped, the weak half simply observes that the state is gone.
//!
//! Refcounts are non-atomic (`Rc`): all callbacks for a subscription are dispatched on the thread that drives it.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

/// Strongly owned, shared combinator state.
#[derive(Debug, Default)]
pub struct StateCell<T>(Rc<RefCell<T>>);

impl<T> StateCell<T> {
    pub fn new(value: T) -> Self {
        StateCell(Rc::new(RefCell::new(value)))
    }

    pub fn downgrade(&self) -> WeakStateCell<T> {
        WeakStateCell(Rc::downgrade(&self.0))
    }

    /// Runs `f` with a shared borrow of the state. Safe to nest.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.borrow())
    }

    /// Runs `f` with an exclusive borrow of the state.
    ///
    /// Must not be held across calls into subscriber or subscription callbacks: those may re-enter the combinator
    /// and borrow the same cell.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        StateCell(self.0.clone())
    }
}

/// The non-owning half of a [`StateCell`]. Access attempts after the strong half has been dropped are no-ops.
#[derive(Debug)]
pub struct WeakStateCell<T>(Weak<RefCell<T>>);

impl<T> WeakStateCell<T> {
    /// A weak cell that never upgrades. Useful as an initial value before the real cell exists.
    pub fn empty() -> Self {
        WeakStateCell(Weak::new())
    }

    pub fn upgrade(&self) -> Option<StateCell<T>> {
        self.0.upgrade().map(StateCell)
    }

    /// Runs `f` with a shared borrow of the state, if it is still alive.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.upgrade().map(|cell| cell.with(f))
    }

    /// Runs `f` with an exclusive borrow of the state, if it is still alive. The same nesting caveat as
    /// [`StateCell::with_mut`] applies.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.upgrade().map(|cell| cell.with_mut(f))
    }
}

impl<T> Clone for WeakStateCell<T> {
    fn clone(&self) -> Self {
        WeakStateCell(self.0.clone())
    }
}

impl<T> Default for WeakStateCell<T> {
    fn default() -> Self {
        WeakStateCell::empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strong_and_weak_share_state() {
        let cell = StateCell::new(1);
        let weak = cell.downgrade();
        weak.with_mut(|value| *value += 1);
        assert_eq!(cell.with(|value| *value), 2);
    }

    #[test]
    fn weak_becomes_empty_when_strong_dropped() {
        let cell = StateCell::new("state");
        let weak = cell.downgrade();
        assert!(weak.upgrade().is_some());
        drop(cell);
        assert!(weak.upgrade().is_none());
        assert_eq!(weak.with(|_| ()), None);
    }

    #[test]
    fn empty_weak_never_upgrades() {
        let weak = WeakStateCell::<u32>::empty();
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn clones_point_at_the_same_state() {
        let cell = StateCell::new(Vec::new());
        let other = cell.clone();
        other.with_mut(|v| v.push(7));
        assert_eq!(cell.with(|v| v.clone()), vec![7]);
    }
}
