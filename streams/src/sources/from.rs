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

use std::cell::{Cell, RefCell};

use crate::{
    element_count::ElementCount,
    publisher::Publisher,
    subscriber::Subscriber,
    subscription::{AnySubscription, Subscription},
};

/// Returns a publisher that emits the values of `items` in order, moving each value out as it is delivered.
///
/// The publisher keeps the container and clones it for every subscription, so that each subscription owns the values
/// it hands to its subscriber. An empty container completes as soon as the subscriber attaches.
pub fn from_vec<T>(items: Vec<T>) -> FromVec<T>
where T: Clone + 'static {
    FromVec { items }
}

/// [`from_vec`] over anything iterable. The items are collected up front; this is a convenience, not a lazy source.
pub fn from_iter<T, I>(items: I) -> FromVec<T>
where
    T: Clone + 'static,
    I: IntoIterator<Item = T>,
{
    from_vec(items.into_iter().collect())
}

/// A single-value stream.
pub fn just<T>(value: T) -> FromVec<T>
where T: Clone + 'static {
    from_vec(vec![value])
}

/// Emits `count` incrementing values starting at `begin`. `range(5, 2)` generates 5, 6.
pub fn range(begin: i64, count: usize) -> FromVec<i64> {
    from_vec((0..count as i64).map(|offset| begin + offset).collect())
}

/// Emits `count` copies of `value`. `repeat(5, 3)` generates 5, 5, 5.
pub fn repeat<T>(value: T, count: usize) -> FromVec<T>
where T: Clone + 'static {
    from_vec(vec![value; count])
}

#[derive(Debug, Clone)]
pub struct FromVec<T> {
    items: Vec<T>,
}

impl<T> Publisher for FromVec<T>
where T: Clone + 'static
{
    type Item = T;

    fn subscribe<S>(&self, mut subscriber: S) -> AnySubscription
    where S: Subscriber<Item = T> + 'static {
        if self.items.is_empty() {
            subscriber.on_complete();
            return AnySubscription::empty();
        }
        AnySubscription::new(FromSubscription {
            outstanding: Cell::new(ElementCount::default()),
            cancelled: Cell::new(false),
            done: Cell::new(false),
            inner: RefCell::new(FromInner {
                items: self.items.clone().into_iter(),
                subscriber,
            }),
        })
    }
}

struct FromInner<T, S> {
    items: std::vec::IntoIter<T>,
    subscriber: S,
}

struct FromSubscription<T, S> {
    // Demand that has been requested but not yet delivered. Kept outside the RefCell: re-entrant requests from within
    // `on_next` fold into this counter while the drain loop below still holds the inner borrow.
    outstanding: Cell<ElementCount>,
    cancelled: Cell<bool>,
    done: Cell<bool>,
    inner: RefCell<FromInner<T, S>>,
}

impl<T, S> Subscription for FromSubscription<T, S>
where S: Subscriber<Item = T>
{
    fn request(&self, count: ElementCount) {
        if count <= 0 {
            return;
        }

        let draining = self.outstanding.get() != 0;
        self.outstanding.set(self.outstanding.get() + count);
        if draining {
            // Further up the stack this subscription is already delivering; the loop there picks up the new demand.
            return;
        }

        while !self.cancelled.get() && self.outstanding.get() != 0 && !self.done.get() {
            let mut inner = self.inner.borrow_mut();
            let value = match inner.items.next() {
                Some(value) => value,
                None => break,
            };
            let exhausted = inner.items.len() == 0;
            inner.subscriber.on_next(value);
            if exhausted {
                self.done.set(true);
                inner.subscriber.on_complete();
            }
            drop(inner);
            // Decrement after delivering so that a re-entrant request always sees a non-zero outstanding count.
            self.outstanding.set(self.outstanding.get() - 1);
        }

        if self.done.get() {
            self.outstanding.set(ElementCount::default());
        }
    }

    fn cancel(&self) {
        self.cancelled.set(true);
    }
}
