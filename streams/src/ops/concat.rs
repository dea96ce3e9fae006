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

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::{Rc, Weak},
};

use crate::{
    element_count::ElementCount,
    error::StreamError,
    publisher::{BoxPublisher, Publisher},
    subscriber::{BoxSubscriber, Subscriber},
    subscription::{AnySubscription, Subscription},
};

/// Runs the given publishers one after another: each is subscribed only once its predecessor has completed, and
/// demand that was requested but not yet delivered carries over to the next publisher.
pub fn concat<T: 'static>(publishers: Vec<BoxPublisher<T>>) -> Concat<T> {
    Concat { publishers }
}

pub struct Concat<T> {
    publishers: Vec<BoxPublisher<T>>,
}

impl<T> Clone for Concat<T> {
    fn clone(&self) -> Self {
        Concat {
            publishers: self.publishers.clone(),
        }
    }
}

impl<T: 'static> Publisher for Concat<T> {
    type Item = T;

    fn subscribe<S>(&self, mut subscriber: S) -> AnySubscription
    where S: Subscriber<Item = T> + 'static {
        if self.publishers.is_empty() {
            subscriber.on_complete();
            return AnySubscription::empty();
        }
        let shared = Rc::new(ConcatShared {
            this: RefCell::new(Weak::new()),
            demand: Cell::new(ElementCount::default()),
            pending: Cell::new(ElementCount::default()),
            generation: Cell::new(0),
            finished: Cell::new(false),
            inner: RefCell::new(ConcatInner {
                remaining: self.publishers.iter().cloned().collect(),
                active: None,
                subscriber: Some(Box::new(subscriber) as BoxSubscriber<T>),
            }),
        });
        *shared.this.borrow_mut() = Rc::downgrade(&shared);
        let first = shared.inner.borrow_mut().remaining.pop_front();
        if let Some(publisher) = first {
            // A publisher that completes during subscribe transitions to its successor before this returns; the
            // generation check keeps the stale subscription from clobbering the successor's.
            let generation = shared.generation.get();
            let subscription = publisher.subscribe(ConcatSourceSubscriber {
                shared: Rc::downgrade(&shared),
            });
            if shared.generation.get() == generation && !shared.finished.get() {
                let mut inner = shared.inner.borrow_mut();
                if inner.active.is_none() {
                    inner.active = Some(subscription);
                }
            }
        }
        AnySubscription::new(ConcatSubscription { shared })
    }
}

struct ConcatShared<T> {
    // Used to mint the per-source subscribers; they must not own the shared state or they would cycle through it.
    this: RefCell<Weak<ConcatShared<T>>>,
    // Requested but not yet delivered downstream demand.
    demand: Cell<ElementCount>,
    // Demand that has not yet been forwarded to the currently active upstream. Re-entrant requests accumulate here
    // while the pump below has the active subscription checked out.
    pending: Cell<ElementCount>,
    // Bumped on every transition to the next publisher, so the pump knows not to restore a stale subscription.
    generation: Cell<u64>,
    finished: Cell<bool>,
    inner: RefCell<ConcatInner<T>>,
}

struct ConcatInner<T> {
    remaining: VecDeque<BoxPublisher<T>>,
    active: Option<AnySubscription>,
    subscriber: Option<BoxSubscriber<T>>,
}

impl<T: 'static> ConcatShared<T> {
    /// Forwards accumulated demand to the active upstream until none is left or the slot is unavailable.
    fn pump(&self) {
        loop {
            if self.finished.get() {
                return;
            }
            let to_forward = self.pending.get();
            if to_forward <= 0 {
                return;
            }
            let active = self.inner.borrow_mut().active.take();
            let subscription = match active {
                Some(subscription) => subscription,
                None => return,
            };
            self.pending.set(ElementCount::default());
            let generation = self.generation.get();
            subscription.request(to_forward);
            if self.generation.get() == generation && !self.finished.get() {
                let mut inner = self.inner.borrow_mut();
                if inner.active.is_none() {
                    inner.active = Some(subscription);
                }
            }
            // A transition happened during the request; the checked-out subscription belongs to a completed
            // publisher and is dropped here.
        }
    }

    fn deliver(&self, value: T) {
        if self.finished.get() {
            return;
        }
        if self.demand.get() <= 0 {
            self.fail(StreamError::logic("Got value that was not requested"));
            return;
        }
        self.demand.set(self.demand.get() - 1);
        let subscriber = self.inner.borrow_mut().subscriber.take();
        if let Some(mut subscriber) = subscriber {
            subscriber.on_next(value);
            let mut inner = self.inner.borrow_mut();
            if inner.subscriber.is_none() {
                inner.subscriber = Some(subscriber);
            }
        }
    }

    fn fail(&self, error: StreamError) {
        if self.finished.get() {
            return;
        }
        self.finished.set(true);
        let active = self.inner.borrow_mut().active.take();
        if let Some(subscription) = active {
            subscription.cancel();
        }
        let subscriber = self.inner.borrow_mut().subscriber.take();
        if let Some(mut subscriber) = subscriber {
            subscriber.on_error(error);
        }
    }

    fn activate_next(&self) {
        if self.finished.get() {
            return;
        }
        let next = self.inner.borrow_mut().remaining.pop_front();
        match next {
            Some(publisher) => {
                self.generation.set(self.generation.get() + 1);
                let generation = self.generation.get();
                let subscription = publisher.subscribe(ConcatSourceSubscriber {
                    shared: self.this.borrow().clone(),
                });
                if self.generation.get() != generation || self.finished.get() {
                    // The new publisher finished during subscribe and the chain has already moved on.
                    return;
                }
                {
                    let mut inner = self.inner.borrow_mut();
                    if inner.active.is_none() {
                        inner.active = Some(subscription);
                    }
                }
                // Undelivered demand carries over to the new upstream.
                self.pending.set(self.demand.get());
                self.pump();
            },
            None => {
                self.finished.set(true);
                self.inner.borrow_mut().active = None;
                let subscriber = self.inner.borrow_mut().subscriber.take();
                if let Some(mut subscriber) = subscriber {
                    subscriber.on_complete();
                }
            },
        }
    }
}

struct ConcatSubscription<T> {
    shared: Rc<ConcatShared<T>>,
}

impl<T: 'static> Subscription for ConcatSubscription<T> {
    fn request(&self, count: ElementCount) {
        if count <= 0 || self.shared.finished.get() {
            return;
        }
        self.shared.demand.set(self.shared.demand.get() + count);
        self.shared.pending.set(self.shared.pending.get() + count);
        self.shared.pump();
    }

    fn cancel(&self) {
        self.shared.finished.set(true);
        let active = self.shared.inner.borrow_mut().active.take();
        if let Some(subscription) = active {
            subscription.cancel();
        }
    }
}

struct ConcatSourceSubscriber<T> {
    shared: Weak<ConcatShared<T>>,
}

impl<T: 'static> Subscriber for ConcatSourceSubscriber<T> {
    type Item = T;

    fn on_next(&mut self, item: T) {
        if let Some(shared) = self.shared.upgrade() {
            shared.deliver(item);
        }
    }

    fn on_error(&mut self, error: StreamError) {
        if let Some(shared) = self.shared.upgrade() {
            shared.fail(error);
        }
    }

    fn on_complete(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.activate_next();
        }
    }
}

#[cfg(test)]
mod test {
    use shuriken_test_utils::streams::{recording, StreamEvent};

    use super::*;
    use crate::{
        publisher::PublisherExt,
        sources::{empty, from_vec, just, throw_error},
    };

    #[test]
    fn runs_publishers_in_order() {
        let (subscriber, probe) = recording();
        let sub = concat(vec![just(1).boxed(), just(2).boxed(), just(3).boxed()]).subscribe(subscriber);
        sub.request(ElementCount::new(2));
        assert_eq!(probe.next_values(), vec![1, 2]);
        assert!(!probe.is_completed());
        sub.request(ElementCount::new(1));
        assert_eq!(probe.next_values(), vec![1, 2, 3]);
        assert!(probe.is_completed());
    }

    #[test]
    fn demand_carries_across_transitions() {
        let (subscriber, probe) = recording();
        let sub = concat(vec![from_vec(vec![1]).boxed(), from_vec(vec![2, 3]).boxed()]).subscribe(subscriber);
        sub.request(ElementCount::new(3));
        assert_eq!(probe.next_values(), vec![1, 2, 3]);
        assert!(probe.is_completed());
    }

    #[test]
    fn empty_list_completes_immediately() {
        let (subscriber, probe) = recording::<i32>();
        let _sub = concat(Vec::<BoxPublisher<i32>>::new()).subscribe(subscriber);
        assert_eq!(probe.events(), vec![StreamEvent::Complete]);
    }

    #[test]
    fn empty_members_are_skipped() {
        let (subscriber, probe) = recording();
        let sub = concat(vec![empty::<i32>().boxed(), just(7).boxed(), empty::<i32>().boxed()]).subscribe(subscriber);
        sub.request(ElementCount::unbounded());
        assert_eq!(probe.next_values(), vec![7]);
        assert!(probe.is_completed());
    }

    #[test]
    fn error_in_a_member_surfaces_and_stops_the_chain() {
        let (subscriber, probe) = recording();
        let sub = concat(vec![
            just(1).boxed(),
            throw_error::<i32>(StreamError::logic("boom")).boxed(),
            just(2).boxed(),
        ])
        .subscribe(subscriber);
        sub.request(ElementCount::unbounded());
        assert_eq!(probe.next_values(), vec![1]);
        assert_eq!(probe.error_messages().len(), 1);
        assert!(!probe.is_completed());
    }

    #[test]
    fn concat_is_associative() {
        let a = || just(1).boxed();
        let b = || just(2).boxed();
        let c = || just(3).boxed();

        let (subscriber, left) = recording();
        let sub = concat(vec![concat(vec![a(), b()]).boxed(), c()]).subscribe(subscriber);
        sub.request(ElementCount::unbounded());

        let (subscriber, right) = recording();
        let sub = concat(vec![a(), concat(vec![b(), c()]).boxed()]).subscribe(subscriber);
        sub.request(ElementCount::unbounded());

        assert_eq!(left.events(), right.events());
    }

    #[test]
    fn cancel_stops_the_active_member() {
        let (subscriber, probe) = recording();
        let sub = concat(vec![from_vec(vec![1, 2, 3]).boxed(), just(4).boxed()]).subscribe(subscriber);
        sub.request(ElementCount::new(1));
        sub.cancel();
        sub.request(ElementCount::new(5));
        assert_eq!(probe.next_values(), vec![1]);
        assert!(!probe.is_completed());
    }
}
