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
    marker::PhantomData,
    rc::{Rc, Weak},
};

use crate::{
    element_count::ElementCount,
    error::StreamError,
    publisher::Publisher,
    subscriber::{BoxSubscriber, Subscriber},
    subscription::{AnySubscription, Subscription},
};

pub fn catch_error<P, F, Q>(source: P, handler: F) -> Catch<P, F, Q>
where
    P: Publisher,
    F: FnMut(StreamError) -> Q + Clone,
    Q: Publisher<Item = P::Item>,
{
    Catch {
        source,
        handler,
        _recovery: PhantomData,
    }
}

/// See [`PublisherExt::catch_error`](crate::publisher::PublisherExt::catch_error): the asynchronous version of a
/// try/catch. The recovery publisher picks up the demand that the failed upstream left unfulfilled.
pub struct Catch<P, F, Q> {
    source: P,
    handler: F,
    _recovery: PhantomData<fn() -> Q>,
}

impl<P: Clone, F: Clone, Q> Clone for Catch<P, F, Q> {
    fn clone(&self) -> Self {
        Catch {
            source: self.source.clone(),
            handler: self.handler.clone(),
            _recovery: PhantomData,
        }
    }
}

impl<P, F, Q> Publisher for Catch<P, F, Q>
where
    P: Publisher,
    P::Item: 'static,
    F: FnMut(StreamError) -> Q + Clone + 'static,
    Q: Publisher<Item = P::Item> + 'static,
{
    type Item = P::Item;

    fn subscribe<S>(&self, subscriber: S) -> AnySubscription
    where S: Subscriber<Item = P::Item> + 'static {
        let shared = Rc::new(CatchShared {
            requested: Cell::new(ElementCount::default()),
            cancelled: Cell::new(false),
            has_failed: Cell::new(false),
            inner: RefCell::new(CatchInner {
                subscriber: Some(Box::new(subscriber) as BoxSubscriber<P::Item>),
                handler: Some(self.handler.clone()),
                upstream: None,
                recovery: None,
            }),
        });
        let upstream = self.source.subscribe(CatchSubscriber::<P::Item, F, Q> {
            shared: Rc::downgrade(&shared),
            _recovery: PhantomData,
        });
        // The upstream may have failed during subscribe, in which case the recovery stream has already taken over
        // and this subscription must not be stored as live.
        if !shared.has_failed.get() {
            shared.inner.borrow_mut().upstream = Some(upstream);
        }
        AnySubscription::new(CatchSubscription { shared })
    }
}

struct CatchShared<T, F> {
    // Requested but not yet emitted demand; carried over to the recovery stream on failure.
    requested: Cell<ElementCount>,
    // A cancelled subscription may still fail, and in that case the recovery publisher must not be subscribed since
    // that would undo the cancellation.
    cancelled: Cell<bool>,
    has_failed: Cell<bool>,
    inner: RefCell<CatchInner<T, F>>,
}

struct CatchInner<T, F> {
    subscriber: Option<BoxSubscriber<T>>,
    handler: Option<F>,
    upstream: Option<AnySubscription>,
    recovery: Option<AnySubscription>,
}

impl<T: 'static, F> CatchShared<T, F> {
    fn deliver(&self, value: T) {
        if self.cancelled.get() {
            return;
        }
        if self.requested.get() <= 0 {
            self.cancelled.set(true);
            self.cancel_subscriptions();
            let subscriber = self.inner.borrow_mut().subscriber.take();
            if let Some(mut subscriber) = subscriber {
                subscriber.on_error(StreamError::logic("Got value that was not requested"));
            }
            return;
        }
        self.requested.set(self.requested.get() - 1);
        let subscriber = self.inner.borrow_mut().subscriber.take();
        if let Some(mut subscriber) = subscriber {
            subscriber.on_next(value);
            let mut inner = self.inner.borrow_mut();
            if inner.subscriber.is_none() {
                inner.subscriber = Some(subscriber);
            }
        }
    }

    fn cancel_subscriptions(&self) {
        let (upstream, recovery) = {
            let mut inner = self.inner.borrow_mut();
            (inner.upstream.take(), inner.recovery.take())
        };
        if let Some(subscription) = upstream {
            subscription.cancel();
        }
        if let Some(subscription) = recovery {
            subscription.cancel();
        }
    }
}

struct CatchSubscription<T, F> {
    shared: Rc<CatchShared<T, F>>,
}

impl<T: 'static, F> Subscription for CatchSubscription<T, F> {
    fn request(&self, count: ElementCount) {
        if count <= 0 {
            return;
        }
        let shared = &self.shared;
        shared.requested.set(shared.requested.get() + count);
        let slot = {
            let mut inner = shared.inner.borrow_mut();
            if shared.has_failed.get() {
                inner.recovery.take()
            } else {
                inner.upstream.take()
            }
        };
        if let Some(subscription) = slot {
            subscription.request(count);
            let mut inner = shared.inner.borrow_mut();
            let restore = if shared.has_failed.get() {
                &mut inner.recovery
            } else {
                &mut inner.upstream
            };
            if restore.is_none() {
                *restore = Some(subscription);
            }
        }
    }

    fn cancel(&self) {
        self.shared.cancelled.set(true);
        self.shared.cancel_subscriptions();
    }
}

struct CatchSubscriber<T, F, Q> {
    shared: Weak<CatchShared<T, F>>,
    _recovery: PhantomData<fn() -> Q>,
}

impl<T, F, Q> Subscriber for CatchSubscriber<T, F, Q>
where
    T: 'static,
    F: FnMut(StreamError) -> Q + 'static,
    Q: Publisher<Item = T> + 'static,
{
    type Item = T;

    fn on_next(&mut self, item: T) {
        if let Some(shared) = self.shared.upgrade() {
            shared.deliver(item);
        }
    }

    fn on_error(&mut self, error: StreamError) {
        let shared = match self.shared.upgrade() {
            Some(shared) => shared,
            None => return,
        };
        if shared.cancelled.get() {
            return;
        }
        if shared.has_failed.get() {
            // The recovery stream itself failed; that error is final.
            let subscriber = shared.inner.borrow_mut().subscriber.take();
            if let Some(mut subscriber) = subscriber {
                subscriber.on_error(error);
            }
            return;
        }
        shared.has_failed.set(true);
        let handler = shared.inner.borrow_mut().handler.take();
        let mut handler = match handler {
            Some(handler) => handler,
            None => return,
        };
        let recovery = handler(error);
        let values_subscriber: CatchSubscriber<T, F, Q> = CatchSubscriber {
            shared: self.shared.clone(),
            _recovery: PhantomData,
        };
        let subscription = recovery.subscribe(values_subscriber);
        shared.inner.borrow_mut().recovery = Some(subscription);
        // The recovery stream picks up the demand the failed stream never fulfilled.
        let outstanding = shared.requested.get();
        if outstanding > 0 {
            let slot = shared.inner.borrow_mut().recovery.take();
            if let Some(subscription) = slot {
                subscription.request(outstanding);
                let mut inner = shared.inner.borrow_mut();
                if inner.recovery.is_none() {
                    inner.recovery = Some(subscription);
                }
            }
        }
    }

    fn on_complete(&mut self) {
        let shared = match self.shared.upgrade() {
            Some(shared) => shared,
            None => return,
        };
        if shared.cancelled.get() {
            return;
        }
        let subscriber = shared.inner.borrow_mut().subscriber.take();
        if let Some(mut subscriber) = subscriber {
            subscriber.on_complete();
        }
    }
}
