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

pub fn concat_map<P, F, Q>(source: P, mapper: F) -> ConcatMap<P, F, Q>
where
    P: Publisher,
    F: FnMut(P::Item) -> Result<Q, StreamError> + Clone,
    Q: Publisher,
{
    ConcatMap {
        source,
        mapper,
        _inner: PhantomData,
    }
}

pub fn flat_map<P, F, Q>(source: P, mapper: F) -> FlatMap<P, F, Q>
where
    P: Publisher,
    F: FnMut(P::Item) -> Result<Q, StreamError> + Clone,
    Q: Publisher,
{
    concat_map(source, mapper)
}

/// The flattening here is sequential: the publishers produced by the mapper are concatenated, never interleaved.
pub type FlatMap<P, F, Q> = ConcatMap<P, F, Q>;

/// See [`PublisherExt::concat_map`](crate::publisher::PublisherExt::concat_map).
///
/// One upstream value is requested at a time; its mapped publisher is run to completion (with the downstream's
/// outstanding demand) before the next upstream value is requested.
pub struct ConcatMap<P, F, Q> {
    source: P,
    mapper: F,
    _inner: PhantomData<fn() -> Q>,
}

impl<P: Clone, F: Clone, Q> Clone for ConcatMap<P, F, Q> {
    fn clone(&self) -> Self {
        ConcatMap {
            source: self.source.clone(),
            mapper: self.mapper.clone(),
            _inner: PhantomData,
        }
    }
}

impl<P, F, Q> Publisher for ConcatMap<P, F, Q>
where
    P: Publisher,
    P::Item: 'static,
    F: FnMut(P::Item) -> Result<Q, StreamError> + Clone + 'static,
    Q: Publisher + 'static,
    Q::Item: 'static,
{
    type Item = Q::Item;

    fn subscribe<S>(&self, subscriber: S) -> AnySubscription
    where S: Subscriber<Item = Q::Item> + 'static {
        let shared = Rc::new(ConcatMapShared {
            state: Cell::new(State::Init),
            requested: Cell::new(ElementCount::default()),
            inner: RefCell::new(ConcatMapInner {
                subscriber: Some(Box::new(subscriber) as BoxSubscriber<Q::Item>),
                outer: None,
                values: None,
            }),
        });
        let outer = self.source.subscribe(OuterSubscriber::<P::Item, F, Q> {
            shared: Rc::downgrade(&shared),
            mapper: self.mapper.clone(),
            _in: PhantomData,
        });
        shared.inner.borrow_mut().outer = Some(outer);
        AnySubscription::new(ConcatMapSubscription { shared })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Init,
    RequestedPublisher,
    HasPublisher,
    OnLastPublisher,
    End,
}

struct ConcatMapShared<T> {
    state: Cell<State>,
    // Downstream demand that has not yet been satisfied by a flattened value.
    requested: Cell<ElementCount>,
    inner: RefCell<ConcatMapInner<T>>,
}

struct ConcatMapInner<T> {
    subscriber: Option<BoxSubscriber<T>>,
    outer: Option<AnySubscription>,
    values: Option<AnySubscription>,
}

impl<T: 'static> ConcatMapShared<T> {
    fn deliver(&self, value: T) {
        if self.requested.get() <= 0 {
            self.fail(StreamError::logic("Got value that was not requested"));
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

    fn fail(&self, error: StreamError) {
        if self.state.get() == State::End {
            return;
        }
        // The failure may come from the flattened values stream, in which case the outer stream is still live and
        // must be cancelled as well.
        self.cancel_all();
        let subscriber = self.inner.borrow_mut().subscriber.take();
        if let Some(mut subscriber) = subscriber {
            subscriber.on_error(error);
        }
    }

    fn cancel_all(&self) {
        self.state.set(State::End);
        let (outer, values) = {
            let mut inner = self.inner.borrow_mut();
            (inner.outer.take(), inner.values.take())
        };
        if let Some(subscription) = outer {
            subscription.cancel();
        }
        if let Some(subscription) = values {
            subscription.cancel();
        }
    }

    fn complete_downstream(&self) {
        self.state.set(State::End);
        let subscriber = self.inner.borrow_mut().subscriber.take();
        if let Some(mut subscriber) = subscriber {
            subscriber.on_complete();
        }
    }

    /// Called when the active flattened stream has completed, or when demand first arrives.
    fn request_new_publisher(&self) {
        if self.state.get() == State::OnLastPublisher {
            self.complete_downstream();
        } else if self.requested.get() != 0 {
            self.state.set(State::RequestedPublisher);
            self.request_outer(ElementCount::new(1));
        } else if self.state.get() != State::End {
            // No outstanding demand. Wait in Init for the next request.
            self.state.set(State::Init);
        }
    }

    fn request_outer(&self, count: ElementCount) {
        let outer = self.inner.borrow_mut().outer.take();
        if let Some(subscription) = outer {
            subscription.request(count);
            let mut inner = self.inner.borrow_mut();
            if inner.outer.is_none() {
                inner.outer = Some(subscription);
            }
        }
    }

    fn request_values(&self, count: ElementCount) {
        if count <= 0 {
            return;
        }
        let values = self.inner.borrow_mut().values.take();
        if let Some(subscription) = values {
            subscription.request(count);
            let mut inner = self.inner.borrow_mut();
            if inner.values.is_none() {
                inner.values = Some(subscription);
            }
        }
    }
}

struct ConcatMapSubscription<T> {
    shared: Rc<ConcatMapShared<T>>,
}

impl<T: 'static> Subscription for ConcatMapSubscription<T> {
    fn request(&self, count: ElementCount) {
        if count <= 0 {
            return;
        }
        let shared = &self.shared;
        shared.requested.set(shared.requested.get() + count);
        match shared.state.get() {
            State::End | State::RequestedPublisher => {},
            State::HasPublisher | State::OnLastPublisher => shared.request_values(count),
            State::Init => shared.request_new_publisher(),
        }
    }

    fn cancel(&self) {
        self.shared.cancel_all();
    }
}

struct OuterSubscriber<T, F, Q: Publisher> {
    shared: Weak<ConcatMapShared<Q::Item>>,
    mapper: F,
    _in: PhantomData<fn(T)>,
}

impl<T, F, Q> Subscriber for OuterSubscriber<T, F, Q>
where
    F: FnMut(T) -> Result<Q, StreamError>,
    Q: Publisher + 'static,
    Q::Item: 'static,
{
    type Item = T;

    fn on_next(&mut self, item: T) {
        let shared = match self.shared.upgrade() {
            Some(shared) => shared,
            // Stray values may arrive after everything has been torn down.
            None => return,
        };
        if shared.state.get() == State::End {
            return;
        }
        if shared.state.get() != State::RequestedPublisher {
            shared.fail(StreamError::logic("Got value that was not requested"));
            return;
        }
        match (self.mapper)(item) {
            Ok(publisher) => {
                shared.state.set(State::HasPublisher);
                let subscription = publisher.subscribe(ValuesSubscriber {
                    shared: self.shared.clone(),
                });
                shared.inner.borrow_mut().values = Some(subscription);
                shared.request_values(shared.requested.get());
            },
            Err(error) => shared.fail(error),
        }
    }

    fn on_error(&mut self, error: StreamError) {
        if let Some(shared) = self.shared.upgrade() {
            shared.fail(error);
        }
    }

    fn on_complete(&mut self) {
        let shared = match self.shared.upgrade() {
            Some(shared) => shared,
            None => return,
        };
        match shared.state.get() {
            State::End => {},
            State::Init | State::RequestedPublisher => shared.complete_downstream(),
            State::HasPublisher => {
                // The outer stream is done but a flattened stream is still live; wait it out.
                shared.state.set(State::OnLastPublisher);
            },
            State::OnLastPublisher => shared.fail(StreamError::logic("Got more than one on_complete signal")),
        }
    }
}

struct ValuesSubscriber<T> {
    shared: Weak<ConcatMapShared<T>>,
}

impl<T: 'static> Subscriber for ValuesSubscriber<T> {
    type Item = T;

    fn on_next(&mut self, item: T) {
        if let Some(shared) = self.shared.upgrade() {
            if shared.state.get() != State::End {
                shared.deliver(item);
            }
        }
    }

    fn on_error(&mut self, error: StreamError) {
        if let Some(shared) = self.shared.upgrade() {
            shared.fail(error);
        }
    }

    fn on_complete(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            if shared.state.get() != State::End {
                shared.request_new_publisher();
            }
        }
    }
}
