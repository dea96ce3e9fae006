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

use std::marker::PhantomData;

use crate::{
    error::StreamError,
    publisher::Publisher,
    shared::{StateCell, WeakStateCell},
    subscriber::Subscriber,
    subscription::{AnySubscription, CellSubscription, Subscription},
};

pub fn map<P, F, U>(source: P, f: F) -> Map<P, F, U>
where
    P: Publisher,
    F: FnMut(P::Item) -> U + Clone,
{
    Map {
        source,
        f,
        _out: PhantomData,
    }
}

pub fn try_map<P, F, U>(source: P, f: F) -> TryMap<P, F, U>
where
    P: Publisher,
    F: FnMut(P::Item) -> Result<U, StreamError> + Clone,
{
    TryMap {
        source,
        f,
        _out: PhantomData,
    }
}

/// See [`PublisherExt::map`](crate::publisher::PublisherExt::map). Demand passes through unchanged; errors and
/// completion are forwarded as-is.
pub struct Map<P, F, U> {
    source: P,
    f: F,
    _out: PhantomData<fn() -> U>,
}

impl<P: Clone, F: Clone, U> Clone for Map<P, F, U> {
    fn clone(&self) -> Self {
        Map {
            source: self.source.clone(),
            f: self.f.clone(),
            _out: PhantomData,
        }
    }
}

impl<P, F, U> Publisher for Map<P, F, U>
where
    P: Publisher,
    P::Item: 'static,
    F: FnMut(P::Item) -> U + Clone + 'static,
    U: 'static,
{
    type Item = U;

    fn subscribe<S>(&self, subscriber: S) -> AnySubscription
    where S: Subscriber<Item = U> + 'static {
        self.source.subscribe(MapSubscriber {
            subscriber,
            f: self.f.clone(),
            _in: PhantomData,
        })
    }
}

struct MapSubscriber<T, S, F> {
    subscriber: S,
    f: F,
    _in: PhantomData<fn(T)>,
}

impl<T, S, F, U> Subscriber for MapSubscriber<T, S, F>
where
    S: Subscriber<Item = U>,
    F: FnMut(T) -> U,
{
    type Item = T;

    fn on_next(&mut self, item: T) {
        let mapped = (self.f)(item);
        self.subscriber.on_next(mapped);
    }

    fn on_error(&mut self, error: StreamError) {
        self.subscriber.on_error(error);
    }

    fn on_complete(&mut self) {
        self.subscriber.on_complete();
    }
}

/// See [`PublisherExt::try_map`](crate::publisher::PublisherExt::try_map). A failed callback cancels the upstream and
/// forwards the error; once that happens all further upstream signals are swallowed.
pub struct TryMap<P, F, U> {
    source: P,
    f: F,
    _out: PhantomData<fn() -> U>,
}

impl<P: Clone, F: Clone, U> Clone for TryMap<P, F, U> {
    fn clone(&self) -> Self {
        TryMap {
            source: self.source.clone(),
            f: self.f.clone(),
            _out: PhantomData,
        }
    }
}

impl<P, F, U> Publisher for TryMap<P, F, U>
where
    P: Publisher,
    P::Item: 'static,
    F: FnMut(P::Item) -> Result<U, StreamError> + Clone + 'static,
    U: 'static,
{
    type Item = U;

    fn subscribe<S>(&self, subscriber: S) -> AnySubscription
    where S: Subscriber<Item = U> + 'static {
        let slot = StateCell::new(None);
        let upstream = self.source.subscribe(TryMapSubscriber {
            subscriber,
            f: self.f.clone(),
            failed: false,
            subscription: slot.downgrade(),
            _in: PhantomData,
        });
        slot.with_mut(|cell| *cell = Some(upstream));
        AnySubscription::new(CellSubscription::new(slot))
    }
}

struct TryMapSubscriber<T, S, F> {
    subscriber: S,
    f: F,
    failed: bool,
    subscription: WeakStateCell<Option<AnySubscription>>,
    _in: PhantomData<fn(T)>,
}

impl<T, S, F, U> Subscriber for TryMapSubscriber<T, S, F>
where
    S: Subscriber<Item = U>,
    F: FnMut(T) -> Result<U, StreamError>,
{
    type Item = T;

    fn on_next(&mut self, item: T) {
        if self.failed {
            return;
        }
        match (self.f)(item) {
            Ok(mapped) => self.subscriber.on_next(mapped),
            Err(error) => {
                self.failed = true;
                let _ = self.subscription.with(|slot| {
                    if let Some(upstream) = slot {
                        upstream.cancel();
                    }
                });
                self.subscriber.on_error(error);
            },
        }
    }

    fn on_error(&mut self, error: StreamError) {
        if !self.failed {
            self.subscriber.on_error(error);
        }
    }

    fn on_complete(&mut self) {
        if !self.failed {
            self.subscriber.on_complete();
        }
    }
}
