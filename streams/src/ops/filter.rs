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

use crate::{
    element_count::ElementCount,
    error::StreamError,
    publisher::Publisher,
    shared::{StateCell, WeakStateCell},
    subscriber::Subscriber,
    subscription::{AnySubscription, CellSubscription, Subscription},
};

pub fn filter<P, F>(source: P, predicate: F) -> Filter<P, F>
where
    P: Publisher,
    F: FnMut(&P::Item) -> bool + Clone,
{
    Filter { source, predicate }
}

pub fn try_filter<P, F>(source: P, predicate: F) -> TryFilter<P, F>
where
    P: Publisher,
    F: FnMut(&P::Item) -> Result<bool, StreamError> + Clone,
{
    TryFilter { source, predicate }
}

/// See [`PublisherExt::filter`](crate::publisher::PublisherExt::filter). For every value the predicate rejects, one
/// replacement element is requested from the upstream so that the downstream still receives as many values as it
/// asked for, if the upstream has them.
#[derive(Clone)]
pub struct Filter<P, F> {
    source: P,
    predicate: F,
}

impl<P, F> Publisher for Filter<P, F>
where
    P: Publisher,
    P::Item: 'static,
    F: FnMut(&P::Item) -> bool + Clone + 'static,
{
    type Item = P::Item;

    fn subscribe<S>(&self, subscriber: S) -> AnySubscription
    where S: Subscriber<Item = P::Item> + 'static {
        let slot = StateCell::new(None);
        let upstream = self.source.subscribe(FilterSubscriber {
            subscriber,
            predicate: self.predicate.clone(),
            subscription: slot.downgrade(),
        });
        slot.with_mut(|cell| *cell = Some(upstream));
        AnySubscription::new(CellSubscription::new(slot))
    }
}

struct FilterSubscriber<S, F> {
    subscriber: S,
    predicate: F,
    subscription: WeakStateCell<Option<AnySubscription>>,
}

impl<S, F> Subscriber for FilterSubscriber<S, F>
where
    S: Subscriber,
    F: FnMut(&S::Item) -> bool,
{
    type Item = S::Item;

    fn on_next(&mut self, item: S::Item) {
        if (self.predicate)(&item) {
            self.subscriber.on_next(item);
        } else {
            // If the slot is gone the upstream subscription has been destroyed, which means it is already cancelled.
            let _ = self.subscription.with(|slot| {
                if let Some(upstream) = slot {
                    upstream.request(ElementCount::new(1));
                }
            });
        }
    }

    fn on_error(&mut self, error: StreamError) {
        self.subscriber.on_error(error);
    }

    fn on_complete(&mut self) {
        self.subscriber.on_complete();
    }
}

/// See [`PublisherExt::try_filter`](crate::publisher::PublisherExt::try_filter). Once the predicate has failed, the
/// upstream is cancelled, the error forwarded, and every subsequent signal swallowed.
#[derive(Clone)]
pub struct TryFilter<P, F> {
    source: P,
    predicate: F,
}

impl<P, F> Publisher for TryFilter<P, F>
where
    P: Publisher,
    P::Item: 'static,
    F: FnMut(&P::Item) -> Result<bool, StreamError> + Clone + 'static,
{
    type Item = P::Item;

    fn subscribe<S>(&self, subscriber: S) -> AnySubscription
    where S: Subscriber<Item = P::Item> + 'static {
        let slot = StateCell::new(None);
        let upstream = self.source.subscribe(TryFilterSubscriber {
            subscriber,
            predicate: self.predicate.clone(),
            failed: false,
            subscription: slot.downgrade(),
        });
        slot.with_mut(|cell| *cell = Some(upstream));
        AnySubscription::new(CellSubscription::new(slot))
    }
}

struct TryFilterSubscriber<S, F> {
    subscriber: S,
    predicate: F,
    failed: bool,
    subscription: WeakStateCell<Option<AnySubscription>>,
}

impl<S, F> Subscriber for TryFilterSubscriber<S, F>
where
    S: Subscriber,
    F: FnMut(&S::Item) -> Result<bool, StreamError>,
{
    type Item = S::Item;

    fn on_next(&mut self, item: S::Item) {
        if self.failed {
            return;
        }
        match (self.predicate)(&item) {
            Ok(true) => self.subscriber.on_next(item),
            Ok(false) => {
                let _ = self.subscription.with(|slot| {
                    if let Some(upstream) = slot {
                        upstream.request(ElementCount::new(1));
                    }
                });
            },
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
