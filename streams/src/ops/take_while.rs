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
    error::StreamError,
    publisher::Publisher,
    shared::{StateCell, WeakStateCell},
    subscriber::Subscriber,
    subscription::{AnySubscription, CellSubscription, Subscription},
};

pub fn take_while<P, F>(source: P, predicate: F) -> TakeWhile<P, F>
where
    P: Publisher,
    F: FnMut(&P::Item) -> bool + Clone,
{
    TakeWhile { source, predicate }
}

/// See [`PublisherExt::take_while`](crate::publisher::PublisherExt::take_while). The first rejected value completes
/// the downstream and cancels the upstream; the rejected value itself is not emitted.
#[derive(Clone)]
pub struct TakeWhile<P, F> {
    source: P,
    predicate: F,
}

impl<P, F> Publisher for TakeWhile<P, F>
where
    P: Publisher,
    P::Item: 'static,
    F: FnMut(&P::Item) -> bool + Clone + 'static,
{
    type Item = P::Item;

    fn subscribe<S>(&self, subscriber: S) -> AnySubscription
    where S: Subscriber<Item = P::Item> + 'static {
        let slot = StateCell::new(None);
        let upstream = self.source.subscribe(TakeWhileSubscriber {
            subscriber,
            predicate: self.predicate.clone(),
            done: false,
            subscription: slot.downgrade(),
        });
        slot.with_mut(|cell| *cell = Some(upstream));
        AnySubscription::new(CellSubscription::new(slot))
    }
}

struct TakeWhileSubscriber<S, F> {
    subscriber: S,
    predicate: F,
    done: bool,
    subscription: WeakStateCell<Option<AnySubscription>>,
}

impl<S, F> Subscriber for TakeWhileSubscriber<S, F>
where
    S: Subscriber,
    F: FnMut(&S::Item) -> bool,
{
    type Item = S::Item;

    fn on_next(&mut self, item: S::Item) {
        if self.done {
            return;
        }
        if (self.predicate)(&item) {
            self.subscriber.on_next(item);
        } else {
            self.subscriber.on_complete();
            let _ = self.subscription.with(|slot| {
                if let Some(upstream) = slot {
                    upstream.cancel();
                }
            });
            self.done = true;
        }
    }

    fn on_error(&mut self, error: StreamError) {
        if !self.done {
            self.subscriber.on_error(error);
        }
    }

    fn on_complete(&mut self) {
        if !self.done {
            self.subscriber.on_complete();
        }
    }
}
