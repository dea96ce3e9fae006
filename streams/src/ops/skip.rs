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

pub fn skip<P: Publisher>(source: P, count: usize) -> Skip<P> {
    Skip { source, count }
}

/// See [`PublisherExt::skip`](crate::publisher::PublisherExt::skip). Dropped values are replaced by requesting one
/// more element upstream, like a filter that rejects the first `count` values.
#[derive(Clone)]
pub struct Skip<P> {
    source: P,
    count: usize,
}

impl<P> Publisher for Skip<P>
where
    P: Publisher,
    P::Item: 'static,
{
    type Item = P::Item;

    fn subscribe<S>(&self, subscriber: S) -> AnySubscription
    where S: Subscriber<Item = P::Item> + 'static {
        let slot = StateCell::new(None);
        let upstream = self.source.subscribe(SkipSubscriber {
            subscriber,
            remaining: self.count,
            subscription: slot.downgrade(),
        });
        slot.with_mut(|cell| *cell = Some(upstream));
        AnySubscription::new(CellSubscription::new(slot))
    }
}

struct SkipSubscriber<S> {
    subscriber: S,
    remaining: usize,
    subscription: WeakStateCell<Option<AnySubscription>>,
}

impl<S: Subscriber> Subscriber for SkipSubscriber<S> {
    type Item = S::Item;

    fn on_next(&mut self, item: S::Item) {
        if self.remaining > 0 {
            self.remaining -= 1;
            let _ = self.subscription.with(|slot| {
                if let Some(upstream) = slot {
                    upstream.request(ElementCount::new(1));
                }
            });
        } else {
            self.subscriber.on_next(item);
        }
    }

    fn on_error(&mut self, error: StreamError) {
        self.subscriber.on_error(error);
    }

    fn on_complete(&mut self) {
        self.subscriber.on_complete();
    }
}
