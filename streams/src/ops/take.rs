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

pub fn take<P: Publisher>(source: P, count: i64) -> Take<P> {
    Take { source, count }
}

/// See [`PublisherExt::take`](crate::publisher::PublisherExt::take). On reaching the bound the downstream is
/// completed and the upstream cancelled; later upstream signals are suppressed.
#[derive(Clone)]
pub struct Take<P> {
    source: P,
    count: i64,
}

impl<P> Publisher for Take<P>
where
    P: Publisher,
    P::Item: 'static,
{
    type Item = P::Item;

    fn subscribe<S>(&self, mut subscriber: S) -> AnySubscription
    where S: Subscriber<Item = P::Item> + 'static {
        if self.count <= 0 {
            subscriber.on_complete();
            return AnySubscription::empty();
        }
        let slot = StateCell::new(None);
        let upstream = self.source.subscribe(TakeSubscriber {
            subscriber,
            remaining: self.count,
            done: false,
            subscription: slot.downgrade(),
        });
        slot.with_mut(|cell| *cell = Some(upstream));
        AnySubscription::new(CellSubscription::new(slot))
    }
}

struct TakeSubscriber<S> {
    subscriber: S,
    remaining: i64,
    done: bool,
    subscription: WeakStateCell<Option<AnySubscription>>,
}

impl<S: Subscriber> Subscriber for TakeSubscriber<S> {
    type Item = S::Item;

    fn on_next(&mut self, item: S::Item) {
        if self.done {
            return;
        }
        if self.remaining > 0 {
            self.subscriber.on_next(item);
        }
        self.remaining -= 1;
        if self.remaining <= 0 {
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
