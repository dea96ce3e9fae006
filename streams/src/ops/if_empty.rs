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

use std::{cell::Cell, rc::Rc};

use crate::{
    ops::concat::concat,
    publisher::{make_publisher, BoxPublisher, Publisher, PublisherExt},
    subscriber::{BoxSubscriber, Subscriber},
    subscription::AnySubscription,
};

/// Routes the stream through unchanged; if it completes without a single value, continues with `fallback` instead.
///
/// Built as a concatenation of the source (with a marker noting whether anything was emitted) and a conditional
/// publisher that either ends the stream on the spot or hands over to the fallback. The marker flag is allocated per
/// subscription, so independent subscriptions do not influence each other.
pub fn if_empty<P, Q>(source: P, fallback: Q) -> BoxPublisher<P::Item>
where
    P: Publisher + 'static,
    P::Item: 'static,
    Q: Publisher<Item = P::Item> + 'static,
{
    let source = source.boxed();
    let fallback = fallback.boxed();
    make_publisher(move |subscriber: BoxSubscriber<P::Item>| {
        let seen = Rc::new(Cell::new(false));
        let marked = {
            let seen = seen.clone();
            source
                .clone()
                .map(move |value| {
                    seen.set(true);
                    value
                })
                .boxed()
        };
        let tail = {
            let fallback = fallback.clone();
            make_publisher(move |mut subscriber: BoxSubscriber<P::Item>| {
                if seen.get() {
                    // The source produced values; there is nothing left to do. Completing on the spot keeps the
                    // concatenation from waiting for demand that the downstream has no reason to send.
                    subscriber.on_complete();
                    AnySubscription::empty()
                } else {
                    fallback.subscribe(subscriber)
                }
            })
            .boxed()
        };
        concat(vec![marked, tail]).subscribe(subscriber)
    })
    .boxed()
}
