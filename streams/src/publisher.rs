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

use std::{marker::PhantomData, rc::Rc};

use crate::{
    error::StreamError,
    ops,
    ops::{
        catch::Catch,
        concat_map::{ConcatMap, FlatMap},
        filter::{Filter, TryFilter},
        map::{Map, TryMap},
        reduce::{Reduce, ReduceMultiple, ReduceWith},
        skip::Skip,
        take::Take,
        take_while::TakeWhile,
    },
    subscriber::{BoxSubscriber, Subscriber},
    subscription::AnySubscription,
};

/// A factory for data flows: every call to [`subscribe`](Publisher::subscribe) starts an independent run of the
/// underlying effect and returns the subscription that controls it.
///
/// `subscribe` must not signal the subscriber synchronously during the call, and must not panic; failures are
/// reported through `on_error` once demand arrives. The only exceptions, inherited from the sources, are streams that
/// are known to be finished before any demand can matter (`take(0)` and the `from` family with an empty container),
/// which complete immediately.
pub trait Publisher {
    type Item;

    fn subscribe<S>(&self, subscriber: S) -> AnySubscription
    where S: Subscriber<Item = Self::Item> + 'static;
}

/// Builds a publisher from a callable of shape `(subscriber) -> subscription`.
pub fn make_publisher<T, F>(subscribe: F) -> FnPublisher<T, F>
where
    T: 'static,
    F: Fn(BoxSubscriber<T>) -> AnySubscription,
{
    FnPublisher {
        subscribe,
        _item: PhantomData,
    }
}

pub struct FnPublisher<T, F> {
    subscribe: F,
    _item: PhantomData<fn() -> T>,
}

impl<T, F: Clone> Clone for FnPublisher<T, F> {
    fn clone(&self) -> Self {
        FnPublisher {
            subscribe: self.subscribe.clone(),
            _item: PhantomData,
        }
    }
}

impl<T, F> Publisher for FnPublisher<T, F>
where
    T: 'static,
    F: Fn(BoxSubscriber<T>) -> AnySubscription,
{
    type Item = T;

    fn subscribe<S>(&self, subscriber: S) -> AnySubscription
    where S: Subscriber<Item = T> + 'static {
        (self.subscribe)(Box::new(subscriber))
    }
}

trait DynPublisher<T> {
    fn subscribe_dyn(&self, subscriber: BoxSubscriber<T>) -> AnySubscription;
}

impl<P> DynPublisher<P::Item> for P
where
    P: Publisher,
    P::Item: 'static,
{
    fn subscribe_dyn(&self, subscriber: BoxSubscriber<P::Item>) -> AnySubscription {
        self.subscribe(subscriber)
    }
}

/// A cheaply cloneable, type-erased publisher handle.
///
/// Multiplexing combinators take their inputs in this form so that publishers of different concrete types can flow
/// through the same stream.
pub struct BoxPublisher<T>(Rc<dyn DynPublisher<T>>);

impl<T: 'static> BoxPublisher<T> {
    pub fn new<P>(publisher: P) -> Self
    where P: Publisher<Item = T> + 'static {
        BoxPublisher(Rc::new(publisher))
    }
}

impl<T> Clone for BoxPublisher<T> {
    fn clone(&self) -> Self {
        BoxPublisher(self.0.clone())
    }
}

impl<T: 'static> Publisher for BoxPublisher<T> {
    type Item = T;

    fn subscribe<S>(&self, subscriber: S) -> AnySubscription
    where S: Subscriber<Item = T> + 'static {
        self.0.subscribe_dyn(Box::new(subscriber))
    }
}

/// The combinator surface. Adapters consume `self` and are subscribed through the assembled chain; the upstream
/// publisher itself is only run when the returned publisher is subscribed.
pub trait PublisherExt: Publisher + Sized {
    /// Erases the publisher's concrete type.
    fn boxed(self) -> BoxPublisher<Self::Item>
    where
        Self: 'static,
        Self::Item: 'static,
    {
        BoxPublisher::new(self)
    }

    /// Emits `f(v)` for every upstream value `v`.
    fn map<U, F>(self, f: F) -> Map<Self, F, U>
    where F: FnMut(Self::Item) -> U + Clone {
        ops::map::map(self, f)
    }

    /// Like [`map`](PublisherExt::map), but the callback may fail. On `Err` the upstream is cancelled and the error
    /// is forwarded downstream.
    fn try_map<U, F>(self, f: F) -> TryMap<Self, F, U>
    where F: FnMut(Self::Item) -> Result<U, StreamError> + Clone {
        ops::map::try_map(self, f)
    }

    /// Emits the values for which `predicate` returns true. Each value that is filtered out is replaced by
    /// requesting one more element upstream, so downstream demand is still honored.
    fn filter<F>(self, predicate: F) -> Filter<Self, F>
    where F: FnMut(&Self::Item) -> bool + Clone {
        ops::filter::filter(self, predicate)
    }

    /// Like [`filter`](PublisherExt::filter), but the predicate may fail. On `Err` the upstream is cancelled and the
    /// error is forwarded downstream.
    fn try_filter<F>(self, predicate: F) -> TryFilter<Self, F>
    where F: FnMut(&Self::Item) -> Result<bool, StreamError> + Clone {
        ops::filter::try_filter(self, predicate)
    }

    /// Emits at most `count` values, then completes and cancels the upstream. `take(0)` completes as soon as the
    /// subscriber attaches, without subscribing upstream at all.
    fn take(self, count: i64) -> Take<Self> {
        ops::take::take(self, count)
    }

    /// Emits values until `predicate` returns false, then completes and cancels the upstream.
    fn take_while<F>(self, predicate: F) -> TakeWhile<Self, F>
    where F: FnMut(&Self::Item) -> bool + Clone {
        ops::take_while::take_while(self, predicate)
    }

    /// Drops the first `count` values, then passes everything through.
    fn skip(self, count: usize) -> Skip<Self> {
        ops::skip::skip(self, count)
    }

    /// Emits the first value of the stream, or fails with an out-of-range error if the stream is empty.
    fn first(self) -> BoxPublisher<Self::Item>
    where
        Self: 'static,
        Self::Item: 'static,
    {
        ops::first::first(self)
    }

    /// Emits the first value matching `predicate`, or fails with an out-of-range error if there is none.
    fn first_where<F>(self, predicate: F) -> BoxPublisher<Self::Item>
    where
        Self: 'static,
        Self::Item: 'static,
        F: FnMut(&Self::Item) -> bool + Clone + 'static,
    {
        ops::first::first_where(self, predicate)
    }

    /// Emits the last value of the stream, or fails with an out-of-range error if the stream is empty.
    fn last(self) -> BoxPublisher<Self::Item>
    where
        Self: 'static,
        Self::Item: 'static,
    {
        ops::last::last(self)
    }

    /// Emits the value at `index`, or fails with an out-of-range error if the stream is shorter.
    fn element_at(self, index: usize) -> BoxPublisher<Self::Item>
    where
        Self: 'static,
        Self::Item: 'static,
    {
        ops::element_at::element_at(self, index)
    }

    /// Emits a single boolean: whether any upstream value equals `value`. Cancels the upstream on the first match.
    fn contains(self, value: Self::Item) -> BoxPublisher<bool>
    where
        Self: 'static,
        Self::Item: PartialEq + Clone + 'static,
    {
        ops::some::contains(self, value)
    }

    /// Emits a single boolean: whether any upstream value matches `predicate`. Cancels the upstream on the first
    /// match.
    fn some<F>(self, predicate: F) -> BoxPublisher<bool>
    where
        Self: 'static,
        Self::Item: 'static,
        F: FnMut(&Self::Item) -> bool + Clone + 'static,
    {
        ops::some::some(self, predicate)
    }

    /// Emits the number of upstream values as a single value on completion.
    fn count(self) -> BoxPublisher<usize>
    where
        Self: 'static,
        Self::Item: 'static,
    {
        ops::count::count(self)
    }

    /// Folds the stream and emits the accumulator exactly once when the upstream completes.
    fn reduce<A, F>(self, initial: A, reducer: F) -> Reduce<Self, A, F>
    where
        A: Clone,
        F: FnMut(A, Self::Item) -> A + Clone,
    {
        ops::reduce::reduce(self, initial, reducer)
    }

    /// Like [`reduce`](PublisherExt::reduce), but takes a function producing the initial value. Useful when the
    /// initial value is not cloneable.
    fn reduce_with<A, M, F>(self, make_initial: M, reducer: F) -> ReduceWith<Self, M, F, A>
    where
        M: Fn() -> A + Clone,
        F: FnMut(A, Self::Item) -> A + Clone,
    {
        ops::reduce::reduce_with(self, make_initial, reducer)
    }

    /// Folds the stream, emitting and resetting the accumulator whenever `should_emit` holds for the incoming value.
    /// The final accumulator is always emitted when the upstream completes.
    fn reduce_multiple<A, F, E>(self, initial: A, reducer: F, should_emit: E) -> ReduceMultiple<Self, A, F, E>
    where
        A: Clone,
        F: FnMut(A, Self::Item) -> A + Clone,
        E: FnMut(&A, &Self::Item) -> bool + Clone,
    {
        ops::reduce::reduce_multiple(self, initial, reducer, should_emit)
    }

    /// Routes values through unchanged. If the upstream completes without emitting anything, the output continues
    /// with `fallback` instead.
    fn if_empty<P>(self, fallback: P) -> BoxPublisher<Self::Item>
    where
        Self: 'static,
        Self::Item: 'static,
        P: Publisher<Item = Self::Item> + 'static,
    {
        ops::if_empty::if_empty(self, fallback)
    }

    /// Prefixes the stream with the given values.
    fn start_with(self, values: Vec<Self::Item>) -> BoxPublisher<Self::Item>
    where
        Self: 'static,
        Self::Item: Clone + 'static,
    {
        ops::start_with::start_with(self, values)
    }

    /// Prefixes the stream with a single lazily produced value.
    fn start_with_get<M>(self, make_value: M) -> BoxPublisher<Self::Item>
    where
        Self: 'static,
        Self::Item: 'static,
        M: FnMut() -> Self::Item + Clone + 'static,
    {
        ops::start_with::start_with_get(self, make_value)
    }

    /// Continues with `publisher` after this stream completes.
    fn append<P>(self, publisher: P) -> BoxPublisher<Self::Item>
    where
        Self: 'static,
        Self::Item: 'static,
        P: Publisher<Item = Self::Item> + 'static,
    {
        ops::append::append(self, publisher)
    }

    /// Runs `publisher` to completion before this stream.
    fn prepend<P>(self, publisher: P) -> BoxPublisher<Self::Item>
    where
        Self: 'static,
        Self::Item: 'static,
        P: Publisher<Item = Self::Item> + 'static,
    {
        ops::append::prepend(self, publisher)
    }

    /// Maps every upstream value to a publisher and flattens their outputs sequentially: only one inner publisher is
    /// active at a time, and the next upstream value is requested only when the current inner stream completes. A
    /// mapper failure cancels everything and is forwarded downstream.
    fn concat_map<F, P>(self, mapper: F) -> ConcatMap<Self, F, P>
    where
        F: FnMut(Self::Item) -> Result<P, StreamError> + Clone,
        P: Publisher,
    {
        ops::concat_map::concat_map(self, mapper)
    }

    /// Alias for [`concat_map`](PublisherExt::concat_map): flattening here is sequential, not interleaved.
    fn flat_map<F, P>(self, mapper: F) -> FlatMap<Self, F, P>
    where
        F: FnMut(Self::Item) -> Result<P, StreamError> + Clone,
        P: Publisher,
    {
        ops::concat_map::flat_map(self, mapper)
    }

    /// Passes values through; if the upstream fails, `handler` maps the error to a recovery publisher whose output
    /// continues the stream with the unfulfilled demand carried over.
    fn catch_error<F, P>(self, handler: F) -> Catch<Self, F, P>
    where
        F: FnMut(StreamError) -> P + Clone,
        P: Publisher<Item = Self::Item>,
    {
        ops::catch::catch_error(self, handler)
    }
}

impl<P: Publisher + Sized> PublisherExt for P {}

#[cfg(test)]
mod test {
    use shuriken_test_utils::streams::{recording, StreamEvent};

    use super::*;
    use crate::{element_count::ElementCount, sources::just, subscription::Subscription};

    #[test]
    fn make_publisher_runs_the_callable_per_subscription() {
        let publisher = make_publisher(|mut subscriber: BoxSubscriber<i32>| {
            subscriber.on_complete();
            AnySubscription::empty()
        });
        for _ in 0..2 {
            let (subscriber, probe) = recording::<i32>();
            let _sub = publisher.subscribe(subscriber);
            assert_eq!(probe.events(), vec![StreamEvent::Complete]);
        }
    }

    #[test]
    fn boxed_publisher_behaves_like_the_original() {
        let boxed = just(1).boxed();
        let clone = boxed.clone();
        for publisher in [boxed, clone] {
            let (subscriber, probe) = recording();
            let sub = publisher.subscribe(subscriber);
            sub.request(ElementCount::new(1));
            assert_eq!(probe.events(), vec![StreamEvent::Next(1), StreamEvent::Complete]);
        }
    }
}
