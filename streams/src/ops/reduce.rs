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

use std::{collections::VecDeque, marker::PhantomData};

use crate::{
    element_count::ElementCount,
    error::StreamError,
    publisher::Publisher,
    shared::StateCell,
    subscriber::Subscriber,
    subscription::{AnySubscription, Subscription},
};

pub fn reduce<P, A, F>(source: P, initial: A, reducer: F) -> Reduce<P, A, F>
where
    P: Publisher,
    A: Clone,
    F: FnMut(A, P::Item) -> A + Clone,
{
    Reduce {
        source,
        initial,
        reducer,
    }
}

pub fn reduce_with<P, M, F, A>(source: P, make_initial: M, reducer: F) -> ReduceWith<P, M, F, A>
where
    P: Publisher,
    M: Fn() -> A + Clone,
    F: FnMut(A, P::Item) -> A + Clone,
{
    ReduceWith {
        source,
        make_initial,
        reducer,
        _acc: PhantomData,
    }
}

pub fn reduce_multiple<P, A, F, E>(source: P, initial: A, reducer: F, should_emit: E) -> ReduceMultiple<P, A, F, E>
where
    P: Publisher,
    A: Clone,
    F: FnMut(A, P::Item) -> A + Clone,
    E: FnMut(&A, &P::Item) -> bool + Clone,
{
    ReduceMultiple {
        source,
        initial,
        reducer,
        should_emit,
    }
}

/// See [`PublisherExt::reduce`](crate::publisher::PublisherExt::reduce).
///
/// The accumulator is emitted once two things have happened: the upstream has completed, and the downstream has
/// requested at least one element. The first positive downstream request drives the upstream with unbounded demand,
/// since the fold consumes the whole input to produce its single output.
#[derive(Clone)]
pub struct Reduce<P, A, F> {
    source: P,
    initial: A,
    reducer: F,
}

impl<P, A, F> Publisher for Reduce<P, A, F>
where
    P: Publisher,
    P::Item: 'static,
    A: Clone + 'static,
    F: FnMut(A, P::Item) -> A + Clone + 'static,
{
    type Item = A;

    fn subscribe<S>(&self, subscriber: S) -> AnySubscription
    where S: Subscriber<Item = A> + 'static {
        subscribe_reduce(&self.source, self.initial.clone(), self.reducer.clone(), subscriber)
    }
}

/// See [`PublisherExt::reduce_with`](crate::publisher::PublisherExt::reduce_with): [`Reduce`] for accumulators that
/// cannot be cloned, built fresh per subscription.
pub struct ReduceWith<P, M, F, A> {
    source: P,
    make_initial: M,
    reducer: F,
    _acc: PhantomData<fn() -> A>,
}

impl<P: Clone, M: Clone, F: Clone, A> Clone for ReduceWith<P, M, F, A> {
    fn clone(&self) -> Self {
        ReduceWith {
            source: self.source.clone(),
            make_initial: self.make_initial.clone(),
            reducer: self.reducer.clone(),
            _acc: PhantomData,
        }
    }
}

impl<P, M, F, A> Publisher for ReduceWith<P, M, F, A>
where
    P: Publisher,
    P::Item: 'static,
    A: 'static,
    M: Fn() -> A + Clone + 'static,
    F: FnMut(A, P::Item) -> A + Clone + 'static,
{
    type Item = A;

    fn subscribe<S>(&self, subscriber: S) -> AnySubscription
    where S: Subscriber<Item = A> + 'static {
        subscribe_reduce(&self.source, (self.make_initial)(), self.reducer.clone(), subscriber)
    }
}

struct ReduceState<A, S> {
    accumulator: Option<A>,
    subscriber: Option<S>,
    failed: bool,
    cancelled: bool,
    upstream_done: bool,
    result_requested: bool,
}

fn subscribe_reduce<P, A, F, S>(source: &P, initial: A, reducer: F, subscriber: S) -> AnySubscription
where
    P: Publisher,
    P::Item: 'static,
    A: 'static,
    F: FnMut(A, P::Item) -> A + 'static,
    S: Subscriber<Item = A> + 'static,
{
    let state = StateCell::new(ReduceState {
        accumulator: Some(initial),
        subscriber: Some(subscriber),
        failed: false,
        cancelled: false,
        upstream_done: false,
        result_requested: false,
    });
    let upstream = source.subscribe(ReduceSubscriber {
        state: state.clone(),
        reducer,
        _in: PhantomData,
    });
    AnySubscription::new(ReduceSubscription { state, upstream })
}

fn maybe_emit<A, S: Subscriber<Item = A>>(state: &StateCell<ReduceState<A, S>>) {
    let ready = state.with_mut(|s| {
        if s.upstream_done &&
            s.result_requested &&
            !s.failed &&
            !s.cancelled &&
            s.subscriber.is_some() &&
            s.accumulator.is_some()
        {
            Some((s.accumulator.take().unwrap(), s.subscriber.take().unwrap()))
        } else {
            None
        }
    });
    if let Some((accumulator, mut subscriber)) = ready {
        subscriber.on_next(accumulator);
        subscriber.on_complete();
    }
}

struct ReduceSubscriber<T, A, S, F> {
    state: StateCell<ReduceState<A, S>>,
    reducer: F,
    _in: PhantomData<fn(T)>,
}

impl<T, A, S, F> Subscriber for ReduceSubscriber<T, A, S, F>
where
    S: Subscriber<Item = A>,
    F: FnMut(A, T) -> A,
{
    type Item = T;

    fn on_next(&mut self, item: T) {
        let accumulator = self.state.with_mut(|s| {
            if s.failed || s.cancelled {
                None
            } else {
                s.accumulator.take()
            }
        });
        if let Some(accumulator) = accumulator {
            let next = (self.reducer)(accumulator, item);
            self.state.with_mut(|s| s.accumulator = Some(next));
        }
    }

    fn on_error(&mut self, error: StreamError) {
        let subscriber = self.state.with_mut(|s| {
            s.failed = true;
            s.subscriber.take()
        });
        if let Some(mut subscriber) = subscriber {
            subscriber.on_error(error);
        }
    }

    fn on_complete(&mut self) {
        self.state.with_mut(|s| s.upstream_done = true);
        maybe_emit(&self.state);
    }
}

struct ReduceSubscription<A, S> {
    state: StateCell<ReduceState<A, S>>,
    upstream: AnySubscription,
}

impl<A, S: Subscriber<Item = A>> Subscription for ReduceSubscription<A, S> {
    fn request(&self, count: ElementCount) {
        if count <= 0 {
            return;
        }
        self.state.with_mut(|s| s.result_requested = true);
        self.upstream.request(ElementCount::unbounded());
        maybe_emit(&self.state);
    }

    fn cancel(&self) {
        self.state.with_mut(|s| s.cancelled = true);
        self.upstream.cancel();
    }
}

/// See [`PublisherExt::reduce_multiple`](crate::publisher::PublisherExt::reduce_multiple).
///
/// Mid-stream accumulator emissions only go out while the downstream has demand; any excess is buffered and drained
/// by later requests, so the demand invariant holds even though the upstream is driven unbounded.
#[derive(Clone)]
pub struct ReduceMultiple<P, A, F, E> {
    source: P,
    initial: A,
    reducer: F,
    should_emit: E,
}

impl<P, A, F, E> Publisher for ReduceMultiple<P, A, F, E>
where
    P: Publisher,
    P::Item: 'static,
    A: Clone + 'static,
    F: FnMut(A, P::Item) -> A + Clone + 'static,
    E: FnMut(&A, &P::Item) -> bool + Clone + 'static,
{
    type Item = A;

    fn subscribe<S>(&self, subscriber: S) -> AnySubscription
    where S: Subscriber<Item = A> + 'static {
        let state = StateCell::new(MultiState {
            accumulator: Some(self.initial.clone()),
            pending: VecDeque::new(),
            subscriber: Some(subscriber),
            demand: ElementCount::default(),
            draining: false,
            started: false,
            terminated: false,
            upstream_done: false,
        });
        let upstream = self.source.subscribe(MultiSubscriber {
            state: state.clone(),
            reducer: self.reducer.clone(),
            should_emit: self.should_emit.clone(),
            initial: self.initial.clone(),
            _in: PhantomData,
        });
        AnySubscription::new(MultiSubscription { state, upstream })
    }
}

struct MultiState<A, S> {
    accumulator: Option<A>,
    pending: VecDeque<A>,
    subscriber: Option<S>,
    demand: ElementCount,
    draining: bool,
    started: bool,
    terminated: bool,
    upstream_done: bool,
}

fn drain_multi<A, S: Subscriber<Item = A>>(state: &StateCell<MultiState<A, S>>) {
    let already_draining = state.with_mut(|s| {
        let draining = s.draining;
        s.draining = true;
        draining
    });
    if already_draining {
        return;
    }

    loop {
        let step = state.with_mut(|s| {
            if s.terminated || s.demand <= 0 || s.pending.is_empty() {
                None
            } else {
                let value = s.pending.pop_front().unwrap();
                s.demand -= 1;
                s.subscriber.take().map(|subscriber| (value, subscriber))
            }
        });
        match step {
            Some((value, mut subscriber)) => {
                subscriber.on_next(value);
                state.with_mut(|s| {
                    if s.subscriber.is_none() {
                        s.subscriber = Some(subscriber);
                    }
                });
            },
            None => break,
        }
    }

    state.with_mut(|s| s.draining = false);

    let finished = state.with_mut(|s| {
        if !s.terminated && s.upstream_done && s.pending.is_empty() {
            s.terminated = true;
            s.subscriber.take()
        } else {
            None
        }
    });
    if let Some(mut subscriber) = finished {
        subscriber.on_complete();
    }
}

struct MultiSubscriber<T, A, S, F, E> {
    state: StateCell<MultiState<A, S>>,
    reducer: F,
    should_emit: E,
    initial: A,
    _in: PhantomData<fn(T)>,
}

impl<T, A, S, F, E> Subscriber for MultiSubscriber<T, A, S, F, E>
where
    A: Clone,
    S: Subscriber<Item = A>,
    F: FnMut(A, T) -> A,
    E: FnMut(&A, &T) -> bool,
{
    type Item = T;

    fn on_next(&mut self, item: T) {
        let accumulator = self.state.with_mut(|s| {
            if s.terminated {
                None
            } else {
                s.accumulator.take()
            }
        });
        let mut accumulator = match accumulator {
            Some(accumulator) => accumulator,
            None => return,
        };
        if (self.should_emit)(&accumulator, &item) {
            self.state.with_mut(|s| s.pending.push_back(accumulator));
            accumulator = self.initial.clone();
        }
        let next = (self.reducer)(accumulator, item);
        self.state.with_mut(|s| s.accumulator = Some(next));
        drain_multi(&self.state);
    }

    fn on_error(&mut self, error: StreamError) {
        let subscriber = self.state.with_mut(|s| {
            if s.terminated {
                None
            } else {
                s.terminated = true;
                s.pending.clear();
                s.subscriber.take()
            }
        });
        if let Some(mut subscriber) = subscriber {
            subscriber.on_error(error);
        }
    }

    fn on_complete(&mut self) {
        self.state.with_mut(|s| {
            if !s.terminated {
                s.upstream_done = true;
                if let Some(accumulator) = s.accumulator.take() {
                    s.pending.push_back(accumulator);
                }
            }
        });
        drain_multi(&self.state);
    }
}

struct MultiSubscription<A, S> {
    state: StateCell<MultiState<A, S>>,
    upstream: AnySubscription,
}

impl<A, S: Subscriber<Item = A>> Subscription for MultiSubscription<A, S> {
    fn request(&self, count: ElementCount) {
        if count <= 0 {
            return;
        }
        let first = self.state.with_mut(|s| {
            s.demand += count;
            let first = !s.started;
            s.started = true;
            first
        });
        if first {
            self.upstream.request(ElementCount::unbounded());
        }
        drain_multi(&self.state);
    }

    fn cancel(&self) {
        self.state.with_mut(|s| s.terminated = true);
        self.upstream.cancel();
    }
}
