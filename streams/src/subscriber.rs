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

use std::{cell::RefCell, marker::PhantomData, rc::Rc};

use crate::error::StreamError;

/// The sink side of a stream.
///
/// After `on_error` or `on_complete` no further callbacks are delivered on the same subscription, and the number of
/// `on_next` calls never exceeds the demand the subscriber has requested. Publishers and combinators enforce this;
/// a subscriber does not need to defend against violations.
pub trait Subscriber {
    type Item;

    fn on_next(&mut self, item: Self::Item);

    fn on_error(&mut self, error: StreamError);

    fn on_complete(&mut self);
}

/// Type-erased subscriber. Combinators that multiplex several upstreams into one downstream store the downstream in
/// this form.
pub type BoxSubscriber<T> = Box<dyn Subscriber<Item = T>>;

impl<T> Subscriber for BoxSubscriber<T> {
    type Item = T;

    fn on_next(&mut self, item: Self::Item) {
        (**self).on_next(item)
    }

    fn on_error(&mut self, error: StreamError) {
        (**self).on_error(error)
    }

    fn on_complete(&mut self) {
        (**self).on_complete()
    }
}

/// Builds a subscriber from three callables.
pub fn subscriber_from_fns<T, N, E, C>(on_next: N, on_error: E, on_complete: C) -> CallbackSubscriber<T, N, E, C>
where
    N: FnMut(T),
    E: FnMut(StreamError),
    C: FnMut(),
{
    CallbackSubscriber {
        on_next,
        on_error,
        on_complete,
        _item: PhantomData,
    }
}

pub struct CallbackSubscriber<T, N, E, C> {
    on_next: N,
    on_error: E,
    on_complete: C,
    _item: PhantomData<fn(T)>,
}

impl<T, N, E, C> Subscriber for CallbackSubscriber<T, N, E, C>
where
    N: FnMut(T),
    E: FnMut(StreamError),
    C: FnMut(),
{
    type Item = T;

    fn on_next(&mut self, item: T) {
        (self.on_next)(item)
    }

    fn on_error(&mut self, error: StreamError) {
        (self.on_error)(error)
    }

    fn on_complete(&mut self) {
        (self.on_complete)()
    }
}

/// Wraps a shared handle to a subscriber so that several parties can deliver into the same sink.
pub struct SharedSubscriber<S>(Rc<RefCell<S>>);

impl<S> SharedSubscriber<S> {
    pub fn new(subscriber: S) -> Self {
        SharedSubscriber(Rc::new(RefCell::new(subscriber)))
    }
}

impl<S> Clone for SharedSubscriber<S> {
    fn clone(&self) -> Self {
        SharedSubscriber(self.0.clone())
    }
}

impl<S: Subscriber> Subscriber for SharedSubscriber<S> {
    type Item = S::Item;

    fn on_next(&mut self, item: Self::Item) {
        self.0.borrow_mut().on_next(item)
    }

    fn on_error(&mut self, error: StreamError) {
        self.0.borrow_mut().on_error(error)
    }

    fn on_complete(&mut self) {
        self.0.borrow_mut().on_complete()
    }
}
