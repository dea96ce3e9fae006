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

use std::{cell::RefCell, marker::PhantomData};

use crate::{
    element_count::ElementCount,
    publisher::Publisher,
    subscriber::Subscriber,
    subscription::{AnySubscription, Subscription},
};

/// A stream that calls `make_value` on the first positive request, emits the result and completes.
///
/// The callable runs once per subscription, so subscribing twice evaluates it twice.
pub fn start<T, F>(make_value: F) -> Start<T, F>
where
    T: 'static,
    F: FnMut() -> T + Clone + 'static,
{
    Start {
        make_value,
        _item: PhantomData,
    }
}

#[derive(Debug)]
pub struct Start<T, F> {
    make_value: F,
    _item: PhantomData<fn() -> T>,
}

impl<T, F: Clone> Clone for Start<T, F> {
    fn clone(&self) -> Self {
        Start {
            make_value: self.make_value.clone(),
            _item: PhantomData,
        }
    }
}

impl<T, F> Publisher for Start<T, F>
where
    T: 'static,
    F: FnMut() -> T + Clone + 'static,
{
    type Item = T;

    fn subscribe<S>(&self, subscriber: S) -> AnySubscription
    where S: Subscriber<Item = T> + 'static {
        AnySubscription::new(StartSubscription {
            slot: RefCell::new(Some((self.make_value.clone(), subscriber))),
        })
    }
}

struct StartSubscription<F, S> {
    slot: RefCell<Option<(F, S)>>,
}

impl<F, S> Subscription for StartSubscription<F, S>
where
    S: Subscriber,
    F: FnMut() -> S::Item,
{
    fn request(&self, count: ElementCount) {
        if count <= 0 {
            return;
        }
        let slot = self.slot.borrow_mut().take();
        if let Some((mut make_value, mut subscriber)) = slot {
            subscriber.on_next(make_value());
            subscriber.on_complete();
        }
    }

    fn cancel(&self) {
        self.slot.borrow_mut().take();
    }
}
