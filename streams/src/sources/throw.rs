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
    error::StreamError,
    publisher::Publisher,
    subscriber::Subscriber,
    subscription::{AnySubscription, Subscription},
};

/// A stream that fails with `error` on the first positive request and signals nothing after that.
pub fn throw_error<T: 'static>(error: StreamError) -> Throw<T> {
    Throw {
        error,
        _item: PhantomData,
    }
}

#[derive(Debug)]
pub struct Throw<T> {
    error: StreamError,
    _item: PhantomData<fn() -> T>,
}

impl<T> Clone for Throw<T> {
    fn clone(&self) -> Self {
        Throw {
            error: self.error.clone(),
            _item: PhantomData,
        }
    }
}

impl<T: 'static> Publisher for Throw<T> {
    type Item = T;

    fn subscribe<S>(&self, subscriber: S) -> AnySubscription
    where S: Subscriber<Item = T> + 'static {
        AnySubscription::new(ThrowSubscription {
            slot: RefCell::new(Some((subscriber, self.error.clone()))),
        })
    }
}

struct ThrowSubscription<S> {
    slot: RefCell<Option<(S, StreamError)>>,
}

impl<S: Subscriber> Subscription for ThrowSubscription<S> {
    fn request(&self, count: ElementCount) {
        if count <= 0 {
            return;
        }
        let slot = self.slot.borrow_mut().take();
        if let Some((mut subscriber, error)) = slot {
            subscriber.on_error(error);
        }
    }

    fn cancel(&self) {
        self.slot.borrow_mut().take();
    }
}
