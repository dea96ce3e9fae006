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

/// A stream with no values: it completes on the first positive request.
pub fn empty<T: 'static>() -> Empty<T> {
    Empty(PhantomData)
}

#[derive(Debug)]
pub struct Empty<T>(PhantomData<fn() -> T>);

impl<T> Clone for Empty<T> {
    fn clone(&self) -> Self {
        Empty(PhantomData)
    }
}

impl<T: 'static> Publisher for Empty<T> {
    type Item = T;

    fn subscribe<S>(&self, subscriber: S) -> AnySubscription
    where S: Subscriber<Item = T> + 'static {
        AnySubscription::new(EmptySubscription {
            subscriber: RefCell::new(Some(subscriber)),
        })
    }
}

struct EmptySubscription<S> {
    subscriber: RefCell<Option<S>>,
}

impl<S: Subscriber> Subscription for EmptySubscription<S> {
    fn request(&self, count: ElementCount) {
        if count <= 0 {
            return;
        }
        let subscriber = self.subscriber.borrow_mut().take();
        if let Some(mut subscriber) = subscriber {
            subscriber.on_complete();
        }
    }

    fn cancel(&self) {
        self.subscriber.borrow_mut().take();
    }
}
