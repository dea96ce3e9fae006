// Copyright 2024. The Shuriken Project
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

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use log::*;
use shuriken_streams::{AnySubscription, ElementCount, Subscriber, Subscription};

use crate::{
    client::deliver_unary_outcome,
    context::CallContext,
    tag::{CqTag, TagHandler},
    transport::UnaryReader,
};

const LOG_TARGET: &str = "shuriken::rpc::client::unary";

/// Starts a unary invocation: nothing happens until the subscriber requests at least one element, at which point the
/// stub is invoked and `finish` is posted. The completion delivers the response and completes, or errors with the
/// returned status.
pub(crate) fn invoke<R, S>(
    context: CallContext,
    open: Box<dyn FnOnce(CallContext) -> R>,
    subscriber: S,
) -> AnySubscription
where
    R: UnaryReader + 'static,
    R::Response: 'static,
    S: Subscriber<Item = R::Response> + 'static,
{
    let call = Rc::new_cyclic(|this: &Weak<UnaryInvocation<R, S>>| UnaryInvocation {
        context,
        this: this.clone(),
        inner: RefCell::new(UnaryInner {
            started: false,
            cancelled: false,
            open: Some(open),
            reader: None,
            subscriber: Some(subscriber),
        }),
    });
    AnySubscription::new(UnarySubscription { call })
}

struct UnaryInvocation<R: UnaryReader, S> {
    context: CallContext,
    this: Weak<UnaryInvocation<R, S>>,
    inner: RefCell<UnaryInner<R, S>>,
}

struct UnaryInner<R: UnaryReader, S> {
    started: bool,
    cancelled: bool,
    open: Option<Box<dyn FnOnce(CallContext) -> R>>,
    reader: Option<R>,
    subscriber: Option<S>,
}

impl<R, S> UnaryInvocation<R, S>
where
    R: UnaryReader + 'static,
    R::Response: 'static,
    S: Subscriber<Item = R::Response> + 'static,
{
    fn request(&self, count: ElementCount) {
        if count <= 0 {
            return;
        }
        let open = {
            let mut inner = self.inner.borrow_mut();
            if inner.cancelled || inner.started {
                None
            } else {
                inner.started = true;
                inner.open.take()
            }
        };
        let open = match open {
            Some(open) => open,
            None => return,
        };
        let this = match self.this.upgrade() {
            Some(this) => this,
            None => return,
        };
        trace!(target: LOG_TARGET, "Starting unary call");
        let mut reader = open(self.context.clone());
        reader.finish(CqTag::primary(this));
        self.inner.borrow_mut().reader = Some(reader);
    }

    fn cancel(&self) {
        self.inner.borrow_mut().cancelled = true;
        self.context.try_cancel();
    }
}

impl<R, S> TagHandler for UnaryInvocation<R, S>
where
    R: UnaryReader + 'static,
    R::Response: 'static,
    S: Subscriber<Item = R::Response> + 'static,
{
    fn operation_done(&self, success: bool) {
        let (cancelled, reader, subscriber) = {
            let mut inner = self.inner.borrow_mut();
            (inner.cancelled, inner.reader.take(), inner.subscriber.take())
        };
        if cancelled {
            trace!(target: LOG_TARGET, "Unary call finished after cancellation; dropping the result");
            return;
        }
        if !success {
            // The runloop is shutting down. This is not an error condition, but no more signals will be delivered on
            // this subscription.
            trace!(target: LOG_TARGET, "Unary call aborted by queue shutdown");
            return;
        }
        if let (Some(mut reader), Some(mut subscriber)) = (reader, subscriber) {
            let (response, status) = reader.take_result();
            deliver_unary_outcome(response, status, &mut subscriber);
        }
    }
}

struct UnarySubscription<R: UnaryReader, S> {
    call: Rc<UnaryInvocation<R, S>>,
}

impl<R, S> Subscription for UnarySubscription<R, S>
where
    R: UnaryReader + 'static,
    R::Response: 'static,
    S: Subscriber<Item = R::Response> + 'static,
{
    fn request(&self, count: ElementCount) {
        self.call.request(count);
    }

    fn cancel(&self) {
        self.call.cancel();
    }
}
