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
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use log::*;
use shuriken_streams::{AnySubscription, ElementCount, StreamError, Subscriber, Subscription};

use crate::{
    context::CallContext,
    tag::{CqTag, TagHandler},
    transport::StreamingReader,
};

const LOG_TARGET: &str = "shuriken::rpc::client::server_streaming";

/// Starts a server-streaming invocation. Reads are posted one at a time and only while the downstream has demand;
/// with no demand outstanding the machine parks in `AwaitingRequest` with no operation in flight, so dropping the
/// subscription can free the call.
pub(crate) fn invoke<R, S>(
    context: CallContext,
    open: Box<dyn FnOnce(CallContext, CqTag) -> R>,
    subscriber: S,
) -> AnySubscription
where
    R: StreamingReader + 'static,
    R::Response: 'static,
    S: Subscriber<Item = R::Response> + 'static,
{
    let call = Rc::new_cyclic(|this: &Weak<ServerStreamingInvocation<R, S>>| ServerStreamingInvocation {
        context,
        this: this.clone(),
        state: Cell::new(ReadState::Init),
        requested: Cell::new(ElementCount::default()),
        cancelled: Cell::new(false),
        inner: RefCell::new(StreamInner {
            open: Some(open),
            reader: None,
            subscriber: Some(subscriber),
        }),
    });
    AnySubscription::new(ServerStreamingSubscription { call })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    /// The stream has been (or is being) opened; the open's completion has not arrived yet.
    Init,
    /// No operation in flight; waiting for downstream demand.
    AwaitingRequest,
    ReadingResponse,
    Finishing,
    /// The read side failed after the call stopped mattering; the pending finish completion is dropped on arrival.
    ReadFailure,
}

struct ServerStreamingInvocation<R: StreamingReader, S> {
    context: CallContext,
    this: Weak<ServerStreamingInvocation<R, S>>,
    state: Cell<ReadState>,
    // Elements the downstream has asked for that have not yet been read from the transport.
    requested: Cell<ElementCount>,
    cancelled: Cell<bool>,
    inner: RefCell<StreamInner<R, S>>,
}

struct StreamInner<R: StreamingReader, S> {
    open: Option<Box<dyn FnOnce(CallContext, CqTag) -> R>>,
    reader: Option<R>,
    subscriber: Option<S>,
}

impl<R, S> ServerStreamingInvocation<R, S>
where
    R: StreamingReader + 'static,
    R::Response: 'static,
    S: Subscriber<Item = R::Response> + 'static,
{
    fn primary_tag(&self) -> Option<CqTag> {
        self.this.upgrade().map(|this| CqTag::primary(this))
    }

    fn request(&self, count: ElementCount) {
        if self.cancelled.get() || count <= 0 {
            return;
        }
        let open = self.inner.borrow_mut().open.take();
        if let Some(open) = open {
            self.requested.set(count);
            let tag = match self.primary_tag() {
                Some(tag) => tag,
                None => return,
            };
            trace!(target: LOG_TARGET, "Opening server stream with initial demand {}", count);
            let reader = open(self.context.clone(), tag);
            self.inner.borrow_mut().reader = Some(reader);
        } else {
            self.requested.set(self.requested.get() + count);
            if self.state.get() == ReadState::AwaitingRequest {
                self.maybe_read_next();
            }
        }
    }

    fn maybe_read_next(&self) {
        if self.requested.get() > 0 {
            self.requested.set(self.requested.get() - 1);
            self.state.set(ReadState::ReadingResponse);
            if let Some(tag) = self.primary_tag() {
                let mut inner = self.inner.borrow_mut();
                if let Some(reader) = inner.reader.as_mut() {
                    reader.read(tag);
                }
            }
        } else {
            // No demand left. With no operation outstanding the queue holds no reference to this call, so if the
            // subscriber drops its subscription the call can be freed.
            self.state.set(ReadState::AwaitingRequest);
        }
    }

    fn post_finish(&self) {
        if let Some(tag) = self.primary_tag() {
            let mut inner = self.inner.borrow_mut();
            if let Some(reader) = inner.reader.as_mut() {
                reader.finish(tag);
            }
        }
    }

    fn cancel(&self) {
        self.cancelled.set(true);
        self.context.try_cancel();
    }
}

impl<R, S> TagHandler for ServerStreamingInvocation<R, S>
where
    R: StreamingReader + 'static,
    R::Response: 'static,
    S: Subscriber<Item = R::Response> + 'static,
{
    fn operation_done(&self, success: bool) {
        match self.state.get() {
            ReadState::Init => {
                trace!(target: LOG_TARGET, "Server stream opened (success = {})", success);
                if success {
                    self.maybe_read_next();
                } else {
                    self.state.set(ReadState::ReadFailure);
                    self.post_finish();
                }
            },
            ReadState::AwaitingRequest => {
                // No operation may be outstanding in this state.
                error!(target: LOG_TARGET, "Got a completion while awaiting request");
                debug_assert!(false, "got a completion while awaiting request");
            },
            ReadState::ReadingResponse => {
                if success {
                    let response = {
                        let mut inner = self.inner.borrow_mut();
                        inner.reader.as_mut().and_then(|reader| reader.take_response())
                    };
                    if !self.cancelled.get() {
                        match response {
                            Some(response) => {
                                let subscriber = self.inner.borrow_mut().subscriber.take();
                                if let Some(mut subscriber) = subscriber {
                                    subscriber.on_next(response);
                                    let mut inner = self.inner.borrow_mut();
                                    if inner.subscriber.is_none() {
                                        inner.subscriber = Some(subscriber);
                                    }
                                }
                            },
                            None => {
                                let subscriber = self.inner.borrow_mut().subscriber.take();
                                if let Some(mut subscriber) = subscriber {
                                    subscriber
                                        .on_error(StreamError::logic("Transport reported a read without a message"));
                                }
                                self.cancelled.set(true);
                            },
                        }
                    }
                    self.maybe_read_next();
                } else {
                    // The end of the stream; ask for the final status.
                    let state = if self.cancelled.get() {
                        ReadState::ReadFailure
                    } else {
                        ReadState::Finishing
                    };
                    trace!(target: LOG_TARGET, "Server stream ended; finishing");
                    self.state.set(state);
                    self.post_finish();
                }
            },
            ReadState::Finishing => {
                let (status, subscriber) = {
                    let mut inner = self.inner.borrow_mut();
                    let status = inner.reader.as_mut().map(|reader| reader.take_status());
                    (status, inner.subscriber.take())
                };
                if self.cancelled.get() {
                    return;
                }
                if let (Some(status), Some(mut subscriber)) = (status, subscriber) {
                    if status.is_ok() {
                        subscriber.on_complete();
                    } else {
                        subscriber.on_error(status.into());
                    }
                }
            },
            ReadState::ReadFailure => {
                trace!(target: LOG_TARGET, "Dropping completion for a dead server stream");
                let mut inner = self.inner.borrow_mut();
                inner.reader.take();
                inner.subscriber.take();
            },
        }
    }
}

struct ServerStreamingSubscription<R: StreamingReader, S> {
    call: Rc<ServerStreamingInvocation<R, S>>,
}

impl<R, S> Subscription for ServerStreamingSubscription<R, S>
where
    R: StreamingReader + 'static,
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
