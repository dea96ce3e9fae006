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
use shuriken_streams::{AnySubscription, BoxPublisher, ElementCount, Publisher, StreamError, Subscriber, Subscription};

use crate::{
    client::deliver_unary_outcome,
    context::CallContext,
    tag::{CqTag, TagHandler},
    transport::StreamingWriter,
};

const LOG_TARGET: &str = "shuriken::rpc::client::client_streaming";

/// Starts a client-streaming invocation.
///
/// The request publisher is consumed one element ahead: each accepted request is parked in a single slot and written
/// when no other operation is in flight, and one more element is requested from the publisher as each write starts.
/// The response is read only after the write stream has been closed; a failed request stream still closes the
/// protocol cleanly and the recorded error is delivered at the end.
pub(crate) fn invoke<W, S>(
    context: CallContext,
    open: Box<dyn FnOnce(CallContext, CqTag) -> W>,
    requests: BoxPublisher<W::Request>,
    subscriber: S,
) -> AnySubscription
where
    W: StreamingWriter + 'static,
    W::Request: 'static,
    W::Response: 'static,
    S: Subscriber<Item = W::Response> + 'static,
{
    let call = Rc::new_cyclic(|this: &Weak<ClientStreamingInvocation<W, S>>| ClientStreamingInvocation {
        context,
        this: this.clone(),
        inner: RefCell::new(WriteInner {
            cancelled: false,
            op_in_progress: false,
            sent_final_request: false,
            enqueued_writes_done: false,
            enqueued_finish: false,
            open: Some(open),
            writer: None,
            requests: Some(requests),
            requests_sub: None,
            next_request: None,
            request_stream_error: None,
            subscriber: Some(subscriber),
        }),
    });
    AnySubscription::new(ClientStreamingSubscription { call })
}

struct ClientStreamingInvocation<W: StreamingWriter, S> {
    context: CallContext,
    this: Weak<ClientStreamingInvocation<W, S>>,
    inner: RefCell<WriteInner<W, S>>,
}

struct WriteInner<W: StreamingWriter, S> {
    cancelled: bool,
    // Whether a transport operation is outstanding. Writes, writes_done and finish are strictly serialized; a newly
    // enqueued step waits here until the previous completion arrives.
    op_in_progress: bool,
    sent_final_request: bool,
    enqueued_writes_done: bool,
    enqueued_finish: bool,
    open: Option<Box<dyn FnOnce(CallContext, CqTag) -> W>>,
    writer: Option<W>,
    requests: Option<BoxPublisher<W::Request>>,
    requests_sub: Option<AnySubscription>,
    // The single-slot write queue.
    next_request: Option<W::Request>,
    request_stream_error: Option<StreamError>,
    subscriber: Option<S>,
}

enum WriteOp<Req> {
    Write(Req),
    WritesDone,
    Finish,
}

impl<W, S> ClientStreamingInvocation<W, S>
where
    W: StreamingWriter + 'static,
    W::Request: 'static,
    W::Response: 'static,
    S: Subscriber<Item = W::Response> + 'static,
{
    fn primary_tag(&self) -> Option<CqTag> {
        self.this.upgrade().map(|this| CqTag::primary(this))
    }

    fn request(&self, count: ElementCount) {
        let start = {
            let mut inner = self.inner.borrow_mut();
            if inner.cancelled || count <= 0 || inner.open.is_none() {
                None
            } else {
                // Opening the stream posts a completion, so an operation is outstanding from here on.
                inner.op_in_progress = true;
                inner.open.take().zip(inner.requests.take())
            }
        };
        let (open, requests) = match start {
            Some(start) => start,
            None => return,
        };
        let tag = match self.primary_tag() {
            Some(tag) => tag,
            None => return,
        };
        trace!(target: LOG_TARGET, "Opening client stream");
        let writer = open(self.context.clone(), tag);
        self.inner.borrow_mut().writer = Some(writer);

        let forwarder = RequestForwarder { call: self.this.clone() };
        let subscription = requests.subscribe(forwarder);
        self.inner.borrow_mut().requests_sub = Some(subscription);
        self.request_more_input(ElementCount::new(1));
    }

    /// Requests more elements from the request publisher. The subscription is taken out of the slot for the call:
    /// the publisher may deliver synchronously, and that delivery path borrows this state.
    fn request_more_input(&self, count: ElementCount) {
        let subscription = self.inner.borrow_mut().requests_sub.take();
        if let Some(subscription) = subscription {
            subscription.request(count);
            let mut inner = self.inner.borrow_mut();
            if inner.requests_sub.is_none() {
                inner.requests_sub = Some(subscription);
            }
        }
    }

    fn on_request_next(&self, request: W::Request) {
        self.inner.borrow_mut().next_request = Some(request);
        self.run_enqueued_operation();
    }

    fn on_request_error(&self, error: StreamError) {
        {
            let mut inner = self.inner.borrow_mut();
            // Half-close anyway so the protocol terminates; the recorded error is delivered at the end.
            inner.request_stream_error = Some(error);
            inner.enqueued_writes_done = true;
        }
        self.run_enqueued_operation();
    }

    fn on_request_complete(&self) {
        self.inner.borrow_mut().enqueued_writes_done = true;
        self.run_enqueued_operation();
    }

    fn run_enqueued_operation(&self) {
        let op = {
            let mut inner = self.inner.borrow_mut();
            if inner.op_in_progress || inner.cancelled {
                None
            } else if let Some(request) = inner.next_request.take() {
                inner.op_in_progress = true;
                Some(WriteOp::Write(request))
            } else if inner.enqueued_writes_done {
                inner.enqueued_writes_done = false;
                inner.enqueued_finish = true;
                inner.op_in_progress = true;
                Some(WriteOp::WritesDone)
            } else if inner.enqueued_finish {
                inner.enqueued_finish = false;
                inner.sent_final_request = true;
                inner.op_in_progress = true;
                Some(WriteOp::Finish)
            } else {
                None
            }
        };
        let tag = match self.primary_tag() {
            Some(tag) => tag,
            None => return,
        };
        match op {
            Some(WriteOp::Write(request)) => {
                trace!(target: LOG_TARGET, "Writing buffered request");
                {
                    let mut inner = self.inner.borrow_mut();
                    if let Some(writer) = inner.writer.as_mut() {
                        writer.write(request, tag);
                    }
                }
                self.request_more_input(ElementCount::new(1));
            },
            Some(WriteOp::WritesDone) => {
                trace!(target: LOG_TARGET, "Half-closing the write stream");
                let mut inner = self.inner.borrow_mut();
                if let Some(writer) = inner.writer.as_mut() {
                    writer.writes_done(tag);
                }
            },
            Some(WriteOp::Finish) => {
                trace!(target: LOG_TARGET, "Requesting the final response");
                let mut inner = self.inner.borrow_mut();
                if let Some(writer) = inner.writer.as_mut() {
                    writer.finish(tag);
                }
            },
            None => {},
        }
    }

    fn cancel(&self) {
        let subscription = {
            let mut inner = self.inner.borrow_mut();
            inner.cancelled = true;
            inner.requests_sub.take()
        };
        self.context.try_cancel();
        if let Some(subscription) = subscription {
            subscription.cancel();
        }
    }
}

impl<W, S> TagHandler for ClientStreamingInvocation<W, S>
where
    W: StreamingWriter + 'static,
    W::Request: 'static,
    W::Response: 'static,
    S: Subscriber<Item = W::Response> + 'static,
{
    fn operation_done(&self, success: bool) {
        let sent_final_request = self.inner.borrow().sent_final_request;
        if sent_final_request {
            let (cancelled, error, writer, subscriber) = {
                let mut inner = self.inner.borrow_mut();
                (
                    inner.cancelled,
                    inner.request_stream_error.take(),
                    inner.writer.take(),
                    inner.subscriber.take(),
                )
            };
            if cancelled {
                return;
            }
            if let Some(error) = error {
                if let Some(mut subscriber) = subscriber {
                    subscriber.on_error(error);
                }
                return;
            }
            if !success {
                // The runloop is shutting down; nothing is delivered.
                trace!(target: LOG_TARGET, "Client-streaming call aborted by queue shutdown");
                return;
            }
            if let (Some(mut writer), Some(mut subscriber)) = (writer, subscriber) {
                let (response, status) = writer.take_result();
                deliver_unary_outcome(response, status, &mut subscriber);
            }
        } else if success {
            self.inner.borrow_mut().op_in_progress = false;
            self.run_enqueued_operation();
        } else {
            // The runloop is shutting down mid-write.
            trace!(target: LOG_TARGET, "Write stream aborted by queue shutdown");
            let mut inner = self.inner.borrow_mut();
            inner.subscriber.take();
            inner.writer.take();
        }
    }
}

struct RequestForwarder<W: StreamingWriter, S> {
    call: Weak<ClientStreamingInvocation<W, S>>,
}

impl<W, S> Subscriber for RequestForwarder<W, S>
where
    W: StreamingWriter + 'static,
    W::Request: 'static,
    W::Response: 'static,
    S: Subscriber<Item = W::Response> + 'static,
{
    type Item = W::Request;

    fn on_next(&mut self, request: W::Request) {
        if let Some(call) = self.call.upgrade() {
            call.on_request_next(request);
        }
    }

    fn on_error(&mut self, error: StreamError) {
        if let Some(call) = self.call.upgrade() {
            call.on_request_error(error);
        }
    }

    fn on_complete(&mut self) {
        if let Some(call) = self.call.upgrade() {
            call.on_request_complete();
        }
    }
}

struct ClientStreamingSubscription<W: StreamingWriter, S> {
    call: Rc<ClientStreamingInvocation<W, S>>,
}

impl<W, S> Subscription for ClientStreamingSubscription<W, S>
where
    W: StreamingWriter + 'static,
    W::Request: 'static,
    W::Response: 'static,
    S: Subscriber<Item = W::Response> + 'static,
{
    fn request(&self, count: ElementCount) {
        self.call.request(count);
    }

    fn cancel(&self) {
        self.call.cancel();
    }
}
