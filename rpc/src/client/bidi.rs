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
    context::CallContext,
    status::RpcStatus,
    tag::{CqTag, TagHandler},
    transport::BidiCall,
};

const LOG_TARGET: &str = "shuriken::rpc::client::bidi";

/// Starts a bidirectional invocation.
///
/// The two halves share the call handle but have distinct tag identities: writer operations complete on the primary
/// slot, reads on the alternate slot. Neither half reports downstream on its own; the terminal signal is delivered
/// only once both halves have finished, because only then is it known whether the call as a whole succeeded.
pub(crate) fn invoke<C, S>(
    context: CallContext,
    open: Box<dyn FnOnce(CallContext, CqTag) -> C>,
    requests: BoxPublisher<C::Request>,
    subscriber: S,
) -> AnySubscription
where
    C: BidiCall + 'static,
    C::Request: 'static,
    C::Response: 'static,
    S: Subscriber<Item = C::Response> + 'static,
{
    let call = Rc::new_cyclic(|this: &Weak<BidiInvocation<C, S>>| BidiInvocation {
        context,
        this: this.clone(),
        inner: RefCell::new(BidiInner {
            cancelled: false,
            op_in_progress: false,
            sent_final_request: false,
            enqueued_writes_done: false,
            enqueued_finish: false,
            writer_done: false,
            open: Some(open),
            stream: None,
            requests: Some(requests),
            requests_sub: None,
            next_request: None,
            status: None,
            reader_state: ReaderState::AwaitingRequest,
            requested: ElementCount::default(),
            reader_error: None,
            reader_done: false,
            subscriber: Some(subscriber),
        }),
    });
    AnySubscription::new(BidiSubscription { call })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    AwaitingRequest,
    ReadingResponse,
    End,
}

struct BidiInvocation<C: BidiCall, S> {
    context: CallContext,
    this: Weak<BidiInvocation<C, S>>,
    inner: RefCell<BidiInner<C, S>>,
}

struct BidiInner<C: BidiCall, S> {
    cancelled: bool,
    // Writer half. Mirrors the client-streaming write loop.
    op_in_progress: bool,
    sent_final_request: bool,
    enqueued_writes_done: bool,
    enqueued_finish: bool,
    writer_done: bool,
    open: Option<Box<dyn FnOnce(CallContext, CqTag) -> C>>,
    stream: Option<C>,
    requests: Option<BoxPublisher<C::Request>>,
    requests_sub: Option<AnySubscription>,
    next_request: Option<C::Request>,
    status: Option<RpcStatus>,
    // Reader half. Mirrors the server-streaming read loop.
    reader_state: ReaderState,
    // Elements the downstream has asked for that have not yet been read from the transport.
    requested: ElementCount,
    reader_error: Option<StreamError>,
    reader_done: bool,
    subscriber: Option<S>,
}

enum WriteOp<Req> {
    Write(Req),
    WritesDone,
    Finish,
}

impl<C, S> BidiInvocation<C, S>
where
    C: BidiCall + 'static,
    C::Request: 'static,
    C::Response: 'static,
    S: Subscriber<Item = C::Response> + 'static,
{
    fn writer_tag(&self) -> Option<CqTag> {
        self.this.upgrade().map(|this| CqTag::primary(this))
    }

    fn reader_tag(&self) -> Option<CqTag> {
        self.this.upgrade().map(|this| CqTag::alternate(this))
    }

    fn request(&self, count: ElementCount) {
        if self.inner.borrow().cancelled {
            return;
        }
        let start = {
            let mut inner = self.inner.borrow_mut();
            if inner.open.is_none() || count <= 0 {
                None
            } else {
                // Opening the stream posts a completion on the writer tag.
                inner.op_in_progress = true;
                inner.open.take().zip(inner.requests.take())
            }
        };
        match start {
            Some((open, requests)) => {
                let tag = match self.writer_tag() {
                    Some(tag) => tag,
                    None => return,
                };
                trace!(target: LOG_TARGET, "Opening bidirectional stream with initial demand {}", count);
                let stream = open(self.context.clone(), tag);
                self.inner.borrow_mut().stream = Some(stream);
                self.reader_request(count);

                let forwarder = RequestForwarder { call: self.this.clone() };
                let subscription = requests.subscribe(forwarder);
                self.inner.borrow_mut().requests_sub = Some(subscription);
                self.request_more_input(ElementCount::new(1));
            },
            None => self.reader_request(count),
        }
    }

    /// The reader half's demand accounting: posts a read when demand is available and no read is in flight.
    fn reader_request(&self, count: ElementCount) {
        let post = {
            let mut inner = self.inner.borrow_mut();
            inner.requested += count;
            if inner.reader_state == ReaderState::AwaitingRequest && inner.requested > 0 {
                inner.requested -= 1;
                inner.reader_state = ReaderState::ReadingResponse;
                true
            } else {
                false
            }
        };
        if post {
            if let Some(tag) = self.reader_tag() {
                let mut inner = self.inner.borrow_mut();
                if let Some(stream) = inner.stream.as_mut() {
                    stream.read(tag);
                }
            }
        }
    }

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

    fn on_request_next(&self, request: C::Request) {
        self.inner.borrow_mut().next_request = Some(request);
        self.run_enqueued_operation();
    }

    fn on_request_error(&self, error: StreamError) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.reader_error = Some(error);
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
        let tag = match self.writer_tag() {
            Some(tag) => tag,
            None => return,
        };
        match op {
            Some(WriteOp::Write(request)) => {
                trace!(target: LOG_TARGET, "Writing buffered request");
                {
                    let mut inner = self.inner.borrow_mut();
                    if let Some(stream) = inner.stream.as_mut() {
                        stream.write(request, tag);
                    }
                }
                self.request_more_input(ElementCount::new(1));
            },
            Some(WriteOp::WritesDone) => {
                trace!(target: LOG_TARGET, "Half-closing the write stream");
                let mut inner = self.inner.borrow_mut();
                if let Some(stream) = inner.stream.as_mut() {
                    stream.writes_done(tag);
                }
            },
            Some(WriteOp::Finish) => {
                trace!(target: LOG_TARGET, "Requesting the final status");
                let mut inner = self.inner.borrow_mut();
                if let Some(stream) = inner.stream.as_mut() {
                    stream.finish(tag);
                }
            },
            None => {},
        }
    }

    /// Delivers the terminal signal once both halves are done. Whichever half finishes second triggers delivery.
    fn try_shutdown(&self) {
        let outcome = {
            let mut inner = self.inner.borrow_mut();
            if !(inner.writer_done && inner.reader_done) {
                None
            } else if inner.cancelled {
                inner.subscriber.take();
                None
            } else {
                inner
                    .subscriber
                    .take()
                    .map(|subscriber| (subscriber, inner.status.take(), inner.reader_error.take()))
            }
        };
        if let Some((mut subscriber, status, reader_error)) = outcome {
            match status {
                Some(status) if !status.is_ok() => subscriber.on_error(status.into()),
                _ => match reader_error {
                    Some(error) => subscriber.on_error(error),
                    None => subscriber.on_complete(),
                },
            }
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

impl<C, S> TagHandler for BidiInvocation<C, S>
where
    C: BidiCall + 'static,
    C::Request: 'static,
    C::Response: 'static,
    S: Subscriber<Item = C::Response> + 'static,
{
    /// Writer-half completions.
    fn operation_done(&self, success: bool) {
        let sent_final_request = self.inner.borrow().sent_final_request;
        if sent_final_request {
            {
                let mut inner = self.inner.borrow_mut();
                let status = inner.stream.as_mut().map(|stream| stream.take_status());
                inner.status = status;
                inner.writer_done = true;
            }
            self.try_shutdown();
        } else if success {
            self.inner.borrow_mut().op_in_progress = false;
            self.run_enqueued_operation();
        } else {
            // The runloop is shutting down.
            trace!(target: LOG_TARGET, "Write stream aborted by queue shutdown");
            {
                let mut inner = self.inner.borrow_mut();
                inner.writer_done = true;
                inner.cancelled = true;
            }
            self.try_shutdown();
        }
    }

    /// Reader-half completions.
    fn alternate_operation_done(&self, success: bool) {
        let failed = !success || self.inner.borrow().reader_error.is_some();
        if failed {
            // The end of the read stream.
            {
                let mut inner = self.inner.borrow_mut();
                inner.reader_state = ReaderState::End;
                inner.reader_done = true;
            }
            trace!(target: LOG_TARGET, "Read stream ended");
            self.try_shutdown();
        } else {
            let (cancelled, response) = {
                let mut inner = self.inner.borrow_mut();
                let response = inner.stream.as_mut().and_then(|stream| stream.take_response());
                (inner.cancelled, response)
            };
            if !cancelled {
                if let Some(response) = response {
                    let subscriber = self.inner.borrow_mut().subscriber.take();
                    if let Some(mut subscriber) = subscriber {
                        subscriber.on_next(response);
                        let mut inner = self.inner.borrow_mut();
                        if inner.subscriber.is_none() {
                            inner.subscriber = Some(subscriber);
                        }
                    }
                }
            }
            self.inner.borrow_mut().reader_state = ReaderState::AwaitingRequest;
            self.reader_request(ElementCount::default());
        }
    }
}

struct RequestForwarder<C: BidiCall, S> {
    call: Weak<BidiInvocation<C, S>>,
}

impl<C, S> Subscriber for RequestForwarder<C, S>
where
    C: BidiCall + 'static,
    C::Request: 'static,
    C::Response: 'static,
    S: Subscriber<Item = C::Response> + 'static,
{
    type Item = C::Request;

    fn on_next(&mut self, request: C::Request) {
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

struct BidiSubscription<C: BidiCall, S> {
    call: Rc<BidiInvocation<C, S>>,
}

impl<C, S> Subscription for BidiSubscription<C, S>
where
    C: BidiCall + 'static,
    C::Request: 'static,
    C::Response: 'static,
    S: Subscriber<Item = C::Response> + 'static,
{
    fn request(&self, count: ElementCount) {
        self.call.request(count);
    }

    fn cancel(&self) {
        self.call.cancel();
    }
}
