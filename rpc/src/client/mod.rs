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

//! The per-service client surface: lifts generated stub methods into cold response publishers.

mod bidi;
mod client_streaming;
mod server_streaming;
mod unary;

use std::{cell::RefCell, rc::Rc};

use shuriken_streams::{
    make_publisher,
    BoxPublisher,
    BoxSubscriber,
    PublisherExt,
    StreamError,
    Subscriber,
};

use crate::{
    context::CallContext,
    queue::EventQueue,
    status::RpcStatus,
    tag::CqTag,
    transport::{BidiCall, StreamingReader, StreamingWriter, UnaryReader},
};

/// A handle to one service: the generated stub plus the queue its calls complete on.
///
/// Every method returns a cold publisher. Nothing touches the transport until the returned publisher is subscribed;
/// each subscription allocates a fresh invocation with its own call context and drives the corresponding state
/// machine.
pub struct ServiceClient<S> {
    stub: Rc<RefCell<S>>,
    queue: Rc<EventQueue>,
}

impl<S> Clone for ServiceClient<S> {
    fn clone(&self) -> Self {
        ServiceClient {
            stub: self.stub.clone(),
            queue: self.queue.clone(),
        }
    }
}

impl<S: 'static> ServiceClient<S> {
    pub fn new(stub: S, queue: Rc<EventQueue>) -> Self {
        ServiceClient {
            stub: Rc::new(RefCell::new(stub)),
            queue,
        }
    }

    /// Unary call: one request in, a single-value response stream out.
    pub fn unary<Req, R, F>(&self, method: F, request: Req) -> BoxPublisher<R::Response>
    where
        Req: Clone + 'static,
        R: UnaryReader + 'static,
        R::Response: 'static,
        F: Fn(&mut S, CallContext, Req) -> R + Clone + 'static,
    {
        let stub = self.stub.clone();
        let queue = self.queue.clone();
        make_publisher(move |subscriber: BoxSubscriber<R::Response>| {
            let context = CallContext::new(queue.clone());
            let open = {
                let stub = stub.clone();
                let method = method.clone();
                let request = request.clone();
                Box::new(move |context: CallContext| method(&mut stub.borrow_mut(), context, request))
                    as Box<dyn FnOnce(CallContext) -> R>
            };
            unary::invoke(context, open, subscriber)
        })
        .boxed()
    }

    /// Server-streaming call: one request in, a response stream out.
    pub fn server_streaming<Req, R, F>(&self, method: F, request: Req) -> BoxPublisher<R::Response>
    where
        Req: Clone + 'static,
        R: StreamingReader + 'static,
        R::Response: 'static,
        F: Fn(&mut S, CallContext, Req, CqTag) -> R + Clone + 'static,
    {
        let stub = self.stub.clone();
        let queue = self.queue.clone();
        make_publisher(move |subscriber: BoxSubscriber<R::Response>| {
            let context = CallContext::new(queue.clone());
            let open = {
                let stub = stub.clone();
                let method = method.clone();
                let request = request.clone();
                Box::new(move |context: CallContext, tag: CqTag| method(&mut stub.borrow_mut(), context, request, tag))
                    as Box<dyn FnOnce(CallContext, CqTag) -> R>
            };
            server_streaming::invoke(context, open, subscriber)
        })
        .boxed()
    }

    /// Client-streaming call: a request stream in, a single-value response stream out.
    pub fn client_streaming<W, F>(&self, method: F, requests: BoxPublisher<W::Request>) -> BoxPublisher<W::Response>
    where
        W: StreamingWriter + 'static,
        W::Request: 'static,
        W::Response: 'static,
        F: Fn(&mut S, CallContext, CqTag) -> W + Clone + 'static,
    {
        let stub = self.stub.clone();
        let queue = self.queue.clone();
        make_publisher(move |subscriber: BoxSubscriber<W::Response>| {
            let context = CallContext::new(queue.clone());
            let open = {
                let stub = stub.clone();
                let method = method.clone();
                Box::new(move |context: CallContext, tag: CqTag| method(&mut stub.borrow_mut(), context, tag))
                    as Box<dyn FnOnce(CallContext, CqTag) -> W>
            };
            client_streaming::invoke(context, open, requests.clone(), subscriber)
        })
        .boxed()
    }

    /// Bidirectional call: a request stream in, a response stream out.
    pub fn bidi_streaming<C, F>(&self, method: F, requests: BoxPublisher<C::Request>) -> BoxPublisher<C::Response>
    where
        C: BidiCall + 'static,
        C::Request: 'static,
        C::Response: 'static,
        F: Fn(&mut S, CallContext, CqTag) -> C + Clone + 'static,
    {
        let stub = self.stub.clone();
        let queue = self.queue.clone();
        make_publisher(move |subscriber: BoxSubscriber<C::Response>| {
            let context = CallContext::new(queue.clone());
            let open = {
                let stub = stub.clone();
                let method = method.clone();
                Box::new(move |context: CallContext, tag: CqTag| method(&mut stub.borrow_mut(), context, tag))
                    as Box<dyn FnOnce(CallContext, CqTag) -> C>
            };
            bidi::invoke(context, open, requests.clone(), subscriber)
        })
        .boxed()
    }
}

/// The shared tail of the unary-shaped calls: one response followed by completion when the status is ok, the status
/// as an error otherwise.
fn deliver_unary_outcome<T, S>(response: Option<T>, status: RpcStatus, subscriber: &mut S)
where S: Subscriber<Item = T> {
    if status.is_ok() {
        match response {
            Some(response) => {
                subscriber.on_next(response);
                subscriber.on_complete();
            },
            None => subscriber.on_error(StreamError::logic("Transport reported success without a response")),
        }
    } else {
        subscriber.on_error(status.into());
    }
}
