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

//! An in-memory greeting service: scripted transport handles that fill their result slots and post completions on
//! the call's queue, the way a generated stub over a real transport would.

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use shuriken_rpc::{
    transport::{BidiCall, StreamingReader, StreamingWriter, UnaryReader},
    CallContext,
    CqTag,
    RpcStatus,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SayHelloRequest {
    pub name: String,
}

impl SayHelloRequest {
    pub fn new(name: &str) -> Self {
        SayHelloRequest { name: name.to_string() }
    }
}

/// The scripted service. Each field configures what the transport reports for the corresponding call shape; the
/// `written` log records everything the client streamed in.
pub struct GreetingStub {
    pub hello_status: RpcStatus,
    pub greetings: Vec<String>,
    pub greetings_status: RpcStatus,
    pub collect_status: RpcStatus,
    pub chat_replies: Vec<String>,
    pub chat_status: RpcStatus,
    /// Simulates the transport aborting operations (the success=false completion path).
    pub abort_operations: bool,
    pub written: Rc<RefCell<Vec<String>>>,
}

impl Default for GreetingStub {
    fn default() -> Self {
        GreetingStub {
            hello_status: RpcStatus::ok(),
            greetings: Vec::new(),
            greetings_status: RpcStatus::ok(),
            collect_status: RpcStatus::ok(),
            chat_replies: Vec::new(),
            chat_status: RpcStatus::ok(),
            abort_operations: false,
            written: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl GreetingStub {
    /// Unary: responds with a greeting for the requested name.
    pub fn say_hello(&mut self, context: CallContext, request: SayHelloRequest) -> MockUnaryReader {
        MockUnaryReader {
            context,
            response: format!("Hello, {}!", request.name),
            status: self.hello_status.clone(),
            abort: self.abort_operations,
            result: None,
        }
    }

    /// Server streaming: emits the scripted greetings, then the scripted status.
    pub fn stream_greetings(&mut self, context: CallContext, _request: SayHelloRequest, tag: CqTag) -> MockStreamReader {
        let reader = MockStreamReader {
            context: context.clone(),
            responses: self.greetings.clone().into(),
            status: self.greetings_status.clone(),
            response_slot: None,
            status_slot: None,
        };
        // The transport acknowledges the opened stream through the tag handed to the open call.
        context.queue().post(tag, true);
        reader
    }

    /// Client streaming: collects names and responds with one combined greeting.
    pub fn collect_names(&mut self, context: CallContext, tag: CqTag) -> MockStreamWriter {
        let writer = MockStreamWriter {
            context: context.clone(),
            written: self.written.clone(),
            status: self.collect_status.clone(),
            abort: self.abort_operations,
            result: None,
        };
        context.queue().post(tag, !self.abort_operations);
        writer
    }

    /// Bidi: records incoming messages and replies with the scripted responses.
    pub fn chat(&mut self, context: CallContext, tag: CqTag) -> MockBidiStream {
        let stream = MockBidiStream {
            context: context.clone(),
            written: self.written.clone(),
            replies: self.chat_replies.clone().into(),
            status: self.chat_status.clone(),
            response_slot: None,
            status_slot: None,
        };
        context.queue().post(tag, true);
        stream
    }
}

pub struct MockUnaryReader {
    context: CallContext,
    response: String,
    status: RpcStatus,
    abort: bool,
    result: Option<(Option<String>, RpcStatus)>,
}

impl UnaryReader for MockUnaryReader {
    type Response = String;

    fn finish(&mut self, tag: CqTag) {
        if self.abort {
            self.context.queue().post(tag, false);
            return;
        }
        if self.status.is_ok() {
            self.result = Some((Some(self.response.clone()), RpcStatus::ok()));
        } else {
            self.result = Some((None, self.status.clone()));
        }
        self.context.queue().post(tag, true);
    }

    fn take_result(&mut self) -> (Option<String>, RpcStatus) {
        self.result
            .take()
            .expect("take_result called before the finish completion")
    }
}

pub struct MockStreamReader {
    context: CallContext,
    responses: VecDeque<String>,
    status: RpcStatus,
    response_slot: Option<String>,
    status_slot: Option<RpcStatus>,
}

impl StreamingReader for MockStreamReader {
    type Response = String;

    fn read(&mut self, tag: CqTag) {
        if self.context.is_cancelled() {
            self.context.queue().post(tag, false);
            return;
        }
        match self.responses.pop_front() {
            Some(response) => {
                self.response_slot = Some(response);
                self.context.queue().post(tag, true);
            },
            None => self.context.queue().post(tag, false),
        }
    }

    fn take_response(&mut self) -> Option<String> {
        self.response_slot.take()
    }

    fn finish(&mut self, tag: CqTag) {
        let status = if self.context.is_cancelled() {
            RpcStatus::cancelled()
        } else {
            self.status.clone()
        };
        self.status_slot = Some(status);
        self.context.queue().post(tag, true);
    }

    fn take_status(&mut self) -> RpcStatus {
        self.status_slot
            .take()
            .expect("take_status called before the finish completion")
    }
}

pub struct MockStreamWriter {
    context: CallContext,
    written: Rc<RefCell<Vec<String>>>,
    status: RpcStatus,
    abort: bool,
    result: Option<(Option<String>, RpcStatus)>,
}

impl StreamingWriter for MockStreamWriter {
    type Request = String;
    type Response = String;

    fn write(&mut self, request: Self::Request, tag: CqTag) {
        if self.abort || self.context.is_cancelled() {
            self.context.queue().post(tag, false);
            return;
        }
        self.written.borrow_mut().push(request);
        self.context.queue().post(tag, true);
    }

    fn writes_done(&mut self, tag: CqTag) {
        self.context.queue().post(tag, !self.abort);
    }

    fn finish(&mut self, tag: CqTag) {
        if self.status.is_ok() {
            let combined = format!("Hello, {}!", self.written.borrow().join(" and "));
            self.result = Some((Some(combined), RpcStatus::ok()));
        } else {
            self.result = Some((None, self.status.clone()));
        }
        self.context.queue().post(tag, true);
    }

    fn take_result(&mut self) -> (Option<String>, RpcStatus) {
        self.result
            .take()
            .expect("take_result called before the finish completion")
    }
}

pub struct MockBidiStream {
    context: CallContext,
    written: Rc<RefCell<Vec<String>>>,
    replies: VecDeque<String>,
    status: RpcStatus,
    response_slot: Option<String>,
    status_slot: Option<RpcStatus>,
}

impl BidiCall for MockBidiStream {
    type Request = String;
    type Response = String;

    fn read(&mut self, tag: CqTag) {
        if self.context.is_cancelled() {
            self.context.queue().post(tag, false);
            return;
        }
        match self.replies.pop_front() {
            Some(reply) => {
                self.response_slot = Some(reply);
                self.context.queue().post(tag, true);
            },
            None => self.context.queue().post(tag, false),
        }
    }

    fn take_response(&mut self) -> Option<String> {
        self.response_slot.take()
    }

    fn write(&mut self, request: Self::Request, tag: CqTag) {
        if self.context.is_cancelled() {
            self.context.queue().post(tag, false);
            return;
        }
        self.written.borrow_mut().push(request);
        self.context.queue().post(tag, true);
    }

    fn writes_done(&mut self, tag: CqTag) {
        self.context.queue().post(tag, true);
    }

    fn finish(&mut self, tag: CqTag) {
        let status = if self.context.is_cancelled() {
            RpcStatus::cancelled()
        } else {
            self.status.clone()
        };
        self.status_slot = Some(status);
        self.context.queue().post(tag, true);
    }

    fn take_status(&mut self) -> RpcStatus {
        self.status_slot
            .take()
            .expect("take_status called before the finish completion")
    }
}
