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

//! The seam between the invocation state machines and a generated stub layer.
//!
//! Each RPC shape is consumed through one of these handle traits. Starting an operation hands the transport a
//! [`CqTag`]; the transport performs the operation, fills its result slot, and posts `(tag, success)` on the call's
//! event queue. The `take_*` accessors move the filled-in results out of the handle after the matching completion
//! has been observed.
//!
//! Contract for implementors: operations must never invoke a tag synchronously — completions always travel through
//! the queue — and at most one operation per direction may be outstanding on a handle at a time (reads and writes of
//! a bidirectional call may overlap, distinguished by their tags).

use crate::tag::CqTag;
use crate::status::RpcStatus;

/// The transport side of a unary call. The stub starts the call; `finish` asks for the single response and the
/// final status in one operation.
pub trait UnaryReader {
    type Response;

    fn finish(&mut self, tag: CqTag);

    /// The response and status filled by the `finish` completion. The response is `None` when the call failed.
    fn take_result(&mut self) -> (Option<Self::Response>, RpcStatus);
}

/// The transport side of a server-streaming call.
pub trait StreamingReader {
    type Response;

    /// Asks for the next message. The completion reports success=false when the stream has ended.
    fn read(&mut self, tag: CqTag);

    /// The message filled by the last successful `read` completion.
    fn take_response(&mut self) -> Option<Self::Response>;

    /// Asks for the final status once the stream has ended.
    fn finish(&mut self, tag: CqTag);

    /// The status filled by the `finish` completion.
    fn take_status(&mut self) -> RpcStatus;
}

/// The transport side of a client-streaming call.
pub trait StreamingWriter {
    type Request;
    type Response;

    fn write(&mut self, request: Self::Request, tag: CqTag);

    /// Half-closes the write stream.
    fn writes_done(&mut self, tag: CqTag);

    /// Asks for the response and final status once the writes are done.
    fn finish(&mut self, tag: CqTag);

    /// The response and status filled by the `finish` completion. The response is `None` when the call failed.
    fn take_result(&mut self) -> (Option<Self::Response>, RpcStatus);
}

/// The transport side of a bidirectional call: a read stream and a write stream over one handle. Reads are posted
/// with alternate tags, writes with primary tags.
pub trait BidiCall {
    type Request;
    type Response;

    fn read(&mut self, tag: CqTag);

    fn take_response(&mut self) -> Option<Self::Response>;

    fn write(&mut self, request: Self::Request, tag: CqTag);

    fn writes_done(&mut self, tag: CqTag);

    fn finish(&mut self, tag: CqTag);

    fn take_status(&mut self) -> RpcStatus;
}
