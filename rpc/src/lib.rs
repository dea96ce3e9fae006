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

//! Binds the shuriken reactive-streams core to a completion-queue RPC transport.
//!
//! A [`Runloop`] owns an [`EventQueue`](queue::EventQueue) and drives it; a [`ServiceClient`] turns generated stub
//! methods into cold [`BoxPublisher`](shuriken_streams::BoxPublisher)s of responses. Subscribing to one of those
//! publishers allocates a per-call state machine that interleaves transport operations (posted as
//! [`CqTag`](tag::CqTag)s) with the demand the subscriber signals, for each of the four call shapes: unary,
//! server-streaming, client-streaming and bidirectional.
//!
//! The transport itself is consumed through the handle traits in [`transport`]; generated stubs implement them, and
//! tests script them with in-memory fakes.

pub mod client;
pub mod context;
pub mod queue;
pub mod runloop;
pub mod status;
pub mod tag;
pub mod transport;

pub use client::ServiceClient;
pub use context::CallContext;
pub use queue::{CqNext, CqPoll, EventQueue};
pub use runloop::{process_all, process_one, process_one_with_deadline, Runloop};
pub use status::{RpcStatus, RpcStatusCode};
pub use tag::{CqTag, TagHandler};
