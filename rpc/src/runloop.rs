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

use std::{rc::Rc, time::Instant};

use log::*;

use crate::{
    client::ServiceClient,
    queue::{CqNext, CqPoll, EventQueue},
};

const LOG_TARGET: &str = "shuriken::rpc::runloop";

/// Pops one event and dispatches it. Returns false when the queue reports shutdown or has nothing left to hand out.
pub fn process_one(queue: &EventQueue) -> bool {
    match queue.next() {
        CqPoll::Event(tag, success) => {
            trace!(target: LOG_TARGET, "Dispatching tag {:#x} (success = {})", tag.id(), success);
            tag.dispatch(success);
            true
        },
        CqPoll::Empty => false,
        CqPoll::Shutdown => {
            trace!(target: LOG_TARGET, "Queue is shutting down");
            false
        },
    }
}

/// Like [`process_one`], but reports how the poll ended.
pub fn process_one_with_deadline(queue: &EventQueue, deadline: Instant) -> CqNext {
    let (next, event) = queue.next_with_deadline(deadline);
    if let Some((tag, success)) = event {
        trace!(target: LOG_TARGET, "Dispatching tag {:#x} (success = {})", tag.id(), success);
        tag.dispatch(success);
    }
    next
}

/// Dispatches events until the queue runs dry or shuts down.
pub fn process_all(queue: &EventQueue) {
    while process_one(queue) {}
}

/// Owns an event queue and drives it. Invocation completions for every client made from this runloop are dispatched
/// from whichever thread calls [`run`](Runloop::run) or [`next`](Runloop::next).
pub struct Runloop {
    queue: Rc<EventQueue>,
}

impl Runloop {
    pub fn new() -> Self {
        Runloop {
            queue: Rc::new(EventQueue::new()),
        }
    }

    pub fn queue(&self) -> &Rc<EventQueue> {
        &self.queue
    }

    /// Makes a per-service client whose calls are posted on this runloop's queue.
    pub fn make_client<S: 'static>(&self, stub: S) -> ServiceClient<S> {
        ServiceClient::new(stub, self.queue.clone())
    }

    /// Blocks processing events until the queue shuts down or runs dry.
    pub fn run(&self) {
        process_all(&self.queue);
    }

    /// Processes one event. Returns false if the queue is shutting down or empty.
    pub fn next(&self) -> bool {
        process_one(&self.queue)
    }

    /// Processes one event with a deadline.
    pub fn next_with_deadline(&self, deadline: Instant) -> CqNext {
        process_one_with_deadline(&self.queue, deadline)
    }

    pub fn shutdown(&self) {
        self.queue.shutdown();
    }
}

impl Default for Runloop {
    fn default() -> Self {
        Runloop::new()
    }
}

impl Drop for Runloop {
    fn drop(&mut self) {
        self.shutdown();
    }
}
